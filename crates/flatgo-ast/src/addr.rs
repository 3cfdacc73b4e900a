//! Address derivation for the flat store.
//!
//! The tree stores no parent/child links. A node at address `a` keeps its
//! children at the contiguous run `child_base(a) + 0, 1, 2, …`, where
//! `child_base` scrambles the parent address through an avalanche mixer so
//! that the runs of unrelated parents land in disjoint regions of the `u64`
//! key space with overwhelming probability.

/// Scrambles a node address into the base address of its child run.
///
/// A pure multiply/xor/shift cascade with full avalanche: every output bit
/// depends on every input bit. Deterministic across runs and platforms.
pub fn scramble(addr: u64) -> u64 {
    let mut v = addr
        .wrapping_mul(3935559000370003845)
        .wrapping_add(2691343689449507681);
    v ^= v >> 21;
    v ^= v << 37;
    v ^= v >> 4;
    v = v.wrapping_mul(4768777513237032717);
    v ^= v << 20;
    v ^= v >> 41;
    v ^= v << 5;
    v
}

/// The base address of `parent`'s child run.
#[inline]
pub fn child_base(parent: u64) -> u64 {
    scramble(parent)
}

/// The address of child `i` of `parent`.
#[inline]
pub fn child(parent: u64, i: u64) -> u64 {
    child_base(parent).wrapping_add(i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    // Pinned vectors: the scramble function is part of the data model's
    // contract, so any change to the constants is a breaking change.
    #[rstest]
    #[case(0, 8882115565503647203)]
    #[case(1, 13738603025981410947)]
    #[case(2, 5254468713721439064)]
    #[case(42, 14558803520972736065)]
    #[case(0xdeadbeef, 197846099562493495)]
    #[case(u64::MAX, 10017675707735882228)]
    fn test_scramble_vectors(#[case] addr: u64, #[case] expected: u64) {
        assert_eq!(scramble(addr), expected);
    }

    #[test]
    fn test_child_offsets() {
        let base = child_base(7);
        assert_eq!(child(7, 0), base);
        assert_eq!(child(7, 3), base.wrapping_add(3));
    }

    proptest! {
        #[test]
        fn test_deterministic(addr: u64) {
            prop_assert_eq!(scramble(addr), scramble(addr));
        }

        #[test]
        fn test_avalanche(addr: u64, bit in 0u32..64) {
            let flipped = addr ^ (1u64 << bit);
            let diff = (scramble(addr) ^ scramble(flipped)).count_ones();
            // A single flipped input bit should change roughly half of the
            // output bits; anything below 8 would indicate a broken mixer.
            prop_assert!(diff >= 8, "only {} bits changed", diff);
        }

        #[test]
        fn test_sibling_runs_disjoint(parent_a: u64, parent_b: u64) {
            prop_assume!(parent_a != parent_b);
            let a = child_base(parent_a);
            let b = child_base(parent_b);
            // Runs of test-sized trees never overlap.
            prop_assert!(a.wrapping_sub(b) > 1000 && b.wrapping_sub(a) > 1000);
        }
    }
}
