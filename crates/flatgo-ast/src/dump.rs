//! Structural trace of a subtree, for builder debugging.
//!
//! The format is human-readable and unstable; nothing may depend on it.

use crate::Tree;

const MAX_INDENT: usize = 50;

/// Renders an indented trace of the subtree rooted at `addr`, one bracketed
/// line per record. The absent key that terminates each child run is shown
/// as `[-]`.
pub fn dump(tree: &Tree, addr: u64, indent: usize) -> String {
    let mut out = String::new();
    dump_into(&mut out, tree, addr, indent);
    out
}

fn dump_into(out: &mut String, tree: &Tree, addr: u64, indent: usize) -> bool {
    out.push_str(&" ".repeat(indent.min(MAX_INDENT)));
    let Some(node) = tree.get(addr) else {
        out.push_str("[-]\n");
        return false;
    };
    match node.category() {
        Some(category) => out.push_str(&format!(
            "[{:?} {} {}]\n",
            category,
            node.variant(),
            node.slots()
        )),
        None if node.is_leaf() => {
            out.push_str("[leaf ");
            out.push_str(node.text());
            out.push_str("]\n");
        }
        None => out.push_str("[empty]\n"),
    }
    for i in 0u64.. {
        if !dump_into(out, tree, crate::addr::child(addr, i), indent + 1) {
            break;
        }
    }
    true
}
