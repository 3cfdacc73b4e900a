//! The flat store: one `u64 → Node` map for a whole tree.

use rustc_hash::FxHashMap;

use crate::addr;
use crate::node::Node;

/// The address of the root node.
pub const ROOT: u64 = 0;

/// A whole syntax tree packed into a single flat map.
///
/// The tree is built once by an external builder and is immutable during
/// rendering: the API is write-once, records are inserted and never updated or
/// removed. A missing key is the *absent* record form and terminates the
/// child run scanned from index 0.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: FxHashMap<u64, Node>,
}

impl Tree {
    pub fn new() -> Tree {
        Tree::default()
    }

    /// Inserts the record at `key`. Construction only; overwriting an
    /// occupied address violates the builder contract.
    pub fn insert(&mut self, key: u64, node: Node) {
        self.nodes.insert(key, node);
    }

    /// Inserts child `i` of `parent` and returns the child's address.
    pub fn insert_child(&mut self, parent: u64, i: u64, node: Node) -> u64 {
        let key = addr::child(parent, i);
        self.insert(key, node);
        key
    }

    pub fn get(&self, key: u64) -> Option<&Node> {
        self.nodes.get(&key)
    }

    /// Whether the address is occupied (the original's `Poke`).
    pub fn contains(&self, key: u64) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Child `i` of `parent`, or `None` when absent.
    pub fn child(&self, parent: u64, i: u64) -> Option<&Node> {
        self.get(addr::child(parent, i))
    }

    /// Iterates `parent`'s child run in order, stopping at the first absent
    /// key.
    pub fn children(&self, parent: u64) -> impl Iterator<Item = (u64, &Node)> {
        let base = addr::child_base(parent);
        (0u64..)
            .map(move |i| base.wrapping_add(i))
            .map_while(|key| self.get(key).map(|node| (key, node)))
    }

    /// The number of materialized children of `parent`.
    pub fn child_count(&self, parent: u64) -> u64 {
        self.children(parent).count() as u64
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
