//! `flatgo-ast` is a pointer-free, in-memory representation of a Go syntax
//! tree: the whole tree lives in one flat `u64 → Node` map with no
//! parent/child references. A node at address `a` keeps its children at the
//! contiguous run starting at `scramble(a)`, so structure is recomputed from
//! addresses instead of stored as links.
//!
//! ## Examples
//!
//! ```
//! use flatgo_ast::{Node, PackageKind, ROOT, Tree};
//!
//! let mut tree = Tree::new();
//! tree.insert(ROOT, Node::Root);
//! let file = tree.insert_child(ROOT, 0, Node::File);
//! let pkg = tree.insert_child(file, 0, Node::Package(PackageKind::Normal));
//! tree.insert_child(pkg, 0, Node::leaf("main"));
//!
//! assert_eq!(tree.child_count(file), 1);
//! assert!(tree.child(pkg, 0).unwrap().is_leaf());
//! ```
//!
//! An external builder populates the tree from a front-end parse, consulting
//! [`classify`] to tag comment records; `flatgo-formatter` then regenerates
//! source text from the finished store.

pub mod addr;
mod comments;
mod dump;
mod node;
mod store;

pub use addr::{child, child_base, scramble};
pub use comments::{CommentPlacement, classify};
pub use dump::dump;
pub use node::{
    AssignKind, BlockKind, BranchKind, Category, CommentKind, ExprKind, FieldKind, GoDeferKind,
    IncDecKind, LabelKind, Node, PackageKind, TypeDefKind, VarDefKind,
};
pub use store::{ROOT, Tree};
