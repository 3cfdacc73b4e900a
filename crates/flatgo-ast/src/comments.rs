//! Comment placement classification.
//!
//! The unparser cannot recover comment placement from the tree alone, so the
//! builder consults one forward scan of the raw source before constructing
//! comment records: a comment that shares a line with other content must be
//! re-attached to the end of that line, and a comment that follows a blank
//! line must get its blank line back.

use itertools::Itertools;
use rustc_hash::FxHashSet;

use crate::node::CommentKind;

/// Marker byte offsets, classified. Offsets not present in either set are
/// ordinary own-line comments.
#[derive(Debug, Clone, Default)]
pub struct CommentPlacement {
    /// Comment markers preceded by non-whitespace content on their line.
    pub end_of_line: FxHashSet<usize>,
    /// Comment markers (and the `package` keyword) that are the first content
    /// on their line after at least one blank line.
    pub separate: FxHashSet<usize>,
}

impl CommentPlacement {
    /// The comment kind for a marker starting at `offset`.
    pub fn kind_at(&self, offset: usize) -> CommentKind {
        if self.end_of_line.contains(&offset) {
            CommentKind::Ender
        } else if self.separate.contains(&offset) {
            CommentKind::Separate
        } else {
            CommentKind::Normal
        }
    }
}

/// Classifies every `//` and `/*` marker in `source` in one O(n) pass.
///
/// The scan tracks whether the position is still in a line's leading
/// whitespace, whether the previous line was blank, and whether a marker was
/// already recorded for the current line's tail.
pub fn classify(source: &[u8]) -> CommentPlacement {
    let mut placement = CommentPlacement::default();
    // Leading whitespace of the (empty) zeroth line.
    let mut whitespace = true;
    let mut blank_line_before = false;
    let mut saw_ender = false;

    for (i, (c, d)) in source.iter().copied().tuple_windows().enumerate() {
        if c == b'\n' {
            if whitespace {
                blank_line_before = true;
            }
            whitespace = true;
            saw_ender = false;
            continue;
        }
        let marker = (c == b'/' && d == b'/') || (c == b'/' && d == b'*');
        if marker && !whitespace && !saw_ender {
            placement.end_of_line.insert(i);
            saw_ender = true;
        }
        if marker && blank_line_before {
            placement.separate.insert(i);
            blank_line_before = false;
        }
        if c == b'p' && d == b'a' && blank_line_before {
            placement.separate.insert(i);
            blank_line_before = false;
        }
        if c > b' ' {
            whitespace = false;
            blank_line_before = false;
        }
    }
    placement
}
