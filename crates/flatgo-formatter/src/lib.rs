//! `flatgo-formatter` walks a finished [`flatgo_ast::Tree`] once, depth
//! first, and regenerates well-formed Go source text from it. All emission
//! decisions are a pure function of a node's {category, variant, slots} plus
//! at most one sibling's category, so the walk is single-pass with no
//! persistent cross-sibling state.

mod error;
mod unparser;

pub use error::RenderError;
pub use unparser::{Unparser, render};
