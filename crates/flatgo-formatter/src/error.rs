/// Errors raised while rendering a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The tree nests deeper than the recursion ceiling. Rendering produces
    /// no output rather than overflowing the stack.
    #[error("tree is too deeply nested ({depth} levels)")]
    TooDeep { depth: usize },
}
