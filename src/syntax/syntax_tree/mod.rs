//! Contains the syntax tree nodes of the `CommandScript` language.

pub mod declaration;
pub mod expression;
pub mod program;
pub mod statement;

/// The indentation unit of tree dumps, repeated once per depth level.
pub const INDENT: &str = "| ";

/// Capability of producing an indented textual dump of a node.
///
/// The dump is stable and is used for golden-style assertions in tests; it is
/// not an execution format. Each node prints one summary line at its own
/// depth and its children recursively beneath.
pub trait Render {
    /// Renders the node at the given depth.
    fn render(&self, depth: usize) -> String;
}

impl<T: Render> Render for Box<T> {
    fn render(&self, depth: usize) -> String {
        self.as_ref().render(depth)
    }
}

/// Gets the indentation prefix for the given depth.
#[must_use]
pub fn indent(depth: usize) -> String {
    INDENT.repeat(depth)
}
