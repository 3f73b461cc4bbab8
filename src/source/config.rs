//! Configuration of a [`SqlSource`](super::SqlSource).

use crate::scanner::Dialect;

/// How statement text is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Layout {
    /// Comments removed, each run of whitespace and comments replaced by a
    /// single space.
    #[default]
    Compact,
    /// Source text as written, comments included, trimmed at both ends.
    Verbatim,
}

/// Options for splitting a script into statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceConfig {
    /// Lexical rules used to scan the script.
    pub dialect: Dialect,
    /// Rendering of the statements handed out.
    pub layout: Layout,
}

impl SourceConfig {
    /// Use the given dialect.
    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Use the given layout.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }
}
