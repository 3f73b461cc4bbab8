//! Formatting of SQL text for log output.

use crate::errors::ErrorReporter;
use crate::reader::SourceReader;
use crate::scanner::{Dialect, Scanner};
use crate::source::Layout;
use crate::source::text::StatementText;
use crate::token::TokenKind;

/// Renders SQL text for display.
pub trait SqlFormatter {
    /// Format `sql`. Formatting never fails; input that cannot be formatted
    /// is returned as is.
    fn format(&self, sql: &str) -> String;
}

/// Puts SQL on a single line: comments are removed and every run of
/// whitespace and comments becomes one space.
///
/// ```
/// use sql_script_rs::{SimpleSqlFormatter, SqlFormatter};
///
/// let formatter = SimpleSqlFormatter::default();
/// assert_eq!(
///     formatter.format("SELECT a, -- first\n       b\n  FROM t;"),
///     "SELECT a, b FROM t;"
/// );
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimpleSqlFormatter {
    dialect: Dialect,
}

impl SimpleSqlFormatter {
    /// Create a formatter scanning with `dialect`.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// The dialect used to scan the input.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

impl SqlFormatter for SimpleSqlFormatter {
    fn format(&self, sql: &str) -> String {
        let mut failed = FailureFlag(false);
        let tokens = match Scanner::new(self.dialect)
            .scan_tokens(&mut SourceReader::from_sql(sql), &mut failed)
        {
            Ok(tokens) if !failed.0 => tokens,
            _ => return sql.to_owned(),
        };
        let mut text = StatementText::new(Layout::Compact);
        for token in tokens.iter().filter(|t| t.kind() != TokenKind::Eof) {
            text.push(token);
        }
        text.finish()
    }
}

/// Remembers whether anything was reported, without logging it.
struct FailureFlag(bool);

impl ErrorReporter for FailureFlag {
    fn error(&mut self, _offset: usize, _length: usize, _message: &str) {
        self.0 = true;
    }
}
