//! Errors found while scanning and splitting SQL scripts.

use core::fmt::{self, Display};

/// A lexical or structural error found in SQL input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanError {
    /// Character offset where the offending construct starts.
    pub offset: usize,
    /// Number of characters covered by the error.
    pub length: usize,
    /// Human-readable description.
    pub message: String,
}

impl ScanError {
    /// Create a new error record.
    #[must_use]
    pub fn new(offset: usize, length: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            message: message.into(),
        }
    }
}

impl Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(offset={}, length={}) {}",
            self.offset, self.length, self.message
        )
    }
}

/// A sink for errors found while scanning or reassembling SQL input.
///
/// Reporting never fails and never aborts the caller; whoever drives the scan
/// decides what to do with the errors afterwards.
pub trait ErrorReporter {
    /// Record an error covering `length` characters at `offset`.
    fn error(&mut self, offset: usize, length: usize, message: &str);
}

/// An [`ErrorReporter`] that keeps every reported error, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList {
    errors: Vec<ScanError>,
}

impl ErrorList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The errors recorded so far.
    #[must_use]
    pub fn errors(&self) -> &[ScanError] {
        &self.errors
    }

    /// Returns `true` if at least one error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of recorded errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consume the list, returning the recorded errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<ScanError> {
        self.errors
    }
}

impl ErrorReporter for ErrorList {
    fn error(&mut self, offset: usize, length: usize, message: &str) {
        tracing::warn!(offset, length, message, "SQL input error");
        self.errors.push(ScanError::new(offset, length, message));
    }
}

/// Errors returned when pulling statements out of a SQL source.
#[derive(Debug, thiserror::Error)]
pub enum SqlInputError {
    /// The underlying character stream failed.
    #[error("I/O error reading SQL source: {0}")]
    Io(#[from] std::io::Error),
    /// The input contains lexical or structural errors.
    #[error("SQL input error(s): {}", ErrorsDisplay(.errors))]
    Syntax {
        /// Every recorded error, in the order it was found.
        errors: Vec<ScanError>,
    },
}

impl SqlInputError {
    /// The recorded scan errors, empty for I/O failures.
    #[must_use]
    pub fn errors(&self) -> &[ScanError] {
        match self {
            SqlInputError::Io(_) => &[],
            SqlInputError::Syntax { errors } => errors,
        }
    }
}

struct ErrorsDisplay<'a>(&'a [ScanError]);

impl Display for ErrorsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}
