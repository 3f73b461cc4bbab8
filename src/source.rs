//! Pull-based splitting of a SQL script into statements.
//!
//! [`SqlSource`] scans the whole script on the first request, then hands out
//! one statement per call. Lexical and structural errors are collected while
//! scanning and reassembling; the request that runs into them fails with all
//! of them at once, and so does every request after it.

mod config;
mod reassembler;
pub(crate) mod text;

use std::fs::File;
use std::io::{self, Read};
use std::iter::FusedIterator;
use std::path::Path;

use encoding_rs::Encoding;
use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};
pub use config::{Layout, SourceConfig};
use reassembler::Reassembler;

use crate::errors::{ErrorList, ScanError, SqlInputError};
use crate::format::{SimpleSqlFormatter, SqlFormatter};
use crate::reader::SourceReader;
use crate::scanner::Scanner;
use crate::token::Token;

/// Failure kept around so it can be returned again.
#[derive(Debug, Clone)]
enum Failure {
    Io { kind: io::ErrorKind, message: String },
    Syntax(Vec<ScanError>),
}

impl Failure {
    fn to_error(&self) -> SqlInputError {
        match self {
            Failure::Io { kind, message } => io::Error::new(*kind, message.clone()).into(),
            Failure::Syntax(errors) => SqlInputError::Syntax {
                errors: errors.clone(),
            },
        }
    }
}

impl From<&SqlInputError> for Failure {
    fn from(error: &SqlInputError) -> Self {
        match error {
            SqlInputError::Io(e) => Failure::Io {
                kind: e.kind(),
                message: e.to_string(),
            },
            SqlInputError::Syntax { errors } => Failure::Syntax(errors.clone()),
        }
    }
}

/// A SQL script read from `R`, handed out one statement at a time.
///
/// The underlying stream is read to the end on the first call to
/// [`next_statement`](Self::next_statement) and released right after.
#[derive(Debug)]
pub struct SqlSource<R> {
    reader: Option<SourceReader<R>>,
    scanner: Scanner,
    layout: Layout,
    tokens: Vec<Token>,
    reassembler: Reassembler,
    errors: ErrorList,
    failure: Option<Failure>,
    emitted: usize,
    fused: bool,
}

impl<R: Read> SqlSource<R> {
    /// Split the script read from `reader` with the default configuration.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, SourceConfig::default())
    }

    /// Split the script read from `reader` with the given configuration.
    #[must_use]
    pub fn with_config(reader: R, config: SourceConfig) -> Self {
        Self {
            reader: Some(SourceReader::new(reader)),
            scanner: Scanner::new(config.dialect),
            layout: config.layout,
            tokens: Vec::new(),
            reassembler: Reassembler::default(),
            errors: ErrorList::new(),
            failure: None,
            emitted: 0,
            fused: false,
        }
    }

    /// The next statement, or `Ok(None)` once the script is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`SqlInputError::Io`] if reading the script failed and
    /// [`SqlInputError::Syntax`] with every recorded error if the script is
    /// malformed. Once a call has failed, every later call returns the same
    /// error.
    pub fn next_statement(&mut self) -> Result<Option<String>, SqlInputError> {
        if let Some(failure) = &self.failure {
            return Err(failure.to_error());
        }
        self.pull().inspect_err(|error| self.failure = Some(Failure::from(error)))
    }

    /// Tokens of the script; empty until the first statement was requested.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Errors recorded so far.
    #[must_use]
    pub fn errors(&self) -> &[ScanError] {
        self.errors.errors()
    }

    fn pull(&mut self) -> Result<Option<String>, SqlInputError> {
        self.scan()?;
        self.check()?;
        let statement = self
            .reassembler
            .next_statement(&self.tokens, self.layout, &mut self.errors);
        self.check()?;

        if let Some(statement) = &statement {
            self.emitted += 1;
            if tracing::enabled!(tracing::Level::DEBUG) {
                let formatted = SimpleSqlFormatter::new(self.scanner.dialect()).format(statement);
                tracing::debug!(ordinal = self.emitted, statement = %formatted, "SQL statement");
            }
        }
        Ok(statement)
    }

    fn scan(&mut self) -> io::Result<()> {
        if let Some(mut reader) = self.reader.take() {
            self.tokens = self.scanner.scan_tokens(&mut reader, &mut self.errors)?;
        }
        Ok(())
    }

    fn check(&self) -> Result<(), SqlInputError> {
        if self.errors.has_errors() {
            return Err(SqlInputError::Syntax {
                errors: self.errors.errors().to_vec(),
            });
        }
        Ok(())
    }
}

impl<'a> SqlSource<&'a [u8]> {
    /// Split an in-memory script with the default configuration.
    #[must_use]
    pub fn from_sql(sql: &'a str) -> Self {
        Self::new(sql.as_bytes())
    }

    /// Split an in-memory script with the given configuration.
    #[must_use]
    pub fn from_sql_with_config(sql: &'a str, config: SourceConfig) -> Self {
        Self::with_config(sql.as_bytes(), config)
    }
}

impl SqlSource<File> {
    /// Split the script stored in the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::open_with_config(path, SourceConfig::default())
    }

    /// Split the script stored in the file at `path` with the given
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open_with_config(path: impl AsRef<Path>, config: SourceConfig) -> io::Result<Self> {
        Ok(Self::with_config(File::open(path)?, config))
    }
}

impl<R: Read> SqlSource<DecodeReaderBytes<R, Vec<u8>>> {
    /// Split a script read from `reader` in the given text encoding, such as
    /// [`encoding_rs::UTF_16LE`].
    ///
    /// A byte-order mark at the start of the stream takes precedence over
    /// `encoding`.
    #[must_use]
    pub fn with_encoding(reader: R, encoding: &'static Encoding, config: SourceConfig) -> Self {
        let decoded = DecodeReaderBytesBuilder::new()
            .encoding(Some(encoding))
            .bom_override(true)
            .build(reader);
        Self::with_config(decoded, config)
    }
}

impl SqlSource<DecodeReaderBytes<File, Vec<u8>>> {
    /// Split the script stored in the file at `path` in the given text
    /// encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open_with_encoding(
        path: impl AsRef<Path>,
        encoding: &'static Encoding,
        config: SourceConfig,
    ) -> io::Result<Self> {
        Ok(Self::with_encoding(File::open(path)?, encoding, config))
    }
}

impl<R: Read> Iterator for SqlSource<R> {
    type Item = Result<String, SqlInputError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fused {
            return None;
        }
        let item = self.next_statement().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.fused = true;
        }
        item
    }
}

impl<R: Read> FusedIterator for SqlSource<R> {}
