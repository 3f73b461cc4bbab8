#![doc = include_str!("../README.md")]
#![deny(clippy::mod_module_files)]

pub mod errors;
pub mod format;
pub mod reader;
pub mod scanner;
pub mod source;
pub mod token;

pub use encoding_rs;
pub use errors::{ErrorList, ErrorReporter, ScanError, SqlInputError};
pub use format::{SimpleSqlFormatter, SqlFormatter};
pub use reader::{CharSource, SourceReader};
pub use scanner::{Dialect, Scanner};
pub use source::{Layout, SourceConfig, SqlSource};
pub use token::{Token, TokenKind};
