//! Lexical scanner for SQL scripts.
//!
//! The scanner classifies just enough of SQL to find statement boundaries:
//! punctuation, comments, quoted text, whitespace, and the handful of
//! reserved words that open or close compound blocks. Every character of the
//! input lands in exactly one token.
//!
//! Dialects extend the scanner with [`SpecialToken`] matchers that are tried,
//! in order, before the standard dispatch.

mod postgres;

use std::io;

pub use postgres::dollar_quoted_string;

use crate::errors::ErrorReporter;
use crate::reader::{CharSource, EOF};
use crate::token::{Token, TokenKind, reserved_word};

/// Dialect-specific token matcher.
///
/// Called with the first character of a token (already consumed). A matcher
/// either produces the token, fails after reporting an error, or declines so
/// the next matcher (and finally the standard dispatch) gets a turn.
///
/// Characters a declining matcher consumed stay in the lexeme, so a matcher
/// may only consume characters before declining when the standard dispatch
/// would put them in the same token as `c`.
pub type SpecialToken = fn(char, &mut ScanRequest<'_>) -> io::Result<Matched>;

/// Outcome of scanning one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matched {
    /// A complete token.
    Token(Token),
    /// The matcher does not handle this input.
    Declined,
    /// An error was reported; scanning cannot continue.
    Failed,
}

const POSTGRES_SPECIAL_TOKENS: &[SpecialToken] = &[dollar_quoted_string];

/// SQL dialect selecting the scanner's lexical rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dialect {
    /// Standard SQL.
    #[default]
    Standard,
    /// PostgreSQL: dollar-quoted strings, `$` allowed inside identifiers.
    Postgres,
}

impl Dialect {
    /// Matchers tried before the standard dispatch, in order.
    #[must_use]
    pub fn special_tokens(self) -> &'static [SpecialToken] {
        match self {
            Dialect::Standard => &[],
            Dialect::Postgres => POSTGRES_SPECIAL_TOKENS,
        }
    }

    /// Returns `true` if `c` may continue an identifier.
    #[must_use]
    pub fn is_identifier_char(self, c: char) -> bool {
        match self {
            Dialect::Standard => is_identifier_char(c),
            Dialect::Postgres => is_identifier_char(c) || c == '$',
        }
    }
}

/// State shared by the scanning routines while one token is being scanned.
pub struct ScanRequest<'a> {
    source: &'a mut dyn CharSource,
    reporter: &'a mut dyn ErrorReporter,
    dialect: Dialect,
}

impl<'a> ScanRequest<'a> {
    fn new(
        source: &'a mut dyn CharSource,
        reporter: &'a mut dyn ErrorReporter,
        dialect: Dialect,
    ) -> Self {
        Self {
            source,
            reporter,
            dialect,
        }
    }

    /// The dialect being scanned.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The text of the token scanned so far.
    #[must_use]
    pub fn lexeme(&self) -> &str {
        self.source.lexeme()
    }

    /// Characters `start..end` of the token scanned so far.
    #[must_use]
    pub fn lexeme_range(&self, start: usize, end: usize) -> &str {
        self.source.lexeme_range(start, end)
    }

    /// Returns `true` once the input is exhausted.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.source.is_eof()
    }

    /// Consume the next character, `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    pub fn next_char(&mut self) -> io::Result<Option<char>> {
        let c = self.source.advance()?;
        Ok(if c == EOF && self.source.is_eof() {
            None
        } else {
            Some(c)
        })
    }

    /// The next character without consuming it, `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    pub fn peek_char(&mut self) -> io::Result<Option<char>> {
        let c = self.source.peek()?;
        Ok(if self.source.is_eof() { None } else { Some(c) })
    }

    /// Consume the next character if it equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    pub fn match_char(&mut self, expected: char) -> io::Result<bool> {
        self.source.match_char(expected)
    }

    /// Consume characters for as long as `predicate` holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    pub fn advance_while(&mut self, predicate: impl Fn(char) -> bool) -> io::Result<()> {
        while let Some(c) = self.peek_char()? {
            if !predicate(c) {
                break;
            }
            self.source.advance()?;
        }
        Ok(())
    }

    /// Like [`advance_while`](Self::advance_while), but also stops before a
    /// `--` or `/*` that opens a comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    pub fn advance_run(&mut self, predicate: impl Fn(char) -> bool) -> io::Result<()> {
        while let Some(c) = self.peek_char()? {
            if !predicate(c) || self.comment_follows(c)? {
                break;
            }
            self.source.advance()?;
        }
        Ok(())
    }

    fn comment_follows(&mut self, c: char) -> io::Result<bool> {
        Ok(match c {
            '-' => self.source.peek_next()? == '-',
            '/' => self.source.peek_next()? == '*',
            _ => false,
        })
    }

    /// A token of `kind` over the characters scanned so far.
    #[must_use]
    pub fn token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.source.lexeme(), self.source.start())
    }

    /// Report an error at the start of the current token.
    pub fn error(&mut self, length: usize, message: &str) {
        self.reporter.error(self.source.start(), length, message);
    }

    /// Report an unterminated construct whose opening delimiter is
    /// `delimiter_len` characters long and give up on the scan.
    ///
    /// The reported span covers the delimiter and the end-of-input position.
    #[must_use]
    pub fn unterminated(&mut self, delimiter_len: usize, message: &str) -> Matched {
        self.error(delimiter_len + 1, message);
        Matched::Failed
    }
}

/// SQL scanner producing the complete token list of a script.
#[derive(Debug, Clone)]
pub struct Scanner {
    dialect: Dialect,
    special: Vec<SpecialToken>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(Dialect::Standard)
    }
}

impl Scanner {
    /// Create a scanner for `dialect`.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            special: dialect.special_tokens().to_vec(),
        }
    }

    /// Add a matcher, tried after the dialect's own matchers.
    #[must_use]
    pub fn with_special_token(mut self, matcher: SpecialToken) -> Self {
        self.special.push(matcher);
        self
    }

    /// The dialect this scanner was built for.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Scan `source` to the end, returning every token.
    ///
    /// Lexical errors go to `reporter`. The first unrecoverable one stops the
    /// scan; the tokens found up to that point are still returned. The list
    /// always ends with exactly one [`TokenKind::Eof`] token.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    pub fn scan_tokens(
        &self,
        source: &mut dyn CharSource,
        reporter: &mut dyn ErrorReporter,
    ) -> io::Result<Vec<Token>> {
        let mut request = ScanRequest::new(source, reporter, self.dialect);
        let mut tokens = Vec::new();
        while !request.is_eof() {
            request.source.mark_start();
            let c = request.source.advance()?;
            match self.scan_token(c, &mut request)? {
                Matched::Token(token) => tokens.push(token),
                Matched::Declined => {}
                Matched::Failed => break,
            }
        }
        if tokens.last().is_none_or(|token| token.kind() != TokenKind::Eof) {
            request.source.mark_start();
            tokens.push(request.token(TokenKind::Eof));
        }
        tracing::trace!(
            dialect = ?self.dialect,
            tokens = tokens.len(),
            "scanned SQL source"
        );
        Ok(tokens)
    }

    fn scan_token(&self, c: char, request: &mut ScanRequest<'_>) -> io::Result<Matched> {
        for matcher in &self.special {
            match matcher(c, request)? {
                Matched::Declined => {}
                matched => return Ok(matched),
            }
        }
        scan_standard(c, request)
    }
}

/// The standard dispatch on the first character of a token.
fn scan_standard(c: char, request: &mut ScanRequest<'_>) -> io::Result<Matched> {
    match c {
        EOF if request.is_eof() => token(request, TokenKind::Eof),
        '(' => token(request, TokenKind::LeftParen),
        ')' => token(request, TokenKind::RightParen),
        '{' => token(request, TokenKind::LeftBrace),
        '}' => token(request, TokenKind::RightBrace),
        ';' => token(request, TokenKind::Semicolon),
        '-' if request.match_char('-')? => line_comment(request),
        '/' if request.match_char('*')? => block_comment(request),
        '"' => quoted(request, '"', TokenKind::Identifier, "unterminated quoted identifier"),
        '\'' => quoted(request, '\'', TokenKind::Literal, "unterminated string"),
        _ if is_whitespace(c) => {
            request.advance_while(is_whitespace)?;
            token(request, TokenKind::Whitespace)
        }
        _ if is_identifier_start(c) => identifier(request),
        _ if c.is_ascii_digit() => {
            request.advance_run(is_number_char)?;
            token(request, TokenKind::Literal)
        }
        _ if is_operator(c) => {
            request.advance_run(is_operator)?;
            token(request, TokenKind::Literal)
        }
        _ => {
            request.error(1, &format!("unrecognized input '{c}'"));
            Ok(Matched::Failed)
        }
    }
}

fn token(request: &ScanRequest<'_>, kind: TokenKind) -> io::Result<Matched> {
    Ok(Matched::Token(request.token(kind)))
}

/// `--` comment, up to but not including the end of the line.
fn line_comment(request: &mut ScanRequest<'_>) -> io::Result<Matched> {
    request.advance_while(|c| c != '\n')?;
    token(request, TokenKind::Comment)
}

/// `/* ... */` comment; comments nest.
fn block_comment(request: &mut ScanRequest<'_>) -> io::Result<Matched> {
    let mut depth = 1usize;
    loop {
        match request.next_char()? {
            None => return Ok(request.unterminated(2, "unterminated block comment")),
            Some('/') if request.match_char('*')? => depth += 1,
            Some('*') if request.match_char('/')? => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Matched::Token(request.token(TokenKind::Comment)));
                }
            }
            Some(_) => {}
        }
    }
}

/// Text enclosed in `quote`, where a doubled quote stands for itself.
fn quoted(
    request: &mut ScanRequest<'_>,
    quote: char,
    kind: TokenKind,
    unterminated: &str,
) -> io::Result<Matched> {
    loop {
        match request.next_char()? {
            None => return Ok(request.unterminated(1, unterminated)),
            Some(c) if c == quote && !request.match_char(quote)? => {
                return Ok(Matched::Token(request.token(kind)));
            }
            Some(_) => {}
        }
    }
}

fn identifier(request: &mut ScanRequest<'_>) -> io::Result<Matched> {
    let dialect = request.dialect();
    request.advance_while(|c| dialect.is_identifier_char(c))?;
    let kind = reserved_word(request.lexeme()).unwrap_or(TokenKind::Identifier);
    token(request, kind)
}

/// Whitespace as the scanner sees it: Unicode white space, the ASCII
/// information separators, and NUL.
#[must_use]
pub fn is_whitespace(c: char) -> bool {
    matches!(c, '\0' | '\u{1c}'..='\u{1f}') || c.is_whitespace()
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')
}

/// Operator text; stops at characters that start a token of their own.
fn is_operator(c: char) -> bool {
    !c.is_alphanumeric()
        && !is_whitespace(c)
        && !matches!(c, '(' | ')' | '{' | '}' | ';' | '\'' | '"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorList, ScanError};
    use crate::reader::SourceReader;

    fn scan(dialect: Dialect, input: &str) -> (Vec<Token>, ErrorList) {
        let mut errors = ErrorList::new();
        let tokens = Scanner::new(dialect)
            .scan_tokens(&mut SourceReader::from_sql(input), &mut errors)
            .unwrap();
        (tokens, errors)
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        scan(Dialect::Standard, input)
            .0
            .iter()
            .map(Token::kind)
            .collect()
    }

    /// Asserts that `input` scans to a single token of `kind` plus EOF.
    fn validate_input(input: &str, kind: TokenKind) {
        let (tokens, errors) = scan(Dialect::Standard, input);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors.errors());
        assert_eq!(tokens.len(), 2, "tokens: {tokens:?}");
        assert_eq!(tokens[0].kind(), kind);
        assert_eq!(tokens[0].lexeme(), input);
        assert_eq!(tokens[1].kind(), TokenKind::Eof);
        assert_eq!(tokens[1].lexeme(), "");
    }

    #[test]
    fn test_empty_input() {
        let (tokens, errors) = scan(Dialect::Standard, "");
        assert!(errors.is_empty());
        assert_eq!(tokens, vec![Token::new(TokenKind::Eof, "", 0)]);
    }

    #[test]
    fn test_punctuation() {
        validate_input("(", TokenKind::LeftParen);
        validate_input(")", TokenKind::RightParen);
        validate_input("{", TokenKind::LeftBrace);
        validate_input("}", TokenKind::RightBrace);
        validate_input(";", TokenKind::Semicolon);
    }

    #[test]
    fn test_whitespace() {
        validate_input("\0\t\n\u{b}\u{c}\r \u{a0}\u{1f}", TokenKind::Whitespace);
    }

    #[test]
    fn test_comments() {
        validate_input("-- comment", TokenKind::Comment);
        validate_input("/* comment */", TokenKind::Comment);
        validate_input(
            "/* outer /* nested /* more nested comment */ comment */ comment */",
            TokenKind::Comment,
        );
        validate_input("/**/", TokenKind::Comment);
    }

    #[test]
    fn test_line_comment_stops_before_newline() {
        let (tokens, _) = scan(Dialect::Standard, "-- note\nx");
        assert_eq!(tokens[0].lexeme(), "-- note");
        assert_eq!(tokens[1].kind(), TokenKind::Whitespace);
        assert_eq!(tokens[1].lexeme(), "\n");
        assert_eq!(tokens[2].kind(), TokenKind::Identifier);
    }

    #[test]
    fn test_strings_and_identifiers() {
        validate_input("'string '' string'", TokenKind::Literal);
        validate_input("''", TokenKind::Literal);
        validate_input("\"Table Name With Spaces\"", TokenKind::Identifier);
        validate_input("\"say \"\"hi\"\"\"", TokenKind::Identifier);
        validate_input("AZaz_09", TokenKind::Identifier);
        validate_input("_private", TokenKind::Identifier);
        validate_input("naïve", TokenKind::Identifier);
    }

    #[test]
    fn test_reserved_words() {
        validate_input("BEGIN", TokenKind::Begin);
        validate_input("begin", TokenKind::Begin);
        validate_input("END", TokenKind::End);
        validate_input("IF", TokenKind::If);
        validate_input("FOR", TokenKind::For);
        validate_input("While", TokenKind::While);
        validate_input("LOOP", TokenKind::Loop);
        validate_input("CASE", TokenKind::Case);
        validate_input("transaction", TokenKind::Transaction);
        validate_input("BEGINNING", TokenKind::Identifier);
    }

    #[test]
    fn test_numbers_and_operators() {
        validate_input("0123.45e-12", TokenKind::Literal);
        validate_input("+@$%^&*/!`~=#", TokenKind::Literal);
        validate_input("-", TokenKind::Literal);
        validate_input("/", TokenKind::Literal);
        validate_input("<>", TokenKind::Literal);
    }

    #[test]
    fn test_operator_runs_stop_at_punctuation() {
        let (tokens, _) = scan(Dialect::Standard, "*);'a'");
        let lexemes: Vec<_> = tokens.iter().map(Token::lexeme).collect();
        assert_eq!(lexemes, ["*", ")", ";", "'a'", ""]);
        assert_eq!(
            kinds("SELECT *;"),
            vec![
                TokenKind::Identifier,
                TokenKind::Whitespace,
                TokenKind::Literal,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_runs_stop_before_comments() {
        let lexemes = |input: &str| -> Vec<String> {
            scan(Dialect::Standard, input)
                .0
                .iter()
                .map(|token| token.lexeme().to_owned())
                .collect()
        };
        assert_eq!(lexemes("10-- ten"), ["10", "-- ten", ""]);
        assert_eq!(lexemes("=/* x */1"), ["=", "/* x */", "1", ""]);
        assert_eq!(lexemes("//* x */"), ["/", "/* x */", ""]);
        assert_eq!(lexemes("<>--"), ["<>", "--", ""]);
        assert_eq!(lexemes("1.5e-3-2"), ["1.5e-3-2", ""]);
        assert_eq!(lexemes("*/-"), ["*/-", ""]);
    }

    #[test]
    fn test_statement_tokens() {
        assert_eq!(
            kinds("SELECT a, 'x;y' FROM t;"),
            vec![
                TokenKind::Identifier,
                TokenKind::Whitespace,
                TokenKind::Identifier,
                TokenKind::Literal,
                TokenKind::Whitespace,
                TokenKind::Literal,
                TokenKind::Whitespace,
                TokenKind::Identifier,
                TokenKind::Whitespace,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_offsets_count_characters() {
        let (tokens, _) = scan(Dialect::Standard, "'é' x");
        assert_eq!(tokens[0].offset(), 0);
        assert_eq!(tokens[0].length(), 3);
        assert_eq!(tokens[1].offset(), 3);
        assert_eq!(tokens[2].offset(), 4);
        assert_eq!(tokens[3].offset(), 5);
        assert_eq!(tokens[3].kind(), TokenKind::Eof);
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, errors) = scan(Dialect::Standard, "'");
        assert_eq!(errors.errors(), [ScanError::new(0, 2, "unterminated string")]);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind(), TokenKind::Eof);
    }

    #[test]
    fn test_unterminated_quoted_identifier() {
        let (_, errors) = scan(Dialect::Standard, "x \"abc");
        assert_eq!(
            errors.errors(),
            [ScanError::new(2, 2, "unterminated quoted identifier")]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let (tokens, errors) = scan(Dialect::Standard, "a /* b /* c */");
        assert_eq!(
            errors.errors(),
            [ScanError::new(2, 3, "unterminated block comment")]
        );
        let kinds: Vec<_> = tokens.iter().map(Token::kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Identifier, TokenKind::Whitespace, TokenKind::Eof]
        );
    }

    #[test]
    fn test_unrecognized_input_is_terminal() {
        let (tokens, errors) = scan(Dialect::Standard, "x ² y 'open");
        assert_eq!(
            errors.errors(),
            [ScanError::new(2, 1, "unrecognized input '²'")]
        );
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].kind(), TokenKind::Eof);
    }

    #[test]
    fn test_custom_special_token() {
        fn hash_comment(c: char, request: &mut ScanRequest<'_>) -> io::Result<Matched> {
            if c != '#' {
                return Ok(Matched::Declined);
            }
            request.advance_while(|c| c != '\n')?;
            Ok(Matched::Token(request.token(TokenKind::Comment)))
        }

        let scanner = Scanner::new(Dialect::Standard).with_special_token(hash_comment);
        let mut errors = ErrorList::new();
        let tokens = scanner
            .scan_tokens(&mut SourceReader::from_sql("# note; x\n#"), &mut errors)
            .unwrap();
        let kinds: Vec<_> = tokens.iter().map(Token::kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Comment,
                TokenKind::Whitespace,
                TokenKind::Comment,
                TokenKind::Eof
            ]
        );
        assert_eq!(tokens[0].lexeme(), "# note; x");
    }

    #[test]
    fn test_postgres_identifiers_admit_dollar() {
        let (tokens, errors) = scan(Dialect::Postgres, "a$b");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind(), TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme(), "a$b");

        let (tokens, _) = scan(Dialect::Standard, "a$b");
        assert_eq!(tokens[0].lexeme(), "a");
        assert_eq!(tokens[1].lexeme(), "$");
    }
}
