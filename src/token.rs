//! Tokens produced by the scanner.

use core::fmt::{self, Display};

/// A token produced by the scanner.
///
/// A token keeps the exact source text it was scanned from, so the lexemes of
/// a scan, concatenated in order, reproduce the scanned input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    kind: TokenKind,
    lexeme: String,
    offset: usize,
    length: usize,
}

impl Token {
    /// Create a token of the given kind over `lexeme`, starting at character
    /// `offset` of the source.
    #[must_use]
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, offset: usize) -> Self {
        let lexeme = lexeme.into();
        let length = lexeme.chars().count();
        Self {
            kind,
            lexeme,
            offset,
            length,
        }
    }

    /// The lexical class of this token.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The exact source text of this token.
    #[must_use]
    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    /// Character offset of the first character of this token.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the lexeme, in characters.
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Returns `true` for whitespace and comments.
    #[must_use]
    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(i={}, l={}, s='{}')",
            self.kind.as_str(),
            self.offset,
            self.length,
            self.lexeme.trim()
        )
    }
}

/// The lexical classes recognized by the scanner.
///
/// Only the classes needed to find statement boundaries are distinguished;
/// everything else is an identifier or a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    // Punctuation
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `;`
    Semicolon,

    // Reserved words
    /// BEGIN keyword
    Begin,
    /// END keyword
    End,
    /// IF keyword
    If,
    /// FOR keyword
    For,
    /// WHILE keyword
    While,
    /// LOOP keyword
    Loop,
    /// CASE keyword
    Case,
    /// TRANSACTION keyword
    Transaction,

    /// String, numeric, dollar-quoted or operator text.
    Literal,
    /// Plain or quoted identifier.
    Identifier,
    /// Line or block comment.
    Comment,
    /// Run of whitespace characters.
    Whitespace,

    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns a descriptive name for this token kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::LeftParen => "LEFT_PAREN",
            TokenKind::RightParen => "RIGHT_PAREN",
            TokenKind::LeftBrace => "LEFT_BRACE",
            TokenKind::RightBrace => "RIGHT_BRACE",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Begin => "BEGIN",
            TokenKind::End => "END",
            TokenKind::If => "IF",
            TokenKind::For => "FOR",
            TokenKind::While => "WHILE",
            TokenKind::Loop => "LOOP",
            TokenKind::Case => "CASE",
            TokenKind::Transaction => "TRANSACTION",
            TokenKind::Literal => "LITERAL",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Comment => "COMMENT",
            TokenKind::Whitespace => "WHITESPACE",
            TokenKind::Eof => "EOF",
        }
    }

    /// Returns `true` for whitespace and comments.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Returns `true` for the keywords that may follow `END` without closing
    /// a `BEGIN` block (`END IF`, `END LOOP`, `END CASE`).
    #[must_use]
    pub fn closes_inner_construct(self) -> bool {
        matches!(self, TokenKind::If | TokenKind::Loop | TokenKind::Case)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Words that scan to something other than [`TokenKind::Identifier`].
pub const RESERVED_WORDS: [(&str, TokenKind); 8] = [
    ("BEGIN", TokenKind::Begin),
    ("END", TokenKind::End),
    ("IF", TokenKind::If),
    ("FOR", TokenKind::For),
    ("WHILE", TokenKind::While),
    ("LOOP", TokenKind::Loop),
    ("CASE", TokenKind::Case),
    ("TRANSACTION", TokenKind::Transaction),
];

/// Look up `word` in [`RESERVED_WORDS`], ignoring ASCII case.
#[must_use]
pub fn reserved_word(word: &str) -> Option<TokenKind> {
    RESERVED_WORDS
        .iter()
        .find(|(reserved, _)| reserved.eq_ignore_ascii_case(word))
        .map(|&(_, kind)| kind)
}
