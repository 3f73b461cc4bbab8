//! Construction of statement text from tokens.

use super::config::Layout;
use crate::scanner::is_whitespace;
use crate::token::Token;

/// Accumulates the text of one statement.
#[derive(Debug)]
pub(crate) struct StatementText {
    layout: Layout,
    text: String,
    has_content: bool,
    pending_space: bool,
}

impl StatementText {
    pub(crate) fn new(layout: Layout) -> Self {
        Self {
            layout,
            text: String::new(),
            has_content: false,
            pending_space: false,
        }
    }

    pub(crate) fn push(&mut self, token: &Token) {
        match self.layout {
            Layout::Verbatim => self.text.push_str(token.lexeme()),
            Layout::Compact if token.is_trivia() => self.pending_space = true,
            Layout::Compact => {
                if self.pending_space && self.has_content {
                    self.text.push(' ');
                }
                self.pending_space = false;
                self.text.push_str(token.lexeme());
            }
        }
        self.has_content |= !token.is_trivia();
    }

    /// The finished text; empty when only whitespace and comments were seen.
    pub(crate) fn finish(self) -> String {
        if !self.has_content {
            return String::new();
        }
        match self.layout {
            Layout::Compact => self.text,
            Layout::Verbatim => self.text.trim_matches(is_whitespace).to_owned(),
        }
    }
}
