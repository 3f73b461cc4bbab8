//! Grouping of tokens into statements.

use super::config::Layout;
use super::text::StatementText;
use crate::errors::ErrorReporter;
use crate::token::{Token, TokenKind};

/// Cursor over a token list that hands out one statement at a time.
///
/// A statement ends at a top-level `;` or at end of input. Inside a
/// `BEGIN ... END` block semicolons are statement text; blocks nest, and
/// `END IF`, `END LOOP` and `END CASE` leave the enclosing block open.
/// `BEGIN TRANSACTION` does not open a block.
#[derive(Debug, Default)]
pub(crate) struct Reassembler {
    cursor: usize,
}

impl Reassembler {
    /// The next non-empty statement, or `None` once `tokens` is exhausted.
    pub(crate) fn next_statement(
        &mut self,
        tokens: &[Token],
        layout: Layout,
        reporter: &mut dyn ErrorReporter,
    ) -> Option<String> {
        while self.cursor < tokens.len() {
            let statement = self.take_statement(tokens, layout, reporter);
            if !statement.is_empty() {
                return Some(statement);
            }
        }
        None
    }

    fn take_statement(
        &mut self,
        tokens: &[Token],
        layout: Layout,
        reporter: &mut dyn ErrorReporter,
    ) -> String {
        let mut text = StatementText::new(layout);
        let mut blocks: Vec<&Token> = Vec::new();

        while let Some(token) = tokens.get(self.cursor) {
            self.cursor += 1;
            let terminates = match token.kind() {
                TokenKind::Eof => true,
                TokenKind::Semicolon => blocks.is_empty(),
                TokenKind::Begin => {
                    if next_significant(tokens, self.cursor) != Some(TokenKind::Transaction) {
                        blocks.push(token);
                    }
                    false
                }
                TokenKind::End if !blocks.is_empty() => {
                    if !next_significant(tokens, self.cursor)
                        .is_some_and(TokenKind::closes_inner_construct)
                    {
                        blocks.pop();
                    }
                    false
                }
                _ => false,
            };
            if terminates {
                break;
            }
            text.push(token);
        }

        for begin in blocks {
            reporter.error(begin.offset(), begin.length(), "mismatched BEGIN");
        }
        text.finish()
    }
}

/// Kind of the first token at or after `from` that is not whitespace or a
/// comment.
fn next_significant(tokens: &[Token], from: usize) -> Option<TokenKind> {
    tokens
        .get(from..)?
        .iter()
        .map(Token::kind)
        .find(|kind| !kind.is_trivia())
}
