//! PostgreSQL dollar-quoted string literals.
//!
//! A dollar-quoted string opens with `$tag$`, where the tag is empty or an
//! identifier without `$`, and closes at the next occurrence of the very same
//! `$tag$`. Anything in between, including other dollar-quoted strings with
//! different tags, is literal content.

use std::io;

use super::{Matched, ScanRequest};
use crate::token::TokenKind;

/// [`SpecialToken`](super::SpecialToken) matcher for dollar-quoted strings.
///
/// Declines when `c` is not `$` or when no tag character follows it (as in
/// the positional parameter `$1`). A tag that is not closed by `$` is
/// scanned as a literal of its own.
///
/// # Errors
///
/// Returns an error if the underlying stream fails.
pub fn dollar_quoted_string(c: char, request: &mut ScanRequest<'_>) -> io::Result<Matched> {
    if c != '$' {
        return Ok(Matched::Declined);
    }

    let mut tag_len = 0usize;
    while !request.match_char('$')? {
        match request.peek_char()? {
            Some(c) if is_tag_char(c, tag_len == 0) => {
                request.next_char()?;
                tag_len += 1;
            }
            _ if tag_len == 0 => return Ok(Matched::Declined),
            _ => return Ok(Matched::Token(request.token(TokenKind::Literal))),
        }
    }
    let tag = request.lexeme_range(1, tag_len + 1).to_owned();

    loop {
        match request.next_char()? {
            None => {
                let message = "unterminated dollar-quoted string";
                return Ok(request.unterminated(tag_len + 2, message));
            }
            Some('$') if match_closing_tag(&tag, request)? => {
                return Ok(Matched::Token(request.token(TokenKind::Literal)));
            }
            Some(_) => {}
        }
    }
}

/// Consume `tag$` if it follows; on a mismatch the characters matched so far
/// remain consumed as content.
fn match_closing_tag(tag: &str, request: &mut ScanRequest<'_>) -> io::Result<bool> {
    for expected in tag.chars() {
        if !request.match_char(expected)? {
            return Ok(false);
        }
    }
    request.match_char('$')
}

fn is_tag_char(c: char, first: bool) -> bool {
    c.is_alphabetic() || c == '_' || (!first && c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use crate::errors::{ErrorList, ScanError};
    use crate::reader::SourceReader;
    use crate::scanner::{Dialect, Scanner};
    use crate::token::{Token, TokenKind};

    fn scan(input: &str) -> (Vec<Token>, ErrorList) {
        let mut errors = ErrorList::new();
        let tokens = Scanner::new(Dialect::Postgres)
            .scan_tokens(&mut SourceReader::from_sql(input), &mut errors)
            .unwrap();
        (tokens, errors)
    }

    fn validate_input(input: &str) {
        let (tokens, errors) = scan(input);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors.errors());
        assert_eq!(tokens.len(), 2, "tokens: {tokens:?}");
        assert_eq!(tokens[0].kind(), TokenKind::Literal);
        assert_eq!(tokens[0].lexeme(), input);
        assert_eq!(tokens[1].kind(), TokenKind::Eof);
    }

    #[test]
    fn test_empty_tag() {
        validate_input("$$ Dollar-quoted string ' ' $$");
        validate_input("$$$$");
    }

    #[test]
    fn test_non_empty_tag() {
        validate_input("$tag$ Dollar-quoted string ' ' $tag$");
        validate_input("$_t1$;$_t1$");
    }

    #[test]
    fn test_nested_tags_are_content() {
        validate_input("$tag$ $$ Nested dollar-quoted string $$ $tag$");
        validate_input("$tag$ $other$ Nested dollar-quoted string $other$ $tag$");
    }

    #[test]
    fn test_bare_dollar_signs_are_content() {
        validate_input("$tag$ Dollar quoted string $ $tag$");
        validate_input("$tag$ Dollar quoted string $ $t $ta $tagg $tag$");
        validate_input("$tag$ $ta$tag$");
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        let (_, errors) = scan("$tag$ body $TAG$");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_mismatched_tag_is_unterminated() {
        let (tokens, errors) = scan("$tag$ Dollar quoted string ' ' $otherTag$");
        assert_eq!(
            errors.errors(),
            [ScanError::new(0, 6, "unterminated dollar-quoted string")]
        );
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_positional_parameter_is_not_a_quote() {
        let (tokens, errors) = scan("WHERE id = $1");
        assert!(errors.is_empty());
        let lexemes: Vec<_> = tokens.iter().map(Token::lexeme).collect();
        assert_eq!(lexemes, ["WHERE", " ", "id", " ", "=", " ", "$", "1", ""]);
    }

    #[test]
    fn test_unclosed_tag_is_a_literal() {
        let (tokens, errors) = scan("$ab +");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind(), TokenKind::Literal);
        assert_eq!(tokens[0].lexeme(), "$ab");
        assert_eq!(tokens[2].lexeme(), "+");

        let (tokens, errors) = scan("$ab;$--x");
        assert!(errors.is_empty());
        let lexemes: Vec<_> = tokens.iter().map(Token::lexeme).collect();
        assert_eq!(lexemes, ["$ab", ";", "$", "--x", ""]);
    }

    #[test]
    fn test_function_body() {
        let input = "CREATE FUNCTION f() RETURNS int AS $body$ BEGIN RETURN 1; END; $body$ LANGUAGE plpgsql;";
        let (tokens, errors) = scan(input);
        assert!(errors.is_empty());
        let body = tokens
            .iter()
            .find(|t| t.lexeme().starts_with("$body$"))
            .unwrap();
        assert_eq!(body.lexeme(), "$body$ BEGIN RETURN 1; END; $body$");
        assert_eq!(body.offset(), 35);
        assert_eq!(
            tokens.iter().filter(|t| t.kind() == TokenKind::Semicolon).count(),
            1
        );
    }
}
