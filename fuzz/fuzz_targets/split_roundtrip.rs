//! Split-roundtrip fuzzer: scanning and splitting arbitrary text never panics.
//!
//! This fuzzer checks:
//! 1. Concatenating the lexemes of an error-free scan gives back the input
//! 2. Token offsets are contiguous and the scan ends with a single EOF token
//! 3. Every statement of a successful split splits into itself again

use honggfuzz::fuzz;
use sql_script_rs::{
    Dialect, ErrorList, Layout, Scanner, SourceConfig, SourceReader, SqlSource, Token, TokenKind,
};

fn main() {
    loop {
        fuzz!(|sql: &[u8]| {
            let Ok(sql) = std::str::from_utf8(sql) else {
                return;
            };
            for dialect in [Dialect::Standard, Dialect::Postgres] {
                check_scan(sql, dialect);
                for layout in [Layout::Compact, Layout::Verbatim] {
                    check_split(
                        sql,
                        SourceConfig::default()
                            .with_dialect(dialect)
                            .with_layout(layout),
                    );
                }
            }
        });
    }
}

fn check_scan(sql: &str, dialect: Dialect) {
    let mut errors = ErrorList::new();
    let tokens = Scanner::new(dialect)
        .scan_tokens(&mut SourceReader::from_sql(sql), &mut errors)
        .expect("reading from a string cannot fail");
    assert_eq!(tokens.last().map(Token::kind), Some(TokenKind::Eof));
    if errors.has_errors() {
        return;
    }

    let lexemes: String = tokens.iter().map(Token::lexeme).collect();
    assert_eq!(lexemes, sql.trim_start_matches(['\u{feff}', '\u{fffd}']));

    let mut offset = 0;
    for token in &tokens {
        assert_eq!(token.offset(), offset, "gap before {token}");
        offset += token.length();
    }
    assert_eq!(
        tokens.iter().filter(|t| t.kind() == TokenKind::Eof).count(),
        1
    );
}

fn check_split(sql: &str, config: SourceConfig) {
    let Ok(statements) = SqlSource::from_sql_with_config(sql, config).collect::<Result<Vec<_>, _>>()
    else {
        return;
    };
    for statement in statements {
        assert!(!statement.is_empty());
        // A leading byte-order mark would be stripped again.
        if statement.starts_with(['\u{feff}', '\u{fffd}']) {
            continue;
        }
        let again: Vec<String> = SqlSource::from_sql_with_config(&statement, config)
            .collect::<Result<_, _>>()
            .expect("a split statement scans cleanly");
        assert_eq!(again, [statement]);
    }
}
