//! Character source for the scanner.
//!
//! [`SourceReader`] decodes UTF-8 from any [`Read`] one character at a time,
//! keeps two characters of pushback for [`CharSource::peek`] and
//! [`CharSource::peek_next`], and
//! accumulates the characters consumed since the last
//! [`CharSource::mark_start`] as the current lexeme.

use std::io::{self, BufReader, ErrorKind, Read};

/// Character returned by [`CharSource::advance`] and [`CharSource::peek`]
/// once the stream is exhausted (ASCII DEL).
///
/// DEL may also appear in the input itself; [`CharSource::is_eof`] tells the
/// two apart.
pub const EOF: char = '\u{7f}';

const ZERO_WIDTH_NO_BREAK_SPACE: char = '\u{feff}';
const REPLACEMENT_CHARACTER: char = '\u{fffd}';

/// A pull-based character stream with a movable lexeme window.
pub trait CharSource {
    /// Character offset where the current lexeme starts.
    fn start(&self) -> usize;

    /// Character offset of the next character to be consumed.
    fn current(&self) -> usize;

    /// Characters consumed since the last [`mark_start`](Self::mark_start).
    fn lexeme(&self) -> &str;

    /// The characters `start..end` of the current lexeme, counted in
    /// characters. Out-of-range bounds are clamped.
    fn lexeme_range(&self, start: usize, end: usize) -> &str {
        let lexeme = self.lexeme();
        let byte_at = |n: usize| lexeme.char_indices().nth(n).map_or(lexeme.len(), |(i, _)| i);
        let end = byte_at(end);
        &lexeme[byte_at(start).min(end)..end]
    }

    /// Start a new lexeme at the current position.
    fn mark_start(&mut self);

    /// Returns `true` once the stream is known to hold no more characters.
    fn is_eof(&self) -> bool;

    /// Consume the next character and append it to the lexeme.
    ///
    /// Returns [`EOF`] when the stream is exhausted, on every call.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    fn advance(&mut self) -> io::Result<char>;

    /// Return the next character without consuming it.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    fn peek(&mut self) -> io::Result<char>;

    /// Return the character after the one [`peek`](Self::peek) returns,
    /// without consuming either. [`EOF`] if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    fn peek_next(&mut self) -> io::Result<char>;

    /// Consume the next character only if it equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    fn match_char(&mut self, expected: char) -> io::Result<bool> {
        let c = self.peek()?;
        if self.is_eof() || c != expected {
            return Ok(false);
        }
        self.advance()?;
        Ok(true)
    }
}

/// [`CharSource`] over a UTF-8 byte stream.
///
/// A leading run of byte-order marks (U+FEFF) and replacement characters
/// (U+FFFD) is dropped before the first character is handed out. Dropping the
/// reader releases the underlying stream.
#[derive(Debug)]
pub struct SourceReader<R> {
    inner: BufReader<R>,
    peeked: Option<char>,
    // Only `Some` while `peeked` is.
    peeked_next: Option<char>,
    exhausted: bool,
    stripped: bool,
    start: usize,
    current: usize,
    lexeme: String,
}

impl<R: Read> SourceReader<R> {
    /// Wrap `reader`, buffering it.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
            peeked: None,
            peeked_next: None,
            exhausted: false,
            stripped: false,
            start: 0,
            current: 0,
            lexeme: String::new(),
        }
    }

    fn read_char(&mut self) -> io::Result<Option<char>> {
        if self.stripped {
            return self.decode();
        }
        self.stripped = true;
        loop {
            match self.decode()? {
                Some(ZERO_WIDTH_NO_BREAK_SPACE | REPLACEMENT_CHARACTER) => {}
                other => return Ok(other),
            }
        }
    }

    fn decode(&mut self) -> io::Result<Option<char>> {
        if self.exhausted {
            return Ok(None);
        }
        let mut buf = [0u8; 4];
        if !self.read_byte(&mut buf[0])? {
            self.exhausted = true;
            return Ok(None);
        }
        let width = utf8_width(buf[0]).ok_or_else(|| invalid_utf8(self.current))?;
        for byte in &mut buf[1..width] {
            if !self.read_byte(byte)? {
                return Err(invalid_utf8(self.current));
            }
        }
        let decoded = std::str::from_utf8(&buf[..width])
            .map_err(|_| invalid_utf8(self.current))?;
        Ok(decoded.chars().next())
    }

    fn read_byte(&mut self, byte: &mut u8) -> io::Result<bool> {
        loop {
            match self.inner.read(std::slice::from_mut(byte)) {
                Ok(0) => return Ok(false),
                Ok(_) => return Ok(true),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }
}

impl<'a> SourceReader<&'a [u8]> {
    /// Read from an in-memory string.
    #[must_use]
    pub fn from_sql(sql: &'a str) -> Self {
        Self::new(sql.as_bytes())
    }
}

impl<R: Read> CharSource for SourceReader<R> {
    fn start(&self) -> usize {
        self.start
    }

    fn current(&self) -> usize {
        self.current
    }

    fn lexeme(&self) -> &str {
        &self.lexeme
    }

    fn mark_start(&mut self) {
        self.start = self.current;
        self.lexeme.clear();
    }

    fn is_eof(&self) -> bool {
        self.peeked.is_none() && self.exhausted
    }

    fn advance(&mut self) -> io::Result<char> {
        let next = match self.peeked.take() {
            Some(c) => {
                self.peeked = self.peeked_next.take();
                Some(c)
            }
            None => self.read_char()?,
        };
        Ok(next.map_or(EOF, |c| {
            self.current += 1;
            self.lexeme.push(c);
            c
        }))
    }

    fn peek(&mut self) -> io::Result<char> {
        if self.peeked.is_none() {
            self.peeked = self.read_char()?;
        }
        Ok(self.peeked.unwrap_or(EOF))
    }

    fn peek_next(&mut self) -> io::Result<char> {
        self.peek()?;
        if self.peeked.is_none() {
            return Ok(EOF);
        }
        if self.peeked_next.is_none() {
            self.peeked_next = self.read_char()?;
        }
        Ok(self.peeked_next.unwrap_or(EOF))
    }
}

/// Width in bytes of the UTF-8 sequence introduced by `lead`.
fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7f => Some(1),
        0xc2..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf4 => Some(4),
        _ => None,
    }
}

fn invalid_utf8(offset: usize) -> io::Error {
    io::Error::new(
        ErrorKind::InvalidData,
        format!("stream did not contain valid UTF-8 at character {offset}"),
    )
}
