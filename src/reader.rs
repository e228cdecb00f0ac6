//! Text loading and logical-line assembly for `.pc` files.
//!
//! [`TextLoader`] reads a file's full contents into memory once and hands
//! them out as a character stream with one character of pushback.
//! [`LineReader`] assembles logical lines on top of it: backslash
//! continuations join physical lines, `#` starts a comment running to the
//! end of the physical line, and newline variants are normalized.
//!
//! Newline handling is intentionally asymmetric between the two scanner
//! states: after a continuation backslash both `\r\n` and `\n\r` are
//! consumed as one pair, while in plain text only `\n` ends a line (eating
//! a following `\r`) and a lone `\r` is an ordinary character. Downstream
//! consumers depend on that exact shape.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// A character stream over an eagerly loaded text, with single-character
/// pushback.
#[derive(Debug)]
pub struct TextLoader {
    chars: Vec<char>,
    pos: usize,
}

impl TextLoader {
    /// Read the file at `path` into memory. I/O failures surface
    /// unchanged.
    pub fn open(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_text(&text))
    }

    /// Build a loader over in-memory text.
    pub fn from_text(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    /// The next character, or `None` at end of input.
    pub fn get_char(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Push back the character most recently returned by
    /// [`get_char`](Self::get_char). Only one character of pushback is
    /// supported and it must be the character that was actually read.
    pub fn unget_char(&mut self, c: char) {
        debug_assert!(self.pos > 0, "unget_char with nothing read");
        debug_assert_eq!(self.chars.get(self.pos - 1), Some(&c), "unget_char mismatch");
        self.pos = self.pos.saturating_sub(1);
    }
}

/// Assembles logical lines from a [`TextLoader`].
#[derive(Debug)]
pub struct LineReader {
    loader: TextLoader,
}

impl LineReader {
    pub fn new(loader: TextLoader) -> Self {
        Self { loader }
    }

    /// Read one logical line, without its terminating newline. Returns
    /// `None` only when no character at all could be read.
    pub fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        let mut quoted = false;
        let mut comment = false;
        let mut read_any = false;

        loop {
            let Some(c) = self.loader.get_char() else {
                if quoted {
                    line.push('\\');
                }
                return read_any.then_some(line);
            };
            read_any = true;

            if quoted {
                quoted = false;
                match c {
                    '#' => line.push('#'),
                    '\r' | '\n' => {
                        // Line continuation: swallow the companion newline
                        // character if present, push back anything else.
                        let companion = if c == '\r' { '\n' } else { '\r' };
                        match self.loader.get_char() {
                            Some(next) if next == companion => {}
                            Some(next) => self.loader.unget_char(next),
                            None => {}
                        }
                    }
                    other => {
                        line.push('\\');
                        line.push(other);
                    }
                }
            } else {
                match c {
                    '#' => comment = true,
                    '\\' if !comment => quoted = true,
                    '\n' => {
                        match self.loader.get_char() {
                            Some('\r') => {}
                            Some(next) => self.loader.unget_char(next),
                            None => {}
                        }
                        return Some(line);
                    }
                    other => {
                        if !comment {
                            line.push(other);
                        }
                    }
                }
            }
        }
    }
}

impl Iterator for LineReader {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        LineReader::new(TextLoader::from_text(text)).collect()
    }

    // ── TextLoader ──────────────────────────────────────────────────

    #[test]
    fn get_and_unget() {
        let mut loader = TextLoader::from_text("ab");
        assert_eq!(loader.get_char(), Some('a'));
        assert_eq!(loader.get_char(), Some('b'));
        loader.unget_char('b');
        assert_eq!(loader.get_char(), Some('b'));
        assert_eq!(loader.get_char(), None);
        assert_eq!(loader.get_char(), None);
    }

    // ── Plain lines ─────────────────────────────────────────────────

    #[test]
    fn simple_lines() {
        assert_eq!(lines("a\nb\nc\n"), vec!["a", "b", "c"]);
    }

    #[test]
    fn last_line_without_newline() {
        assert_eq!(lines("a\nb"), vec!["a", "b"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(lines("").is_empty());
    }

    #[test]
    fn empty_lines_are_preserved() {
        assert_eq!(lines("a\n\nb\n"), vec!["a", "", "b"]);
    }

    // ── Comments ────────────────────────────────────────────────────

    #[test]
    fn comment_runs_to_end_of_line() {
        assert_eq!(lines("key # note\nnext\n"), vec!["key ", "next"]);
    }

    #[test]
    fn full_line_comment_becomes_empty_line() {
        assert_eq!(lines("# whole line\nvalue\n"), vec!["", "value"]);
    }

    #[test]
    fn backslash_inside_comment_is_inert() {
        // A backslash after '#' neither escapes nor continues.
        assert_eq!(lines("a # x \\\nb\n"), vec!["a ", "b"]);
    }

    #[test]
    fn escaped_hash_is_literal() {
        assert_eq!(lines("a \\# b\n"), vec!["a # b"]);
    }

    // ── Continuations ───────────────────────────────────────────────

    #[test]
    fn backslash_newline_joins_lines() {
        assert_eq!(lines("a \\\nb\n"), vec!["a b"]);
    }

    #[test]
    fn chained_continuations() {
        assert_eq!(lines("a\\\nb\\\nc\n"), vec!["abc"]);
    }

    #[test]
    fn continuation_consumes_crlf_pair() {
        assert_eq!(lines("a\\\r\nb\n"), vec!["ab"]);
        assert_eq!(lines("a\\\n\rb\n"), vec!["ab"]);
    }

    #[test]
    fn continuation_without_companion_keeps_next_char() {
        assert_eq!(lines("a\\\nxb\n"), vec!["axb"]);
    }

    #[test]
    fn escaped_ordinary_char_keeps_backslash() {
        // Only '#' and newlines are special after a backslash; anything
        // else passes through with the backslash intact.
        assert_eq!(lines("a\\b\n"), vec!["a\\b"]);
    }

    #[test]
    fn trailing_backslash_at_eof_is_kept() {
        assert_eq!(lines("abc\\"), vec!["abc\\"]);
    }

    // ── Newline variants ────────────────────────────────────────────

    #[test]
    fn lf_cr_is_one_line_ending() {
        assert_eq!(lines("a\n\rb\n"), vec!["a", "b"]);
    }

    #[test]
    fn bare_cr_is_an_ordinary_character() {
        // Unquoted CR does not end a line; it lands in the buffer. The
        // quoted and unquoted states deliberately disagree here.
        assert_eq!(lines("a\rb\n"), vec!["a\rb"]);
    }

    #[test]
    fn crlf_leaves_cr_in_line() {
        assert_eq!(lines("a\r\nb\n"), vec!["a\r", "b"]);
    }
}
