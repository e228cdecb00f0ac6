//! Shell-style argument splitting for flag fields.
//!
//! Splitting runs in two phases. The tokenizer walks the input and carves
//! it into quoted tokens, tracking one `current_quote` state (`"`, `'`,
//! `\` or `#`); quotes and escapes are kept in the token text. The
//! unquoting pass then rewrites each token in place, resolving escapes and
//! stripping quote characters.
//!
//! A `#` starts a comment only at the start of the input or right after a
//! space, a newline, or a NUL; anywhere else it is an ordinary character.
//! A `"` preceded by an odd number of backslashes never closes its quote.

use crate::cursor::{CharBuf, Cursor};
use crate::error::{Error, Result};

/// Split `input` into unquoted tokens.
///
/// # Errors
///
/// Fails when the input ends inside a quote or a pending backslash escape,
/// or when it contains no tokens at all.
///
/// # Examples
///
/// ```
/// use pcquery::argsplit::split;
///
/// let tokens = split(r#"'a b' "c d""#).unwrap();
/// assert_eq!(tokens, vec!["a b", "c d"]);
/// ```
pub fn split(input: &str) -> Result<Vec<String>> {
    tokenize(input)?.iter().map(|token| unquote(token)).collect()
}

/// Carve `input` into raw tokens, quotes and escapes preserved.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let buf = CharBuf::new(input);
    let mut cur = buf.start();
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut have_token = false;
    let mut current_quote = '\0';
    // Consecutive-backslash parity, for the escaped-" rule.
    let mut backslashed = false;
    // Character before the cursor; '\0' stands for start of input.
    let mut prev = '\0';

    loop {
        let mut c = buf.peek(cur);
        if c == '\0' {
            break;
        }

        if current_quote == '\\' {
            if c != '\n' {
                current.push('\\');
                current.push(c);
                have_token = true;
            }
            current_quote = '\0';
        } else if current_quote == '#' {
            while buf.peek(cur) != '\0' && buf.peek(cur) != '\n' {
                cur.advance();
            }
            current_quote = '\0';
            c = buf.peek(cur);
            if c == '\0' {
                break;
            }
        } else if current_quote != '\0' {
            if c == current_quote && !(current_quote == '"' && backslashed) {
                current_quote = '\0';
            }
            // Everything inside quotes, and the close quote itself, is
            // copied verbatim; the unquote pass resolves it.
            current.push(c);
            have_token = true;
        } else {
            match c {
                '\n' => {
                    if have_token {
                        tokens.push(std::mem::take(&mut current));
                        have_token = false;
                    }
                }
                ' ' | '\t' => {
                    if have_token && !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                        have_token = false;
                    }
                }
                '\'' | '"' => {
                    current.push(c);
                    have_token = true;
                    current_quote = c;
                }
                '\\' => {
                    current_quote = '\\';
                }
                '#' => {
                    if matches!(prev, '\0' | ' ' | '\n') {
                        current_quote = '#';
                    } else {
                        current.push('#');
                        have_token = true;
                    }
                }
                other => {
                    current.push(other);
                    have_token = true;
                }
            }
        }

        backslashed = if c == '\\' { !backslashed } else { false };
        prev = c;
        cur.advance();
    }

    if have_token {
        tokens.push(current);
    }

    if current_quote == '\\' {
        return Err(Error::TrailingBackslash {
            text: input.to_string(),
        });
    }
    if current_quote != '\0' {
        return Err(Error::UnterminatedQuote {
            quote: current_quote,
            text: input.to_string(),
        });
    }
    if tokens.is_empty() {
        return Err(Error::EmptyText);
    }

    Ok(tokens)
}

/// Resolve quoting and escapes in a single raw token.
pub fn unquote(token: &str) -> Result<String> {
    let mut buf = CharBuf::new(token);
    let mut start = buf.start();
    let mut out = String::new();

    while buf.peek(start) != '\0' {
        let c = buf.peek(start);
        if c == '"' || c == '\'' {
            let segment = start;
            start = unquote_in_place(&mut buf, start)?;
            out.push_str(&buf.string_from(segment));
        } else if c == '\\' {
            start.advance();
            let escaped = buf.peek(start);
            if escaped != '\0' {
                if escaped != '\n' {
                    out.push(escaped);
                }
                start.advance();
            }
        } else {
            out.push(c);
            start.advance();
        }
    }

    Ok(out)
}

/// Unquote the quoted segment beginning at `cur`, rewriting the buffer in
/// place and NUL-terminating the result, C style. Returns the cursor just
/// past the closing quote; the unquoted text sits at `cur` up to the
/// written terminator.
fn unquote_in_place(buf: &mut CharBuf, cur: Cursor) -> Result<Cursor> {
    let mut dest = cur;
    let mut s = cur;
    let quote_char = buf.peek(s);

    if quote_char != '"' && quote_char != '\'' {
        return Err(Error::NotQuoted);
    }
    s.advance();

    if quote_char == '"' {
        while buf.peek(s) != '\0' {
            match buf.peek(s) {
                '"' => {
                    buf.write_nul(dest);
                    s.advance();
                    return Ok(s);
                }
                '\\' => {
                    s.advance();
                    match buf.peek(s) {
                        c @ ('"' | '\\' | '`' | '$' | '\n') => {
                            buf.write(dest, c);
                            dest.advance();
                            s.advance();
                        }
                        _ => {
                            // Not an escapable character: the backslash
                            // stays, the next char is handled normally.
                            buf.write(dest, '\\');
                            dest.advance();
                        }
                    }
                }
                c => {
                    buf.write(dest, c);
                    dest.advance();
                    s.advance();
                }
            }
        }
    } else {
        while buf.peek(s) != '\0' {
            let c = buf.peek(s);
            if c == '\'' {
                buf.write_nul(dest);
                s.advance();
                return Ok(s);
            }
            buf.write(dest, c);
            dest.advance();
            s.advance();
        }
    }

    buf.write_nul(dest);
    Err(Error::UnmatchedQuote)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── tokenize ────────────────────────────────────────────────────

    #[test]
    fn tokenize_whitespace_separated() {
        assert_eq!(tokenize("-a -b\t-c").unwrap(), vec!["-a", "-b", "-c"]);
    }

    #[test]
    fn tokenize_keeps_quotes() {
        assert_eq!(
            tokenize(r#"-I"inc dir" 'x y'"#).unwrap(),
            vec![r#"-I"inc dir""#, "'x y'"]
        );
    }

    #[test]
    fn tokenize_keeps_escapes() {
        assert_eq!(tokenize(r"a\ b").unwrap(), vec![r"a\ b"]);
    }

    #[test]
    fn tokenize_backslash_newline_is_continuation() {
        assert_eq!(tokenize("a\\\nb").unwrap(), vec!["ab"]);
    }

    #[test]
    fn tokenize_newline_delimits() {
        assert_eq!(tokenize("a\nb").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn tokenize_comment_at_start() {
        assert!(matches!(tokenize("# all comment"), Err(Error::EmptyText)));
    }

    #[test]
    fn tokenize_comment_after_space() {
        assert_eq!(tokenize("a # rest ignored").unwrap(), vec!["a"]);
    }

    #[test]
    fn tokenize_comment_runs_to_newline() {
        assert_eq!(tokenize("a # zap\nb").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn tokenize_hash_mid_token_is_literal() {
        assert_eq!(tokenize("a#b").unwrap(), vec!["a#b"]);
    }

    #[test]
    fn tokenize_hash_after_tab_is_literal() {
        // Only space and newline make a '#' a comment starter.
        assert_eq!(tokenize("a\t#b").unwrap(), vec!["a", "#b"]);
    }

    #[test]
    fn tokenize_escaped_quote_inside_double_quotes() {
        assert_eq!(tokenize(r#""a\"b""#).unwrap(), vec![r#""a\"b""#]);
    }

    #[test]
    fn tokenize_trailing_backslash_fails() {
        let err = tokenize(r"abc\").unwrap_err();
        assert!(err.to_string().contains("Text ended just after a '\\' character"));
    }

    #[test]
    fn tokenize_unterminated_quote_fails() {
        let err = tokenize(r#"ab "cd"#).unwrap_err();
        assert!(err
            .to_string()
            .contains("Text ended before matching quote was found for \""));
    }

    #[test]
    fn tokenize_empty_fails() {
        assert!(matches!(tokenize(""), Err(Error::EmptyText)));
        assert!(matches!(tokenize("   \t "), Err(Error::EmptyText)));
    }

    // ── unquote ─────────────────────────────────────────────────────

    #[test]
    fn unquote_plain() {
        assert_eq!(unquote("abc").unwrap(), "abc");
    }

    #[test]
    fn unquote_single_quotes_are_literal() {
        assert_eq!(unquote(r#"'a "b" \n c'"#).unwrap(), r#"a "b" \n c"#);
    }

    #[test]
    fn unquote_double_quotes_resolve_escapes() {
        assert_eq!(unquote(r#""a\"b\\c\$d\`e""#).unwrap(), r#"a"b\c$d`e"#);
    }

    #[test]
    fn unquote_double_quotes_keep_other_backslashes() {
        assert_eq!(unquote(r#""a\nb""#).unwrap(), r"a\nb");
    }

    #[test]
    fn unquote_backslash_outside_quotes() {
        assert_eq!(unquote(r"a\ b").unwrap(), "a b");
        assert_eq!(unquote(r"\\").unwrap(), r"\");
    }

    #[test]
    fn unquote_backslash_newline_is_dropped() {
        assert_eq!(unquote("a\\\nb").unwrap(), "ab");
    }

    #[test]
    fn unquote_adjacent_segments_concatenate() {
        assert_eq!(unquote(r#"-I"a b"'c d'e"#).unwrap(), "-Ia bc de");
    }

    #[test]
    fn unquote_unterminated_quote_fails() {
        let err = unquote("'abc").unwrap_err();
        assert!(err.to_string().contains("Unmatched quotation mark"));
    }

    // ── split ───────────────────────────────────────────────────────

    #[test]
    fn split_well_quoted_input() {
        assert_eq!(split(r#"'a b' "c d""#).unwrap(), vec!["a b", "c d"]);
    }

    #[test]
    fn split_typical_flags() {
        assert_eq!(
            split("-I/usr/include -DFOO=1 -lm").unwrap(),
            vec!["-I/usr/include", "-DFOO=1", "-lm"]
        );
    }

    #[test]
    fn split_escaped_spaces() {
        assert_eq!(
            split(r"-I/path\ with\ spaces -lfoo").unwrap(),
            vec!["-I/path with spaces", "-lfoo"]
        );
    }

    #[test]
    fn split_quoted_flag_keeps_inner_spacing() {
        assert_eq!(split("'-I  include/dir'").unwrap(), vec!["-I  include/dir"]);
    }

    #[test]
    fn split_empty_quotes_make_empty_token() {
        assert_eq!(split("a '' b").unwrap(), vec!["a", "", "b"]);
    }
}
