//! Element extent estimation over raw bytes.
//!
//! All delimiters are ASCII, so every returned offset is a char boundary.

#[derive(Debug, Clone, Copy)]
pub(super) struct Lexical {
    /// Treat `'…'` as a string literal. Off for Rust, where `'` starts lifetimes.
    pub single_quote_strings: bool,
    /// `//` and `/* */` comments.
    pub c_comments: bool,
}

/// End of a brace-delimited declaration starting at `from`.
///
/// Scans forward to the first top-level `{` (then matches braces), `;`
/// (declaration without body), or `=>` (arrow function with either a block
/// or an expression body). Unbalanced input runs to the end of the source.
pub(super) fn brace_end(source: &str, from: usize, lex: Lexical) -> usize {
    let bytes = source.as_bytes();
    let mut i = from;
    let mut paren = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' => paren += 1,
            b')' | b']' => paren = paren.saturating_sub(1),
            b'"' | b'`' => i = skip_string(bytes, i),
            b'\'' if lex.single_quote_strings => i = skip_string(bytes, i),
            b'/' if lex.c_comments && is_comment_start(bytes, i) => i = skip_comment(bytes, i),
            b';' if paren == 0 => return i + 1,
            b'{' if paren == 0 => return match_braces(bytes, i, lex),
            b'=' if paren == 0 && bytes.get(i + 1) == Some(&b'>') => {
                let mut j = i + 2;
                while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                if bytes.get(j) == Some(&b'{') {
                    return match_braces(bytes, j, lex);
                }
                return expression_end(bytes, j, lex);
            }
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

/// End of an indentation-scoped block whose header line starts at `start`.
/// Trailing blank lines are not included.
pub(super) fn indent_end(source: &str, start: usize) -> usize {
    let line_end = |pos: usize| source[pos..].find('\n').map_or(source.len(), |o| pos + o);

    let base = indent_width(&source[start..line_end(start)]);
    let mut end = line_end(start);
    let mut pos = end + 1;

    while pos < source.len() {
        let le = line_end(pos);
        let line = &source[pos..le];
        if line.trim().is_empty() {
            pos = le + 1;
            continue;
        }
        if indent_width(line) <= base {
            break;
        }
        end = le;
        pos = le + 1;
    }
    end
}

fn indent_width(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}

fn match_braces(bytes: &[u8], open: usize, lex: Lexical) -> usize {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1;
                }
            }
            b'"' | b'`' => i = skip_string(bytes, i),
            b'\'' if lex.single_quote_strings => i = skip_string(bytes, i),
            b'/' if lex.c_comments && is_comment_start(bytes, i) => i = skip_comment(bytes, i),
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

fn expression_end(bytes: &[u8], from: usize, lex: Lexical) -> usize {
    let mut depth = 0usize;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b'"' | b'`' => i = skip_string(bytes, i),
            b'\'' if lex.single_quote_strings => i = skip_string(bytes, i),
            b';' if depth == 0 => return i + 1,
            b'\n' if depth == 0 => return i,
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

fn is_comment_start(bytes: &[u8], i: usize) -> bool {
    matches!(bytes.get(i + 1), Some(b'/' | b'*'))
}

/// Index of the last byte of the comment starting at `i`.
fn skip_comment(bytes: &[u8], i: usize) -> usize {
    if bytes.get(i + 1) == Some(&b'/') {
        let mut j = i + 2;
        while j < bytes.len() && bytes[j] != b'\n' {
            j += 1;
        }
        return j.saturating_sub(1).max(i + 1);
    }
    let mut j = i + 2;
    while j + 1 < bytes.len() {
        if bytes[j] == b'*' && bytes[j + 1] == b'/' {
            return j + 1;
        }
        j += 1;
    }
    bytes.len()
}

/// Index of the closing quote of the literal starting at `i`. Non-backtick
/// literals end at a newline when unterminated.
fn skip_string(bytes: &[u8], i: usize) -> usize {
    let quote = bytes[i];
    let mut j = i + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' if quote != b'`' => return j,
            b if b == quote => return j,
            _ => j += 1,
        }
    }
    bytes.len()
}
