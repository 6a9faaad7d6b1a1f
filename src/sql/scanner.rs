//! Quote- and parenthesis-aware scanning over SQL text.
//!
//! All structural characters (quotes, parentheses, commas, semicolons) are
//! ASCII, so scanning works on bytes and every reported position is a valid
//! `char` boundary.

use alloc::string::String;
use alloc::vec::Vec;

/// Tracks whether a byte-wise scan is inside a quoted literal.
///
/// A doubled quote (`'it''s'`) closes and immediately reopens the literal,
/// which keeps the state correct without special handling. A quote preceded
/// by a backslash does not close the literal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct QuoteState {
    quote: Option<u8>,
}

impl QuoteState {
    /// Feed the byte at `pos` and report whether it belongs to a literal,
    /// including the delimiting quotes themselves.
    pub(crate) fn step(&mut self, bytes: &[u8], pos: usize) -> bool {
        let b = bytes[pos];
        match self.quote {
            Some(q) => {
                if b == q && !(pos > 0 && bytes[pos - 1] == b'\\') {
                    self.quote = None;
                }
                true
            }
            None if b == b'\'' || b == b'"' => {
                self.quote = Some(b);
                true
            }
            None => false,
        }
    }

    fn is_open(self) -> bool {
        self.quote.is_some()
    }
}

/// Tracks whether a byte-wise scan over raw statement text is inside a
/// quoted literal or a `--` line comment.
///
/// A comment runs up to and including the newline that ends it. Quotes
/// inside a comment open nothing, and `--` inside a literal starts nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TextState {
    quote: QuoteState,
    comment: bool,
}

impl TextState {
    /// Feed the byte at `pos` and report whether it belongs to a literal or
    /// a comment, delimiters included.
    pub(crate) fn step(&mut self, bytes: &[u8], pos: usize) -> bool {
        if self.comment {
            if bytes[pos] == b'\n' {
                self.comment = false;
            }
            return true;
        }
        if !self.quote.is_open() && bytes[pos] == b'-' && bytes.get(pos + 1) == Some(&b'-') {
            self.comment = true;
            return true;
        }
        self.quote.step(bytes, pos)
    }

    /// Whether the last byte fed was part of an unfinished comment.
    pub(crate) fn in_comment(self) -> bool {
        self.comment
    }
}

/// One byte of scanned input together with its structural context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Site {
    /// Byte offset in the input.
    pub(crate) pos: usize,
    /// The byte itself.
    pub(crate) byte: u8,
    /// Parenthesis depth. An opening parenthesis reports the depth outside
    /// it, a closing parenthesis the depth after it closes.
    pub(crate) depth: usize,
    /// Whether the byte is part of a quoted literal.
    pub(crate) quoted: bool,
}

/// Left-to-right scan yielding a [`Site`] per byte.
pub(crate) struct Structure<'a> {
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    quote: QuoteState,
}

impl<'a> Structure<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
            depth: 0,
            quote: QuoteState::default(),
        }
    }
}

impl Iterator for Structure<'_> {
    type Item = Site;

    fn next(&mut self) -> Option<Site> {
        if self.pos >= self.bytes.len() {
            return None;
        }
        let pos = self.pos;
        let byte = self.bytes[pos];
        self.pos += 1;

        let quoted = self.quote.step(self.bytes, pos);
        let depth = if quoted {
            self.depth
        } else {
            match byte {
                b'(' => {
                    self.depth += 1;
                    self.depth - 1
                }
                b')' => {
                    // Unbalanced closers clamp at zero.
                    self.depth = self.depth.saturating_sub(1);
                    self.depth
                }
                _ => self.depth,
            }
        };

        Some(Site {
            pos,
            byte,
            depth,
            quoted,
        })
    }
}

/// Split a comma-separated list on its top-level commas.
///
/// Commas nested inside parentheses or quoted literals do not split, so
/// `TO_DATE(:x,'YYYY,MM')` stays one token. Each token is trimmed. Input
/// that is empty or all whitespace yields no tokens. Unbalanced input never
/// fails: whatever was accumulated is returned and callers validate the
/// overall shape.
///
/// # Example
///
/// ```
/// use sql_parity::split_top_level;
///
/// let tokens = split_top_level("a, TO_DATE(x,'YYYY,MM'), b");
/// assert_eq!(tokens, vec!["a", "TO_DATE(x,'YYYY,MM')", "b"]);
/// ```
#[must_use]
pub fn split_top_level(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut start = 0;

    for site in Structure::new(text) {
        if site.byte == b',' && site.depth == 0 && !site.quoted {
            tokens.push(text[start..site.pos].trim().into());
            start = site.pos + 1;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() || !tokens.is_empty() {
        tokens.push(tail.into());
    }
    tokens
}

/// Position of the parenthesis closing the one at `open`.
///
/// Returns `None` when `open` is not an unquoted `(` or the group never closes.
pub(crate) fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut sites = Structure::new(text).skip_while(|site| site.pos < open);
    let first = sites.next()?;
    if first.byte != b'(' || first.quoted {
        return None;
    }
    let outer = first.depth;
    sites
        .find(|site| site.byte == b')' && !site.quoted && site.depth == outer)
        .map(|site| site.pos)
}

/// Position of the first unquoted, top-level `byte` at or after `from`.
pub(crate) fn find_top_level(text: &str, byte: u8, from: usize) -> Option<usize> {
    Structure::new(text)
        .find(|site| site.pos >= from && site.byte == byte && site.depth == 0 && !site.quoted)
        .map(|site| site.pos)
}

/// Position of the first top-level occurrence of `keyword` as a whole word,
/// matched case-insensitively, at or after `from`.
pub(crate) fn find_keyword(text: &str, keyword: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    Structure::new(text)
        .find(|site| {
            site.pos >= from && site.depth == 0 && !site.quoted && keyword_at(bytes, site.pos, keyword)
        })
        .map(|site| site.pos)
}

/// Whether `keyword` starts at `pos` as a whole word.
pub(crate) fn keyword_at(bytes: &[u8], pos: usize, keyword: &str) -> bool {
    let end = pos + keyword.len();
    end <= bytes.len()
        && bytes[pos..end].eq_ignore_ascii_case(keyword.as_bytes())
        && (pos == 0 || !is_bound_byte(bytes[pos - 1]))
        && (end == bytes.len() || !is_word_byte(bytes[end]))
}

/// Whether a byte can appear inside an identifier.
///
/// Non-ASCII bytes count as word bytes so that keywords glued to non-ASCII
/// identifiers are not split off.
pub(crate) fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'#') || b >= 0x80
}

/// Whether a byte preceding a word ties it to what comes before
/// (`t.FROM`, `:VALUES`).
fn is_bound_byte(b: u8) -> bool {
    is_word_byte(b) || matches!(b, b'.' | b':')
}

/// The leading identifier of `text`, skipping whitespace and opening parentheses.
pub(crate) fn leading_word(text: &str) -> &str {
    let rest = text.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
    let end = rest
        .bytes()
        .position(|b| !is_word_byte(b))
        .unwrap_or(rest.len());
    &rest[..end]
}
