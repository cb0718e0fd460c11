//! OptionSettings block parser
//!
//! Locates the `OptionSettings=(...)` block in raw file text and decomposes it
//! into an ordered mapping of setting name → raw string value, together with
//! the exact byte span of the block so the serializer can later replace only
//! that span.

use std::collections::BTreeSet;
use std::ops::Range;

use gamecfg_core::prelude::*;
use gamecfg_core::{is_quoted, unquote, RawSettings};

/// Opening marker of the block
pub const BLOCK_OPENER: &str = "OptionSettings=(";

/// Byte span `[start, end)` of the whole `OptionSettings=(...)` text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    pub start: usize,
    pub end: usize,
}

impl BlockSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of parsing a file's OptionSettings block
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBlock {
    /// Settings in the order they first appear; values are unquoted
    pub settings: RawSettings,

    /// Span of the block in the source text
    pub span: BlockSpan,

    /// Keys whose (last) value was written in double quotes
    pub quoted: BTreeSet<String>,
}

/// Parse the OptionSettings block out of `text`
///
/// Returns [`Error::MissingBlock`] when the text has no block, so the caller
/// can fall back to plain INI handling.
pub fn parse(text: &str) -> Result<ParsedBlock> {
    let (span, inner) = locate_block(text).ok_or(Error::MissingBlock)?;
    let (settings, quoted) = parse_entries(&text[inner]);

    debug!(
        "Parsed OptionSettings block at {}..{} with {} settings",
        span.start,
        span.end,
        settings.len()
    );

    Ok(ParsedBlock {
        settings,
        span,
        quoted,
    })
}

/// Find the block, returning its span and the byte range of its contents
///
/// The block ends at the first `)` that is not inside a quoted value or a
/// parenthesized value. If quotes or groups never close, the first `)` after
/// the opener ends the block.
pub fn locate_block(text: &str) -> Option<(BlockSpan, Range<usize>)> {
    let start = text.find(BLOCK_OPENER)?;
    let inner_start = start + BLOCK_OPENER.len();
    let rest = &text[inner_start..];

    let close = find_block_end(rest).or_else(|| {
        trace!("Unbalanced OptionSettings block, ending at the first ')'");
        rest.find(')')
    })?;
    let inner_end = inner_start + close;

    Some((BlockSpan::new(start, inner_end + 1), inner_start..inner_end))
}

fn find_block_end(rest: &str) -> Option<usize> {
    let mut scanner = ValueScanner::default();
    rest.char_indices()
        .find(|&(i, c)| scanner.feed(rest, i, c) == Token::Close)
        .map(|(i, _)| i)
}

/// Split block contents into settings
///
/// Duplicate keys: the last value wins, the first position is kept.
/// Fragments without exactly one `=` outside quoted or parenthesized values,
/// or with an empty key, are skipped. If a quote or group is left open the
/// contents are split on every `,` and `=` instead.
pub fn parse_entries(inner: &str) -> (RawSettings, BTreeSet<String>) {
    let mut settings = RawSettings::new();
    let mut quoted = BTreeSet::new();

    let (fragments, structured) = match split_fragments(inner) {
        Some(fragments) => (fragments, true),
        None => {
            debug!("Unbalanced quotes or parentheses in block, using plain split");
            (inner.split(',').collect(), false)
        }
    };

    for fragment in fragments {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }

        let pair = if structured {
            split_key_value(fragment)
        } else {
            fragment.split_once('=').filter(|(_, v)| !v.contains('='))
        };
        let Some((key, value)) = pair else {
            trace!("Skipping malformed fragment: {:?}", fragment);
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            trace!("Skipping fragment with empty key: {:?}", fragment);
            continue;
        }

        let value = value.trim();
        if is_quoted(value) {
            quoted.insert(key.to_string());
        } else {
            quoted.remove(key);
        }

        if settings
            .insert(key.to_string(), unquote(value).to_string())
            .is_some()
        {
            debug!("Duplicate setting '{}' in block, last value wins", key);
        }
    }

    (settings, quoted)
}

/// Split on top-level `,`; `None` when a quote or group is left open
fn split_fragments(input: &str) -> Option<Vec<&str>> {
    let mut scanner = ValueScanner::default();
    let mut parts = Vec::new();
    let mut last = 0;

    for (i, c) in input.char_indices() {
        if scanner.feed(input, i, c) == Token::Comma {
            parts.push(&input[last..i]);
            last = i + c.len_utf8();
        }
    }
    parts.push(&input[last..]);

    scanner.is_balanced().then_some(parts)
}

/// Split at the only top-level `=`
fn split_key_value(fragment: &str) -> Option<(&str, &str)> {
    let mut scanner = ValueScanner::default();
    let mut equals = None;

    for (i, c) in fragment.char_indices() {
        if scanner.feed(fragment, i, c) == Token::Equals && equals.replace(i).is_some() {
            return None;
        }
    }

    equals.map(|i| (&fragment[..i], &fragment[i + 1..]))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// `,` between settings
    Comma,
    /// `=` between a key and its value
    Equals,
    /// `)` closing the block
    Close,
    Other,
}

/// Character-level state for the block contents
///
/// A `"` opens a quoted value only as the first character of a value and
/// closes it only when followed by `,`, `)` or the end of the text, so quotes
/// inside a value are literal. A `(` opens a group only as the first
/// character of a value or inside another group, and a group's `)` follows
/// the same closing rule as a quote.
#[derive(Debug, Default)]
struct ValueScanner {
    /// Set by a top-level `=`, cleared by the next non-space character
    at_value_start: bool,
    in_quotes: bool,
    depth: usize,
}

impl ValueScanner {
    /// Classify the character `c` found at byte `i` of `text`
    fn feed(&mut self, text: &str, i: usize, c: char) -> Token {
        if self.in_quotes {
            if c == '"' && ends_value(&text[i + 1..]) {
                self.in_quotes = false;
            }
            return Token::Other;
        }

        if c.is_whitespace() {
            return Token::Other;
        }
        let value_start = std::mem::take(&mut self.at_value_start);

        match c {
            '"' if value_start => {
                self.in_quotes = true;
                Token::Other
            }
            '(' if value_start || self.depth > 0 => {
                self.depth += 1;
                Token::Other
            }
            ')' if self.depth > 0 => {
                if ends_value(&text[i + 1..]) {
                    self.depth -= 1;
                }
                Token::Other
            }
            ')' => Token::Close,
            ',' if self.depth == 0 => Token::Comma,
            '=' if self.depth == 0 => {
                self.at_value_start = true;
                Token::Equals
            }
            _ => Token::Other,
        }
    }

    fn is_balanced(&self) -> bool {
        !self.in_quotes && self.depth == 0
    }
}

/// True when only a separator, the block end or nothing follows
fn ends_value(after: &str) -> bool {
    matches!(after.trim_start().chars().next(), None | Some(',') | Some(')'))
}
