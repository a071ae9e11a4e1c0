//! Quote-aware scanning of directive blocks.
//!
//! Quotes only open at the start of an argument (right after `(` or `,`,
//! ignoring whitespace), so apostrophes inside free text such as
//! `play_music(Don't Stop Me Now)` never start a quoted region.

use super::ast::{Block, Span};
use super::error::ParseError;

/// Tracks whether the scanner is inside a quoted argument.
#[derive(Debug, Clone, Copy)]
struct QuoteState {
    open: Option<char>,
    at_arg_start: bool,
}

impl QuoteState {
    fn new(at_arg_start: bool) -> Self {
        Self {
            open: None,
            at_arg_start,
        }
    }

    /// Feed one char; returns true if it belongs to a quoted region
    /// (including the quote characters themselves).
    fn feed(&mut self, ch: char) -> bool {
        if let Some(q) = self.open {
            if ch == q {
                self.open = None;
            }
            return true;
        }
        if self.at_arg_start && (ch == '"' || ch == '\'') {
            self.open = Some(ch);
            self.at_arg_start = false;
            return true;
        }
        if ch == '(' || ch == ',' {
            self.at_arg_start = true;
        } else if !ch.is_whitespace() {
            self.at_arg_start = false;
        }
        false
    }

    fn unterminated(&self) -> Option<char> {
        self.open
    }
}

/// Locate the first `[...]` block. Returns `None` when there is no `[` or
/// the block is never closed.
///
/// If a quote opened inside the block never closes, the first `]` is taken
/// as the end so the parser can report the bad quote.
pub fn find_block(text: &str) -> Option<Block<'_>> {
    let open = text.find('[')?;
    let body_start = open + 1;
    let rest = text.get(body_start..)?;

    let mut quotes = QuoteState::new(false);
    for (i, ch) in rest.char_indices() {
        let quoted = quotes.feed(ch);
        if !quoted && ch == ']' {
            return block(text, open, body_start + i);
        }
    }
    if quotes.unterminated().is_some() {
        return block(text, open, body_start + rest.find(']')?);
    }
    None
}

fn block(text: &str, open: usize, body_end: usize) -> Option<Block<'_>> {
    let body_start = open + 1;
    Some(Block {
        body: text.get(body_start..body_end)?,
        body_span: Span::new(body_start, body_end),
        span: Span::new(open, body_end + 1),
    })
}

/// A slice of the source with its absolute span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece<'a> {
    pub text: &'a str,
    pub span: Span,
}

impl<'a> Piece<'a> {
    /// Trim whitespace, keeping the span aligned with the trimmed text.
    pub fn trimmed(self) -> Piece<'a> {
        let leading = self.text.len() - self.text.trim_start().len();
        let text = self.text.trim();
        let start = self.span.start + leading;
        Piece {
            text,
            span: Span::new(start, start + text.len()),
        }
    }
}

/// Where a split starts: inside an argument list or at chain level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `->` between calls.
    Arrow,
    /// `,` between arguments.
    Comma,
}

impl Delimiter {
    fn as_str(self) -> &'static str {
        match self {
            Delimiter::Arrow => "->",
            Delimiter::Comma => ",",
        }
    }
}

/// Split `src` (located at `offset` in the original text) on a delimiter that
/// appears outside quotes. Fails on an unterminated quote.
pub fn split_outside_quotes(
    src: &str,
    offset: usize,
    delimiter: Delimiter,
) -> Result<Vec<Piece<'_>>, ParseError> {
    let delim = delimiter.as_str();
    let mut quotes = QuoteState::new(delimiter == Delimiter::Comma);
    let mut pieces = Vec::new();
    let mut piece_start = 0;
    let mut skip_until = 0;

    for (i, ch) in src.char_indices() {
        if i < skip_until {
            continue;
        }
        let quoted = quotes.feed(ch);
        if quoted {
            continue;
        }
        if src.get(i..).is_some_and(|tail| tail.starts_with(delim)) {
            pieces.push(piece(src, offset, piece_start, i));
            piece_start = i + delim.len();
            skip_until = piece_start;
            if delimiter == Delimiter::Arrow {
                quotes = QuoteState::new(false);
            }
        }
    }

    if let Some(q) = quotes.unterminated() {
        return Err(ParseError::syntax(
            format!("Unterminated {q} quote in '{}'", src.trim()),
            Span::new(offset, offset + src.len()),
        ));
    }

    pieces.push(piece(src, offset, piece_start, src.len()));
    Ok(pieces)
}

fn piece(src: &str, offset: usize, start: usize, end: usize) -> Piece<'_> {
    Piece {
        text: src.get(start..end).unwrap_or_default(),
        span: Span::new(offset + start, offset + end),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn texts(pieces: &[Piece<'_>]) -> Vec<String> {
        pieces.iter().map(|p| p.trimmed().text.to_string()).collect()
    }

    #[test]
    fn find_block_locates_first_block() {
        let text = "Turning it on [setting(wifi, on)] and [volume(5)]";
        let block = find_block(text).unwrap();
        assert_eq!(block.body, "setting(wifi, on)");
        assert_eq!(&text[block.span.start..block.span.end], "[setting(wifi, on)]");
    }

    #[test]
    fn find_block_ignores_bracket_inside_quotes() {
        let block = find_block("[play_music(\"Song [Live]\")]").unwrap();
        assert_eq!(block.body, "play_music(\"Song [Live]\")");
    }

    #[test]
    fn find_block_none_without_brackets_or_closing() {
        assert!(find_block("No directives here.").is_none());
        assert!(find_block("Dangling [volume(5)").is_none());
    }

    #[test]
    fn find_block_with_unterminated_quote_uses_first_bracket() {
        let block = find_block("[call(\"Mom)] trailing").unwrap();
        assert_eq!(block.body, "call(\"Mom)");
    }

    #[test]
    fn split_arrow_respects_quotes() {
        let pieces = split_outside_quotes("call('a->b') -> volume(5)", 0, Delimiter::Arrow).unwrap();
        assert_eq!(texts(&pieces), vec!["call('a->b')", "volume(5)"]);
    }

    #[test]
    fn split_comma_keeps_quoted_commas() {
        let pieces = split_outside_quotes(" \"Smith, John\" , 42 ", 10, Delimiter::Comma).unwrap();
        assert_eq!(texts(&pieces), vec!["\"Smith, John\"", "42"]);
        assert_eq!(pieces[0].trimmed().span, Span::new(11, 24));
    }

    #[test]
    fn apostrophe_mid_argument_is_not_a_quote() {
        let pieces = split_outside_quotes("Don't Stop Me Now", 0, Delimiter::Comma).unwrap();
        assert_eq!(texts(&pieces), vec!["Don't Stop Me Now"]);
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let err = split_outside_quotes("'Mom, 5", 0, Delimiter::Comma).unwrap_err();
        assert!(err.message.contains("Unterminated"));
    }
}
