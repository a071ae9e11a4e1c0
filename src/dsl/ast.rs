//! Parsed directive types.

/// Byte span into the text the directive was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// One `name(arg0, arg1, ...)` call from a directive block.
///
/// Arguments are raw: trimmed, but quotes are left in place for the handler
/// to strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub args: Vec<String>,
    pub span: Span,
}

/// The `[...]` block located in a text, with the span of its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    pub body: &'a str,
    /// Span of the body (between the brackets).
    pub body_span: Span,
    /// Span including both brackets.
    pub span: Span,
}
