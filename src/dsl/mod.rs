//! Directive grammar: `[name(arg, ...) -> name(arg, ...)]` embedded in free text.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

use ast::Directive;
use error::ParseError;

/// Extract the directive chain from an assistant reply.
///
/// This is the primary entry point for the grammar: text → block → calls.
pub fn parse_directives(text: &str) -> Result<Vec<Directive>, ParseError> {
    parser::parse(text)
}

/// The reply text with its directive block removed, for display.
pub fn strip_directives(text: &str) -> String {
    match lexer::find_block(text) {
        Some(block) => {
            let before = text.get(..block.span.start).unwrap_or_default().trim_end();
            let after = text.get(block.span.end..).unwrap_or_default().trim_start();
            match (before.is_empty(), after.is_empty()) {
                (true, _) => after.to_string(),
                (_, true) => before.to_string(),
                _ => format!("{before} {after}"),
            }
        }
        None => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_directives_removes_block() {
        assert_eq!(
            strip_directives("Turning on wifi. [setting(wifi, on)]"),
            "Turning on wifi."
        );
        assert_eq!(
            strip_directives("[volume(20)] Done, volume lowered."),
            "Done, volume lowered."
        );
        assert_eq!(strip_directives("Calling [call(Mom)] now."), "Calling now.");
        assert_eq!(strip_directives("  plain reply "), "plain reply");
    }
}
