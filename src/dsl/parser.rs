use super::ast::{Directive, Span};
use super::error::ParseError;
use super::lexer::{find_block, split_outside_quotes, Delimiter, Piece};

/// Parse the directive chain out of free text.
///
/// Text without a block yields an empty list. Any malformed call fails the
/// whole chain; nothing is partially returned.
pub fn parse(text: &str) -> Result<Vec<Directive>, ParseError> {
    let Some(block) = find_block(text) else {
        return Ok(Vec::new());
    };

    if block.body.trim().is_empty() {
        return Err(ParseError::syntax("Empty directive block", block.span));
    }

    split_outside_quotes(block.body, block.body_span.start, Delimiter::Arrow)?
        .into_iter()
        .map(|piece| parse_call(piece.trimmed()))
        .collect()
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Parse `name(args)`.
fn parse_call(call: Piece<'_>) -> Result<Directive, ParseError> {
    let text = call.text;
    if text.is_empty() {
        return Err(ParseError::syntax("Empty command in directive chain", call.span));
    }

    let name_len = text
        .char_indices()
        .find(|&(i, ch)| if i == 0 { !is_ident_start(ch) } else { !is_ident_continue(ch) })
        .map_or(text.len(), |(i, _)| i);
    if name_len == 0 {
        return Err(ParseError::syntax(
            format!("Expected a command name, found '{text}'"),
            call.span,
        ));
    }
    let name = text.get(..name_len).unwrap_or_default();

    let after_name = text.get(name_len..).unwrap_or_default();
    let gap = after_name.len() - after_name.trim_start().len();
    let Some(args_and_close) = after_name.trim_start().strip_prefix('(') else {
        return Err(ParseError::syntax(
            format!("Expected '(' after '{name}' in '{text}'"),
            call.span,
        ));
    };
    let Some(inner) = args_and_close.strip_suffix(')') else {
        return Err(ParseError::syntax(
            format!("Expected '{name}(...)' to end with ')', found '{text}'"),
            call.span,
        ));
    };

    let inner_offset = call.span.start + name_len + gap + 1;
    let args = if inner.trim().is_empty() {
        Vec::new()
    } else {
        split_outside_quotes(inner, inner_offset, Delimiter::Comma)?
            .into_iter()
            .map(|p| p.trimmed().text.to_string())
            .collect()
    };

    Ok(Directive {
        name: name.to_string(),
        args,
        span: Span::new(call.span.start, call.span.end),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::dsl::error::ErrorKind;

    fn names_and_args(text: &str) -> Vec<(String, Vec<String>)> {
        parse(text)
            .unwrap()
            .into_iter()
            .map(|d| (d.name, d.args))
            .collect()
    }

    #[test]
    fn no_block_yields_empty_list() {
        assert!(parse("Hello! How can I help you today?").unwrap().is_empty());
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn single_call() {
        assert_eq!(
            names_and_args("Sure, turning it up. [volume(50)]"),
            vec![("volume".to_string(), vec!["50".to_string()])]
        );
    }

    #[test]
    fn chain_with_whitespace_and_quotes() {
        let parsed = names_and_args("[ setting(wifi, on) ->  call( \"Mom\" ) ->play_music('Song, Part 2') ]");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0], ("setting".into(), vec!["wifi".into(), "on".into()]));
        assert_eq!(parsed[1], ("call".into(), vec!["\"Mom\"".into()]));
        assert_eq!(parsed[2], ("play_music".into(), vec!["'Song, Part 2'".into()]));
    }

    #[test]
    fn empty_argument_list() {
        let parsed = names_and_args("[music_control ( )]");
        assert_eq!(parsed, vec![("music_control".to_string(), Vec::new())]);
    }

    #[test]
    fn directive_span_points_at_call() {
        let text = "ok [volume(5) -> call(Mom)]";
        let directives = parse(text).unwrap();
        assert_eq!(&text[directives[1].span.start..directives[1].span.end], "call(Mom)");
    }

    #[test]
    fn malformed_call_fails_whole_chain() {
        let err = parse("[volume(50) -> setting wifi on]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert!(err.message.contains("Expected '('"));
    }

    #[test]
    fn missing_close_paren() {
        let err = parse("[volume(50]").unwrap_err();
        assert!(err.message.contains("end with ')'"));
    }

    #[test]
    fn trailing_arrow_is_empty_call() {
        let err = parse("[volume(50) -> ]").unwrap_err();
        assert!(err.message.contains("Empty command"));
    }

    #[test]
    fn empty_block_is_an_error() {
        assert!(parse("[   ]").is_err());
    }

    #[test]
    fn bad_name_is_an_error() {
        let err = parse("[9lives(1)]").unwrap_err();
        assert!(err.message.contains("Expected a command name"));
    }

    #[test]
    fn unterminated_quote_in_args() {
        let err = parse("[call(\"Mom)]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }
}
