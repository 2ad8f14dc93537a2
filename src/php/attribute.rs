use super::eval::{EvalContext, Evaluator};
use super::lexer::{Token, TokenKind};
use super::{short_name, PhpValue};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ParsedAttribute {
    /// Name as written, possibly qualified
    pub name: String,
    pub args: Vec<PhpValue>,
    pub named_args: HashMap<String, PhpValue>,
}

impl ParsedAttribute {
    /// Match by last name segment, ignoring case.
    pub fn is(&self, name: &str) -> bool {
        short_name(&self.name).eq_ignore_ascii_case(name)
    }

    /// Look up an argument by name, falling back to its position.
    pub fn arg(&self, name: &str, position: usize) -> Option<&PhpValue> {
        self.named_args.get(name).or_else(|| self.args.get(position))
    }

    pub fn bool_arg(&self, name: &str, position: usize, default: bool) -> bool {
        self.arg(name, position)
            .and_then(PhpValue::as_bool)
            .unwrap_or(default)
    }

    pub fn string_arg(&self, name: &str, position: usize) -> Option<String> {
        self.arg(name, position)
            .and_then(PhpValue::as_str)
            .map(str::to_string)
    }

    /// String elements of an array argument; non-strings are ignored.
    pub fn string_list_arg(&self, name: &str, position: usize) -> Vec<String> {
        match self.arg(name, position) {
            Some(PhpValue::Array(entries)) => entries
                .iter()
                .filter_map(|(_, v)| v.as_str().map(str::to_string))
                .collect(),
            Some(PhpValue::Str(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}

/// Parse one `#[...]` group. `start` points just past the `#[` token.
/// Returns the attributes and the index just past the closing `]`.
pub fn parse_attribute_group(
    tokens: &[Token],
    start: usize,
    ctx: &EvalContext<'_>,
) -> (Vec<ParsedAttribute>, usize) {
    let end = matching_close(tokens, start);
    let body = &tokens[start..end.min(tokens.len())];
    let mut attributes = Vec::new();

    for piece in split_top_level(body) {
        let Some(name) = piece.first().and_then(Token::ident) else {
            continue;
        };
        let mut attribute = ParsedAttribute {
            name: name.to_string(),
            args: Vec::new(),
            named_args: HashMap::new(),
        };

        if piece.get(1).map(|t| &t.kind) == Some(&TokenKind::LParen) {
            let close = matching_close(piece, 2);
            for arg in split_top_level(&piece[2..close.min(piece.len())]) {
                parse_argument(arg, ctx, &mut attribute);
            }
        }
        attributes.push(attribute);
    }

    (attributes, (end + 1).min(tokens.len()))
}

fn parse_argument(arg: &[Token], ctx: &EvalContext<'_>, attribute: &mut ParsedAttribute) {
    let named = match (arg.first(), arg.get(1)) {
        (Some(first), Some(second)) if second.kind == TokenKind::Colon => first.ident().map(str::to_string),
        _ => None,
    };
    let value_tokens = if named.is_some() { &arg[2..] } else { arg };

    let mut evaluator = Evaluator::new(value_tokens, ctx);
    match evaluator.expression() {
        Ok(value) if evaluator.at_end() => match named {
            Some(name) => {
                attribute.named_args.insert(name, value);
            }
            None => attribute.args.push(value),
        },
        Ok(_) => debug!("Ignoring trailing tokens in argument of #[{}]", attribute.name),
        Err(e) => debug!("Ignoring argument of #[{}]: {}", attribute.name, e),
    }
}

/// Index of the bracket closing the group opened just before `start`.
pub(crate) fn matching_close(tokens: &[Token], start: usize) -> usize {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(start) {
        match token.kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace | TokenKind::AttrOpen => {
                depth += 1
            }
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                if depth == 0 {
                    return i;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    tokens.len()
}

/// Split on commas that are not nested inside brackets; empty pieces are dropped.
pub(crate) fn split_top_level(tokens: &[Token]) -> Vec<&[Token]> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut piece_start = 0;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace | TokenKind::AttrOpen => {
                depth += 1
            }
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                depth = depth.saturating_sub(1)
            }
            TokenKind::Comma if depth == 0 => {
                if i > piece_start {
                    pieces.push(&tokens[piece_start..i]);
                }
                piece_start = i + 1;
            }
            _ => {}
        }
    }
    if tokens.len() > piece_start {
        pieces.push(&tokens[piece_start..]);
    }
    pieces
}
