//! Static evaluation of constant PHP expressions.

use super::lexer::{Token, TokenKind};
use super::{NameScope, PhpKey, PhpValue};
use thiserror::Error;

/// Resolves `Enum::CASE->value` for enums known to the caller.
pub trait CaseLookup: Sync {
    fn case_value(&self, class: &str, case: &str) -> Option<PhpValue>;
}

/// Lookup that knows no enum cases.
pub struct NoCases;

impl CaseLookup for NoCases {
    fn case_value(&self, _class: &str, _case: &str) -> Option<PhpValue> {
        None
    }
}

pub struct EvalContext<'a> {
    pub scope: &'a NameScope,
    /// Fully qualified class that `self` and `static` refer to
    pub current_class: Option<&'a str>,
    pub cases: &'a dyn CaseLookup,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unsupported expression near '{token}' on line {line}")]
    Unsupported { token: String, line: usize },

    #[error("expected '{expected}' but found '{found}' on line {line}")]
    Expected {
        expected: &'static str,
        found: String,
        line: usize,
    },

    #[error("cannot resolve '{class}::{case}->{property}'")]
    UnresolvedCase {
        class: String,
        case: String,
        property: String,
    },
}

pub struct Evaluator<'t, 'c> {
    tokens: &'t [Token],
    pos: usize,
    ctx: &'c EvalContext<'c>,
}

impl<'t, 'c> Evaluator<'t, 'c> {
    pub fn new(tokens: &'t [Token], ctx: &'c EvalContext<'c>) -> Self {
        Self { tokens, pos: 0, ctx }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'t TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn next(&mut self) -> Result<&'t Token, EvalError> {
        let token = self.tokens.get(self.pos).ok_or(EvalError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<(), EvalError> {
        let token = self.next()?;
        if token.kind == kind {
            Ok(())
        } else {
            Err(EvalError::Expected {
                expected,
                found: token.describe(),
                line: token.line,
            })
        }
    }

    /// Evaluate one expression starting at the current position.
    pub fn expression(&mut self) -> Result<PhpValue, EvalError> {
        let mut value = self.unary()?;
        while self.peek_kind() == Some(&TokenKind::Dot) {
            let dot = self.next()?;
            let rhs = self.unary()?;
            let (Some(l), Some(r)) = (stringify(&value), stringify(&rhs)) else {
                return Err(unsupported(dot));
            };
            value = PhpValue::Str(l + &r);
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<PhpValue, EvalError> {
        if self.eat(&TokenKind::Plus) {
            return self.unary();
        }
        if self.peek_kind() == Some(&TokenKind::Minus) {
            let minus = self.next()?;
            return match self.unary()? {
                PhpValue::Int(n) => Ok(PhpValue::Int(-n)),
                PhpValue::Float(f) => Ok(PhpValue::Float(-f)),
                _ => Err(unsupported(minus)),
            };
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<PhpValue, EvalError> {
        let token = self.next()?;
        match &token.kind {
            TokenKind::Str(s) => Ok(PhpValue::Str(s.clone())),
            TokenKind::Int(n) => Ok(PhpValue::Int(*n)),
            TokenKind::Float(f) => Ok(PhpValue::Float(*f)),
            TokenKind::LBracket => self.array_body(TokenKind::RBracket),
            TokenKind::LParen => {
                let inner = self.expression()?;
                self.expect(TokenKind::RParen, ")")?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                if self.peek_kind() == Some(&TokenKind::DoubleColon) {
                    self.pos += 1;
                    return self.class_member(name, token);
                }
                match name.to_ascii_lowercase().as_str() {
                    "true" => Ok(PhpValue::Bool(true)),
                    "false" => Ok(PhpValue::Bool(false)),
                    "null" => Ok(PhpValue::Null),
                    "array" if self.eat(&TokenKind::LParen) => self.array_body(TokenKind::RParen),
                    _ => Err(unsupported(token)),
                }
            }
            _ => Err(unsupported(token)),
        }
    }

    fn class_member(&mut self, class_name: &str, at: &Token) -> Result<PhpValue, EvalError> {
        let class = match class_name.to_ascii_lowercase().as_str() {
            "self" | "static" => self
                .ctx
                .current_class
                .map(str::to_string)
                .ok_or_else(|| unsupported(at))?,
            _ => self.ctx.scope.resolve(class_name),
        };

        let member = self.next()?;
        let Some(case) = member.ident() else {
            return Err(unsupported(member));
        };
        if case.eq_ignore_ascii_case("class") {
            return Ok(PhpValue::Str(class));
        }
        let case = case.to_string();

        let is_arrow = matches!(
            self.peek_kind(),
            Some(TokenKind::Arrow) | Some(TokenKind::NullsafeArrow)
        );
        if !is_arrow {
            return Ok(PhpValue::CaseRef { class, case });
        }
        self.pos += 1;

        let property = self.next()?;
        match property.ident() {
            Some("name") => Ok(PhpValue::Str(case)),
            Some("value") => self
                .ctx
                .cases
                .case_value(&class, &case)
                .ok_or(EvalError::UnresolvedCase {
                    class,
                    case,
                    property: "value".to_string(),
                }),
            _ => Err(unsupported(property)),
        }
    }

    fn array_body(&mut self, closer: TokenKind) -> Result<PhpValue, EvalError> {
        let mut entries: Vec<(PhpKey, PhpValue)> = Vec::new();
        let mut next_index: i64 = 0;

        loop {
            if self.eat(&closer) {
                break;
            }
            if let Some(token) = self.peek() {
                if token.kind == TokenKind::Ellipsis {
                    return Err(unsupported(token));
                }
            }

            let key_start = self.peek().cloned();
            let first = self.expression()?;
            let (key, value) = if self.eat(&TokenKind::FatArrow) {
                let key = to_key(first).ok_or_else(|| match &key_start {
                    Some(t) => unsupported(t),
                    None => EvalError::UnexpectedEnd,
                })?;
                (key, self.expression()?)
            } else {
                (PhpKey::Int(next_index), first)
            };

            if let PhpKey::Int(n) = key {
                if n >= next_index {
                    next_index = n + 1;
                }
            }

            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(existing) => existing.1 = value,
                None => entries.push((key, value)),
            }

            if self.eat(&closer) {
                break;
            }
            let token = self.next()?;
            if token.kind != TokenKind::Comma {
                return Err(EvalError::Expected {
                    expected: ",",
                    found: token.describe(),
                    line: token.line,
                });
            }
        }

        Ok(PhpValue::Array(entries))
    }
}

fn unsupported(token: &Token) -> EvalError {
    EvalError::Unsupported {
        token: token.describe(),
        line: token.line,
    }
}

fn stringify(value: &PhpValue) -> Option<String> {
    match value {
        PhpValue::Str(s) => Some(s.clone()),
        PhpValue::Int(n) => Some(n.to_string()),
        PhpValue::Float(f) => Some(f.to_string()),
        PhpValue::Bool(true) => Some("1".to_string()),
        PhpValue::Bool(false) | PhpValue::Null => Some(String::new()),
        _ => None,
    }
}

fn to_key(value: PhpValue) -> Option<PhpKey> {
    match value {
        PhpValue::Str(s) => Some(PhpKey::from_string(s)),
        PhpValue::Int(n) => Some(PhpKey::Int(n)),
        PhpValue::Float(f) => Some(PhpKey::Int(f.trunc() as i64)),
        PhpValue::Bool(b) => Some(PhpKey::Int(b as i64)),
        PhpValue::Null => Some(PhpKey::Str(String::new())),
        PhpValue::Array(_) | PhpValue::CaseRef { .. } => None,
    }
}

/// Evaluate the array returned by a whole file (`return [...];`).
pub fn eval_returned_array(tokens: &[Token], ctx: &EvalContext<'_>) -> Result<PhpValue, EvalError> {
    let start = tokens
        .iter()
        .position(|t| t.is_ident("return"))
        .ok_or(EvalError::UnexpectedEnd)?;
    let mut evaluator = Evaluator::new(&tokens[start + 1..], ctx);
    evaluator.expression()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::php::lexer::tokenize;

    struct OneEnum;

    impl CaseLookup for OneEnum {
        fn case_value(&self, class: &str, case: &str) -> Option<PhpValue> {
            (class == "App\\Enums\\Status" && case == "ACTIVE").then(|| PhpValue::Str("active".into()))
        }
    }

    fn eval(src: &str) -> Result<PhpValue, EvalError> {
        let scope = NameScope {
            namespace: Some("App\\Enums".into()),
            ..Default::default()
        };
        let ctx = EvalContext {
            scope: &scope,
            current_class: Some("App\\Enums\\Status"),
            cases: &OneEnum,
        };
        let tokens = tokenize(src);
        Evaluator::new(&tokens, &ctx).expression()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(eval("'x'").unwrap(), PhpValue::Str("x".into()));
        assert_eq!(eval("-3").unwrap(), PhpValue::Int(-3));
        assert_eq!(eval("NULL").unwrap(), PhpValue::Null);
        assert_eq!(eval("true").unwrap(), PhpValue::Bool(true));
        assert_eq!(eval("'a' . 'b' . 1").unwrap(), PhpValue::Str("ab1".into()));
    }

    #[test]
    fn test_implicit_and_explicit_keys() {
        let value = eval("['a', 5 => 'b', 'c', 'k' => 'd', '7' => 'e']").unwrap();
        let PhpValue::Array(entries) = value else { panic!("expected array") };
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(
            keys,
            vec![
                PhpKey::Int(0),
                PhpKey::Int(5),
                PhpKey::Int(6),
                PhpKey::Str("k".into()),
                PhpKey::Int(7),
            ]
        );
    }

    #[test]
    fn test_duplicate_key_keeps_position() {
        let value = eval("array('a' => 1, 'b' => 2, 'a' => 3,)").unwrap();
        assert_eq!(
            value,
            PhpValue::Array(vec![
                (PhpKey::Str("a".into()), PhpValue::Int(3)),
                (PhpKey::Str("b".into()), PhpValue::Int(2)),
            ])
        );
    }

    #[test]
    fn test_class_references() {
        assert_eq!(
            eval("self::ACTIVE").unwrap(),
            PhpValue::CaseRef {
                class: "App\\Enums\\Status".into(),
                case: "ACTIVE".into()
            }
        );
        assert_eq!(eval("Status::class").unwrap(), PhpValue::Str("App\\Enums\\Status".into()));
        assert_eq!(eval("static::ACTIVE->value").unwrap(), PhpValue::Str("active".into()));
        assert_eq!(eval("self::ACTIVE->name").unwrap(), PhpValue::Str("ACTIVE".into()));
        assert!(matches!(
            eval("self::GONE->value"),
            Err(EvalError::UnresolvedCase { .. })
        ));
    }

    #[test]
    fn test_unsupported_constructs() {
        assert!(matches!(eval("strtoupper('x')"), Err(EvalError::Unsupported { .. })));
        assert!(matches!(eval("[...$other]"), Err(EvalError::Unsupported { .. })));
        assert!(matches!(eval("['a' 'b']"), Err(EvalError::Expected { .. })));
    }

    #[test]
    fn test_returned_array() {
        let scope = NameScope::default();
        let ctx = EvalContext {
            scope: &scope,
            current_class: None,
            cases: &NoCases,
        };
        let tokens = tokenize("<?php\n\nreturn [\n    'welcome' => 'Hi :name',\n];\n");
        let value = eval_returned_array(&tokens, &ctx).unwrap();
        assert_eq!(
            value,
            PhpValue::Array(vec![(
                PhpKey::Str("welcome".into()),
                PhpValue::Str("Hi :name".into())
            )])
        );
    }
}
