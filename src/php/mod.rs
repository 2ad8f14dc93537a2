//! Lightweight front-end for the backend's PHP sources.
//!
//! Nothing here executes code: enum declarations, attributes and constant
//! array expressions are recovered from the token stream.

pub mod attribute;
pub mod enum_decl;
pub mod eval;
pub mod lexer;

pub use attribute::ParsedAttribute;
pub use enum_decl::{parse_source, parse_tokens, BackingType, CaseDecl, EnumDeclaration, MethodDecl, SourceFile};
pub use eval::{CaseLookup, EvalContext, EvalError, Evaluator, NoCases};

use std::collections::HashMap;
use std::fmt;

/// Array key as PHP normalises it: integer-like strings become integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhpKey {
    Int(i64),
    Str(String),
}

impl PhpKey {
    pub fn from_string(s: String) -> Self {
        let canonical_int = s
            .parse::<i64>()
            .ok()
            .filter(|n| n.to_string() == s);
        match canonical_int {
            Some(n) => PhpKey::Int(n),
            None => PhpKey::Str(s),
        }
    }
}

impl fmt::Display for PhpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhpKey::Int(n) => write!(f, "{}", n),
            PhpKey::Str(s) => f.write_str(s),
        }
    }
}

/// A statically evaluated PHP value.
#[derive(Debug, Clone, PartialEq)]
pub enum PhpValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Ordered array; keys follow PHP's implicit numbering rules
    Array(Vec<(PhpKey, PhpValue)>),
    /// `Foo::BAR` where `Foo` resolved to a fully qualified class name
    CaseRef { class: String, case: String },
}

impl PhpValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PhpValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PhpValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            PhpValue::Null => "null",
            PhpValue::Bool(_) => "bool",
            PhpValue::Int(_) => "int",
            PhpValue::Float(_) => "float",
            PhpValue::Str(_) => "string",
            PhpValue::Array(_) => "array",
            PhpValue::CaseRef { .. } => "enum case",
        }
    }

    /// True when keys are exactly `0..n` in order, i.e. a list.
    pub fn is_list(entries: &[(PhpKey, PhpValue)]) -> bool {
        entries
            .iter()
            .enumerate()
            .all(|(i, (k, _))| *k == PhpKey::Int(i as i64))
    }
}

/// Namespace and `use` import context needed to qualify class names.
#[derive(Debug, Clone, Default)]
pub struct NameScope {
    pub namespace: Option<String>,
    /// Alias (lowercased) to fully qualified name
    pub imports: HashMap<String, String>,
}

impl NameScope {
    /// Resolve a class name the way PHP does for class references.
    pub fn resolve(&self, name: &str) -> String {
        if let Some(absolute) = name.strip_prefix('\\') {
            return absolute.to_string();
        }

        let (head, rest) = match name.split_once('\\') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };

        if let Some(imported) = self.imports.get(&head.to_ascii_lowercase()) {
            return match rest {
                Some(rest) => format!("{}\\{}", imported, rest),
                None => imported.clone(),
            };
        }

        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{}\\{}", ns, name),
            _ => name.to_string(),
        }
    }
}

/// Last segment of a `\`-separated qualified name.
pub fn short_name(qualified: &str) -> &str {
    qualified.rsplit('\\').next().unwrap_or(qualified)
}
