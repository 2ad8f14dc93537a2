//! Lenient reader for previously generated enum modules.
//!
//! Only the shapes this crate emits are understood:
//! `export const Name = { KEY: value, ... } (as const)?;` and the array form
//! `export const Name = [ value, ... ] (as const)?;`. Type exports and
//! anything unrecognised are skipped.

use crate::transform::GroupKind;
use crate::ts_generator::{format_float, quote};
use std::fmt;

/// A literal or reference as it appears in a generated module.
#[derive(Debug, Clone, PartialEq)]
pub enum JsValue {
    Str(String),
    /// Canonical numeric text
    Num(String),
    Bool(bool),
    Null,
    /// Dotted reference such as `Status.ACTIVE`
    Ref(String),
    /// Anything else, kept as raw text
    Other(String),
}

impl JsValue {
    pub fn number(text: &str) -> JsValue {
        if let Ok(n) = text.parse::<i64>() {
            return JsValue::Num(n.to_string());
        }
        match text.parse::<f64>() {
            Ok(f) => JsValue::Num(format_float(f)),
            Err(_) => JsValue::Other(text.to_string()),
        }
    }
}

impl fmt::Display for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Str(s) => f.write_str(&quote(s)),
            JsValue::Num(n) => f.write_str(n),
            JsValue::Bool(b) => write!(f, "{}", b),
            JsValue::Null => f.write_str("null"),
            JsValue::Ref(r) | JsValue::Other(r) => f.write_str(r),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExport {
    pub name: String,
    pub kind: GroupKind,
    /// Array entries are keyed `0..n`
    pub entries: Vec<(String, JsValue)>,
}

/// Exported constants of a module, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedModule {
    pub exports: Vec<ParsedExport>,
}

impl ParsedModule {
    pub fn get(&self, name: &str) -> Option<&ParsedExport> {
        self.exports.iter().find(|e| e.name == name)
    }
}

pub fn parse_module(source: &str) -> ParsedModule {
    let cleaned = remove_js_comments(source);
    let tokens = tokenize(&cleaned);
    let mut reader = Reader { tokens: &tokens, pos: 0 };
    let mut module = ParsedModule::default();

    while reader.pos < tokens.len() {
        if !reader.eat_word("export") {
            reader.pos += 1;
            continue;
        }
        if !reader.eat_word("const") {
            // export type / export function / ...
            reader.skip_statement();
            continue;
        }
        let start = reader.pos;
        match reader.const_export() {
            Some(export) => module.exports.push(export),
            None => {
                reader.pos = start;
                reader.skip_statement();
            }
        }
    }

    module
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Word(String),
    Str(String),
    Num(String),
    Punct(char),
}

struct Reader<'t> {
    tokens: &'t [Tok],
    pos: usize,
}

impl<'t> Reader<'t> {
    fn peek(&self) -> Option<&'t Tok> {
        self.tokens.get(self.pos)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Tok::Word(w)) if w == word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.peek() == Some(&Tok::Punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skip to just past the next top-level `;`, or to the next `export`.
    fn skip_statement(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok {
                Tok::Punct('{') | Tok::Punct('[') | Tok::Punct('(') => depth += 1,
                Tok::Punct('}') | Tok::Punct(']') | Tok::Punct(')') => depth = depth.saturating_sub(1),
                Tok::Punct(';') if depth == 0 => {
                    self.pos += 1;
                    return;
                }
                Tok::Word(w) if depth == 0 && w == "export" => return,
                _ => {}
            }
            self.pos += 1;
        }
    }

    /// `Name = {..}|[..] (as const)? ;?` after `export const`.
    fn const_export(&mut self) -> Option<ParsedExport> {
        let Some(Tok::Word(name)) = self.peek() else {
            return None;
        };
        self.pos += 1;
        if !self.eat_punct('=') {
            return None;
        }

        let (kind, entries) = if self.eat_punct('{') {
            (GroupKind::Record, self.object_entries()?)
        } else if self.eat_punct('[') {
            (GroupKind::Array, self.array_entries()?)
        } else {
            return None;
        };

        if self.eat_word("as") {
            self.eat_word("const");
        }
        self.eat_punct(';');

        Some(ParsedExport {
            name: name.clone(),
            kind,
            entries,
        })
    }

    fn object_entries(&mut self) -> Option<Vec<(String, JsValue)>> {
        let mut entries = Vec::new();
        loop {
            if self.eat_punct('}') {
                return Some(entries);
            }
            let key = match self.peek()? {
                Tok::Word(w) | Tok::Str(w) | Tok::Num(w) => w.clone(),
                Tok::Punct(_) => return None,
            };
            self.pos += 1;
            if !self.eat_punct(':') {
                return None;
            }
            let value = self.value()?;
            entries.push((key, value));
            if !self.eat_punct(',') && self.peek() != Some(&Tok::Punct('}')) {
                return None;
            }
        }
    }

    fn array_entries(&mut self) -> Option<Vec<(String, JsValue)>> {
        let mut entries = Vec::new();
        loop {
            if self.eat_punct(']') {
                return Some(entries);
            }
            let value = self.value()?;
            entries.push((entries.len().to_string(), value));
            if !self.eat_punct(',') && self.peek() != Some(&Tok::Punct(']')) {
                return None;
            }
        }
    }

    fn value(&mut self) -> Option<JsValue> {
        let tok = self.peek()?;
        self.pos += 1;
        match tok {
            Tok::Str(s) => Some(JsValue::Str(s.clone())),
            Tok::Num(n) => Some(JsValue::number(n)),
            Tok::Punct('-') => match self.peek()? {
                Tok::Num(n) => {
                    self.pos += 1;
                    Some(JsValue::number(&format!("-{}", n)))
                }
                _ => None,
            },
            Tok::Word(w) => match w.as_str() {
                "true" => Some(JsValue::Bool(true)),
                "false" => Some(JsValue::Bool(false)),
                "null" => Some(JsValue::Null),
                _ => {
                    let mut path = w.clone();
                    while self.peek() == Some(&Tok::Punct('.')) {
                        match self.tokens.get(self.pos + 1) {
                            Some(Tok::Word(next)) => {
                                path.push('.');
                                path.push_str(next);
                                self.pos += 2;
                            }
                            _ => break,
                        }
                    }
                    Some(JsValue::Ref(path))
                }
            },
            Tok::Punct(open @ ('{' | '[')) => {
                let close = if *open == '{' { '}' } else { ']' };
                let start = self.pos - 1;
                let mut depth = 1usize;
                while depth > 0 {
                    match self.peek()? {
                        Tok::Punct(c) if *c == *open => depth += 1,
                        Tok::Punct(c) if *c == close => depth -= 1,
                        _ => {}
                    }
                    self.pos += 1;
                }
                Some(JsValue::Other(render_tokens(&self.tokens[start..self.pos])))
            }
            Tok::Punct(_) => None,
        }
    }
}

fn render_tokens(tokens: &[Tok]) -> String {
    tokens
        .iter()
        .map(|t| match t {
            Tok::Word(w) | Tok::Num(w) => w.clone(),
            Tok::Str(s) => quote(s),
            Tok::Punct(c) => c.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn tokenize(input: &str) -> Vec<Tok> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == '\'' || c == '"' || c == '`' {
            let (s, next) = read_string(&chars, i);
            tokens.push(Tok::Str(s));
            i = next;
        } else if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())) {
            let start = i;
            while i < chars.len()
                && (chars[i].is_ascii_alphanumeric() || chars[i] == '.' || chars[i] == '_')
            {
                i += 1;
            }
            let text: String = chars[start..i].iter().filter(|c| **c != '_').collect();
            tokens.push(Tok::Num(text));
        } else if c.is_alphabetic() || c == '_' || c == '$' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$') {
                i += 1;
            }
            tokens.push(Tok::Word(chars[start..i].iter().collect()));
        } else {
            tokens.push(Tok::Punct(c));
            i += 1;
        }
    }

    tokens
}

/// Decode a quoted string starting at `start`; returns the text and the index after it.
fn read_string(chars: &[char], start: usize) -> (String, usize) {
    let quote_char = chars[start];
    let mut out = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        let c = chars[i];
        if c == quote_char {
            return (out, i + 1);
        }
        if c == '\\' {
            match chars.get(i + 1) {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('u') => {
                    let hex: String = chars.iter().skip(i + 2).take(4).collect();
                    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                        Some(decoded) => {
                            out.push(decoded);
                            i += 6;
                            continue;
                        }
                        None => out.push('u'),
                    }
                }
                Some(other) => out.push(*other),
                None => {}
            }
            i += 2;
            continue;
        }
        out.push(c);
        i += 1;
    }

    (out, i)
}

/// Strip `//` and `/* */` comments outside string literals.
pub fn remove_js_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(quote_char) = in_string {
            result.push(c);
            if c == quote_char {
                in_string = None;
            } else if c == '\\' {
                if let Some(next) = chars.next() {
                    result.push(next);
                }
            }
        } else if c == '"' || c == '\'' || c == '`' {
            in_string = Some(c);
            result.push(c);
        } else if c == '/' {
            match chars.peek() {
                Some('/') => {
                    // Line comment - skip until newline
                    for nc in chars.by_ref() {
                        if nc == '\n' {
                            result.push('\n');
                            break;
                        }
                    }
                }
                Some('*') => {
                    // Block comment - skip until */
                    chars.next();
                    while let Some(nc) = chars.next() {
                        if nc == '*' && chars.peek() == Some(&'/') {
                            chars.next();
                            break;
                        }
                    }
                    result.push(' ');
                }
                _ => result.push(c),
            }
        } else {
            result.push(c);
        }
    }
    result
}
