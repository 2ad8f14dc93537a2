//! Tolerant tokenizer for backend source files.
//!
//! Only the subset needed to find enum declarations, attributes and constant
//! array expressions is recognised. Anything else becomes a `Symbol` token so
//! the lexer never fails.

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier or keyword, including `\`-qualified names
    Ident(String),
    Variable(String),
    /// String literal with escapes already decoded
    Str(String),
    Int(i64),
    Float(f64),
    /// Raw `/** ... */` block
    DocComment(String),
    /// `#[`
    AttrOpen,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Semicolon,
    Comma,
    Colon,
    DoubleColon,
    FatArrow,
    Arrow,
    NullsafeArrow,
    Assign,
    Question,
    Dot,
    Ellipsis,
    Minus,
    Plus,
    Symbol(char),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    pub fn is_ident(&self, word: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(s) if s.eq_ignore_ascii_case(word))
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(s) => Some(s),
            _ => None,
        }
    }

    /// Short human description used in error messages.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Ident(s) => s.clone(),
            TokenKind::Variable(v) => format!("${}", v),
            TokenKind::Str(s) => format!("'{}'", s),
            TokenKind::Int(n) => n.to_string(),
            TokenKind::Float(f) => f.to_string(),
            TokenKind::DocComment(_) => "doc comment".to_string(),
            TokenKind::AttrOpen => "#[".to_string(),
            TokenKind::LParen => "(".to_string(),
            TokenKind::RParen => ")".to_string(),
            TokenKind::LBracket => "[".to_string(),
            TokenKind::RBracket => "]".to_string(),
            TokenKind::LBrace => "{".to_string(),
            TokenKind::RBrace => "}".to_string(),
            TokenKind::Semicolon => ";".to_string(),
            TokenKind::Comma => ",".to_string(),
            TokenKind::Colon => ":".to_string(),
            TokenKind::DoubleColon => "::".to_string(),
            TokenKind::FatArrow => "=>".to_string(),
            TokenKind::Arrow => "->".to_string(),
            TokenKind::NullsafeArrow => "?->".to_string(),
            TokenKind::Assign => "=".to_string(),
            TokenKind::Question => "?".to_string(),
            TokenKind::Dot => ".".to_string(),
            TokenKind::Ellipsis => "...".to_string(),
            TokenKind::Minus => "-".to_string(),
            TokenKind::Plus => "+".to_string(),
            TokenKind::Symbol(c) => c.to_string(),
        }
    }
}

pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek(i) == Some(c))
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, line: usize) {
        self.tokens.push(Token { kind, line });
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(c) = self.peek(0) {
            let line = self.line;

            if c.is_whitespace() {
                self.bump();
                continue;
            }

            if self.starts_with("<?php") {
                self.pos += 5;
                continue;
            }
            if self.starts_with("<?=") || self.starts_with("?>") {
                self.pos += if c == '<' { 3 } else { 2 };
                continue;
            }
            if self.starts_with("<<<") {
                self.heredoc(line);
                continue;
            }

            if self.starts_with("/**") && !self.starts_with("/**/") {
                let text = self.block_comment();
                self.push(TokenKind::DocComment(text), line);
                continue;
            }
            if self.starts_with("/*") {
                self.block_comment();
                continue;
            }
            if self.starts_with("//") || (c == '#' && self.peek(1) != Some('[')) {
                self.line_comment();
                continue;
            }

            if c == '\'' || c == '"' {
                let s = self.string(c);
                self.push(TokenKind::Str(s), line);
                continue;
            }

            if c == '$' && self.peek(1).is_some_and(is_ident_start) {
                self.bump();
                let name = self.take_while(is_ident_char);
                self.push(TokenKind::Variable(name), line);
                continue;
            }

            if c.is_ascii_digit() || (c == '.' && self.peek(1).is_some_and(|n| n.is_ascii_digit())) {
                let kind = self.number();
                self.push(kind, line);
                continue;
            }

            if is_ident_start(c) || (c == '\\' && self.peek(1).is_some_and(is_ident_start)) {
                let name = self.qualified_name();
                self.push(TokenKind::Ident(name), line);
                continue;
            }

            let (kind, width) = match c {
                '#' => (TokenKind::AttrOpen, 2),
                '(' => (TokenKind::LParen, 1),
                ')' => (TokenKind::RParen, 1),
                '[' => (TokenKind::LBracket, 1),
                ']' => (TokenKind::RBracket, 1),
                '{' => (TokenKind::LBrace, 1),
                '}' => (TokenKind::RBrace, 1),
                ';' => (TokenKind::Semicolon, 1),
                ',' => (TokenKind::Comma, 1),
                ':' if self.peek(1) == Some(':') => (TokenKind::DoubleColon, 2),
                ':' => (TokenKind::Colon, 1),
                '=' if self.peek(1) == Some('>') => (TokenKind::FatArrow, 2),
                '=' if self.peek(1) == Some('=') => (TokenKind::Symbol('='), 2),
                '=' => (TokenKind::Assign, 1),
                '-' if self.peek(1) == Some('>') => (TokenKind::Arrow, 2),
                '-' => (TokenKind::Minus, 1),
                '+' => (TokenKind::Plus, 1),
                '?' if self.starts_with("?->") => (TokenKind::NullsafeArrow, 3),
                '?' => (TokenKind::Question, 1),
                '.' if self.starts_with("...") => (TokenKind::Ellipsis, 3),
                '.' => (TokenKind::Dot, 1),
                other => (TokenKind::Symbol(other), 1),
            };
            for _ in 0..width {
                self.bump();
            }
            self.push(kind, line);
        }

        self.tokens
    }

    fn take_while(&mut self, pred: fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek(0) {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    fn qualified_name(&mut self) -> String {
        let mut name = String::new();
        loop {
            if self.peek(0) == Some('\\') && self.peek(1).is_some_and(is_ident_start) {
                self.bump();
                name.push('\\');
            }
            let part = self.take_while(is_ident_char);
            if part.is_empty() {
                break;
            }
            name.push_str(&part);
            if !(self.peek(0) == Some('\\') && self.peek(1).is_some_and(is_ident_start)) {
                break;
            }
        }
        name
    }

    fn number(&mut self) -> TokenKind {
        if self.peek(0) == Some('0') && matches!(self.peek(1), Some('x') | Some('X')) {
            self.pos += 2;
            let digits: String = self
                .take_while(|c| c.is_ascii_hexdigit() || c == '_')
                .replace('_', "");
            return i64::from_str_radix(&digits, 16)
                .map(TokenKind::Int)
                .unwrap_or(TokenKind::Symbol('0'));
        }

        let mut text = self.take_while(|c| c.is_ascii_digit() || c == '_');
        let mut is_float = false;
        if self.peek(0) == Some('.') && self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit() || c == '_'));
            is_float = true;
        }
        if matches!(self.peek(0), Some('e') | Some('E')) {
            let sign = matches!(self.peek(1), Some('+') | Some('-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.peek(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                text.push('e');
                self.bump();
                if sign {
                    if let Some(s) = self.bump() {
                        text.push(s);
                    }
                }
                text.push_str(&self.take_while(|c| c.is_ascii_digit()));
                is_float = true;
            }
        }

        let text = text.replace('_', "");
        if is_float {
            text.parse().map(TokenKind::Float).unwrap_or(TokenKind::Float(0.0))
        } else {
            match text.parse::<i64>() {
                Ok(n) => TokenKind::Int(n),
                Err(_) => text.parse().map(TokenKind::Float).unwrap_or(TokenKind::Float(0.0)),
            }
        }
    }

    fn string(&mut self, quote: char) -> String {
        self.bump();
        let mut out = String::new();
        while let Some(c) = self.bump() {
            if c == quote {
                break;
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let Some(next) = self.bump() else {
                out.push('\\');
                break;
            };
            if quote == '\'' {
                // Single-quoted strings only know \' and \\
                match next {
                    '\'' | '\\' => out.push(next),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
            } else {
                match next {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    'v' => out.push('\u{0B}'),
                    'e' => out.push('\u{1B}'),
                    'f' => out.push('\u{0C}'),
                    '0' => out.push('\0'),
                    '"' | '\\' | '$' => out.push(next),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
            }
        }
        out
    }

    fn heredoc(&mut self, line: usize) {
        self.pos += 3;
        while self.peek(0) == Some(' ') {
            self.bump();
        }
        let quoted = matches!(self.peek(0), Some('\'') | Some('"'));
        if quoted {
            self.bump();
        }
        let label = self.take_while(is_ident_char);
        if quoted {
            self.bump();
        }
        self.take_while(|c| c != '\n');
        self.bump();

        let mut lines: Vec<String> = Vec::new();
        loop {
            if self.peek(0).is_none() {
                break;
            }
            let raw = self.take_while(|c| c != '\n');
            let trimmed = raw.trim_start();
            if !label.is_empty() && trimmed.starts_with(label.as_str()) {
                // Closing marker: rewind to just after the label
                let consumed = raw.chars().count() - trimmed.chars().count() + label.chars().count();
                self.pos -= raw.chars().count() - consumed;
                let indent = raw.chars().count() - trimmed.chars().count();
                let body = lines
                    .iter()
                    .map(|l| l.chars().skip(indent.min(leading_ws(l))).collect::<String>())
                    .collect::<Vec<_>>()
                    .join("\n");
                self.push(TokenKind::Str(body), line);
                return;
            }
            lines.push(raw);
            self.bump();
        }
        self.push(TokenKind::Str(lines.join("\n")), line);
    }

    fn block_comment(&mut self) -> String {
        let mut text = String::new();
        while self.peek(0).is_some() {
            if self.starts_with("*/") {
                self.pos += 2;
                text.push_str("*/");
                return text;
            }
            if let Some(c) = self.bump() {
                text.push(c);
            }
        }
        text
    }

    fn line_comment(&mut self) {
        while let Some(c) = self.peek(0) {
            if c == '\n' || self.starts_with("?>") {
                break;
            }
            self.bump();
        }
    }
}

fn leading_ws(s: &str) -> usize {
    s.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || (c as u32) >= 0x80
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || (c as u32) >= 0x80
}

/// Strip the `/** */` frame and leading asterisks, dropping `@tag` lines.
pub fn clean_doc_comment(raw: &str) -> Option<String> {
    let inner = raw
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");

    let lines: Vec<&str> = inner
        .lines()
        .map(|l| {
            let l = l.trim();
            l.strip_prefix('*').map(str::trim).unwrap_or(l)
        })
        .filter(|l| !l.starts_with('@'))
        .collect();

    let start = lines.iter().position(|l| !l.is_empty())?;
    let end = lines.iter().rposition(|l| !l.is_empty())?;
    Some(lines[start..=end].join("\n"))
}
