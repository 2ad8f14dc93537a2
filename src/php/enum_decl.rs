use super::attribute::{matching_close, parse_attribute_group, split_top_level, ParsedAttribute};
use super::eval::{EvalContext, EvalError, Evaluator, NoCases};
use super::lexer::{clean_doc_comment, tokenize, Token, TokenKind};
use super::{NameScope, PhpValue};
use std::path::PathBuf;

/// Declared backing type of an enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackingType {
    String,
    Int,
}

/// A single `case` of an enum
#[derive(Debug, Clone)]
pub struct CaseDecl {
    pub name: String,
    /// None for pure cases, otherwise the evaluated backing value
    pub value: Option<Result<PhpValue, EvalError>>,
    /// Doc comment text without the comment frame
    pub doc: Option<String>,
}

/// A method header plus its body tokens
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub is_public: bool,
    pub is_static: bool,
    pub params: usize,
    /// Tokens between the body braces; None for abstract methods
    pub body: Option<Vec<Token>>,
    /// Line of the `function` keyword
    pub line: usize,
}

/// Represents an enum declared in a backend source file
#[derive(Debug, Clone)]
pub struct EnumDeclaration {
    pub name: String,
    pub qualified_name: String,
    pub namespace: Option<String>,
    pub backing: Option<BackingType>,
    pub attributes: Vec<ParsedAttribute>,
    pub doc: Option<String>,
    pub cases: Vec<CaseDecl>,
    pub methods: Vec<MethodDecl>,
    /// Imports in effect where the enum is declared
    pub scope: NameScope,
    pub source_file: PathBuf,
}

impl EnumDeclaration {
    pub fn attribute(&self, name: &str) -> Option<&ParsedAttribute> {
        self.attributes.iter().find(|a| a.is(name))
    }

    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        // PHP method names are case-insensitive
        self.methods.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn case(&self, name: &str) -> Option<&CaseDecl> {
        self.cases.iter().find(|c| c.name == name)
    }
}

/// Everything extracted from one source file
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub enums: Vec<EnumDeclaration>,
    /// Namespace and imports in effect at the end of the file
    pub scope: NameScope,
}

pub fn parse_source(source: &str) -> SourceFile {
    let tokens = tokenize(source);
    parse_tokens(&tokens)
}

pub fn parse_tokens(tokens: &[Token]) -> SourceFile {
    FileParser::new(tokens).run()
}

struct FileParser<'t> {
    tokens: &'t [Token],
    scope: NameScope,
    depth: usize,
    /// Brace depth at which a `namespace X { }` block was opened
    namespace_block: Option<usize>,
    pending_attributes: Vec<ParsedAttribute>,
    pending_doc: Option<String>,
    enums: Vec<EnumDeclaration>,
}

impl<'t> FileParser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            scope: NameScope::default(),
            depth: 0,
            namespace_block: None,
            pending_attributes: Vec::new(),
            pending_doc: None,
            enums: Vec::new(),
        }
    }

    fn top_level_depth(&self) -> usize {
        self.namespace_block.map(|d| d + 1).unwrap_or(0)
    }

    fn run(mut self) -> SourceFile {
        let tokens = self.tokens;
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            match &token.kind {
                TokenKind::DocComment(raw) => {
                    self.pending_doc = clean_doc_comment(raw);
                    i += 1;
                    continue;
                }
                TokenKind::AttrOpen => {
                    let ctx = EvalContext {
                        scope: &self.scope,
                        current_class: None,
                        cases: &NoCases,
                    };
                    let (attrs, next) = parse_attribute_group(tokens, i + 1, &ctx);
                    self.pending_attributes.extend(attrs);
                    i = next;
                    continue;
                }
                TokenKind::LBrace => self.depth += 1,
                TokenKind::RBrace => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.namespace_block == Some(self.depth) {
                        self.namespace_block = None;
                        self.scope = NameScope::default();
                    }
                }
                TokenKind::Ident(word) => {
                    let lower = word.to_ascii_lowercase();
                    if lower == "namespace" {
                        i = self.namespace(i + 1);
                        continue;
                    }
                    if lower == "use" && self.depth == self.top_level_depth() {
                        i = self.use_statement(i + 1);
                        continue;
                    }
                    if lower == "enum" {
                        if let Some(next) = self.enum_declaration(i + 1) {
                            i = next;
                            continue;
                        }
                    }
                    if matches!(lower.as_str(), "final" | "readonly" | "abstract") {
                        i += 1;
                        continue;
                    }
                }
                _ => {}
            }
            self.pending_attributes.clear();
            self.pending_doc = None;
            i += 1;
        }

        SourceFile {
            enums: self.enums,
            scope: self.scope,
        }
    }

    fn namespace(&mut self, mut i: usize) -> usize {
        let name = self.tokens.get(i).and_then(Token::ident).map(str::to_string);
        if name.is_some() {
            i += 1;
        }
        self.scope = NameScope {
            namespace: name,
            imports: Default::default(),
        };
        if self.tokens.get(i).map(|t| &t.kind) == Some(&TokenKind::LBrace) {
            self.namespace_block = Some(self.depth);
            self.depth += 1;
        }
        i + 1
    }

    fn use_statement(&mut self, mut i: usize) -> usize {
        // `use function` / `use const` imports never name classes
        if let Some(t) = self.tokens.get(i) {
            if t.is_ident("function") || t.is_ident("const") {
                return self.skip_past_semicolon(i);
            }
        }

        let end = self.find_semicolon(i);
        let statement = &self.tokens[i..end];
        i = 0;
        while i < statement.len() {
            let Some(name) = statement[i].ident() else {
                i += 1;
                continue;
            };
            let prefix = name.trim_start_matches('\\').to_string();

            // Group import: use A\{B, C as D};
            if statement.get(i + 1).map(|t| &t.kind) == Some(&TokenKind::Symbol('\\'))
                && statement.get(i + 2).map(|t| &t.kind) == Some(&TokenKind::LBrace)
            {
                let close = matching_close(statement, i + 3);
                for piece in split_top_level(&statement[i + 3..close.min(statement.len())]) {
                    self.register_import(&prefix, piece);
                }
                i = close + 1;
                continue;
            }

            let piece_end = statement[i..]
                .iter()
                .position(|t| t.kind == TokenKind::Comma)
                .map(|p| i + p)
                .unwrap_or(statement.len());
            self.register_import("", &statement[i..piece_end]);
            i = piece_end + 1;
        }
        (end + 1).min(self.tokens.len())
    }

    fn register_import(&mut self, prefix: &str, piece: &[Token]) {
        let Some(name) = piece.first().and_then(Token::ident) else {
            return;
        };
        let name = name.trim_start_matches('\\');
        let qualified = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}\\{}", prefix, name)
        };
        let alias = match (piece.get(1), piece.get(2)) {
            (Some(kw), Some(alias)) if kw.is_ident("as") => alias.ident().unwrap_or(name).to_string(),
            _ => super::short_name(&qualified).to_string(),
        };
        self.scope.imports.insert(alias.to_ascii_lowercase(), qualified);
    }

    fn find_semicolon(&self, from: usize) -> usize {
        self.tokens[from.min(self.tokens.len())..]
            .iter()
            .position(|t| t.kind == TokenKind::Semicolon)
            .map(|p| from + p)
            .unwrap_or(self.tokens.len())
    }

    fn skip_past_semicolon(&self, from: usize) -> usize {
        (self.find_semicolon(from) + 1).min(self.tokens.len())
    }

    /// Parse `enum Name [: type] [implements ...] { ... }`; `i` points at the name.
    fn enum_declaration(&mut self, mut i: usize) -> Option<usize> {
        let name = self.tokens.get(i)?.ident()?.to_string();
        i += 1;

        let mut backing = None;
        if self.tokens.get(i).map(|t| &t.kind) == Some(&TokenKind::Colon) {
            backing = self.tokens.get(i + 1).and_then(Token::ident).and_then(|t| {
                match t.to_ascii_lowercase().as_str() {
                    "string" => Some(BackingType::String),
                    "int" => Some(BackingType::Int),
                    _ => None,
                }
            });
            i += 2;
        }

        let open = i + self.tokens[i.min(self.tokens.len())..]
            .iter()
            .position(|t| t.kind == TokenKind::LBrace)?;
        let close = matching_close(self.tokens, open + 1);

        let qualified_name = match &self.scope.namespace {
            Some(ns) if !ns.is_empty() => format!("{}\\{}", ns, name),
            _ => name.clone(),
        };

        let body = &self.tokens[open + 1..close.min(self.tokens.len())];
        let (cases, methods) = {
            let ctx = EvalContext {
                scope: &self.scope,
                current_class: Some(&qualified_name),
                cases: &NoCases,
            };
            parse_enum_body(body, &ctx)
        };

        self.enums.push(EnumDeclaration {
            name,
            qualified_name,
            namespace: self.scope.namespace.clone(),
            backing,
            attributes: std::mem::take(&mut self.pending_attributes),
            doc: self.pending_doc.take(),
            cases,
            methods,
            scope: self.scope.clone(),
            source_file: PathBuf::new(),
        });

        Some((close + 1).min(self.tokens.len()))
    }
}

fn parse_enum_body(body: &[Token], ctx: &EvalContext<'_>) -> (Vec<CaseDecl>, Vec<MethodDecl>) {
    let mut cases = Vec::new();
    let mut methods = Vec::new();
    let mut pending_doc: Option<String> = None;
    let mut is_public = true;
    let mut is_static = false;
    let mut i = 0;

    while i < body.len() {
        let token = &body[i];
        match &token.kind {
            TokenKind::DocComment(raw) => {
                pending_doc = clean_doc_comment(raw);
                i += 1;
                continue;
            }
            TokenKind::AttrOpen => {
                i = (matching_close(body, i + 1) + 1).min(body.len());
                continue;
            }
            TokenKind::Ident(word) => match word.to_ascii_lowercase().as_str() {
                "case" => {
                    let end = statement_end(body, i + 1);
                    cases.push(parse_case(&body[i + 1..end], pending_doc.take(), ctx));
                    i = end + 1;
                    is_public = true;
                    is_static = false;
                    continue;
                }
                "const" | "use" => {
                    i = statement_end(body, i + 1) + 1;
                    pending_doc = None;
                    is_public = true;
                    is_static = false;
                    continue;
                }
                "public" => is_public = true,
                "private" | "protected" => is_public = false,
                "static" => is_static = true,
                "final" | "abstract" => {}
                "function" => {
                    let (method, next) = parse_method(body, i + 1, is_public, is_static, token.line);
                    if let Some(method) = method {
                        methods.push(method);
                    }
                    i = next;
                    is_public = true;
                    is_static = false;
                    pending_doc = None;
                    continue;
                }
                _ => pending_doc = None,
            },
            _ => pending_doc = None,
        }
        i += 1;
    }

    (cases, methods)
}

/// Index of the `;` ending a statement that starts at `from`, skipping nested brackets.
fn statement_end(tokens: &[Token], from: usize) -> usize {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(from) {
        match token.kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => depth = depth.saturating_sub(1),
            TokenKind::Semicolon if depth == 0 => return i,
            _ => {}
        }
    }
    tokens.len()
}

fn parse_case(tokens: &[Token], doc: Option<String>, ctx: &EvalContext<'_>) -> CaseDecl {
    let name = tokens
        .first()
        .and_then(Token::ident)
        .unwrap_or_default()
        .to_string();

    let value = match tokens.get(1) {
        Some(t) if t.kind == TokenKind::Assign => {
            let expr = &tokens[2..];
            let mut evaluator = Evaluator::new(expr, ctx);
            Some(evaluator.expression().and_then(|v| match evaluator.peek() {
                None => Ok(v),
                Some(extra) => Err(EvalError::Unsupported {
                    token: extra.describe(),
                    line: extra.line,
                }),
            }))
        }
        _ => None,
    };

    CaseDecl { name, value, doc }
}

/// Parse a method starting at its name (or `&`). Returns the method and the
/// index just past its body.
fn parse_method(
    body: &[Token],
    mut i: usize,
    is_public: bool,
    is_static: bool,
    line: usize,
) -> (Option<MethodDecl>, usize) {
    if body.get(i).map(|t| &t.kind) == Some(&TokenKind::Symbol('&')) {
        i += 1;
    }
    let Some(name) = body.get(i).and_then(Token::ident).map(str::to_string) else {
        return (None, i + 1);
    };
    i += 1;

    if body.get(i).map(|t| &t.kind) != Some(&TokenKind::LParen) {
        return (None, i);
    }
    let params_close = matching_close(body, i + 1);
    let params = split_top_level(&body[i + 1..params_close.min(body.len())]).len();
    i = params_close + 1;

    // Return type tokens are skipped up to the body or `;`.
    if body.get(i).map(|t| &t.kind) == Some(&TokenKind::Colon) {
        i = body[i + 1..]
            .iter()
            .position(|t| matches!(t.kind, TokenKind::LBrace | TokenKind::Semicolon))
            .map(|p| i + 1 + p)
            .unwrap_or(body.len());
    }

    match body.get(i).map(|t| &t.kind) {
        Some(TokenKind::LBrace) => {
            let close = matching_close(body, i + 1);
            let method_body = body[i + 1..close.min(body.len())].to_vec();
            (
                Some(MethodDecl {
                    name,
                    is_public,
                    is_static,
                    params,
                    body: Some(method_body),
                    line,
                }),
                (close + 1).min(body.len()),
            )
        }
        _ => (
            Some(MethodDecl {
                name,
                is_public,
                is_static,
                params,
                body: None,
                line,
            }),
            (i + 1).min(body.len()),
        ),
    }
}
