use super::{format_float, object_key, quote, FormatOptions, INDENT};
use crate::config::OutputFormat;
use crate::error::Result;
use crate::transform::TransformedTranslation;
use crate::tree::{Tree, TreeMap};

/// Locale module generator
pub struct LocaleGenerator {
    options: FormatOptions,
}

impl LocaleGenerator {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    pub fn generate(&self, record: &TransformedTranslation) -> Result<String> {
        if self.options.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(&record.data)?);
        }

        let ident = locale_identifier(&record.locale);
        let mut lines = Vec::new();
        let body = self.render_map(&record.data, 0);

        if self.options.is_ts() {
            lines.push(format!("export const {} = {} as const;", ident, body));
            lines.push(String::new());
            lines.push(format!("export type {} = typeof {};", ident, ident));
        } else {
            lines.push(format!("export const {} = {};", ident, body));
        }

        Ok(lines.join("\n"))
    }

    fn render_map(&self, map: &TreeMap, depth: usize) -> String {
        if map.is_empty() {
            return "{}".to_string();
        }
        let inner = INDENT.repeat(depth + 1);
        let mut out = String::from("{\n");
        let len = map.len();
        for (i, (key, value)) in map.iter().enumerate() {
            out.push_str(&format!(
                "{}{}: {}{}\n",
                inner,
                object_key(key),
                self.render_value(value, depth + 1),
                self.options.separator(i, len)
            ));
        }
        out.push_str(&INDENT.repeat(depth));
        out.push('}');
        out
    }

    fn render_list(&self, items: &[Tree], depth: usize) -> String {
        if items.is_empty() {
            return "[]".to_string();
        }
        let inner = INDENT.repeat(depth + 1);
        let mut out = String::from("[\n");
        for (i, item) in items.iter().enumerate() {
            out.push_str(&format!(
                "{}{}{}\n",
                inner,
                self.render_value(item, depth + 1),
                self.options.separator(i, items.len())
            ));
        }
        out.push_str(&INDENT.repeat(depth));
        out.push(']');
        out
    }

    fn render_value(&self, value: &Tree, depth: usize) -> String {
        match value {
            Tree::Null => "null".to_string(),
            Tree::Bool(b) => b.to_string(),
            Tree::Int(n) => n.to_string(),
            Tree::Float(f) => format_float(*f),
            Tree::Str(s) => quote(s),
            Tree::List(items) => self.render_list(items, depth),
            Tree::Map(map) => self.render_map(map, depth),
        }
    }
}

/// Export name for a locale; characters invalid in identifiers become `_`.
pub fn locale_identifier(locale: &str) -> String {
    let mut ident: String = locale
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}
