mod enum_gen;
mod import_resolver;
mod locale_gen;
mod translator_gen;

pub use enum_gen::EnumGenerator;
pub use import_resolver::ImportResolver;
pub use locale_gen::LocaleGenerator;
pub use translator_gen::{Runtime, TranslatorGenerator};

use crate::config::OutputFormat;

pub(crate) const INDENT: &str = "  ";

/// Options shared by every formatter.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    pub format: OutputFormat,
    pub trailing_comma: bool,
}

impl FormatOptions {
    pub fn is_ts(&self) -> bool {
        self.format == OutputFormat::Ts
    }

    /// Separator after entry `index` of `len` entries.
    pub(crate) fn separator(&self, index: usize, len: usize) -> &'static str {
        if index + 1 < len || self.trailing_comma {
            ","
        } else {
            ""
        }
    }
}

/// Quote a string with as little escaping as possible.
///
/// Single quotes are preferred. A value containing an apostrophe but no
/// double quote is wrapped in double quotes instead. A value containing a
/// double quote stays single-quoted with only its apostrophes escaped.
pub fn quote(value: &str) -> String {
    let has_apostrophe = value.contains('\'');
    let has_double_quote = value.contains('"');

    let escaped = value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029");

    if has_apostrophe && !has_double_quote {
        format!("\"{}\"", escaped)
    } else if has_double_quote {
        format!("'{}'", escaped.replace('\'', "\\'"))
    } else {
        format!("'{}'", escaped)
    }
}

/// Object key as written in a literal: bare when it is a valid identifier.
pub fn object_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Render a float the way JS prints it for integral values (`2` not `2.0`).
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else if value.is_finite() {
        value.to_string()
    } else {
        "null".to_string()
    }
}

/// Render a `/** */` doc comment at the given indentation.
pub(crate) fn doc_comment(doc: &str, indent: &str) -> Vec<String> {
    let lines: Vec<&str> = doc.lines().collect();
    if lines.len() == 1 {
        return vec![format!("{}/** {} */", indent, lines[0].replace("*/", "*\\/"))];
    }
    let mut out = vec![format!("{}/**", indent)];
    for line in lines {
        let line = line.replace("*/", "*\\/");
        if line.is_empty() {
            out.push(format!("{} *", indent));
        } else {
            out.push(format!("{} * {}", indent, line));
        }
    }
    out.push(format!("{} */", indent));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_decision_table() {
        assert_eq!(quote("plain"), "'plain'");
        assert_eq!(quote("it's"), "\"it's\"");
        assert_eq!(quote("say \"hi\""), "'say \"hi\"'");
        assert_eq!(quote("it's \"x\""), "'it\\'s \"x\"'");
        assert_eq!(quote("a\\b"), "'a\\\\b'");
        assert_eq!(quote("it's a\\b"), "\"it's a\\\\b\"");
        assert_eq!(quote("two\nlines"), "'two\\nlines'");
    }

    #[test]
    fn test_object_key() {
        assert_eq!(object_key("ACTIVE"), "ACTIVE");
        assert_eq!(object_key("$ok_1"), "$ok_1");
        assert_eq!(object_key("1"), "'1'");
        assert_eq!(object_key("Log in"), "'Log in'");
        assert_eq!(object_key("messages.welcome"), "'messages.welcome'");
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(2.0), "2");
        assert_eq!(format_float(-0.25), "-0.25");
        assert_eq!(format_float(f64::NAN), "null");
    }

    #[test]
    fn test_doc_comment() {
        assert_eq!(doc_comment("One line", "  "), vec!["  /** One line */"]);
        assert_eq!(
            doc_comment("First\nSecond", ""),
            vec!["/**", " * First", " * Second", " */"]
        );
    }
}
