//! Adapters from the backend's translation string syntax to frontend i18n
//! libraries.
//!
//! Source strings use `:name` parameters and pipe-separated plural forms,
//! optionally prefixed by count markers such as `{0}`, `{1}` or `[2,*]`.

mod i18next;
mod passthrough;
mod vue;

pub use i18next::I18nextAdapter;
pub use passthrough::{PassthroughAdapter, SourceAdapter};
pub use vue::VueI18nAdapter;

use crate::error::{Error, Result};
use crate::tree::{Tree, TreeMap};
use regex::Regex;
use std::sync::OnceLock;

pub trait SyntaxAdapter: Send + Sync {
    /// Name of the target library, as used in configuration
    fn library(&self) -> &'static str;

    /// Rewrite one string leaf stored under `key` into the entries that
    /// replace it. Most adapters return exactly one entry.
    fn rewrite(&self, key: &str, value: &str) -> Vec<(String, Tree)>;

    /// Rewrite a string that has no key of its own, such as a list element.
    /// Used when [`SyntaxAdapter::rewrite`] would expand it into siblings.
    fn rewrite_inline(&self, value: &str) -> String {
        value.to_string()
    }

    fn transform(&self, tree: TreeMap) -> TreeMap {
        let mut out = TreeMap::new();
        for (key, value) in tree {
            match value {
                Tree::Str(s) => {
                    for (k, v) in self.rewrite(&key, &s) {
                        // An existing key keeps the first value written
                        if !out.contains_key(&k) {
                            out.insert(k, v);
                        }
                    }
                }
                other => {
                    out.insert(key, self.transform_value(other));
                }
            }
        }
        out
    }

    /// Rewrite a value that is not a direct map entry (list elements, nested maps).
    fn transform_value(&self, value: Tree) -> Tree {
        match value {
            Tree::Map(map) => Tree::Map(self.transform(map)),
            Tree::List(items) => Tree::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        Tree::Str(s) => {
                            let mut rewritten = self.rewrite("", &s);
                            if rewritten.len() == 1 {
                                rewritten.remove(0).1
                            } else {
                                Tree::Str(self.rewrite_inline(&s))
                            }
                        }
                        other => self.transform_value(other),
                    })
                    .collect(),
            ),
            leaf => leaf,
        }
    }
}

/// Build the adapter for a configured library name.
pub fn adapter_for(library: &str) -> Result<Box<dyn SyntaxAdapter>> {
    match library.trim().to_ascii_lowercase().as_str() {
        "i18next" | "react-i18next" => Ok(Box::new(I18nextAdapter)),
        "vue-i18n" | "vue" => Ok(Box::new(VueI18nAdapter)),
        "passthrough" => Ok(Box::new(PassthroughAdapter)),
        "source" | "none" => Ok(Box::new(SourceAdapter)),
        _ => Err(Error::UnsupportedLibrary(library.to_string())),
    }
}

/// Plural category a count marker selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PluralForm {
    Zero,
    One,
    Other,
}

impl PluralForm {
    pub(crate) fn suffix(self) -> &'static str {
        match self {
            PluralForm::Zero => "zero",
            PluralForm::One => "one",
            PluralForm::Other => "other",
        }
    }
}

/// One pipe-separated piece of a plural string.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Segment {
    pub marker: Option<PluralForm>,
    pub text: String,
}

fn parameter_regex() -> &'static Regex {
    static PARAM_RE: OnceLock<Regex> = OnceLock::new();
    PARAM_RE.get_or_init(|| Regex::new(r":([A-Za-z0-9_]+)").expect("parameter regex must compile"))
}

fn marker_regex() -> &'static Regex {
    static MARKER_RE: OnceLock<Regex> = OnceLock::new();
    MARKER_RE.get_or_init(|| {
        Regex::new(r"^\s*(?:\{(\d+)\}|\[(\d+)\s*,\s*(\d+|\*)\])\s*").expect("marker regex must compile")
    })
}

fn any_marker_regex() -> &'static Regex {
    static ANY_MARKER_RE: OnceLock<Regex> = OnceLock::new();
    ANY_MARKER_RE.get_or_init(|| {
        Regex::new(r"\{\d+\}|\[\d+\s*,\s*(?:\d+|\*)\]").expect("marker regex must compile")
    })
}

/// Replace `:name` parameters using `open` and `close` around the name.
pub(crate) fn substitute_parameters(value: &str, open: &str, close: &str) -> String {
    parameter_regex()
        .replace_all(value, |caps: &regex::Captures<'_>| format!("{}{}{}", open, &caps[1], close))
        .into_owned()
}

pub(crate) fn is_pluralized(value: &str) -> bool {
    value.contains('|') || any_marker_regex().is_match(value)
}

/// Split a plural string and strip each segment's leading count marker.
pub(crate) fn split_segments(value: &str) -> Vec<Segment> {
    value
        .split('|')
        .map(|raw| match marker_regex().captures(raw) {
            Some(caps) => {
                let marker = match (caps.get(1), caps.get(2), caps.get(3)) {
                    (Some(exact), _, _) => form_for_range(exact.as_str(), exact.as_str()),
                    (None, Some(from), Some(to)) => form_for_range(from.as_str(), to.as_str()),
                    _ => PluralForm::Other,
                };
                Segment {
                    marker: Some(marker),
                    text: raw[caps.get(0).map_or(0, |m| m.end())..].trim().to_string(),
                }
            }
            None => Segment {
                marker: None,
                text: raw.trim().to_string(),
            },
        })
        .collect()
}

fn form_for_range(from: &str, to: &str) -> PluralForm {
    match (from, to) {
        ("0", "0") => PluralForm::Zero,
        ("1", "1") => PluralForm::One,
        _ => PluralForm::Other,
    }
}
