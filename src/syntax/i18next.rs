use super::{is_pluralized, split_segments, substitute_parameters, PluralForm, SyntaxAdapter};
use crate::tree::Tree;

/// `{{name}}` interpolation, plural forms as `_zero` / `_one` / `_other` sibling keys.
pub struct I18nextAdapter;

impl SyntaxAdapter for I18nextAdapter {
    fn library(&self) -> &'static str {
        "i18next"
    }

    fn rewrite(&self, key: &str, value: &str) -> Vec<(String, Tree)> {
        if !is_pluralized(value) {
            return vec![(key.to_string(), Tree::Str(substitute_parameters(value, "{{", "}}")))];
        }

        let mut forms: Vec<(PluralForm, String)> = Vec::new();
        for (i, segment) in split_segments(value).into_iter().enumerate() {
            let form = segment.marker.unwrap_or(if i == 0 {
                PluralForm::One
            } else {
                PluralForm::Other
            });
            if forms.iter().any(|(f, _)| *f == form) {
                continue;
            }
            forms.push((form, substitute_parameters(&segment.text, "{{", "}}")));
        }

        forms
            .into_iter()
            .map(|(form, text)| (format!("{}_{}", key, form.suffix()), Tree::Str(text)))
            .collect()
    }

    /// Plural strings keep their pipes; only parameters change.
    fn rewrite_inline(&self, value: &str) -> String {
        substitute_parameters(value, "{{", "}}")
    }
}
