use super::{is_pluralized, split_segments, substitute_parameters, SyntaxAdapter};
use crate::tree::Tree;

/// `{name}` interpolation, plural forms joined with ` | `.
pub struct VueI18nAdapter;

impl SyntaxAdapter for VueI18nAdapter {
    fn library(&self) -> &'static str {
        "vue-i18n"
    }

    fn rewrite(&self, key: &str, value: &str) -> Vec<(String, Tree)> {
        vec![(key.to_string(), Tree::Str(join_plural(value, " | ")))]
    }
}

/// Strip count markers and substitute parameters per segment, then rejoin.
pub(crate) fn join_plural(value: &str, separator: &str) -> String {
    if !is_pluralized(value) {
        return substitute_parameters(value, "{", "}");
    }
    split_segments(value)
        .iter()
        .map(|s| substitute_parameters(&s.text, "{", "}"))
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeMap;

    #[test]
    fn test_vue_plural_and_parameters() {
        let input: TreeMap = vec![
            ("apples".to_string(), Tree::Str("{0} none|{1} one|[2,*] :count apples".into())),
            ("hello".to_string(), Tree::Str("Hello :name".into())),
        ]
        .into_iter()
        .collect();

        let out = VueI18nAdapter.transform(input);
        assert_eq!(out.get("apples"), Some(&Tree::Str("none | one | {count} apples".into())));
        assert_eq!(out.get("hello"), Some(&Tree::Str("Hello {name}".into())));
    }
}
