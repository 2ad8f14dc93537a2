use super::{OutputTarget, TransformedTranslation};
use crate::error::{Error, Result};
use crate::php::eval::eval_returned_array;
use crate::php::lexer::tokenize;
use crate::php::{parse_tokens, short_name, CaseLookup, EvalContext};
use crate::syntax::SyntaxAdapter;
use crate::tree::{Tree, TreeMap};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Locale group whose contents are lifted to the root of the tree
const HOISTED_GROUP: &str = "enums";

pub struct TranslationTransformer<'a> {
    /// Locale roots in precedence order; later roots win
    roots: &'a [PathBuf],
    adapter: &'a dyn SyntaxAdapter,
    cases: &'a dyn CaseLookup,
    target: &'a OutputTarget,
}

impl<'a> TranslationTransformer<'a> {
    pub fn new(
        roots: &'a [PathBuf],
        adapter: &'a dyn SyntaxAdapter,
        cases: &'a dyn CaseLookup,
        target: &'a OutputTarget,
    ) -> Self {
        Self {
            roots,
            adapter,
            cases,
            target,
        }
    }

    pub fn transform(&self, locale: &str, flat: bool) -> Result<TransformedTranslation> {
        let mut merged = TreeMap::new();
        let mut found = false;

        for root in self.roots {
            if let Some(tree) = self.load_root(root, locale)? {
                found = true;
                merged.extend_top_level(tree);
            }
        }

        if !found {
            return Err(Error::LocaleNotFound {
                locale: locale.to_string(),
                roots: self.roots.to_vec(),
            });
        }

        let normalized = normalize_keys(merged);
        let adapted = self.adapter.transform(normalized);
        let data = if flat {
            Tree::Map(adapted).flatten()
        } else {
            adapted
        };

        debug!("Transformed locale {} ({} top-level keys)", locale, data.len());

        Ok(TransformedTranslation {
            locale: locale.to_string(),
            data,
            is_flat: flat,
            output_path: self.target.path_for(locale),
        })
    }

    /// Everything one root defines for `locale`, or None when the root has
    /// neither a `<locale>/` directory nor a `<locale>.json` file.
    fn load_root(&self, root: &Path, locale: &str) -> Result<Option<TreeMap>> {
        let json_file = root.join(format!("{}.json", locale));
        let dir = root.join(locale);
        if !json_file.is_file() && !dir.is_dir() {
            return Ok(None);
        }

        let mut tree = TreeMap::new();
        if json_file.is_file() {
            tree.extend_top_level(load_json(&json_file)?);
        }

        if dir.is_dir() {
            for file in group_files(&dir)? {
                let Some(group) = file.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                    continue;
                };
                let data = match file.extension().and_then(|e| e.to_str()) {
                    Some("json") => load_json(&file)?,
                    _ => self.load_php(&file)?,
                };

                if group == HOISTED_GROUP {
                    tree.extend_top_level(data);
                } else {
                    tree.insert(group, Tree::Map(data));
                }
            }
        }

        Ok(Some(tree))
    }

    fn load_php(&self, path: &Path) -> Result<TreeMap> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let tokens = tokenize(&source);
        let scope = parse_tokens(&tokens).scope;
        let ctx = EvalContext {
            scope: &scope,
            current_class: None,
            cases: self.cases,
        };

        let value = eval_returned_array(&tokens, &ctx).map_err(|e| Error::LocaleFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        match Tree::from_php(&value) {
            Tree::Map(map) => Ok(map),
            Tree::List(items) => Ok(items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect()),
            _ => Err(Error::LocaleFile {
                path: path.to_path_buf(),
                message: format!("expected an array, found {}", value.kind_name()),
            }),
        }
    }
}

/// PHP and JSON files of one locale directory, sorted by name.
fn group_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| matches!(p.extension().and_then(|e| e.to_str()), Some("php") | Some("json")))
        .collect();
    files.sort();
    Ok(files)
}

fn load_json(path: &Path) -> Result<TreeMap> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let tree: Tree = serde_json::from_str(&content).map_err(|e| Error::LocaleFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    tree.into_map().ok_or_else(|| Error::LocaleFile {
        path: path.to_path_buf(),
        message: "expected a JSON object".to_string(),
    })
}

/// Replace `\`-qualified keys by their last segment, at every depth.
fn normalize_keys(map: TreeMap) -> TreeMap {
    map.into_iter()
        .map(|(k, v)| {
            let key = if k.contains('\\') {
                short_name(&k).to_string()
            } else {
                k
            };
            (key, normalize_value(v))
        })
        .collect()
}

fn normalize_value(value: Tree) -> Tree {
    match value {
        Tree::Map(map) => Tree::Map(normalize_keys(map)),
        Tree::List(items) => Tree::List(items.into_iter().map(normalize_value).collect()),
        leaf => leaf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::php::NoCases;
    use crate::syntax::{I18nextAdapter, SourceAdapter};
    use std::fs;
    use tempfile::TempDir;

    fn target() -> OutputTarget {
        OutputTarget {
            dir: PathBuf::from("locales"),
            file_name: "{locale}.{ext}".into(),
            format: OutputFormat::Ts,
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn transform(roots: &[PathBuf], adapter: &dyn SyntaxAdapter, locale: &str, flat: bool) -> Result<TransformedTranslation> {
        let target = target();
        TranslationTransformer::new(roots, adapter, &NoCases, &target).transform(locale, flat)
    }

    #[test]
    fn test_groups_hoisting_and_normalisation() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "en/messages.php",
            "<?php return ['welcome' => 'Hi :name', 'nested' => ['App\\\\Enums\\\\Status' => 'x']];",
        );
        write(
            dir.path(),
            "en/enums.php",
            r#"<?php
use App\Enums\Status;

return [
    Status::class => ['active' => 'Active'],
    'Color' => ['red' => 'Red'],
];"#,
        );

        let result = transform(&[dir.path().to_path_buf()], &SourceAdapter, "en", false).unwrap();
        let keys: Vec<_> = result.data.keys().collect();
        assert_eq!(keys, vec!["Status", "Color", "messages"]);
        assert!(!result.data.contains_key("enums"));

        let nested = result.data.get("messages").and_then(Tree::as_map).unwrap();
        let nested = nested.get("nested").and_then(Tree::as_map).unwrap();
        assert_eq!(nested.get("Status"), Some(&Tree::Str("x".into())));
        assert_eq!(result.output_path, PathBuf::from("locales/en.ts"));
    }

    #[test]
    fn test_last_root_wins() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        write(a.path(), "en/messages.php", "<?php return ['welcome' => 'A', 'only_a' => 'x'];");
        write(b.path(), "en/messages.php", "<?php return ['welcome' => 'B'];");

        let roots = vec![a.path().to_path_buf(), b.path().to_path_buf()];
        let result = transform(&roots, &SourceAdapter, "en", true).unwrap();
        assert_eq!(result.data.get("messages.welcome"), Some(&Tree::Str("B".into())));
        // Top-level replacement: the whole group comes from the later root
        assert!(!result.data.contains_key("messages.only_a"));
        assert!(result.is_flat);
    }

    #[test]
    fn test_json_files_and_adapter() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "en.json", r#"{"Log in": "Log in"}"#);
        write(dir.path(), "en/cart.json", r#"{"items": "{1} :count item|[2,*] :count items"}"#);

        let result = transform(&[dir.path().to_path_buf()], &I18nextAdapter, "en", true).unwrap();
        let keys: Vec<_> = result.data.keys().collect();
        assert_eq!(keys, vec!["Log in", "cart.items_one", "cart.items_other"]);
        assert_eq!(
            result.data.get("cart.items_other"),
            Some(&Tree::Str("{{count}} items".into()))
        );
    }

    #[test]
    fn test_missing_locale_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "en/messages.php", "<?php return [];");
        let err = transform(&[dir.path().to_path_buf()], &SourceAdapter, "fr", false).unwrap_err();
        assert!(matches!(err, Error::LocaleNotFound { ref locale, .. } if locale == "fr"));
    }

    #[test]
    fn test_json_only_locale_is_found() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "en/messages.php", "<?php return ['hi' => 'Hi'];");
        write(dir.path(), "de.json", r#"{"Log in": "Anmelden"}"#);

        let result = transform(&[dir.path().to_path_buf()], &SourceAdapter, "de", false).unwrap();
        let keys: Vec<_> = result.data.keys().collect();
        assert_eq!(keys, vec!["Log in"]);
        assert_eq!(result.data.get("Log in"), Some(&Tree::Str("Anmelden".into())));

        let err = transform(&[dir.path().to_path_buf()], &SourceAdapter, "fr", false).unwrap_err();
        assert!(matches!(err, Error::LocaleNotFound { .. }));
    }

    #[test]
    fn test_unparsable_locale_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "en/bad.php", "<?php return trans('x');");
        let err = transform(&[dir.path().to_path_buf()], &SourceAdapter, "en", false).unwrap_err();
        assert!(matches!(err, Error::LocaleFile { .. }));
    }
}
