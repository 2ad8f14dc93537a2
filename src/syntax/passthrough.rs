use super::vue::join_plural;
use super::SyntaxAdapter;
use crate::tree::{Tree, TreeMap};

/// `{name}` interpolation, plural forms joined with a bare `|`.
pub struct PassthroughAdapter;

impl SyntaxAdapter for PassthroughAdapter {
    fn library(&self) -> &'static str {
        "passthrough"
    }

    fn rewrite(&self, key: &str, value: &str) -> Vec<(String, Tree)> {
        vec![(key.to_string(), Tree::Str(join_plural(value, "|")))]
    }
}

/// Leaves the tree exactly as loaded.
pub struct SourceAdapter;

impl SyntaxAdapter for SourceAdapter {
    fn library(&self) -> &'static str {
        "source"
    }

    fn rewrite(&self, key: &str, value: &str) -> Vec<(String, Tree)> {
        vec![(key.to_string(), Tree::Str(value.to_string()))]
    }

    fn transform(&self, tree: TreeMap) -> TreeMap {
        tree
    }
}
