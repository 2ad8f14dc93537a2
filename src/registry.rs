use crate::error::{Error, Result};
use crate::php::{parse_source, CaseLookup, EnumDeclaration, PhpValue};
use crate::scanner::DiscoveredEnum;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Attribute that opts an enum into generation
pub const GENERATE_MARKER: &str = "GenerateTs";
/// Attribute carrying translator metadata
pub const TRANSLATOR_MARKER: &str = "GenerateTranslator";

/// Which discovered enums take part in a full run
#[derive(Debug, Clone, Default)]
pub struct InclusionPolicy {
    /// Include backed enums that carry no generation marker
    pub generate_all_backed: bool,
    /// Short or qualified names, compared case-insensitively
    pub exclude: Vec<String>,
}

impl InclusionPolicy {
    pub fn is_excluded(&self, decl: &EnumDeclaration) -> bool {
        self.exclude.iter().any(|e| {
            let e = e.trim_start_matches('\\');
            e.eq_ignore_ascii_case(&decl.name) || e.eq_ignore_ascii_case(&decl.qualified_name)
        })
    }

    pub fn includes(&self, decl: &EnumDeclaration) -> bool {
        let marked = decl.attribute(GENERATE_MARKER).is_some();
        let selected = marked || (self.generate_all_backed && decl.backing.is_some());
        selected && !self.is_excluded(decl)
    }
}

/// Every enum declaration found under the configured paths, in discovery order.
#[derive(Debug, Default)]
pub struct EnumRegistry {
    enums: Vec<EnumDeclaration>,
    /// Lowercased qualified name to index in `enums`
    by_qualified: HashMap<String, usize>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve each discovered name against the declarations parsed from its file.
    pub fn from_discovered(discovered: &[DiscoveredEnum]) -> Self {
        let mut registry = Self::new();
        let mut parsed: HashMap<PathBuf, Vec<EnumDeclaration>> = HashMap::new();

        for found in discovered {
            if !parsed.contains_key(&found.path) {
                let declarations = match std::fs::read_to_string(&found.path) {
                    Ok(source) => parse_source(&source).enums,
                    Err(e) => {
                        warn!("Skipping unreadable file {}: {}", found.path.display(), e);
                        Vec::new()
                    }
                };
                parsed.insert(found.path.clone(), declarations);
            }

            let declaration = parsed.get(&found.path).and_then(|decls| {
                decls
                    .iter()
                    .find(|d| d.qualified_name.eq_ignore_ascii_case(&found.qualified_name))
            });
            match declaration {
                Some(decl) => {
                    let mut decl = decl.clone();
                    decl.source_file = found.path.clone();
                    registry.register(decl);
                }
                None => warn!(
                    "Could not read the declaration of {} in {}",
                    found.qualified_name,
                    found.path.display()
                ),
            }
        }

        registry
    }

    /// Add a declaration; a qualified name already present is ignored.
    pub fn register(&mut self, decl: EnumDeclaration) {
        let key = decl.qualified_name.to_ascii_lowercase();
        if self.by_qualified.contains_key(&key) {
            debug!("Ignoring duplicate declaration of {}", decl.qualified_name);
            return;
        }
        self.by_qualified.insert(key, self.enums.len());
        self.enums.push(decl);
    }

    pub fn all(&self) -> &[EnumDeclaration] {
        &self.enums
    }

    pub fn len(&self) -> usize {
        self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }

    pub fn get(&self, qualified_name: &str) -> Option<&EnumDeclaration> {
        let key = qualified_name.trim_start_matches('\\').to_ascii_lowercase();
        self.by_qualified.get(&key).map(|&i| &self.enums[i])
    }

    /// Look up by qualified name, falling back to the first enum with that short name.
    pub fn find(&self, name: &str) -> Option<&EnumDeclaration> {
        self.get(name).or_else(|| {
            self.enums
                .iter()
                .find(|d| d.name.eq_ignore_ascii_case(name))
        })
    }

    /// Enums taking part in a full run.
    pub fn included(&self, policy: &InclusionPolicy) -> Vec<&EnumDeclaration> {
        self.enums.iter().filter(|d| policy.includes(d)).collect()
    }

    /// Enums named explicitly by the caller, in the order given.
    pub fn select(&self, names: &[String]) -> Result<Vec<&EnumDeclaration>> {
        let mut selected: Vec<&EnumDeclaration> = Vec::new();
        for name in names {
            let decl = self
                .find(name)
                .ok_or_else(|| Error::UnknownEnum(name.clone()))?;
            if !selected
                .iter()
                .any(|d| d.qualified_name == decl.qualified_name)
            {
                selected.push(decl);
            }
        }
        Ok(selected)
    }
}

impl CaseLookup for EnumRegistry {
    fn case_value(&self, class: &str, case: &str) -> Option<PhpValue> {
        self.get(class)?.case(case)?.value.clone()?.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(src: &str) -> EnumRegistry {
        let mut registry = EnumRegistry::new();
        for decl in parse_source(src).enums {
            registry.register(decl);
        }
        registry
    }

    const SOURCE: &str = r#"<?php
namespace App\Enums;

#[GenerateTs]
enum Status: string { case ACTIVE = 'active'; }

enum Priority: int { case LOW = 1; }

enum Pure { case A; }

#[\App\Attributes\GenerateTs]
enum Legacy: string { case OLD = 'old'; }
"#;

    #[test]
    fn test_marker_policy() {
        let registry = registry(SOURCE);
        let policy = InclusionPolicy::default();
        let names: Vec<_> = registry.included(&policy).iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["Status", "Legacy"]);
    }

    #[test]
    fn test_generate_all_backed_and_exclude() {
        let registry = registry(SOURCE);
        let policy = InclusionPolicy {
            generate_all_backed: true,
            exclude: vec!["legacy".into(), "\\App\\Enums\\Status".into()],
        };
        let names: Vec<_> = registry.included(&policy).iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["Priority"]);
    }

    #[test]
    fn test_select_by_short_or_qualified_name() {
        let registry = registry(SOURCE);
        let selected = registry
            .select(&["App\\Enums\\Priority".into(), "status".into(), "Priority".into()])
            .unwrap();
        let names: Vec<_> = selected.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Priority", "Status"]);

        assert!(matches!(
            registry.select(&["Missing".into()]),
            Err(Error::UnknownEnum(name)) if name == "Missing"
        ));
    }

    #[test]
    fn test_case_lookup() {
        let registry = registry(SOURCE);
        assert_eq!(
            registry.case_value("App\\Enums\\Priority", "LOW"),
            Some(PhpValue::Int(1))
        );
        assert_eq!(registry.case_value("App\\Enums\\Pure", "A"), None);
        assert_eq!(registry.case_value("App\\Enums\\Nope", "A"), None);
    }
}
