use std::path::Path;

/// Computes the module specifier a generated file uses to import another.
#[derive(Debug, Default)]
pub struct ImportResolver {
    /// Alias prefix for enum modules (e.g. `@/enums`)
    enum_import_base: Option<String>,
}

impl ImportResolver {
    pub fn new(enum_import_base: Option<String>) -> Self {
        Self { enum_import_base }
    }

    /// Resolve the import path from generated file `from` to module `to`.
    /// Uses the configured base when present, else a relative path.
    pub fn resolve(&self, from: &Path, to: &Path) -> String {
        match &self.enum_import_base {
            Some(base) => {
                let stem = to
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                format!("{}/{}", base.trim_end_matches('/'), stem)
            }
            None => self.calculate_relative_path(from, to),
        }
    }

    fn calculate_relative_path(&self, from: &Path, to: &Path) -> String {
        // Get the directory containing the 'from' file
        let from_dir = from.parent().unwrap_or(Path::new("."));
        let to = to.with_extension("");

        pathdiff::diff_paths(&to, from_dir)
            .map(|p| {
                // Normalize to forward slashes for module specifiers
                let s = p.to_string_lossy().replace('\\', "/");
                // Ensure it starts with ./ or ../
                if s.starts_with('.') {
                    s
                } else {
                    format!("./{}", s)
                }
            })
            .unwrap_or_else(|| to.to_string_lossy().replace('\\', "/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path() {
        let resolver = ImportResolver::default();
        let from = Path::new("resources/js/translators/useStatusTranslator.ts");
        let to = Path::new("resources/js/enums/Status.ts");
        assert_eq!(resolver.resolve(from, to), "../enums/Status");
    }

    #[test]
    fn test_same_directory() {
        let resolver = ImportResolver::default();
        let from = Path::new("out/useStatusTranslator.js");
        let to = Path::new("out/Status.js");
        assert_eq!(resolver.resolve(from, to), "./Status");
    }

    #[test]
    fn test_import_base() {
        let resolver = ImportResolver::new(Some("@/enums".to_string()));
        let from = Path::new("anywhere/useStatusTranslator.ts");
        let to = Path::new("resources/js/enums/Status.ts");
        assert_eq!(resolver.resolve(from, to), "@/enums/Status");
    }
}
