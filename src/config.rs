use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub enums: EnumsConfig,
    pub translations: TranslationsConfig,
    pub translators: TranslatorsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Lines longer than this get a lint-suppression directive; <= 0 disables the check
    pub max_line_length: Option<i64>,
    pub trailing_comma: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_line_length: None,
            trailing_comma: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EnumsConfig {
    /// Directories (or glob patterns) scanned for enum declarations
    pub paths: Vec<String>,
    pub output_path: PathBuf,
    pub file_name: String,
    pub format: String,
    /// Include every backed enum, even without a generation marker
    pub generate_all_backed: bool,
    /// Short names or qualified names, matched case-insensitively
    pub exclude: Vec<String>,
}

impl Default for EnumsConfig {
    fn default() -> Self {
        Self {
            paths: vec!["app/Enums".to_string()],
            output_path: PathBuf::from("resources/js/enums"),
            file_name: "{name}.{ext}".to_string(),
            format: "ts".to_string(),
            generate_all_backed: false,
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TranslationsConfig {
    /// Locale roots; later roots override earlier ones at the top level
    pub paths: Vec<PathBuf>,
    pub output_path: PathBuf,
    pub file_name: String,
    pub format: String,
    pub library: String,
    pub flat: bool,
    pub locales: Vec<String>,
}

impl Default for TranslationsConfig {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from("lang")],
            output_path: PathBuf::from("resources/js/locales"),
            file_name: "{locale}.{ext}".to_string(),
            format: "ts".to_string(),
            library: "i18next".to_string(),
            flat: false,
            locales: vec!["en".to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TranslatorsConfig {
    pub output_path: PathBuf,
    pub file_name: String,
    pub format: String,
    pub runtime: String,
    /// Module exporting the generic `useTranslator` helper
    pub helper_import: String,
    /// Import prefix for enum modules; a relative import is computed when unset
    pub enum_import_base: Option<String>,
}

impl Default for TranslatorsConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("resources/js/translators"),
            file_name: "{name}.{ext}".to_string(),
            format: "ts".to_string(),
            runtime: "vue-i18n".to_string(),
            helper_import: "@/composables/useTranslator".to_string(),
            enum_import_base: None,
        }
    }
}

/// The three kinds of artifacts the generator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Enums,
    Translations,
    Translators,
}

impl ArtifactKind {
    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Enums => "enums",
            ArtifactKind::Translations => "translations",
            ArtifactKind::Translators => "translators",
        }
    }

    fn allowed_formats(self) -> &'static [OutputFormat] {
        match self {
            ArtifactKind::Translations => &[OutputFormat::Ts, OutputFormat::Js, OutputFormat::Json],
            _ => &[OutputFormat::Ts, OutputFormat::Js],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Ts,
    Js,
    Json,
}

impl OutputFormat {
    /// Parse a format name, rejecting formats the artifact kind cannot produce.
    pub fn parse_for(kind: ArtifactKind, value: &str) -> Result<Self> {
        let format = match value.trim().to_ascii_lowercase().as_str() {
            "ts" | "typescript" => Some(OutputFormat::Ts),
            "js" | "javascript" => Some(OutputFormat::Js),
            "json" => Some(OutputFormat::Json),
            _ => None,
        };

        match format {
            Some(f) if kind.allowed_formats().contains(&f) => Ok(f),
            _ => Err(Error::UnsupportedFormat {
                artifact: kind.label(),
                format: value.to_string(),
                expected: match kind {
                    ArtifactKind::Translations => "ts, js, json",
                    _ => "ts, js",
                },
            }),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Ts => "ts",
            OutputFormat::Js => "js",
            OutputFormat::Json => "json",
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check every format and library name up front so nothing is written
    /// for a run that is bound to fail.
    pub fn validate(&self) -> Result<()> {
        OutputFormat::parse_for(ArtifactKind::Enums, &self.enums.format)?;
        OutputFormat::parse_for(ArtifactKind::Translations, &self.translations.format)?;
        OutputFormat::parse_for(ArtifactKind::Translators, &self.translators.format)?;
        crate::syntax::adapter_for(&self.translations.library)?;
        crate::ts_generator::Runtime::parse(&self.translators.runtime)?;
        Ok(())
    }

    pub fn max_line_length(&self) -> Option<usize> {
        self.output
            .max_line_length
            .filter(|n| *n > 0)
            .map(|n| n as usize)
    }
}

/// Resolve `path` against `root` unless it is already absolute.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
