//! Drives discovery, transformation, formatting and wrapping for each
//! artifact kind. Nothing is written here; callers hand the returned files
//! to the writer once every item has been produced.

use crate::checker::{self, DriftReport};
use crate::config::{resolve_path, ArtifactKind, Config, OutputFormat};
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::php::EnumDeclaration;
use crate::registry::{EnumRegistry, InclusionPolicy, TRANSLATOR_MARKER};
use crate::scanner;
use crate::syntax::{adapter_for, SyntaxAdapter};
use crate::transform::{
    EnumTransformer, GeneratedFile, OutputTarget, TransformedEnum, TranslationTransformer,
    TranslatorTransformer,
};
use crate::ts_generator::{
    EnumGenerator, FormatOptions, ImportResolver, LocaleGenerator, Runtime, TranslatorGenerator,
};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Enum generation request. Empty `names` means every enum the inclusion
/// policy selects.
#[derive(Debug, Clone, Default)]
pub struct EnumRequest {
    pub names: Vec<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TranslationRequest {
    /// Falls back to the configured locales when empty
    pub locales: Vec<String>,
    pub format: Option<String>,
    pub flat: Option<bool>,
    pub library: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TranslatorRequest {
    pub names: Vec<String>,
    pub format: Option<String>,
    pub runtime: Option<String>,
}

pub struct Generator {
    config: Config,
    /// Directory relative config paths resolve against
    root: PathBuf,
    registry: EnumRegistry,
    custom_adapter: Option<Box<dyn SyntaxAdapter>>,
}

impl Generator {
    /// Validate the configuration and discover every enum under the
    /// configured paths.
    pub fn new(config: Config, root: impl Into<PathBuf>) -> Result<Self> {
        config.validate()?;
        let root = root.into();
        let files = scanner::resolve_sources(&root, &config.enums.paths)?;
        let discovered = scanner::discover_enums(&files);
        let registry = EnumRegistry::from_discovered(&discovered);
        info!(
            "Discovered {} enums in {} source files",
            registry.len(),
            files.len()
        );
        Ok(Self::with_registry(config, root, registry))
    }

    /// Use an already populated registry instead of scanning.
    pub fn with_registry(config: Config, root: impl Into<PathBuf>, registry: EnumRegistry) -> Self {
        Self {
            config,
            root: root.into(),
            registry,
            custom_adapter: None,
        }
    }

    /// Replace the configured syntax adapter. An explicit library in a
    /// request still takes precedence.
    pub fn with_adapter(mut self, adapter: Box<dyn SyntaxAdapter>) -> Self {
        self.custom_adapter = Some(adapter);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &EnumRegistry {
        &self.registry
    }

    fn policy(&self) -> InclusionPolicy {
        InclusionPolicy {
            generate_all_backed: self.config.enums.generate_all_backed,
            exclude: self.config.enums.exclude.clone(),
        }
    }

    fn format_options(&self, format: OutputFormat) -> FormatOptions {
        FormatOptions {
            format,
            trailing_comma: self.config.output.trailing_comma,
        }
    }

    fn envelope(&self, format: OutputFormat) -> Envelope {
        Envelope::new(format, self.config.max_line_length())
    }

    fn target(&self, dir: &Path, file_name: &str, format: OutputFormat) -> OutputTarget {
        OutputTarget {
            dir: resolve_path(&self.root, dir),
            file_name: file_name.to_string(),
            format,
        }
    }

    fn enum_target(&self, format: Option<&str>) -> Result<OutputTarget> {
        let cfg = &self.config.enums;
        let format = OutputFormat::parse_for(ArtifactKind::Enums, format.unwrap_or(&cfg.format))?;
        Ok(self.target(&cfg.output_path, &cfg.file_name, format))
    }

    /// Explicit names select from every discovered enum, marked or not.
    pub fn select_enums(&self, names: &[String]) -> Result<Vec<&EnumDeclaration>> {
        if names.is_empty() {
            Ok(self.registry.included(&self.policy()))
        } else {
            self.registry.select(names)
        }
    }

    /// Transform the requested enums into records without formatting them.
    pub fn enum_records(&self, request: &EnumRequest) -> Result<Vec<TransformedEnum>> {
        let target = self.enum_target(request.format.as_deref())?;
        let decls = self.select_enums(&request.names)?;
        self.transform_enums(&decls, &target)
    }

    fn transform_enums(
        &self,
        decls: &[&EnumDeclaration],
        target: &OutputTarget,
    ) -> Result<Vec<TransformedEnum>> {
        let transformer = EnumTransformer::new(&self.registry, target);
        let records = decls
            .par_iter()
            .map(|decl| transformer.transform(decl))
            .collect::<Result<Vec<_>>>()?;
        ensure_disjoint(records.iter().map(|r| (&r.output_path, r.qualified_name.as_str())))?;
        Ok(records)
    }

    pub fn generate_enums(&self, request: &EnumRequest) -> Result<Vec<GeneratedFile>> {
        let target = self.enum_target(request.format.as_deref())?;
        let decls = self.select_enums(&request.names)?;
        let records = self.transform_enums(&decls, &target)?;

        let generator = EnumGenerator::new(self.format_options(target.format));
        let envelope = self.envelope(target.format);
        let files = records
            .par_iter()
            .map(|record| GeneratedFile {
                path: record.output_path.clone(),
                contents: envelope.wrap(&generator.generate(record)),
            })
            .collect();
        Ok(files)
    }

    /// Compare fresh enum records against the files already on disk.
    pub fn check_enums(&self, request: &EnumRequest) -> Result<DriftReport> {
        let records = self.enum_records(request)?;
        debug!("Checking {} enums for drift", records.len());
        Ok(checker::check(&records))
    }

    pub fn generate_translations(&self, request: &TranslationRequest) -> Result<Vec<GeneratedFile>> {
        let cfg = &self.config.translations;
        let format = OutputFormat::parse_for(
            ArtifactKind::Translations,
            request.format.as_deref().unwrap_or(&cfg.format),
        )?;

        let configured;
        let adapter: &dyn SyntaxAdapter = match (&request.library, &self.custom_adapter) {
            (Some(library), _) => {
                configured = adapter_for(library)?;
                configured.as_ref()
            }
            (None, Some(custom)) => custom.as_ref(),
            (None, None) => {
                configured = adapter_for(&cfg.library)?;
                configured.as_ref()
            }
        };
        debug!("Using {} syntax adapter", adapter.library());

        let flat = request.flat.unwrap_or(cfg.flat);
        let mut locales = if request.locales.is_empty() {
            cfg.locales.clone()
        } else {
            request.locales.clone()
        };
        let mut seen = std::collections::HashSet::new();
        locales.retain(|l| seen.insert(l.clone()));

        let roots: Vec<PathBuf> = cfg.paths.iter().map(|p| resolve_path(&self.root, p)).collect();
        let target = self.target(&cfg.output_path, &cfg.file_name, format);
        let transformer = TranslationTransformer::new(&roots, adapter, &self.registry, &target);

        let records = locales
            .par_iter()
            .map(|locale| transformer.transform(locale, flat))
            .collect::<Result<Vec<_>>>()?;
        ensure_disjoint(records.iter().map(|r| (&r.output_path, r.locale.as_str())))?;

        let generator = LocaleGenerator::new(self.format_options(format));
        let envelope = self.envelope(format);
        records
            .par_iter()
            .map(|record| -> Result<GeneratedFile> {
                Ok(GeneratedFile {
                    path: record.output_path.clone(),
                    contents: envelope.wrap(&generator.generate(record)?),
                })
            })
            .collect()
    }

    pub fn generate_translators(&self, request: &TranslatorRequest) -> Result<Vec<GeneratedFile>> {
        let cfg = &self.config.translators;
        let format = OutputFormat::parse_for(
            ArtifactKind::Translators,
            request.format.as_deref().unwrap_or(&cfg.format),
        )?;
        let runtime = request.runtime.as_deref().unwrap_or(&cfg.runtime);
        Runtime::parse(runtime)?;

        let decls: Vec<&EnumDeclaration> = if request.names.is_empty() {
            let policy = self.policy();
            self.registry
                .all()
                .iter()
                .filter(|d| d.attribute(TRANSLATOR_MARKER).is_some() && !policy.is_excluded(d))
                .collect()
        } else {
            self.registry.select(&request.names)?
        };

        let enum_target = self.enum_target(None)?;
        let target = self.target(&cfg.output_path, &cfg.file_name, format);
        let resolver = ImportResolver::new(cfg.enum_import_base.clone());
        let transformer = TranslatorTransformer::new(&enum_target, &target, &resolver);

        let records: Vec<_> = decls
            .iter()
            .filter_map(|decl| {
                let record = transformer.transform(decl);
                if record.is_none() {
                    debug!("{} does not request a translator helper", decl.name);
                }
                record
            })
            .collect();
        ensure_disjoint(records.iter().map(|r| (&r.output_path, r.enum_name.as_str())))?;

        let generator = TranslatorGenerator::new(self.format_options(format), runtime, &cfg.helper_import);
        let envelope = self.envelope(format);
        records
            .par_iter()
            .map(|record| -> Result<GeneratedFile> {
                Ok(GeneratedFile {
                    path: record.output_path.clone(),
                    contents: envelope.wrap(&generator.generate(record)?),
                })
            })
            .collect()
    }

    /// Every artifact kind with configured defaults. Translations are skipped
    /// when none of the locale roots exist.
    pub fn generate_all(&self) -> Result<Vec<GeneratedFile>> {
        let mut files = self.generate_enums(&EnumRequest::default())?;

        let has_locale_root = self
            .config
            .translations
            .paths
            .iter()
            .any(|p| resolve_path(&self.root, p).is_dir());
        if has_locale_root {
            files.extend(self.generate_translations(&TranslationRequest::default())?);
        } else {
            info!("No locale roots found, skipping translations");
        }

        files.extend(self.generate_translators(&TranslatorRequest::default())?);
        Ok(files)
    }
}

/// Reject two items that would be written to the same path.
fn ensure_disjoint<'a>(items: impl Iterator<Item = (&'a PathBuf, &'a str)>) -> Result<()> {
    let mut seen: HashMap<&PathBuf, &str> = HashMap::new();
    for (path, name) in items {
        if let Some(first) = seen.insert(path, name) {
            return Err(Error::DuplicateOutputPath {
                path: path.clone(),
                first: first.to_string(),
                second: name.to_string(),
            });
        }
    }
    Ok(())
}
