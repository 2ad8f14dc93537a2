//! Error types for frontgen

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Configuration errors
    #[error("Unsupported output format '{format}' for {artifact} (expected one of: {expected})")]
    UnsupportedFormat {
        artifact: &'static str,
        format: String,
        expected: &'static str,
    },

    #[error("Unsupported i18n library '{0}' (expected one of: i18next, vue-i18n, passthrough, source)")]
    UnsupportedLibrary(String),

    #[error("Unsupported translator runtime '{0}' (expected one of: i18next, vue-i18n, react-i18next)")]
    UnsupportedRuntime(String),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("Enum '{0}' was not found in any configured enum path")]
    UnknownEnum(String),

    // Declaration-shape errors
    #[error("Enum '{enum_name}' requires comments but case '{case}' has no doc comment")]
    MissingCaseComment { enum_name: String, case: String },

    #[error("Enum '{enum_name}' has an unsupported value for case '{case}': {reason}")]
    UnsupportedCaseValue {
        enum_name: String,
        case: String,
        reason: String,
    },

    #[error("Enum '{enum_name}' lists method '{method}' in includeMethods, but no such method exists")]
    GroupMethodMissing { enum_name: String, method: String },

    #[error("Method '{enum_name}::{method}' must not take arguments (found {params})")]
    GroupMethodSignature {
        enum_name: String,
        method: String,
        params: usize,
    },

    #[error("Method '{enum_name}::{method}' (line {line}) must be public and static")]
    GroupMethodBinding {
        enum_name: String,
        method: String,
        line: usize,
    },

    #[error("Method '{enum_name}::{method}' must return an array: {reason}")]
    GroupReturnShape {
        enum_name: String,
        method: String,
        reason: String,
    },

    #[error("Method '{enum_name}::{method}' returns an unsupported value at key '{key}': {reason}")]
    GroupValue {
        enum_name: String,
        method: String,
        key: String,
        reason: String,
    },

    #[error("Group '{group}' of enum '{enum_name}' collides with {conflict}")]
    DuplicateGroupName {
        enum_name: String,
        group: String,
        conflict: String,
    },

    // Translation errors
    #[error("Locale '{locale}' was not found in any of: {}", roots.iter().map(|r| r.display().to_string()).collect::<Vec<_>>().join(", "))]
    LocaleNotFound { locale: String, roots: Vec<PathBuf> },

    #[error("Failed to load locale file '{}': {message}", path.display())]
    LocaleFile { path: PathBuf, message: String },

    // Pipeline errors
    #[error("Output path '{}' is produced by both '{first}' and '{second}'", path.display())]
    DuplicateOutputPath {
        path: PathBuf,
        first: String,
        second: String,
    },

    #[error("IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error stems from configuration rather than source declarations.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedFormat { .. }
                | Error::InvalidGlob { .. }
                | Error::UnsupportedLibrary(_)
                | Error::UnsupportedRuntime(_)
                | Error::UnknownEnum(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
