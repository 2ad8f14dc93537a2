//! Intermediate records produced from backend declarations.

pub mod enums;
pub mod translations;
pub mod translators;

pub use enums::EnumTransformer;
pub use translations::TranslationTransformer;
pub use translators::TranslatorTransformer;

use crate::config::OutputFormat;
use crate::tree::TreeMap;
use std::fmt;
use std::path::PathBuf;

/// Where files of one artifact kind go and how they are named.
#[derive(Debug, Clone)]
pub struct OutputTarget {
    pub dir: PathBuf,
    /// Template with `{name}`, `{locale}` and `{ext}` placeholders
    pub file_name: String,
    pub format: OutputFormat,
}

impl OutputTarget {
    pub fn path_for(&self, name: &str) -> PathBuf {
        let file = self
            .file_name
            .replace("{name}", name)
            .replace("{locale}", name)
            .replace("{ext}", self.format.extension());
        self.dir.join(file)
    }
}

/// Scalar that can appear in generated modules.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Scalar {
    /// Renders the value as a TS/JS literal
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(x) => f.write_str(&crate::ts_generator::format_float(*x)),
            Scalar::Str(s) => f.write_str(&crate::ts_generator::quote(s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumCase {
    pub name: String,
    /// Always `Str` or `Int`, matching the enum's backing type
    pub value: Scalar,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Array,
    Record,
}

impl GroupKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupKind::Array => "array",
            GroupKind::Record => "record",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnumGroupValue {
    /// Case of the owning enum, by case name
    Enum(String),
    Literal(Scalar),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumGroup {
    pub name: String,
    pub kind: GroupKind,
    /// For arrays the keys are `0..n`
    pub entries: Vec<(String, EnumGroupValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformedEnum {
    pub name: String,
    pub qualified_name: String,
    pub namespace: Option<String>,
    pub doc: Option<String>,
    pub cases: Vec<EnumCase>,
    pub groups: Vec<EnumGroup>,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformedTranslation {
    pub locale: String,
    pub data: TreeMap,
    pub is_flat: bool,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformedEnumTranslator {
    /// Exported function name, `use<Enum>Translator`
    pub name: String,
    pub enum_name: String,
    pub translation_key: String,
    pub enum_import_path: String,
    pub output_path: PathBuf,
}

/// Final artifact ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}
