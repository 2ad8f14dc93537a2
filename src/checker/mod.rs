//! Drift detection between fresh enum records and previously generated files.

pub mod diff;
pub mod ts_reader;

pub use diff::{diff_enum, DiffLine};
pub use ts_reader::{parse_module, JsValue, ParsedExport, ParsedModule};

use crate::transform::TransformedEnum;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDrift {
    pub enum_name: String,
    pub path: PathBuf,
    pub lines: Vec<DiffLine>,
}

/// Drift across all checked enums. Only enums with differences are listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriftReport {
    pub enums: Vec<EnumDrift>,
}

impl DriftReport {
    pub fn is_in_sync(&self) -> bool {
        self.enums.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.enums.iter().flat_map(|e| e.lines.iter())
    }
}

impl fmt::Display for DriftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for drift in &self.enums {
            writeln!(f, "{} ({})", drift.enum_name, drift.path.display())?;
            for line in &drift.lines {
                writeln!(f, "  {}", line)?;
            }
        }
        Ok(())
    }
}

/// Compare one record against previously generated source, if any.
///
/// A file whose first export is not named after the enum counts as absent.
pub fn check_source(record: &TransformedEnum, previous: Option<&str>) -> Vec<DiffLine> {
    let module = previous.map(parse_module);
    let exports = module
        .as_ref()
        .map(|m| m.exports.as_slice())
        .filter(|exports| exports.first().is_some_and(|e| e.name == record.name));
    if previous.is_some() && exports.is_none() {
        debug!("{} does not export {}, treating as absent", record.output_path.display(), record.name);
    }
    diff_enum(record, exports)
}

/// Read each record's output file and diff it. Missing or unreadable files
/// are treated as absent.
pub fn check(records: &[TransformedEnum]) -> DriftReport {
    let enums = records
        .iter()
        .filter_map(|record| {
            let previous = std::fs::read_to_string(&record.output_path).ok();
            let lines = check_source(record, previous.as_deref());
            if lines.is_empty() {
                None
            } else {
                Some(EnumDrift {
                    enum_name: record.name.clone(),
                    path: record.output_path.clone(),
                    lines,
                })
            }
        })
        .collect();
    DriftReport { enums }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{EnumCase, Scalar};
    use tempfile::TempDir;

    fn record(path: PathBuf) -> TransformedEnum {
        TransformedEnum {
            name: "Status".into(),
            qualified_name: "Status".into(),
            namespace: None,
            doc: None,
            cases: vec![EnumCase {
                name: "ACTIVE".into(),
                value: Scalar::Str("active".into()),
                doc: None,
            }],
            groups: vec![],
            output_path: path,
        }
    }

    #[test]
    fn test_name_mismatch_treated_as_absent() {
        let rec = record(PathBuf::from("Status.ts"));
        let out = check_source(&rec, Some("export const Other = { ACTIVE: 'active' };"));
        assert_eq!(out, vec![DiffLine::Added("ACTIVE: 'active'".into())]);
    }

    #[test]
    fn test_check_reads_files() {
        let dir = TempDir::new().unwrap();
        let in_sync = record(dir.path().join("Status.ts"));
        std::fs::write(&in_sync.output_path, "export const Status = {\n  ACTIVE: 'active',\n} as const;\n").unwrap();

        let mut missing = record(dir.path().join("Missing.ts"));
        missing.name = "Missing".into();

        let report = check(&[in_sync, missing]);
        assert!(!report.is_in_sync());
        assert_eq!(report.enums.len(), 1);
        assert_eq!(report.enums[0].enum_name, "Missing");
        assert_eq!(report.lines().count(), 1);
        assert!(report.to_string().contains("  + ACTIVE: 'active'"));
    }
}
