use crate::error::{Error, Result};
use crate::transform::GeneratedFile;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Existing contents were already identical
    Unchanged,
}

/// Ensure the parent directory exists, then overwrite the file unless its
/// contents are already identical.
pub fn write_file(file: &GeneratedFile) -> Result<WriteOutcome> {
    let should_write = if file.path.exists() {
        let existing = std::fs::read_to_string(&file.path).map_err(|e| Error::io(&file.path, e))?;
        existing != file.contents
    } else {
        true
    };

    if !should_write {
        debug!("No changes for {}", file.path.display());
        return Ok(WriteOutcome::Unchanged);
    }

    if let Some(parent) = file.path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    std::fs::write(&file.path, &file.contents).map_err(|e| Error::io(&file.path, e))?;
    debug!("Wrote {}", file.path.display());
    Ok(WriteOutcome::Written)
}

/// Write files in order, stopping at the first failure.
pub fn write_all(files: &[GeneratedFile]) -> Result<Vec<(PathBuf, WriteOutcome)>> {
    files
        .iter()
        .map(|f| write_file(f).map(|outcome| (f.path.clone(), outcome)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_directories_and_skips_identical() {
        let dir = TempDir::new().unwrap();
        let file = GeneratedFile {
            path: dir.path().join("nested/deeper/Status.ts"),
            contents: "export const Status = {};\n".to_string(),
        };

        assert_eq!(write_file(&file).unwrap(), WriteOutcome::Written);
        assert_eq!(std::fs::read_to_string(&file.path).unwrap(), file.contents);
        assert_eq!(write_file(&file).unwrap(), WriteOutcome::Unchanged);

        let changed = GeneratedFile {
            contents: "export const Status = { A: 'a' };\n".to_string(),
            ..file.clone()
        };
        let results = write_all(&[changed.clone()]).unwrap();
        assert_eq!(results, vec![(changed.path.clone(), WriteOutcome::Written)]);
        assert_eq!(std::fs::read_to_string(&changed.path).unwrap(), changed.contents);
    }
}
