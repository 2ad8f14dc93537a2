use crate::error::{Error, Result};
use crate::php::lexer::{tokenize, TokenKind};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// An enum name found by lexical scanning, with the file that declares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredEnum {
    pub qualified_name: String,
    pub path: PathBuf,
}

pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if path.extension().and_then(|e| e.to_str()) != Some("php") {
            continue;
        }

        // Exclude dependency trees
        if path
            .components()
            .any(|c| c.as_os_str() == "vendor" || c.as_os_str() == "node_modules")
        {
            continue;
        }

        files.push(path.to_path_buf());
    }

    Ok(files)
}

/// Expand a glob pattern to the PHP files it matches, in sorted order.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|e| Error::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_dir() => files.extend(scan_directory(&path)?),
            Ok(path) if path.extension().and_then(|e| e.to_str()) == Some("php") => files.push(path),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable glob match: {}", e),
        }
    }
    files.sort();
    Ok(files)
}

/// Resolve configured enum paths (directories, files or glob patterns)
/// relative to `root` into a list of source files.
pub fn resolve_sources(root: &Path, paths: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        let resolved = crate::config::resolve_path(root, Path::new(path));
        let text = resolved.to_string_lossy();
        if text.contains(|c: char| matches!(c, '*' | '?' | '[')) {
            files.extend(expand_glob(&text)?);
        } else if resolved.is_dir() {
            files.extend(scan_directory(&resolved)?);
        } else if resolved.is_file() {
            files.push(resolved);
        } else {
            warn!("Enum path not found: {}", resolved.display());
        }
    }

    let mut seen = HashSet::new();
    files.retain(|f| seen.insert(f.clone()));
    Ok(files)
}

/// Qualified names of every enum declared in `source`.
///
/// Only the token stream is inspected. `enum` directly followed by `{` or `(`
/// or used as a member name (`->enum`, `::enum`) does not declare anything.
pub fn find_enum_names(source: &str) -> Vec<String> {
    let tokens = tokenize(source);
    let mut namespace: Option<String> = None;
    let mut names = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        if token.is_ident("namespace") {
            namespace = tokens
                .get(i + 1)
                .and_then(|t| t.ident())
                .map(|n| n.trim_start_matches('\\').to_string());
            continue;
        }
        if !token.is_ident("enum") {
            continue;
        }

        let after_member_access = i > 0
            && matches!(
                tokens[i - 1].kind,
                TokenKind::Arrow | TokenKind::NullsafeArrow | TokenKind::DoubleColon
            );
        if after_member_access {
            continue;
        }

        let Some(name) = tokens.get(i + 1).and_then(|t| t.ident()) else {
            continue;
        };
        if name.contains('\\') {
            continue;
        }

        names.push(match &namespace {
            Some(ns) if !ns.is_empty() => format!("{}\\{}", ns, name),
            _ => name.to_string(),
        });
    }

    names
}

/// Scan files for enum declarations. Unreadable files are skipped and the
/// result is de-duplicated by qualified name, keeping the first occurrence.
pub fn discover_enums(files: &[PathBuf]) -> Vec<DiscoveredEnum> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for file in files {
        let source = match std::fs::read_to_string(file) {
            Ok(s) => s,
            Err(e) => {
                warn!("Skipping unreadable file {}: {}", file.display(), e);
                continue;
            }
        };

        for name in find_enum_names(&source) {
            if !seen.insert(name.to_ascii_lowercase()) {
                debug!("Duplicate enum declaration {} in {}", name, file.display());
                continue;
            }
            found.push(DiscoveredEnum {
                qualified_name: name,
                path: file.clone(),
            });
        }
    }

    found
}
