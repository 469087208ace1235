//! Recipe files on disk: expanding directories and validating a path.

use std::path::{Path, PathBuf};

use crate::catalog::SchemaCatalog;
use crate::error::{Error, Result};
use crate::report::{Finding, FindingCode, ValidationReport};
use crate::validate::validate_str;

/// Expand the given paths into recipe files. Directories contribute every
/// `*.json` file beneath them, sorted; files are kept as given.
pub fn collect_recipe_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            walk_dir(path, &mut found)?;
            found.sort();
            out.extend(found);
        } else {
            out.push(path.clone());
        }
    }
    Ok(out)
}

fn walk_dir(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.is_dir() {
            walk_dir(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}

/// Read and validate one recipe file. An unreadable file is reported as a
/// `MALFORMED_DOCUMENT` finding so a batch run keeps going.
pub fn validate_path(path: &Path, catalog: &SchemaCatalog) -> ValidationReport {
    match std::fs::read_to_string(path) {
        Ok(json) => validate_str(&json, catalog),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read recipe");
            ValidationReport::single(Finding::document(
                FindingCode::MalformedDocument,
                format!("Could not read recipe file: {}", e),
                "",
            ))
        }
    }
}
