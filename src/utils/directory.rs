use crate::models::error::{BackupError, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Exact, case-sensitive suffix match.
pub fn is_backup_candidate(file_name: &str, suffixes: &[String]) -> bool {
    suffixes.iter().any(|suffix| file_name.ends_with(suffix.as_str()))
}

/// Names of the immediate entries of `dir` that match one of `suffixes`, sorted by name.
/// Entries of any type are returned; ones that cannot be copied fail later.
/// Fails only when `dir` itself cannot be read; a bad entry is logged and skipped.
pub fn get_candidates_in_path(dir: &Path, suffixes: &[String]) -> Result<Vec<String>> {
    let mut candidates = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(cause) if cause.depth() == 0 => {
                return Err(BackupError::DirectoryRead {
                    path: dir.to_path_buf(),
                    cause,
                });
            }
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };

        let Some(file_name) = entry.file_name().to_str() else {
            warn!(
                "Skipping entry with non UTF-8 name: {}",
                entry.path().display()
            );
            continue;
        };

        if is_backup_candidate(file_name, suffixes) {
            candidates.push(file_name.to_string());
        } else {
            debug!("Ignoring {}", file_name);
        }
    }
    Ok(candidates)
}

/// Creates `dir` and any missing parents. An existing directory is not an error.
pub fn ensure_directory(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|cause| BackupError::DirectoryCreate {
        path: dir.to_path_buf(),
        cause,
    })
}

/// `<dest>/<file_name>_<timestamp>`
pub fn backup_destination(dest: &Path, file_name: &str, timestamp: &str) -> PathBuf {
    dest.join(format!("{}_{}", file_name, timestamp))
}
