use crate::config::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Lists regular files in `dir` (non-recursive) whose extension matches the
/// configured filter, sorted lexicographically by file name. Sorting replaces
/// raw directory-enumeration order so repeat runs over an unchanged directory
/// visit the same files in the same sequence.
pub fn matching_files(cfg: &Config, dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading input dir: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("listing entry in {}", dir.display()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", path.display()))?;
        if !file_type.is_file() {
            continue;
        }
        if extension_matches(cfg, &path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn extension_matches(cfg: &Config, path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    let want = cfg.filter.extension.as_str();
    if cfg.filter.case_insensitive {
        ext.eq_ignore_ascii_case(want)
    } else {
        ext == want
    }
}
