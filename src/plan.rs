use crate::{config::Config, scan};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One unit of work: an input file and the output path derived for it.
/// Both paths are absolute by construction; the pairing only lives for the
/// duration of a single batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPlan {
    pub input_dir: PathBuf,
    pub jobs: Vec<ConversionJob>,
}

impl BatchPlan {
    /// Derives one job per matching file in `dir`. An empty directory (or one
    /// with no matching files) yields an empty plan, which runs cleanly with
    /// zero invocations.
    pub fn from_dir(cfg: &Config, dir: &Path) -> Result<Self> {
        let dir = dir
            .canonicalize()
            .with_context(|| format!("resolving input dir: {}", dir.display()))?;

        let mut jobs = Vec::new();
        for input in scan::matching_files(cfg, &dir)? {
            let input = input
                .canonicalize()
                .with_context(|| format!("resolving input: {}", input.display()))?;
            let output = derive_output(&input, &cfg.filter.output_extension)?;
            jobs.push(ConversionJob { input, output });
        }

        check_collisions(&jobs)?;

        Ok(Self {
            input_dir: dir,
            jobs,
        })
    }
}

/// Same directory, same stem, the configured target extension.
fn derive_output(input: &Path, ext: &str) -> Result<PathBuf> {
    if input.file_stem().is_none() {
        return Err(anyhow!("input has no file stem: {}", input.display()));
    }
    Ok(input.with_extension(ext))
}

/// Two inputs mapping to one output stem (possible under case-insensitive
/// extension matching, e.g. `a.png` and `a.PNG`) would silently overwrite
/// each other; reject the batch instead.
fn check_collisions(jobs: &[ConversionJob]) -> Result<()> {
    let mut by_output: BTreeMap<&Path, &Path> = BTreeMap::new();
    for job in jobs {
        if let Some(first) = by_output.insert(&job.output, &job.input) {
            return Err(anyhow!(
                "output collision: {} and {} both map to {}",
                first.display(),
                job.input.display(),
                job.output.display()
            ));
        }
    }
    Ok(())
}
