use crate::{
    config::Config,
    plan::BatchPlan,
    report::{BatchReport, JobReport},
    tool::Converter,
    util::{now_rfc3339, sha256_hex},
};
use anyhow::{anyhow, Result};
use tracing::{info, warn};

/// Runs a batch plan strictly sequentially: each invocation blocks until the
/// external process exits before the next starts. No retry, no overlap.
pub struct Driver<C: Converter> {
    cfg: Config,
    converter: C,
}

impl<C: Converter> Driver<C> {
    pub fn new(cfg: &Config, converter: C) -> Self {
        Self {
            cfg: cfg.clone(),
            converter,
        }
    }

    pub fn run_batch(&self, plan: &BatchPlan) -> Result<BatchReport> {
        let fail_fast = match self.cfg.run.on_error.as_str() {
            "fail-fast" => true,
            "continue" => false,
            other => return Err(anyhow!("unknown run.on_error: {other}")),
        };

        let batch_id = batch_id(&self.cfg, plan);
        let started = now_rfc3339();

        info!(
            "batch_id={} dir={} jobs={}",
            batch_id,
            plan.input_dir.display(),
            plan.jobs.len()
        );

        let mut jobs = Vec::with_capacity(plan.jobs.len());
        let mut succeeded = 0usize;
        let mut failed = 0usize;

        for (i, job) in plan.jobs.iter().enumerate() {
            info!(
                "job {} {} -> {}",
                i,
                job.input.display(),
                job.output.display()
            );

            let outcome = self.converter.convert(job);

            if outcome.is_success() {
                succeeded += 1;
            } else {
                failed += 1;
                warn!("job {} failed: {:?}", i, outcome);
                if fail_fast {
                    return Err(anyhow!(
                        "aborting batch after job {} ({}): {:?}",
                        i,
                        job.input.display(),
                        outcome
                    ));
                }
            }

            jobs.push(JobReport::new(job, outcome));
        }

        Ok(BatchReport {
            batch_id,
            input_dir: plan.input_dir.display().to_string(),
            started,
            finished: now_rfc3339(),
            total: plan.jobs.len(),
            succeeded,
            failed,
            jobs,
        })
    }
}

/// Stable over config and the matched file list, so identical runs over an
/// unchanged directory share an id.
fn batch_id(cfg: &Config, plan: &BatchPlan) -> String {
    let mut seed = cfg.normalized_for_hash();
    for job in &plan.jobs {
        seed.push_str(&job.input.display().to_string());
        seed.push('\n');
    }
    sha256_hex(seed.as_bytes())
}
