use crate::{
    config::Config,
    driver::Driver,
    plan::BatchPlan,
    tool::{Converter, ExternalTool},
    util::ensure_dir,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "img2bin-batch")]
#[command(about = "Batch driver invoking an external image-to-binary converter per input file")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./img2bin-batch.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the external tool and input directory are usable.
    Doctor {},
    /// Show the derived conversion jobs without invoking anything.
    Plan {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Run the batch: one external invocation per matching file, in sequence.
    Run {
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        tool: Option<PathBuf>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = Config::load(&cfg_path)?;
    let _guard = init_logging(&args, &cfg)?;

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg),
        Command::Plan { dir } => plan(&cfg, dir.as_deref()),
        Command::Run { dir, tool } => run(&cfg, dir.as_deref(), tool.as_deref()),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("img2bin-batch.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("img2bin-batch.example.toml"))
    }
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = resolve_log_path(cfg) {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(&path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    Some(PathBuf::from("img2bin-batch.log"))
}

fn doctor(cfg: &Config) -> Result<()> {
    let tool = ExternalTool::new(cfg);
    let diag = tool.doctor()?;

    let input_dir = PathBuf::from(&cfg.paths.input_dir);
    let input_dir_readable = std::fs::read_dir(&input_dir).is_ok();
    let ok = diag.ok && input_dir_readable;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "tool": diag,
            "input_dir": input_dir,
            "input_dir_readable": input_dir_readable,
            "ok": ok,
        }))?
    );
    Ok(())
}

fn plan(cfg: &Config, dir: Option<&Path>) -> Result<()> {
    let dir = dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.input_dir));
    let plan = BatchPlan::from_dir(cfg, &dir)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn run(cfg: &Config, dir: Option<&Path>, tool_override: Option<&Path>) -> Result<()> {
    let dir = dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.input_dir));
    let plan = BatchPlan::from_dir(cfg, &dir)?;

    let tool = match tool_override {
        Some(p) => ExternalTool::with_tool_path(cfg, p.to_path_buf()),
        None => ExternalTool::new(cfg),
    };

    let driver = Driver::new(cfg, tool);
    let report = driver.run_batch(&plan)?;

    info!(
        "batch done: {} total, {} succeeded, {} failed",
        report.total, report.succeeded, report.failed
    );

    if cfg.run.print_summary {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
