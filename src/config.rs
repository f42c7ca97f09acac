use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub filter: Filter,
    #[serde(default)]
    pub tool: Tool,
    #[serde(default)]
    pub run: Run,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// A stable, normalization-friendly string for hashing.
    pub fn normalized_for_hash(&self) -> String {
        toml::to_string(self).unwrap_or_default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: Default::default(),
            filter: Default::default(),
            tool: Default::default(),
            run: Default::default(),
            logging: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    /// Directory scanned for inputs (non-recursive).
    pub input_dir: String,
    /// External converter executable, invoked as `<tool> <input> <output>`.
    pub tool: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            input_dir: "img".into(),
            tool: "target/debug/maze_exit_img_to_bin".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    pub extension: String,
    pub output_extension: String,
    pub case_insensitive: bool,
}
impl Default for Filter {
    fn default() -> Self {
        Self {
            extension: "png".into(),
            output_extension: "bin".into(),
            case_insensitive: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// 0 disables the timeout.
    pub timeout_seconds: u64,
    pub capture_stderr: bool,
}
impl Default for Tool {
    fn default() -> Self {
        Self {
            timeout_seconds: 0,
            capture_stderr: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// "continue" runs the whole batch regardless of per-file failures
    /// (the historical behavior, now logged and reported); "fail-fast"
    /// aborts on the first failed invocation.
    pub on_error: String,
    pub print_summary: bool,
}
impl Default for Run {
    fn default() -> Self {
        Self {
            on_error: "continue".into(),
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
