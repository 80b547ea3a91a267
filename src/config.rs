use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_VIDEO_PATH: &str = "stub://parade";
const DEFAULT_ORACLE: &str = "stub";

#[derive(Debug, Deserialize, Default)]
struct OverlaydConfigFile {
    video_path: Option<String>,
    oracle: Option<String>,
    max_dim: Option<u32>,
}

/// Runtime configuration for `overlayd`.
///
/// Sources, in increasing precedence: built-in defaults, an optional JSON
/// file named by `OVERLAY_CONFIG`, then `OVERLAY_*` environment variables.
#[derive(Debug, Clone)]
pub struct OverlaydConfig {
    pub video_path: String,
    pub oracle: String,
    pub max_dim: u32,
}

impl OverlaydConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("OVERLAY_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: OverlaydConfigFile) -> Self {
        Self {
            video_path: file
                .video_path
                .unwrap_or_else(|| DEFAULT_VIDEO_PATH.to_string()),
            oracle: file.oracle.unwrap_or_else(|| DEFAULT_ORACLE.to_string()),
            max_dim: file.max_dim.unwrap_or(crate::pipeline::MAX_DIM),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("OVERLAY_VIDEO_PATH") {
            if !path.trim().is_empty() {
                self.video_path = path;
            }
        }
        if let Ok(oracle) = std::env::var("OVERLAY_ORACLE") {
            if !oracle.trim().is_empty() {
                self.oracle = oracle;
            }
        }
        if let Ok(max_dim) = std::env::var("OVERLAY_MAX_DIM") {
            let parsed: u32 = max_dim
                .parse()
                .map_err(|_| anyhow!("OVERLAY_MAX_DIM must be an integer pixel budget"))?;
            self.max_dim = parsed;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.video_path.trim().is_empty() {
            return Err(anyhow!("video_path must not be empty"));
        }
        if self.max_dim == 0 {
            return Err(anyhow!("max_dim must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<OverlaydConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
