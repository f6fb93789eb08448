use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub listen: String,
    pub uploads_dir: String,
    pub max_upload_size: usize,
    /// Empty means any origin is accepted.
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:3000".to_string(),
            uploads_dir: "./uploads".to_string(),
            max_upload_size: 500 * 1024 * 1024,
            allowed_origins: Vec::new(),
        }
    }
}

impl Config {
    /// Read the TOML config at `path`, or write the defaults there if it does
    /// not exist yet.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))
        } else {
            let default_config = Config::default();
            let toml_string = toml::to_string_pretty(&default_config)
                .context("failed to serialize default config")?;
            std::fs::write(path, toml_string)
                .with_context(|| format!("failed to create {}", path.display()))?;
            log::info!("wrote default config to {}", path.display());
            Ok(default_config)
        }
    }

    /// Config path from the first CLI argument or `FILEDROP_CONFIG`, then
    /// `FILEDROP_*` environment overrides on top.
    pub fn from_args_env() -> anyhow::Result<Self> {
        let path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var("FILEDROP_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = Self::load(Path::new(&path))?;
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(listen) = lookup("FILEDROP_LISTEN") {
            self.listen = listen;
        }
        if let Some(dir) = lookup("FILEDROP_UPLOADS_DIR") {
            self.uploads_dir = dir;
        }
        if let Some(size) = lookup("FILEDROP_MAX_UPLOAD_SIZE") {
            self.max_upload_size = size
                .parse()
                .with_context(|| format!("FILEDROP_MAX_UPLOAD_SIZE is not a number: {size}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_upload_size == 0 {
            bail!("max_upload_size must be greater than 0");
        }
        if self.uploads_dir.trim().is_empty() {
            bail!("uploads_dir must not be empty");
        }
        Ok(())
    }
}
