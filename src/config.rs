use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the default config file location.
pub const CONFIG_ENV: &str = "XANTE_PLUGIN_CONFIG";

/// Log settings for the `xante-plugin` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is not set
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

/// What `xante-plugin check` requires from a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Require the lifecycle functions libxante refuses to load without
    #[serde(default = "default_true")]
    pub require_lifecycle: bool,

    /// Additional symbols every checked plugin must export
    #[serde(default)]
    pub extra_symbols: Vec<String>,

    /// Call `xapl_init` with a null argument after loading
    #[serde(default)]
    pub call_init: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            require_lifecycle: true,
            extra_symbols: Vec::new(),
            call_init: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub check: CheckConfig,
}

/// `$XANTE_PLUGIN_CONFIG`, or `plugin.toml` under the user's config
/// directory.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    let dir = dirs::config_dir().ok_or_else(|| anyhow!("Could not find config directory"))?;
    Ok(dir.join("xante").join("plugin.toml"))
}

impl Config {
    /// Load from `path`, or the default location. A missing file yields the
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))?;

        Ok(config)
    }

    /// Write the defaults to `path`. An existing file is only replaced with
    /// `force`.
    pub fn init_at(path: &Path, force: bool) -> Result<Self> {
        if path.exists() && !force {
            bail!("{} already exists (use --force to replace it)", path.display());
        }

        let config = Config::default();
        config.save_to(path)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }
}
