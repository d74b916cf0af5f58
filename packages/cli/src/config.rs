use serde::{Deserialize, Serialize};
use sprig_vdom::RendererConfig;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "sprig.config.json";

/// Sprig configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Tag of the element frames are rendered into
    #[serde(default = "default_root_tag")]
    pub root_tag: String,

    /// Reconciler options
    #[serde(flatten)]
    pub renderer: RendererConfig,
}

fn default_root_tag() -> String {
    "div".to_string()
}

impl Config {
    /// Load `explicit`, or the default config file from `cwd` when present
    pub fn load(cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);
                if !path.exists() {
                    return Ok(Config::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", config_path.display(), e))?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_tag: default_root_tag(),
            renderer: RendererConfig::default(),
        }
    }
}
