//! TOML configuration for the galaxy and window.
//!
//! ```toml
//! seed = 42
//!
//! [galaxy]
//! count = 20000
//! inside_color = "#ff6030"
//!
//! [window]
//! width = 1280
//! height = 720
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::params::ParameterSet;

pub const DEFAULT_WINDOW_WIDTH: u32 = 1280;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 720;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyConfig {
    pub seed: Option<u64>,
    pub galaxy: ParameterSet,
    pub window: WindowConfig,
}

impl GalaxyConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: GalaxyConfig = toml::from_str(source)?;
        config.galaxy.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
