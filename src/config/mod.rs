//! Configuration management for Inkpost.
//!
//! Configuration is read from `~/.config/inkpost/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::authz::{DEFAULT_LANDING_PATH, DEFAULT_LOGIN_PATH};

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "INKPOST_API_URL";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub routes: RouteConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Public web frontend, used to open posts in a browser.
    pub site_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/".to_string(),
            timeout_secs: 10,
            site_url: "http://localhost:3000/".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Browser URL of a post on the public site.
    pub fn post_url(&self, route_key: &str) -> String {
        format!("{}/posts/{}", self.site_url.trim_end_matches('/'), route_key)
    }
}

/// Where route guards send visitors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub login: String,
    pub landing: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login: DEFAULT_LOGIN_PATH.to_string(),
            landing: DEFAULT_LANDING_PATH.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source: e,
        })
    }

    /// Replace the API root, e.g. from `--api-url` or `INKPOST_API_URL`.
    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }
        self
    }

    /// Get the default config file path: `~/.config/inkpost/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("inkpost").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        r##"# Inkpost Configuration
#
# Colors can be specified as:
# - Named colors: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
#   DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
#   LightCyan, White, Reset
# - Hex colors: "#RRGGBB" or "#RGB"
#
# Keybindings can be specified as:
# - Single characters: "a", "A", "1"
# - Special keys: Enter, Tab, BackTab, Backspace, Delete, Home, End,
#   PageUp, PageDown, Up, Down, Left, Right, Esc, Space, F1-F12
# - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter"

[api]
# Backend REST root. INKPOST_API_URL and --api-url take precedence.
base_url = "http://localhost:8000/api/"
timeout_secs = 10
# Public site, used when opening a post in the browser
site_url = "http://localhost:3000/"

[routes]
# Where signed-out visitors are sent
login = "/login"
# Where signed-in users land, and where forbidden visits fall back to
landing = "/dashboard"

[colors]
active_border = "Cyan"
inactive_border = "DarkGray"

selection_bg = "Cyan"
selection_fg = "Black"

# Reaction bar
reaction = "Gray"
reaction_selected = "LightMagenta"
reaction_pending = "DarkGray"

metadata_author = "Yellow"
metadata_date = "Yellow"
metadata_category = "Blue"

status_fg = "White"
status_bg = "DarkGray"
error_fg = "LightRed"

[keybindings]
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
next_page = ["n", "PageDown"]
prev_page = ["p", "PageUp"]
next_pane = ["Tab", "BackTab"]
select = ["Enter"]
open_in_browser = ["o"]
refresh = ["R"]
# React with like, love, haha, wow, sad, angry
react = ["1", "2", "3", "4", "5", "6"]
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
