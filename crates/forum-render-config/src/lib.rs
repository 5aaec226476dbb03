use forum_render_engine::render::options::{
    DEFAULT_ATTACHMENT_BASE, DEFAULT_BASE_URL, DEFAULT_HOSTS,
};
use forum_render_engine::render::style::DEFAULT_FONT_SIZE;
use forum_render_engine::render::{Labels, RenderOptions};
use forum_render_engine::resolver::FetchStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site root that relative links resolve against.
    pub base_url: String,
    /// Root for `./`-relative image, video and attachment paths.
    pub attachment_base: String,
    /// Host names treated as the forum itself when classifying links.
    pub hosts: Vec<String>,
    pub base_font_size: f32,
    pub fetch_strategy: FetchStrategy,
    pub inline_quote_max_blocks: usize,
    pub quote_line_limit: usize,
    /// Directory of bundled sticker images, one file per sticker name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticker_dir: Option<PathBuf>,
    pub labels: Labels,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            attachment_base: DEFAULT_ATTACHMENT_BASE.to_string(),
            hosts: DEFAULT_HOSTS.iter().map(|h| h.to_string()).collect(),
            base_font_size: DEFAULT_FONT_SIZE,
            fetch_strategy: FetchStrategy::default(),
            inline_quote_max_blocks: 5,
            quote_line_limit: 5,
            sticker_dir: None,
            labels: Labels::default(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the sticker directory
        config.sticker_dir = config
            .sticker_dir
            .map(|dir| Self::expand_path(&dir).unwrap_or(dir));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/forum-render");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            base_url: self.base_url.clone(),
            attachment_base: self.attachment_base.clone(),
            hosts: self.hosts.clone(),
            base_font_size: self.base_font_size,
            inline_quote_max_blocks: self.inline_quote_max_blocks,
            quote_line_limit: self.quote_line_limit,
            labels: self.labels.clone(),
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
