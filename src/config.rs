/// The config module defines the configuration options and their parsing.
///
/// Unknown keys are not fatal: they are reported with a warning so that a config written for a
/// newer version still loads.
use crate::error::{Result, ZencpError, ZencpExpectedError};
use crate::tags::TagOptions;
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_FILL_STRING: &str = "<Unknown>";

const KNOWN_KEYS: &[&str] = &["force", "assume_yes", "allow_empty_tags", "fill_empty_tags", "id3v1", "device"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Overwrite tracks that are already on the player.
    pub force: bool,
    /// Transfer without asking. Existing tracks are always skipped in this mode.
    pub assume_yes: bool,
    /// Keep empty tag fields empty instead of filling them.
    pub allow_empty_tags: bool,
    /// Replacement for empty tag fields.
    pub fill_empty_tags: String,
    /// Read ID3v1 tags even when ID3v2 tags are present.
    pub id3v1: bool,
    /// Player to use when several are connected.
    pub device: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            force: false,
            assume_yes: false,
            allow_empty_tags: false,
            fill_empty_tags: DEFAULT_FILL_STRING.to_string(),
            id3v1: false,
            device: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    force: bool,
    assume_yes: bool,
    allow_empty_tags: bool,
    fill_empty_tags: Option<String>,
    id3v1: bool,
    device: Option<u32>,
}

pub fn default_config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "zencp").ok_or_else(|| ZencpError::Generic("Failed to get project directories".to_string()))?;
    Ok(dirs.config_dir().join("config.toml"))
}

impl Config {
    pub fn parse(config_path_override: Option<&Path>) -> Result<Config> {
        let cfgpath = match config_path_override {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };
        let cfgtext = match fs::read_to_string(&cfgpath) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ZencpExpectedError::ConfigNotFound { path: cfgpath }.into());
            }
            Err(e) => return Err(e.into()),
        };
        let config = Self::parse_str(&cfgtext, &cfgpath)?;
        debug!("Loaded configuration from {}", cfgpath.display());
        Ok(config)
    }

    pub fn parse_str(cfgtext: &str, cfgpath: &Path) -> Result<Config> {
        let table: toml::Table = toml::from_str(cfgtext)?;

        let unrecognized: Vec<&str> = table.keys().map(String::as_str).filter(|k| !KNOWN_KEYS.contains(k)).collect();
        if !unrecognized.is_empty() {
            warn!("Unrecognized options found in configuration file: {}", unrecognized.join(", "));
        }

        let raw: RawConfig = toml::Value::Table(table).try_into()?;

        let fill_empty_tags = match raw.fill_empty_tags {
            Some(_) if raw.allow_empty_tags => {
                return Err(ZencpExpectedError::InvalidConfigValue {
                    key: "fill_empty_tags",
                    path: cfgpath.to_path_buf(),
                    message: "cannot be used together with allow_empty_tags".to_string(),
                }
                .into());
            }
            Some(s) if s.is_empty() => {
                return Err(ZencpExpectedError::InvalidConfigValue {
                    key: "fill_empty_tags",
                    path: cfgpath.to_path_buf(),
                    message: "must not be empty".to_string(),
                }
                .into());
            }
            Some(s) => s,
            None => DEFAULT_FILL_STRING.to_string(),
        };

        Ok(Config {
            force: raw.force,
            assume_yes: raw.assume_yes,
            allow_empty_tags: raw.allow_empty_tags,
            fill_empty_tags,
            id3v1: raw.id3v1,
            device: raw.device,
        })
    }

    pub fn tag_options(&self) -> TagOptions {
        TagOptions {
            id3v1: self.id3v1,
            allow_empty: self.allow_empty_tags,
            fill: self.fill_empty_tags.clone(),
        }
    }
}
