//! Environment-driven settings (made by FontLab https://www.fontlab.com/)

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use asciilab_core::probe::DEFAULT_FONT_BASE_URL;
use url::Url;

pub const STATE_DIR_VAR: &str = "ASCIILAB_STATE_DIR";
pub const FONT_CACHE_VAR: &str = "ASCIILAB_FONT_CACHE";
pub const FONT_BASE_URL_VAR: &str = "ASCIILAB_FONT_BASE_URL";
pub const SHARE_BASE_VAR: &str = "ASCIILAB_SHARE_BASE";
pub const FIGLET_VAR: &str = "ASCIILAB_FIGLET";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where favorites and history are kept.
    pub state_dir: PathBuf,
    /// Where fetched typeface definitions land for the engine.
    pub font_cache: PathBuf,
    pub font_base_url: String,
    /// Page share links point at; share links are unavailable without it.
    pub share_base: Option<Url>,
    pub figlet: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::resolve(|key| env::var(key).ok())
    }

    pub(crate) fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let state_dir = match var(STATE_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|d| d.join("asciilab"))
                .ok_or_else(|| anyhow!("no data directory on this platform; set {STATE_DIR_VAR}"))?,
        };

        let font_cache = match var(FONT_CACHE_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::cache_dir()
                .map(|d| d.join("asciilab").join("fonts"))
                .ok_or_else(|| anyhow!("no cache directory on this platform; set {FONT_CACHE_VAR}"))?,
        };

        let share_base = var(SHARE_BASE_VAR)
            .map(|raw| parse_share_base(&raw))
            .transpose()?;

        Ok(Self {
            state_dir,
            font_cache,
            font_base_url: var(FONT_BASE_URL_VAR)
                .unwrap_or_else(|| DEFAULT_FONT_BASE_URL.to_string()),
            share_base,
            figlet: var(FIGLET_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("figlet")),
        })
    }
}

/// Parse a share base, treating its last path segment as a directory.
fn parse_share_base(raw: &str) -> Result<Url> {
    let mut url =
        Url::parse(raw.trim()).with_context(|| format!("{SHARE_BASE_VAR} is not a URL: {raw}"))?;
    if url.cannot_be_a_base() {
        return Err(anyhow!("{SHARE_BASE_VAR} cannot carry a path: {raw}"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
