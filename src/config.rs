use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::paths::config_file_path;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Runtime settings. Every field has a default so a partial `config.json` is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user_agent: String,
    pub metadata_timeout_secs: u64,
    pub transfer_timeout_secs: u64,
    pub http_attempts: usize,
    pub retry_delay_ms: u64,
    pub max_download_attempts: u32,
    pub refresh_pause_secs: u64,
    pub probe_max_seasons: u32,
    pub probe_max_episodes: u32,
    pub probe_miss_limit: u32,
    pub ytdlp_bin: PathBuf,
    /// Extra search terms per show slug, for titles the catalog spells several ways.
    pub title_aliases: BTreeMap<String, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            metadata_timeout_secs: 10,
            transfer_timeout_secs: 30,
            http_attempts: 2,
            retry_delay_ms: 500,
            max_download_attempts: 3,
            refresh_pause_secs: 3,
            probe_max_seasons: 5,
            probe_max_episodes: 99,
            probe_miss_limit: 3,
            ytdlp_bin: PathBuf::from("yt-dlp"),
            title_aliases: default_title_aliases(),
        }
    }
}

fn default_title_aliases() -> BTreeMap<String, Vec<String>> {
    let mut aliases = BTreeMap::new();
    aliases.insert(
        "witch".to_string(),
        vec![
            "w-i-t-c-h".to_string(),
            "w.i.t.c.h".to_string(),
            "الفتيات الخارقات".to_string(),
        ],
    );
    aliases
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = config_file_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env(
            env::var_os("DIMAGRAB_YTDLP_BIN"),
            env::var("DIMAGRAB_USER_AGENT").ok(),
        );
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;
        for (slug, variants) in default_title_aliases() {
            config.title_aliases.entry(slug).or_insert(variants);
        }
        Ok(config)
    }

    pub(crate) fn apply_env(&mut self, ytdlp_bin: Option<OsString>, user_agent: Option<String>) {
        if let Some(value) = ytdlp_bin
            && !value.is_empty()
        {
            self.ytdlp_bin = PathBuf::from(value);
        }
        if let Some(value) = user_agent
            && !value.trim().is_empty()
        {
            self.user_agent = value.trim().to_string();
        }
    }

    pub(crate) fn aliases_for(&self, slug: &str) -> &[String] {
        let key = slug.to_lowercase();
        self.title_aliases
            .iter()
            .find(|(alias_slug, _)| key.contains(alias_slug.as_str()))
            .map(|(_, variants)| variants.as_slice())
            .unwrap_or(&[])
    }
}
