//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or an explicit path), then applies the `STELLAR_LOG_LEVEL` override.
//! API keys come from `NASA_API_KEY` and `GEMINI_API_KEY` only, never TOML.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::enrich::ContentField;
use crate::error::AppError;
use crate::logger;
use crate::picture::DatePolicy;

/// Key the picture service accepts for low-volume anonymous use.
pub const NASA_DEMO_KEY: &str = "DEMO_KEY";

/// Picture-of-the-day service settings (`[picture]`).
#[derive(Debug, Clone)]
pub struct PictureConfig {
    pub api_base_url: String,
    pub timeout_seconds: u64,
    /// Attempt budget used when the caller does not pass one.
    pub max_attempts: u32,
    pub date_policy: DatePolicy,
    /// Fixed anchor date; `None` means today (UTC).
    pub anchor_date: Option<NaiveDate>,
}

/// Generative content service settings (`[content]`).
#[derive(Debug, Clone)]
pub struct ContentConfig {
    pub api_base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
    /// Fields fetched when the caller does not name any.
    pub fields: Vec<ContentField>,
}

/// Encyclopedia lookup settings (`[lookup]`).
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub api_base_url: String,
    pub timeout_seconds: u64,
}

/// Keys read from the environment.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub nasa: Option<String>,
    pub gemini: Option<String>,
}

impl ApiKeys {
    pub fn from_env() -> Self {
        let read = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self { nasa: read("NASA_API_KEY"), gemini: read("GEMINI_API_KEY") }
    }
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub picture: PictureConfig,
    pub content: ContentConfig,
    pub lookup: LookupConfig,
    /// Falls back to [`NASA_DEMO_KEY`].
    pub nasa_api_key: String,
    /// `None` leaves enrichment fields failing with a placeholder.
    pub gemini_api_key: Option<String>,
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    app: RawApp,
    #[serde(default)]
    picture: RawPicture,
    #[serde(default)]
    content: RawContent,
    #[serde(default)]
    lookup: RawLookup,
}

#[derive(Deserialize)]
struct RawApp {
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawApp {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

#[derive(Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
enum RawDatePolicy {
    #[default]
    WalkBack,
    SeededWindow,
}

#[derive(Deserialize)]
struct RawPicture {
    #[serde(default = "default_picture_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,
    #[serde(default)]
    date_policy: RawDatePolicy,
    #[serde(default = "default_window_days")]
    window_days: u32,
    #[serde(default)]
    seed: u64,
    #[serde(default)]
    anchor_date: Option<String>,
}

impl Default for RawPicture {
    fn default() -> Self {
        Self {
            api_base_url: default_picture_api_base_url(),
            timeout_seconds: default_timeout_seconds(),
            max_attempts: default_max_attempts(),
            date_policy: RawDatePolicy::default(),
            window_days: default_window_days(),
            seed: 0,
            anchor_date: None,
        }
    }
}

#[derive(Deserialize)]
struct RawContent {
    #[serde(default = "default_content_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_content_model")]
    model: String,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
    #[serde(default = "default_fields")]
    fields: Vec<ContentField>,
}

impl Default for RawContent {
    fn default() -> Self {
        Self {
            api_base_url: default_content_api_base_url(),
            model: default_content_model(),
            timeout_seconds: default_timeout_seconds(),
            fields: default_fields(),
        }
    }
}

#[derive(Deserialize)]
struct RawLookup {
    #[serde(default = "default_lookup_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawLookup {
    fn default() -> Self {
        Self { api_base_url: default_lookup_api_base_url(), timeout_seconds: default_timeout_seconds() }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_picture_api_base_url() -> String { "https://api.nasa.gov".to_string() }
fn default_content_api_base_url() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_content_model() -> String { "gemini-2.0-flash".to_string() }
fn default_lookup_api_base_url() -> String { "https://en.wikipedia.org".to_string() }
fn default_timeout_seconds() -> u64 { 30 }
fn default_max_attempts() -> u32 { 7 }
fn default_window_days() -> u32 { 30 }
fn default_fields() -> Vec<ContentField> { ContentField::ALL.to_vec() }

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load config from `path` (default `config/default.toml`), then apply env overrides.
pub fn load(path: Option<&str>) -> Result<Config, AppError> {
    let path = PathBuf::from(path.unwrap_or("config/default.toml"));
    let log_level_override = env::var("STELLAR_LOG_LEVEL").ok();
    load_from(&path, log_level_override.as_deref(), ApiKeys::from_env())
}

/// Loader with an explicit path and overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(path: &Path, log_level_override: Option<&str>, keys: ApiKeys) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;
    resolve(parsed, log_level_override, keys)
}

fn resolve(parsed: RawConfig, log_level_override: Option<&str>, keys: ApiKeys) -> Result<Config, AppError> {
    let p = parsed.picture;

    let date_policy = match p.date_policy {
        RawDatePolicy::WalkBack => DatePolicy::WalkBack,
        RawDatePolicy::SeededWindow if p.window_days == 0 => {
            return Err(AppError::Config("picture.window_days must be at least 1".into()));
        }
        RawDatePolicy::SeededWindow => DatePolicy::SeededWindow { window_days: p.window_days, seed: p.seed },
    };
    let anchor_date = p
        .anchor_date
        .as_deref()
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|e| AppError::Config(format!("picture.anchor_date '{s}' is not YYYY-MM-DD: {e}")))
        })
        .transpose()?;

    let log_level = log_level_override.unwrap_or(&parsed.app.log_level).trim().to_string();
    logger::validate(&log_level).map_err(|e| AppError::Config(format!("app.log_level: {e}")))?;

    if parsed.content.fields.is_empty() {
        return Err(AppError::Config("content.fields must name at least one field".into()));
    }

    Ok(Config {
        log_level,
        picture: PictureConfig {
            api_base_url: p.api_base_url,
            timeout_seconds: p.timeout_seconds,
            max_attempts: p.max_attempts,
            date_policy,
            anchor_date,
        },
        content: ContentConfig {
            api_base_url: parsed.content.api_base_url,
            model: parsed.content.model,
            timeout_seconds: parsed.content.timeout_seconds,
            fields: parsed.content.fields,
        },
        lookup: LookupConfig {
            api_base_url: parsed.lookup.api_base_url,
            timeout_seconds: parsed.lookup.timeout_seconds,
        },
        nasa_api_key: keys.nasa.unwrap_or_else(|| NASA_DEMO_KEY.to_string()),
        gemini_api_key: keys.gemini,
    })
}

// ── test helpers ──────────────────────────────────────────────────────────────

#[cfg(test)]
impl Config {
    /// Config pointing every service at `base_url`, for tests against a local mock server.
    pub fn test_default(base_url: &str) -> Self {
        Self {
            log_level: "info".into(),
            picture: PictureConfig {
                api_base_url: base_url.into(),
                timeout_seconds: 2,
                max_attempts: 3,
                date_policy: DatePolicy::WalkBack,
                anchor_date: NaiveDate::from_ymd_opt(2024, 6, 10),
            },
            content: ContentConfig {
                api_base_url: base_url.into(),
                model: "test-model".into(),
                timeout_seconds: 2,
                fields: ContentField::ALL.to_vec(),
            },
            lookup: LookupConfig { api_base_url: base_url.into(), timeout_seconds: 2 },
            nasa_api_key: "test-nasa".into(),
            gemini_api_key: Some("test-gemini".into()),
        }
    }
}
