use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const PLACEHOLDER_API_KEY: &str = "your_gemini_api_key_here";

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but invalid.
#[derive(Clone)]
pub struct Config {
    /// `None` disables the generative tier.
    pub gemini_api_key: Option<String>,
    pub generative_tier_enabled: bool,
    pub curated_tier_enabled: bool,
    pub blend_curated: bool,
    pub max_recommendations: usize,
    pub generation_timeout: Duration,
    pub link_check_timeout: Duration,
    pub link_check_budget: Duration,
    pub link_check_concurrency: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let gemini_api_key = get("GEMINI_API_KEY").filter(|k| k != PLACEHOLDER_API_KEY);

        let curated_tier_enabled = match get("CURATED_TIER_ENABLED") {
            Some(v) => parse_bool("CURATED_TIER_ENABLED", &v)?,
            None => optional_bool(&get, "FALLBACK_ENABLED", true)?,
        };

        Ok(Config {
            gemini_api_key,
            generative_tier_enabled: optional_bool(&get, "GENERATIVE_TIER_ENABLED", true)?,
            curated_tier_enabled,
            blend_curated: optional_bool(&get, "BLEND_CURATED", false)?,
            max_recommendations: ranged(&get, "MAX_RECOMMENDATIONS", 7, 5..=8)?,
            generation_timeout: Duration::from_secs(ranged(
                &get,
                "GENERATION_TIMEOUT_SECS",
                30,
                1..=30,
            )?),
            link_check_timeout: Duration::from_secs(ranged(
                &get,
                "LINK_CHECK_TIMEOUT_SECS",
                10,
                1..=10,
            )?),
            link_check_budget: Duration::from_secs(ranged(
                &get,
                "LINK_CHECK_BUDGET_SECS",
                20,
                1..=120,
            )?),
            link_check_concurrency: ranged(&get, "LINK_CHECK_CONCURRENCY", 4, 1..=32)?,
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// The generative tier runs only with a key and the flag on.
    pub fn generative_available(&self) -> bool {
        self.generative_tier_enabled && self.gemini_api_key.is_some()
    }

    /// API key safe for logs: first 8 and last 4 characters.
    pub fn masked_api_key(&self) -> String {
        match &self.gemini_api_key {
            Some(key) if key.chars().count() > 12 => {
                let chars: Vec<char> = key.chars().collect();
                let head: String = chars[..8].iter().collect();
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("{head}...{tail}")
            }
            Some(_) => "****".to_string(),
            None => "<unset>".to_string(),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{key} must be a boolean, got '{other}'"),
    }
}

fn optional_bool(get: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> Result<bool> {
    match get(key) {
        Some(v) => parse_bool(key, &v),
        None => Ok(default),
    }
}

fn ranged<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T>
where
    T: FromStr + PartialOrd + std::fmt::Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = match get(key) {
        Some(v) => v
            .parse::<T>()
            .with_context(|| format!("{key} must be a number, got '{v}'"))?,
        None => default,
    };
    if !range.contains(&value) {
        bail!(
            "{key} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        );
    }
    Ok(value)
}
