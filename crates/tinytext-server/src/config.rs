//! Server Configuration
//!
//! Read from Shuttle secrets (`Secrets.toml`) through a lookup function so
//! parsing can be tested without a secret store.

use std::path::PathBuf;
use std::time::Duration;

use tinytext::{Catalog, DomainError, Language, VisionOptions};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL_TIERS: &str = "gpt-4o-mini,gpt-4o";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_COMPLETION_TOKENS: u32 = 700;
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_STATIC_DIR: &str = "public";

/// Separator between regexes in `FILLER_PATTERNS_<LANG>`
const PATTERN_SEPARATOR: &str = "||";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// OpenAI API key. Without it every summarize request fails with 500.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    /// Ordered model tiers, cheapest first
    pub model_tiers: Vec<String>,
    pub default_lang: String,
    pub timeout: Duration,
    pub max_completion_tokens: u32,
    pub max_body_bytes: usize,
    pub static_dir: PathBuf,
    /// Extra filler patterns per language code
    pub filler_patterns: Vec<(String, Vec<String>)>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            model_tiers: split_list(DEFAULT_MODEL_TIERS),
            default_lang: Language::DEFAULT_CODE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_completion_tokens: DEFAULT_MAX_COMPLETION_TOKENS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            filler_patterns: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Build from a key lookup (e.g. `|key| secrets.get(key)`)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let model_tiers = match get("MODEL_TIERS") {
            Some(raw) => split_list(&raw),
            None => defaults.model_tiers,
        };
        if model_tiers.is_empty() {
            return Err(DomainError::Configuration(
                "MODEL_TIERS must name at least one model".to_string(),
            ));
        }

        let filler_patterns = get("FILLER_LANGS")
            .map(|langs| split_list(&langs))
            .unwrap_or_default()
            .into_iter()
            .map(|lang| {
                let key = format!("FILLER_PATTERNS_{}", lang.to_uppercase().replace('-', "_"));
                let patterns = get(&key)
                    .map(|raw| {
                        raw.split(PATTERN_SEPARATOR)
                            .map(str::trim)
                            .filter(|p| !p.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default();
                (lang, patterns)
            })
            .collect();

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_base_url),
            model_tiers,
            default_lang: get("DEFAULT_LANG")
                .map(|lang| Language::new(lang).code().to_string())
                .unwrap_or(defaults.default_lang),
            timeout: Duration::from_secs(parse_number(
                get("OPENAI_TIMEOUT_SECS"),
                "OPENAI_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            max_completion_tokens: parse_number(
                get("MAX_COMPLETION_TOKENS"),
                "MAX_COMPLETION_TOKENS",
                DEFAULT_MAX_COMPLETION_TOKENS,
            )?,
            max_body_bytes: parse_number(
                get("MAX_BODY_BYTES"),
                "MAX_BODY_BYTES",
                DEFAULT_MAX_BODY_BYTES,
            )?,
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            filler_patterns,
        })
    }

    /// Catalog with configured filler patterns and default dictionary
    pub fn catalog(&self) -> Result<Catalog, DomainError> {
        let mut catalog = Catalog::builtin();
        if catalog.has_labels(&self.default_lang) {
            catalog = catalog.with_default_language(&self.default_lang)?;
        } else {
            tracing::warn!(
                "⚠️  No labels for DEFAULT_LANG '{}' - using '{}' labels",
                self.default_lang,
                catalog.default_language()
            );
        }

        for (lang, patterns) in &self.filler_patterns {
            if patterns.is_empty() {
                tracing::warn!("⚠️  FILLER_LANGS lists '{}' but no patterns were found", lang);
            }
            catalog = catalog.with_filler_patterns(lang, patterns)?;
        }
        Ok(catalog)
    }

    pub fn vision_options(&self) -> VisionOptions {
        VisionOptions {
            max_completion_tokens: self.max_completion_tokens,
            ..VisionOptions::default()
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_number<T: std::str::FromStr>(
    raw: Option<String>,
    key: &str,
    default: T,
) -> Result<T, DomainError> {
    match raw {
        Some(value) => value
            .parse()
            .map_err(|_| DomainError::Configuration(format!("{} must be a number, got '{}'", key, value))),
        None => Ok(default),
    }
}
