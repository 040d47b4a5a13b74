//! Engine and service configuration.
//!
//! `TriageConfig` is the immutable configuration handed to the engine at
//! construction. `ServiceSettings` covers the HTTP process around it. Both can
//! be read from the environment; `main` loads `.env` first.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use url::Url;
use validator::Validate;

use crate::error::AppError;
use crate::triage::category::default_intents;
use crate::triage::keywords::DEFAULT_MAX_KEYWORDS;
use crate::triage::lexicon::Lexicon;
use crate::triage::normalizer::NormalizerOptions;
use crate::triage::priority::{ScoringWeights, TierThresholds};

/// Characters of input forwarded to external models.
pub const DEFAULT_COLLABORATOR_MAX_CHARS: usize = 512;
pub const DEFAULT_COLLABORATOR_TIMEOUT_MS: u64 = 10_000;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8001;

/// Everything the triage engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TriageConfig {
    /// Matched case-insensitively
    pub vip_emails: Vec<String>,
    /// Matched exactly
    pub vip_sender_ids: Vec<String>,
    pub normalizer: NormalizerOptions,
    /// Category lexicon; declaration order breaks ties
    pub categories: Lexicon,
    /// Lexicon reported as urgency evidence
    pub evidence: Lexicon,
    /// Weighted lexicon behind the urgency sub-score
    pub severity: Lexicon,
    /// Category to intent
    pub intents: HashMap<String, String>,
    pub weights: ScoringWeights,
    pub thresholds: TierThresholds,
    #[validate(range(min = 1, max = 100))]
    pub max_keywords: usize,
    #[validate(range(min = 1))]
    pub collaborator_max_chars: usize,
    #[validate(range(min = 1, max = 300000))]
    pub collaborator_timeout_ms: u64,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            vip_emails: vec![],
            vip_sender_ids: vec![],
            normalizer: NormalizerOptions::default(),
            categories: Lexicon::default_categories(),
            evidence: Lexicon::default_evidence(),
            severity: Lexicon::default_severity(),
            intents: default_intents(),
            weights: ScoringWeights::default(),
            thresholds: TierThresholds::default(),
            max_keywords: DEFAULT_MAX_KEYWORDS,
            collaborator_max_chars: DEFAULT_COLLABORATOR_MAX_CHARS,
            collaborator_timeout_ms: DEFAULT_COLLABORATOR_TIMEOUT_MS,
        }
    }
}

impl TriageConfig {
    /// Run field range checks and the structural checks of every table.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        self.categories.validate("categories")?;
        self.evidence.validate("evidence")?;
        self.severity.validate("severity")?;
        self.weights.check()?;
        self.thresholds.check()?;

        if let Some((category, _)) = self.intents.iter().find(|(_, intent)| intent.trim().is_empty()) {
            return Err(AppError::Config(format!(
                "intents: category '{category}' maps to a blank intent"
            )));
        }
        Ok(())
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }

    /// Load a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            AppError::Config(format!("cannot parse {}: {}", path.display(), e))
        })?;
        config.check()?;
        Ok(config)
    }

    /// Defaults, overlaid with `TRIAGE_CONFIG` (JSON file), `VIP_EMAILS`,
    /// `VIP_SENDER_IDS` and `COLLABORATOR_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = match env::var("TRIAGE_CONFIG") {
            Ok(path) if !path.trim().is_empty() => {
                info!("Loading triage configuration from {}", path);
                Self::from_file(path.trim())?
            }
            _ => Self::default(),
        };

        if let Ok(raw) = env::var("VIP_EMAILS") {
            config.vip_emails = parse_list(&raw);
        }
        if let Ok(raw) = env::var("VIP_SENDER_IDS") {
            config.vip_sender_ids = parse_list(&raw);
        }
        if let Ok(raw) = env::var("COLLABORATOR_TIMEOUT_MS") {
            config.collaborator_timeout_ms = raw.trim().parse().map_err(|_| {
                AppError::Config(format!("COLLABORATOR_TIMEOUT_MS is not a number: '{raw}'"))
            })?;
        }

        config.check()?;
        Ok(config)
    }
}

/// Comma separated list, entries trimmed, empties dropped.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `true` only for a case-insensitive "true"; `default` when unset.
fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(raw) => raw.trim().eq_ignore_ascii_case("true"),
        Err(_) => default,
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    /// Bunyan JSON lines
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "" => Ok(LogFormat::Pretty),
            "json" | "bunyan" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!("unknown LOG_FORMAT '{other}'"))),
        }
    }
}

/// Process-level settings of the HTTP service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub host: String,
    pub port: u16,
    /// Base URL of the remote model service, if any
    pub ml_service_url: Option<Url>,
    pub ml_service_token: Option<String>,
    pub use_zero_shot: bool,
    pub use_transformer_sentiment: bool,
    pub log_format: LogFormat,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ml_service_url: None,
            ml_service_token: None,
            use_zero_shot: true,
            use_transformer_sentiment: false,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ServiceSettings {
    pub fn from_env() -> Result<Self, AppError> {
        let host = env::var("HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("PORT is not a valid port: '{raw}'")))?,
            Err(_) => DEFAULT_PORT,
        };

        let ml_service_url = match env::var("ML_SERVICE_URL") {
            Ok(raw) if !raw.trim().is_empty() => Some(Url::parse(raw.trim())?),
            _ => None,
        };

        let log_format = match env::var("LOG_FORMAT") {
            Ok(raw) => raw.parse()?,
            Err(_) => LogFormat::default(),
        };

        Ok(Self {
            host,
            port,
            ml_service_url,
            ml_service_token: env::var("ML_SERVICE_TOKEN").ok().filter(|t| !t.is_empty()),
            use_zero_shot: env_flag("USE_ZERO_SHOT", true),
            use_transformer_sentiment: env_flag("USE_TRANSFORMER_SENTIMENT", false),
            log_format,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TriageConfig::default();
        config.check().unwrap();
        assert_eq!(config.collaborator_timeout(), Duration::from_secs(10));
        assert_eq!(config.collaborator_max_chars, 512);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list(" a@x.com, ,B@y.com ,"),
            vec!["a@x.com".to_string(), "B@y.com".to_string()]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_rejects_out_of_range_fields() {
        let config = TriageConfig {
            max_keywords: 0,
            ..Default::default()
        };
        assert!(matches!(config.check(), Err(AppError::Validation(_))));

        let config = TriageConfig {
            thresholds: TierThresholds {
                critical: 0.3,
                high: 0.65,
                medium: 0.35,
            },
            ..Default::default()
        };
        assert!(matches!(config.check(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: TriageConfig =
            serde_json::from_str(r#"{"vip_emails": ["ceo@example.com"], "max_keywords": 5}"#)
                .unwrap();
        assert_eq!(config.vip_emails, vec!["ceo@example.com"]);
        assert_eq!(config.max_keywords, 5);
        assert_eq!(config.categories, Lexicon::default_categories());
        config.check().unwrap();
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
