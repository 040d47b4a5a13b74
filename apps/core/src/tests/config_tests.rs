//! Configuration Tests
//!
//! Environment and file loading for `TriageConfig` and `ServiceSettings`.

use crate::config::{LogFormat, ServiceSettings, TriageConfig};
use crate::error::AppError;
use std::io::Write;
use tempfile::NamedTempFile;

const TRIAGE_VARS: [&str; 4] = [
    "TRIAGE_CONFIG",
    "VIP_EMAILS",
    "VIP_SENDER_IDS",
    "COLLABORATOR_TIMEOUT_MS",
];

const SERVICE_VARS: [&str; 7] = [
    "HOST",
    "PORT",
    "ML_SERVICE_URL",
    "ML_SERVICE_TOKEN",
    "USE_ZERO_SHOT",
    "USE_TRANSFORMER_SENTIMENT",
    "LOG_FORMAT",
];

/// Run `f` with `set` applied and every other known variable unset.
fn with_env<R>(set: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
    let vars: Vec<(&str, Option<&str>)> = TRIAGE_VARS
        .iter()
        .chain(SERVICE_VARS.iter())
        .map(|name| {
            let value = set.iter().find(|(k, _)| k == name).map(|(_, v)| *v);
            (*name, value)
        })
        .collect();
    temp_env::with_vars(vars, f)
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[cfg(test)]
mod triage_config_tests {
    use super::*;

    #[test]
    fn test_defaults_without_environment() {
        let config = with_env(&[], TriageConfig::from_env).unwrap();
        assert_eq!(config, TriageConfig::default());
    }

    #[test]
    fn test_vip_lists_from_environment() {
        let config = with_env(
            &[
                ("VIP_EMAILS", " ceo@acme.com, ,CFO@acme.com "),
                ("VIP_SENDER_IDS", "u-1,u-2,"),
            ],
            TriageConfig::from_env,
        )
        .unwrap();

        assert_eq!(config.vip_emails, vec!["ceo@acme.com", "CFO@acme.com"]);
        assert_eq!(config.vip_sender_ids, vec!["u-1", "u-2"]);
    }

    #[test]
    fn test_collaborator_timeout_from_environment() {
        let config = with_env(&[("COLLABORATOR_TIMEOUT_MS", "2500")], TriageConfig::from_env)
            .unwrap();
        assert_eq!(config.collaborator_timeout_ms, 2500);

        let err = with_env(&[("COLLABORATOR_TIMEOUT_MS", "soon")], TriageConfig::from_env)
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = with_env(&[("COLLABORATOR_TIMEOUT_MS", "0")], TriageConfig::from_env)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let file = config_file(
            r#"{
                "vip_emails": ["from-file@acme.com"],
                "thresholds": { "critical": 0.9, "high": 0.7, "medium": 0.4 },
                "weights": { "vip_boost": 0.5 },
                "max_keywords": 3
            }"#,
        );
        let path = file.path().to_str().unwrap().to_string();

        let config = with_env(
            &[("TRIAGE_CONFIG", path.as_str()), ("VIP_SENDER_IDS", "u-9")],
            TriageConfig::from_env,
        )
        .unwrap();

        assert_eq!(config.vip_emails, vec!["from-file@acme.com"]);
        assert_eq!(config.vip_sender_ids, vec!["u-9"]);
        assert_eq!(config.thresholds.critical, 0.9);
        assert_eq!(config.weights.vip_boost, 0.5);
        assert_eq!(config.weights.negative_sentiment_weight, 0.2);
        assert_eq!(config.max_keywords, 3);
    }

    #[test]
    fn test_environment_vip_list_replaces_file_list() {
        let file = config_file(r#"{ "vip_emails": ["from-file@acme.com"] }"#);
        let path = file.path().to_str().unwrap().to_string();

        let config = with_env(
            &[("TRIAGE_CONFIG", path.as_str()), ("VIP_EMAILS", "from-env@acme.com")],
            TriageConfig::from_env,
        )
        .unwrap();
        assert_eq!(config.vip_emails, vec!["from-env@acme.com"]);
    }

    #[test]
    fn test_invalid_config_files() {
        let unparsable = config_file("{ not json");
        let err = TriageConfig::from_file(unparsable.path()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let duplicate_class = config_file(
            r#"{ "categories": [
                { "class_name": "billing", "keywords": ["invoice"] },
                { "class_name": "billing", "keywords": ["refund"] }
            ] }"#,
        );
        let err = TriageConfig::from_file(duplicate_class.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate class"));

        let inverted = config_file(r#"{ "thresholds": { "critical": 0.2 } }"#);
        assert!(TriageConfig::from_file(inverted.path()).is_err());

        let err = TriageConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn test_custom_lexicon_file() {
        let file = config_file(
            r#"{ "categories": [
                { "class_name": "billing", "keywords": ["invoice", "refund"] },
                { "class_name": "shipping", "keywords": ["parcel", "courier"], "weight": 0.5 }
            ] }"#,
        );

        let config = TriageConfig::from_file(file.path()).unwrap();
        assert_eq!(config.categories.class_names(), vec!["billing", "shipping"]);
        assert_eq!(config.categories.get("billing").unwrap().weight, 1.0);
        assert_eq!(config.categories.get("shipping").unwrap().weight, 0.5);
    }
}

#[cfg(test)]
mod service_settings_tests {
    use super::*;

    #[test]
    fn test_service_defaults() {
        let settings = with_env(&[], ServiceSettings::from_env).unwrap();

        assert_eq!(settings, ServiceSettings::default());
        assert_eq!(settings.bind_address(), "0.0.0.0:8001");
        assert!(settings.use_zero_shot);
        assert!(!settings.use_transformer_sentiment);
        assert_eq!(settings.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_service_overrides() {
        let settings = with_env(
            &[
                ("HOST", "127.0.0.1"),
                ("PORT", "9000"),
                ("ML_SERVICE_URL", "http://models.internal:8080/v1"),
                ("ML_SERVICE_TOKEN", "secret"),
                ("USE_ZERO_SHOT", "FALSE"),
                ("USE_TRANSFORMER_SENTIMENT", "True"),
                ("LOG_FORMAT", "json"),
            ],
            ServiceSettings::from_env,
        )
        .unwrap();

        assert_eq!(settings.bind_address(), "127.0.0.1:9000");
        assert_eq!(
            settings.ml_service_url.as_ref().map(|u| u.as_str()),
            Some("http://models.internal:8080/v1")
        );
        assert_eq!(settings.ml_service_token.as_deref(), Some("secret"));
        assert!(!settings.use_zero_shot);
        assert!(settings.use_transformer_sentiment);
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn test_flags_only_accept_true() {
        let settings = with_env(&[("USE_ZERO_SHOT", "yes")], ServiceSettings::from_env).unwrap();
        assert!(!settings.use_zero_shot);
    }

    #[test]
    fn test_invalid_service_settings() {
        let err = with_env(&[("PORT", "eighty")], ServiceSettings::from_env).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = with_env(&[("PORT", "70000")], ServiceSettings::from_env).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = with_env(&[("ML_SERVICE_URL", "not a url")], ServiceSettings::from_env)
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = with_env(&[("LOG_FORMAT", "xml")], ServiceSettings::from_env).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
