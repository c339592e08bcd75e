// JSON-file-backed bot configuration.
//
// The automod config lives in a small JSON file (word filter, spam
// threshold, spam window). The file is the source of truth; the core only
// ever sees an immutable snapshot.

use crate::core::automod::AutoModConfig;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Load the automod configuration from a JSON file.
///
/// Unknown keys are ignored (the file also carries settings for other
/// deployments of the bot); missing keys take their defaults.
pub fn load_automod_config(path: &Path) -> Result<AutoModConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let config: AutoModConfig = serde_json::from_str(&raw)?;
    Ok(config)
}

/// Load the config, falling back to defaults on any failure.
///
/// A moderation bot that starts with default thresholds beats one that
/// refuses to start over a missing file. A zero spam threshold would make
/// every message a trigger, so it is also replaced by the default.
pub fn load_or_default(path: &Path) -> AutoModConfig {
    let mut config = match load_automod_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Could not load config from {}: {} - using defaults", path.display(), e);
            AutoModConfig::default()
        }
    };

    if config.spam_threshold == 0 {
        let fallback = AutoModConfig::default().spam_threshold;
        tracing::warn!(
            "spam_threshold must be at least 1, replacing 0 with the default of {}",
            fallback
        );
        config.spam_threshold = fallback;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_all_fields() {
        let file = write_config(
            r#"{
                "word_filter": ["badword", "worse"],
                "spam_threshold": 3,
                "spam_interval": 15
            }"#,
        );

        let config = load_automod_config(file.path()).unwrap();
        assert_eq!(config.word_filter, vec!["badword", "worse"]);
        assert_eq!(config.spam_threshold, 3);
        assert_eq!(config.spam_interval_secs, 15);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let file = write_config(r#"{ "word_filter": ["x"] }"#);

        let config = load_automod_config(file.path()).unwrap();
        assert_eq!(config.word_filter, vec!["x"]);
        assert_eq!(config.spam_threshold, 5);
        assert_eq!(config.spam_interval_secs, 10);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let file = write_config(
            r#"{ "spam_threshold": 4, "mod_log_channel": "mod-log", "welcome_channel": "lobby" }"#,
        );

        let config = load_automod_config(file.path()).unwrap();
        assert_eq!(config.spam_threshold, 4);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let file = write_config("not json at all");
        assert!(matches!(
            load_automod_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let config = load_or_default(Path::new("does/not/exist.json"));
        assert_eq!(config.spam_threshold, 5);
        assert_eq!(config.spam_interval_secs, 10);
        assert!(config.word_filter.is_empty());
    }

    #[test]
    fn load_or_default_rejects_zero_threshold() {
        let file = write_config(r#"{ "spam_threshold": 0 }"#);
        let config = load_or_default(file.path());
        assert_eq!(config.spam_threshold, 5);
    }
}
