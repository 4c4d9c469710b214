//! Configuration for the BCRP client.

use crate::error::{BcrpError, BcrpResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Hard ceiling on series-by-group results.
pub const MAX_SERIES_RESULTS: usize = 50;

/// How keywords are compared against group names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Substring containment or a close token match.
    #[default]
    Fuzzy,
    /// Substring containment only.
    Substring,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BcrpConfig {
    /// Root of the statistics service; metadata and API paths are joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_metadata_path")]
    pub metadata_path: String,

    /// Language segment of the series API (`eng` or `esp`).
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Encoding label of the metadata CSV.
    #[serde(default = "default_metadata_encoding")]
    pub metadata_encoding: String,

    #[serde(default = "default_max_series_results")]
    pub max_series_results: usize,

    #[serde(default)]
    pub match_mode: MatchMode,

    /// Minimum similarity ratio for a fuzzy token match.
    #[serde(default = "default_match_cutoff")]
    pub match_cutoff: f64,
}

fn default_base_url() -> String {
    "https://estadisticas.bcrp.gob.pe/estadisticas/series/".to_string()
}

fn default_metadata_path() -> String {
    "metadata".to_string()
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("bcrp-mcp/{}", env!("CARGO_PKG_VERSION"))
}

fn default_metadata_encoding() -> String {
    "latin1".to_string()
}

fn default_max_series_results() -> usize {
    MAX_SERIES_RESULTS
}

fn default_match_cutoff() -> f64 {
    0.65
}

impl Default for BcrpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            metadata_path: default_metadata_path(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            metadata_encoding: default_metadata_encoding(),
            max_series_results: default_max_series_results(),
            match_mode: MatchMode::default(),
            match_cutoff: default_match_cutoff(),
        }
    }
}

impl BcrpConfig {
    /// Parse the base URL, ensuring it ends with a slash so joins append
    /// instead of replacing the last segment.
    pub fn base(&self) -> BcrpResult<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Ok(Url::parse(&raw)?)
    }

    pub fn metadata_url(&self) -> BcrpResult<Url> {
        Ok(self.base()?.join(&self.metadata_path)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Effective result cap, never above [`MAX_SERIES_RESULTS`].
    pub fn series_limit(&self) -> usize {
        self.max_series_results.min(MAX_SERIES_RESULTS)
    }

    /// Reject settings that would make every lookup fail.
    pub fn validate(&self) -> BcrpResult<()> {
        self.base()?;
        if !(0.0..=1.0).contains(&self.match_cutoff) {
            return Err(BcrpError::InvalidInput(format!(
                "match_cutoff must be within 0.0..=1.0, got {}",
                self.match_cutoff
            )));
        }
        if encoding_rs::Encoding::for_label(self.metadata_encoding.as_bytes()).is_none() {
            return Err(BcrpError::UnknownEncoding(self.metadata_encoding.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BcrpConfig::default();
        assert_eq!(config.language, "eng");
        assert_eq!(config.series_limit(), 50);
        assert_eq!(config.match_mode, MatchMode::Fuzzy);
        assert_eq!(
            config.metadata_url().unwrap().as_str(),
            "https://estadisticas.bcrp.gob.pe/estadisticas/series/metadata"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_url_without_trailing_slash() {
        let config = BcrpConfig {
            base_url: "http://127.0.0.1:9000/series".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.metadata_url().unwrap().as_str(),
            "http://127.0.0.1:9000/series/metadata"
        );
    }

    #[test]
    fn test_series_limit_is_capped() {
        let config = BcrpConfig {
            max_series_results: 500,
            ..Default::default()
        };
        assert_eq!(config.series_limit(), MAX_SERIES_RESULTS);

        let config = BcrpConfig {
            max_series_results: 10,
            ..Default::default()
        };
        assert_eq!(config.series_limit(), 10);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let config = BcrpConfig {
            match_cutoff: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BcrpConfig {
            metadata_encoding: "klingon".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BcrpError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: BcrpConfig =
            serde_json::from_str(r#"{"language": "esp", "match_mode": "substring"}"#).unwrap();
        assert_eq!(config.language, "esp");
        assert_eq!(config.match_mode, MatchMode::Substring);
        assert_eq!(config.timeout_secs, 30);
    }
}
