use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clustering::{ai::OpenAiOracle, ClusteringConfig};
use dotenvy::dotenv;
use secrecy::{ExposeSecret, SecretString};

const DEFAULT_PORT: u16 = 8003;
const DEFAULT_MODEL: &str = "gpt-4o";

/// Application configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub openai_api_key: SecretString,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub clustering: ClusteringConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = parse_optional(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);

        let api_key = lookup("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;
        if api_key.trim().is_empty() {
            bail!("OPENAI_API_KEY must not be empty");
        }
        let openai_model = lookup("OPENAI_MODEL")
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let openai_base_url = lookup("OPENAI_BASE_URL").filter(|url| !url.trim().is_empty());

        let mut clustering = ClusteringConfig::default();
        if let Some(size) = parse_optional(&lookup, "CLUSTER_MAX_BATCH_SIZE")? {
            clustering = clustering.with_max_batch_size(size);
        }
        if let Some(max) = parse_optional(&lookup, "CLUSTER_MAX_CLUSTERS")? {
            clustering = clustering.with_max_clusters(max);
        }
        if let Some(secs) = parse_optional::<u64>(&lookup, "CLUSTER_ORACLE_TIMEOUT_SECS")? {
            clustering = clustering.with_oracle_timeout(Duration::from_secs(secs));
        }
        if let Some(n) = parse_optional(&lookup, "CLUSTER_MAX_CONCURRENT_BATCHES")? {
            clustering = clustering.with_max_concurrent_batches(n);
        }

        Ok(Self {
            port,
            openai_api_key: SecretString::from(api_key),
            openai_model,
            openai_base_url,
            clustering,
        })
    }

    /// Build the OpenAI oracle described by this configuration
    pub fn openai_oracle(&self) -> OpenAiOracle {
        let key = SecretString::from(self.openai_api_key.expose_secret().to_owned());
        let oracle = OpenAiOracle::new(key).with_model(self.openai_model.as_str());
        match &self.openai_base_url {
            Some(url) => oracle.with_base_url(url.as_str()),
            None => oracle,
        }
    }
}

fn parse_optional<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .with_context(|| format!("{key} must be a valid number"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.port, 8003);
        assert_eq!(config.openai_model, "gpt-4o");
        assert!(config.openai_base_url.is_none());
        assert_eq!(config.clustering.max_batch_size, 50);
        assert_eq!(config.clustering.max_clusters, 20);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "9000"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("CLUSTER_MAX_BATCH_SIZE", "25"),
            ("CLUSTER_ORACLE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.openai_base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(config.clustering.max_batch_size, 25);
        assert_eq!(config.clustering.oracle_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_api_key() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_invalid_number() {
        let err = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("CLUSTER_MAX_CLUSTERS", "many"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("CLUSTER_MAX_CLUSTERS must be a valid number"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-very-secret")])).unwrap();
        assert!(!format!("{:?}", config).contains("sk-very-secret"));
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let err = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "   ")])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY must not be empty"));
    }

    #[test]
    fn test_openai_oracle_from_config() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4.1"),
            ("OPENAI_BASE_URL", "http://proxy/v1/"),
        ]))
        .unwrap();

        let oracle = config.openai_oracle();

        assert_eq!(oracle.model(), "gpt-4.1");
        assert_eq!(oracle.base_url(), "http://proxy/v1");
    }
}
