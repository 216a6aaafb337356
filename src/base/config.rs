//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::base::types::{QuoteError, Res};

// Defaults.

fn default_db_endpoint() -> String {
    "mem://".to_string()
}

fn default_db_namespace() -> String {
    "slack".to_string()
}

fn default_db_database() -> String {
    "quotes".to_string()
}

/// Configuration for the slack-quoter application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack app-level token for socket mode (`SLACK_QUOTER_SLACK_APP_TOKEN`).
    #[serde(default)]
    pub slack_app_token: String,
    /// Slack bot token used to read the directory and post replies (`SLACK_QUOTER_SLACK_BOT_TOKEN`).
    #[serde(default)]
    pub slack_bot_token: String,
    /// Slack user token with `stars:read`, `pins:read`, and `users:read`, used by the crawler (`SLACK_QUOTER_SLACK_LOADER_TOKEN`).
    #[serde(default)]
    pub slack_loader_token: Option<String>,
    /// The one channel the bot listens to and crawls pins from (`SLACK_QUOTER_CHANNEL_ID`).
    pub channel_id: String,
    /// Database endpoint URL (`SLACK_QUOTER_DB_ENDPOINT`), e.g. `ws://localhost:8000` or `mem://`.
    #[serde(default = "default_db_endpoint")]
    pub db_endpoint: String,
    /// Database username (`SLACK_QUOTER_DB_USERNAME`); only used for remote endpoints.
    #[serde(default)]
    pub db_username: Option<String>,
    /// Database password (`SLACK_QUOTER_DB_PASSWORD`).
    #[serde(default)]
    pub db_password: Option<String>,
    /// Database namespace (`SLACK_QUOTER_DB_NAMESPACE`).
    #[serde(default = "default_db_namespace")]
    pub db_namespace: String,
    /// Database name (`SLACK_QUOTER_DB_DATABASE`).
    #[serde(default = "default_db_database")]
    pub db_database: String,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("SLACK_QUOTER").prefix_separator("_"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Checks the fields every mode needs.
    pub fn validate(&self) -> Res<()> {
        if self.channel_id.trim().is_empty() {
            return Err(QuoteError::Config("`channel_id` must be set.".into()).into());
        }

        if self.db_endpoint.trim().is_empty() {
            return Err(QuoteError::Config("`db_endpoint` must not be empty.".into()).into());
        }

        if self.db_username.is_some() != self.db_password.is_some() {
            return Err(QuoteError::Config("`db_username` and `db_password` must be set together.".into()).into());
        }

        Ok(())
    }

    /// Checks the fields the live listener needs.
    pub fn validate_for_listen(&self) -> Res<()> {
        if self.slack_app_token.trim().is_empty() {
            return Err(QuoteError::Config("`slack_app_token` is required to listen.".into()).into());
        }

        if self.slack_bot_token.trim().is_empty() {
            return Err(QuoteError::Config("`slack_bot_token` is required to listen.".into()).into());
        }

        Ok(())
    }

    /// Checks the fields the crawler needs, returning the loader token.
    pub fn validate_for_crawl(&self) -> Res<&str> {
        match self.slack_loader_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(QuoteError::Config("`slack_loader_token` is required to crawl.".into()).into()),
        }
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn config(inner: ConfigInner) -> Config {
        Config { inner: Arc::new(inner) }
    }

    fn base() -> ConfigInner {
        ConfigInner {
            channel_id: "C123".to_string(),
            db_endpoint: default_db_endpoint(),
            db_namespace: default_db_namespace(),
            db_database: default_db_database(),
            ..Default::default()
        }
    }

    #[test]
    fn minimal_config_is_valid() {
        assert!(config(base()).validate().is_ok());
    }

    #[test]
    fn channel_is_required() {
        let cfg = config(ConfigInner { channel_id: " ".into(), ..base() });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn credentials_come_in_pairs() {
        let cfg = config(ConfigInner {
            db_username: Some("root".into()),
            ..base()
        });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn listen_needs_both_slack_tokens() {
        assert!(config(base()).validate_for_listen().is_err());

        let cfg = config(ConfigInner {
            slack_app_token: "xapp-1".into(),
            slack_bot_token: "xoxb-1".into(),
            ..base()
        });
        assert!(cfg.validate_for_listen().is_ok());
    }

    #[test]
    fn crawl_needs_loader_token() {
        assert!(config(base()).validate_for_crawl().is_err());

        let cfg = config(ConfigInner {
            slack_loader_token: Some("xoxp-1".into()),
            ..base()
        });
        assert_eq!(cfg.validate_for_crawl().unwrap(), "xoxp-1");
    }

    #[test]
    fn loads_from_toml_file_with_defaults() {
        let path = std::env::temp_dir().join(format!("slack-quoter-config-{}.toml", std::process::id()));
        std::fs::write(&path, "channel_id = \"C999\"\nslack_bot_token = \"xoxb-9\"\n").unwrap();

        let cfg = Config::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(cfg.channel_id, "C999");
        assert_eq!(cfg.slack_bot_token, "xoxb-9");
        assert_eq!(cfg.db_endpoint, "mem://");
        assert_eq!(cfg.db_namespace, "slack");
        assert_eq!(cfg.db_database, "quotes");
        assert!(cfg.slack_loader_token.is_none());
    }
}
