//! Application configuration sourced from the environment.
//!
//! Missing required values are fatal at startup, never per-request:
//! a server that cannot sign unsubscribe links or reach its database has
//! nothing useful to serve.

use std::net::SocketAddr;

use crate::domain::{SigningSecret, SiteUrl};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SITE_URL: &str = "https://poke.community";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Errors raised while reading configuration at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset.
    #[error("required environment variable {name} is not set")]
    Missing {
        /// Variable name.
        name: &'static str,
    },
    /// A variable is set but unusable.
    #[error("environment variable {name} is invalid: {message}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// What made it unusable.
        message: String,
    },
}

/// Resolved application configuration.
#[derive(Debug)]
pub struct AppConfig {
    /// Socket address the HTTP server binds.
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Public base URL used in emails and unsubscribe links.
    pub site_url: SiteUrl,
    /// Secret keying the unsubscribe token MAC.
    pub unsubscribe_secret: SigningSecret,
    /// Resend API key; the dispatcher is disabled when unset.
    pub resend_api_key: Option<String>,
    /// File holding the session cookie key material.
    pub session_key_file: String,
    /// Allow an ephemeral session key when the key file is unreadable.
    pub allow_ephemeral_session_key: bool,
    /// Whether session cookies require HTTPS.
    pub cookie_secure: bool,
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary lookup, for tests.
    ///
    /// # Errors
    ///
    /// Same contract as [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr_raw =
            lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr: SocketAddr =
            bind_addr_raw
                .parse()
                .map_err(|err| ConfigError::Invalid {
                    name: "BIND_ADDR",
                    message: format!("{err}"),
                })?;

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing {
            name: "DATABASE_URL",
        })?;

        let unsubscribe_secret = lookup("UNSUBSCRIBE_SECRET")
            .filter(|secret| !secret.is_empty())
            .map(|secret| SigningSecret::new(secret.into_bytes()))
            .ok_or(ConfigError::Missing {
                name: "UNSUBSCRIBE_SECRET",
            })?;

        let site_url =
            SiteUrl::new(lookup("SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_owned()));

        Ok(Self {
            bind_addr,
            database_url,
            site_url,
            unsubscribe_secret,
            resend_api_key: lookup("RESEND_API_KEY").filter(|key| !key.is_empty()),
            session_key_file: lookup("SESSION_KEY_FILE")
                .unwrap_or_else(|| DEFAULT_SESSION_KEY_FILE.to_owned()),
            allow_ephemeral_session_key: lookup("SESSION_ALLOW_EPHEMERAL").as_deref()
                == Some("1"),
            cookie_secure: lookup("SESSION_COOKIE_SECURE")
                .map(|value| value != "0")
                .unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn minimal_configuration_applies_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/poke"),
            ("UNSUBSCRIBE_SECRET", "secret"),
        ]))
        .expect("config resolves");

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.site_url, SiteUrl::new(DEFAULT_SITE_URL));
        assert!(config.resend_api_key.is_none());
        assert!(config.cookie_secure);
        assert!(!config.allow_ephemeral_session_key);
    }

    #[test]
    fn missing_database_url_is_fatal() {
        let error = AppConfig::from_lookup(lookup_from(&[("UNSUBSCRIBE_SECRET", "secret")]))
            .expect_err("missing variable");
        assert_eq!(
            error,
            ConfigError::Missing {
                name: "DATABASE_URL"
            }
        );
    }

    #[test]
    fn missing_signing_secret_is_fatal() {
        let error = AppConfig::from_lookup(lookup_from(&[(
            "DATABASE_URL",
            "postgres://localhost/poke",
        )]))
        .expect_err("missing variable");
        assert_eq!(
            error,
            ConfigError::Missing {
                name: "UNSUBSCRIBE_SECRET"
            }
        );
    }

    #[test]
    fn empty_signing_secret_counts_as_missing() {
        let error = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/poke"),
            ("UNSUBSCRIBE_SECRET", ""),
        ]))
        .expect_err("empty secret");
        assert!(matches!(error, ConfigError::Missing { .. }));
    }

    #[test]
    fn malformed_bind_addr_is_invalid() {
        let error = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/poke"),
            ("UNSUBSCRIBE_SECRET", "secret"),
            ("BIND_ADDR", "not-an-addr"),
        ]))
        .expect_err("invalid bind addr");
        assert!(matches!(error, ConfigError::Invalid { name: "BIND_ADDR", .. }));
    }

    #[test]
    fn cookie_security_can_be_disabled_for_local_runs() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/poke"),
            ("UNSUBSCRIBE_SECRET", "secret"),
            ("SESSION_COOKIE_SECURE", "0"),
            ("SESSION_ALLOW_EPHEMERAL", "1"),
        ]))
        .expect("config resolves");
        assert!(!config.cookie_secure);
        assert!(config.allow_ephemeral_session_key);
    }
}
