//! Process configuration loaded via OrthoConfig.
//!
//! Every value can come from `PORTAL_*` environment variables, a config file
//! or command-line flags. Accessors apply defaults and parse raw strings into
//! typed values so startup fails early on a bad setting.

use std::net::SocketAddr;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use crate::domain::RateLimitPolicy;
use crate::domain::rate_limiter::DEFAULT_MAX_ATTEMPTS;
use crate::inbound::bridge::OriginGuard;
use crate::protocol::{TargetOrigin, TargetOriginError};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SURFACE_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_RATE_LIMIT_WINDOW_SECS: i64 = 900;

/// Invalid configuration value.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not `host:port`.
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        /// Raw value.
        value: String,
        /// Parse failure.
        source: std::net::AddrParseError,
    },
    /// An origin is not a concrete web origin.
    #[error(transparent)]
    Origin(#[from] TargetOriginError),
    /// The backend URL is not absolute.
    #[error("invalid backend URL {value:?}: {source}")]
    BackendUrl {
        /// Raw value.
        value: String,
        /// Parse failure.
        source: url::ParseError,
    },
    /// A backend URL was given without an API key, or the reverse.
    #[error("backend URL and API key must be set together")]
    PartialBackend,
    /// The rate limit window or ceiling is zero or out of range.
    #[error("rate limit window and ceiling must be positive")]
    RateLimit,
}

/// Where backend calls go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendTarget {
    /// Seeded in-process store.
    Memory,
    /// Hosted table store and identity service.
    Rest {
        /// Project base URL.
        base_url: Url,
        /// Project API key.
        api_key: String,
    },
}

/// Configuration values for the portal server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct PortalSettings {
    /// Listen address, `host:port`.
    pub bind_addr: Option<String>,
    /// Comma-separated origins whose relayed messages are trusted.
    pub allowed_origins: Option<String>,
    /// Origin every outbound message is addressed to.
    pub surface_origin: Option<String>,
    /// Base URL of the hosted backend; absent selects the in-memory store.
    pub backend_url: Option<String>,
    /// API key of the hosted backend.
    pub api_key: Option<String>,
    /// Signup rate limit window in seconds.
    pub rate_limit_window_secs: Option<i64>,
    /// Signup attempts allowed per window.
    pub rate_limit_max_attempts: Option<usize>,
}

impl PortalSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Origin outbound messages are addressed to.
    pub fn surface_origin(&self) -> Result<TargetOrigin, SettingsError> {
        let value = self
            .surface_origin
            .as_deref()
            .unwrap_or(DEFAULT_SURFACE_ORIGIN);
        Ok(TargetOrigin::parse(value)?)
    }

    /// Sender allow-list; defaults to the surface origin alone.
    pub fn origin_guard(&self) -> Result<OriginGuard, SettingsError> {
        match self.allowed_origins.as_deref() {
            Some(list) => Ok(OriginGuard::parse(list.split(','))?),
            None => Ok(OriginGuard::new([self.surface_origin()?])),
        }
    }

    /// Backend selection.
    pub fn backend(&self) -> Result<BackendTarget, SettingsError> {
        let url = self.backend_url.as_deref().map(str::trim).filter(|v| !v.is_empty());
        let key = self.api_key.as_deref().map(str::trim).filter(|v| !v.is_empty());
        match (url, key) {
            (None, None) => Ok(BackendTarget::Memory),
            (Some(url), Some(key)) => {
                let base_url = Url::parse(url).map_err(|source| SettingsError::BackendUrl {
                    value: url.to_owned(),
                    source,
                })?;
                Ok(BackendTarget::Rest {
                    base_url,
                    api_key: key.to_owned(),
                })
            }
            _ => Err(SettingsError::PartialBackend),
        }
    }

    /// Signup rate limit policy.
    pub fn rate_limit_policy(&self) -> Result<RateLimitPolicy, SettingsError> {
        let seconds = self
            .rate_limit_window_secs
            .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS);
        let max_attempts = self.rate_limit_max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let window = TimeDelta::try_seconds(seconds)
            .filter(|window| *window > TimeDelta::zero())
            .ok_or(SettingsError::RateLimit)?;
        if max_attempts == 0 {
            return Err(SettingsError::RateLimit);
        }
        Ok(RateLimitPolicy {
            window,
            max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "PORTAL_BIND_ADDR",
        "PORTAL_ALLOWED_ORIGINS",
        "PORTAL_SURFACE_ORIGIN",
        "PORTAL_BACKEND_URL",
        "PORTAL_API_KEY",
        "PORTAL_RATE_LIMIT_WINDOW_SECS",
        "PORTAL_RATE_LIMIT_MAX_ATTEMPTS",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> PortalSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        PortalSettings::load_from_iter([OsString::from("portal")]).expect("config should load")
    }

    #[rstest]
    fn defaults_are_used_when_missing() {
        let settings = load_with(&[]);
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(
            settings.surface_origin().expect("origin").as_str(),
            "http://localhost:3000"
        );
        assert!(
            settings
                .origin_guard()
                .expect("guard")
                .is_trusted("http://localhost:3000")
        );
        assert_eq!(settings.backend().expect("backend"), BackendTarget::Memory);
        assert_eq!(
            settings.rate_limit_policy().expect("policy"),
            RateLimitPolicy::default()
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("PORTAL_BIND_ADDR", "127.0.0.1:9000"),
            (
                "PORTAL_ALLOWED_ORIGINS",
                "https://portal.example, https://staff.example",
            ),
            ("PORTAL_SURFACE_ORIGIN", "https://portal.example"),
            ("PORTAL_BACKEND_URL", "https://project.example"),
            ("PORTAL_API_KEY", "anon-key"),
            ("PORTAL_RATE_LIMIT_WINDOW_SECS", "60"),
            ("PORTAL_RATE_LIMIT_MAX_ATTEMPTS", "3"),
        ]);

        assert_eq!(settings.bind_addr().expect("bind").port(), 9000);
        let guard = settings.origin_guard().expect("guard");
        assert!(guard.is_trusted("https://staff.example"));
        assert!(!guard.is_trusted("http://localhost:3000"));
        assert_eq!(
            settings.backend().expect("backend"),
            BackendTarget::Rest {
                base_url: Url::parse("https://project.example").expect("url"),
                api_key: "anon-key".to_owned(),
            }
        );
        assert_eq!(
            settings.rate_limit_policy().expect("policy"),
            RateLimitPolicy {
                window: TimeDelta::seconds(60),
                max_attempts: 3,
            }
        );
    }

    #[rstest]
    #[case::url_only(&[("PORTAL_BACKEND_URL", "https://project.example")])]
    #[case::key_only(&[("PORTAL_API_KEY", "anon-key")])]
    fn partial_backend_configuration_is_rejected(#[case] overrides: &[(&str, &str)]) {
        let settings = load_with(overrides);
        assert!(matches!(
            settings.backend(),
            Err(SettingsError::PartialBackend)
        ));
    }

    #[rstest]
    #[case::wildcard_origin(&[("PORTAL_SURFACE_ORIGIN", "*")])]
    #[case::zero_window(&[("PORTAL_RATE_LIMIT_WINDOW_SECS", "0")])]
    #[case::bad_bind(&[("PORTAL_BIND_ADDR", "localhost")])]
    fn invalid_values_fail_at_startup(#[case] overrides: &[(&str, &str)]) {
        let settings = load_with(overrides);
        let failed = settings.surface_origin().is_err()
            || settings.rate_limit_policy().is_err()
            || settings.bind_addr().is_err();
        assert!(failed);
    }
}
