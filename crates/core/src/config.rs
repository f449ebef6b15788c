//! Core runtime configuration.
//!
//! Resolved once at process startup and passed into core services, so no
//! request-handling code reads process-wide environment variables.

use std::time::Duration;

use crate::error::{CdrError, CdrResult};

const DEFAULT_EXTERNAL_TIMEOUT_MS: u64 = 3_000;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    demographic_base_url: String,
    metadata_base_url: String,
    external_call_timeout: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        demographic_base_url: String,
        metadata_base_url: String,
        external_call_timeout: Duration,
    ) -> CdrResult<Self> {
        if demographic_base_url.trim().is_empty() {
            return Err(CdrError::Validation(
                "demographic_base_url cannot be empty".into(),
            ));
        }
        if metadata_base_url.trim().is_empty() {
            return Err(CdrError::Validation(
                "metadata_base_url cannot be empty".into(),
            ));
        }
        if external_call_timeout.is_zero() {
            return Err(CdrError::Validation(
                "external_call_timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            demographic_base_url: demographic_base_url.trim_end_matches('/').to_string(),
            metadata_base_url: metadata_base_url.trim_end_matches('/').to_string(),
            external_call_timeout,
        })
    }

    pub fn demographic_base_url(&self) -> &str {
        &self.demographic_base_url
    }

    pub fn metadata_base_url(&self) -> &str {
        &self.metadata_base_url
    }

    /// Bounded deadline applied to every call to an external service.
    pub fn external_call_timeout(&self) -> Duration {
        self.external_call_timeout
    }
}

/// Parse the external-call timeout from its env-value form (milliseconds).
///
/// `None` falls back to the 3s default.
pub fn external_timeout_from_env_value(value: Option<String>) -> CdrResult<Duration> {
    match value {
        None => Ok(Duration::from_millis(DEFAULT_EXTERNAL_TIMEOUT_MS)),
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| {
                CdrError::Validation(format!(
                    "EXTERNAL_CALL_TIMEOUT_MS must be an integer number of milliseconds, got {raw}"
                ))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped_from_base_urls() {
        let cfg = CoreConfig::new(
            "http://demographic:8080/".into(),
            "http://metadata:8080".into(),
            Duration::from_secs(3),
        )
        .unwrap();

        assert_eq!(cfg.demographic_base_url(), "http://demographic:8080");
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let result = CoreConfig::new("  ".into(), "http://m".into(), Duration::from_secs(3));
        assert!(matches!(result, Err(CdrError::Validation(_))));
    }

    #[test]
    fn timeout_env_value_defaults_and_parses() {
        assert_eq!(
            external_timeout_from_env_value(None).unwrap(),
            Duration::from_millis(3_000)
        );
        assert_eq!(
            external_timeout_from_env_value(Some("250".into())).unwrap(),
            Duration::from_millis(250)
        );
        assert!(external_timeout_from_env_value(Some("fast".into())).is_err());
    }
}
