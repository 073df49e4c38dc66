//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (pool size > 0, timeouts > 0)
//! - Check that addresses and backend URLs parse
//! - Keep probe timeouts inside the request timeout so a hung backend
//!   shows up as DOWN in the health report rather than a timed-out request
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CompositeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::CompositeConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("pool.max_concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("pool.name must not be empty")]
    EmptyPoolName,

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("backends.{backend}.base_url is not a valid http(s) URL: {value}")]
    InvalidBackendUrl { backend: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error(
        "health.probe_timeout_ms ({probe_ms}) must be below timeouts.request_secs ({request_secs}s)"
    )]
    ProbeTimeoutNotBelowRequest { probe_ms: u64, request_secs: u64 },
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &CompositeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.pool.max_concurrency == 0 {
        errors.push(ValidationError::ZeroConcurrency);
    }
    if config.pool.name.trim().is_empty() {
        errors.push(ValidationError::EmptyPoolName);
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let backends = [
        ("product", &config.backends.product.base_url),
        ("recommendation", &config.backends.recommendation.base_url),
        ("review", &config.backends.review.base_url),
    ];
    for (backend, value) in backends {
        let valid = Url::parse(value)
            .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidBackendUrl {
                backend,
                value: value.clone(),
            });
        }
    }

    let timeouts = [
        ("health.probe_timeout_ms", config.health.probe_timeout_ms),
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.backend_secs", config.timeouts.backend_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ];
    for (field, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout { field });
        }
    }

    let request_ms = config.timeouts.request_secs.saturating_mul(1000);
    if request_ms > 0 && config.health.probe_timeout_ms >= request_ms {
        errors.push(ValidationError::ProbeTimeoutNotBelowRequest {
            probe_ms: config.health.probe_timeout_ms,
            request_secs: config.timeouts.request_secs,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&CompositeConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = CompositeConfig::default();
        config.pool.max_concurrency = 0;
        config.backends.recommendation.base_url = "not a url".into();
        config.health.probe_timeout_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroConcurrency));
        assert!(errors.contains(&ValidationError::ZeroTimeout {
            field: "health.probe_timeout_ms"
        }));
        assert!(matches!(
            errors[1],
            ValidationError::InvalidBackendUrl { backend: "recommendation", .. }
        ));
    }

    #[test]
    fn test_probe_timeout_must_fit_in_request_timeout() {
        let mut config = CompositeConfig::default();
        config.timeouts.request_secs = 1;
        config.health.probe_timeout_ms = 3000;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::ProbeTimeoutNotBelowRequest {
                probe_ms: 3000,
                request_secs: 1,
            }]
        );

        config.health.probe_timeout_ms = 1000;
        assert!(validate_config(&config).is_err());

        config.health.probe_timeout_ms = 999;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_queue_depth_is_allowed() {
        let mut config = CompositeConfig::default();
        config.pool.max_queue_depth = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = CompositeConfig::default();
        config.observability.metrics_enabled = false;
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());
    }
}
