//! Configuration validation.
//!
//! # Responsibilities
//! - Every backend service has an address
//! - Validate value ranges (timeouts > 0, port valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::backends::ServiceKind;
use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("environment variable {:?} not set", .0.env_key())]
    MissingServiceAddr(ServiceKind),

    #[error("listener port must be non-zero")]
    ZeroPort,

    #[error("timeout {0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("metrics address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a configuration, returning every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for kind in ServiceKind::ALL {
        if config.services.get(kind).trim().is_empty() {
            errors.push(ValidationError::MissingServiceAddr(kind));
        }
    }

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    let timeouts = [
        ("dial_secs", config.timeouts.dial_secs),
        ("rpc_secs", config.timeouts.rpc_secs),
        ("request_secs", config.timeouts.request_secs),
    ];
    for (name, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_reports_every_missing_service() {
        let errors = validate_config(&GatewayConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 6);
        for kind in ServiceKind::ALL {
            assert!(errors.contains(&ValidationError::MissingServiceAddr(kind)));
        }
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut config = GatewayConfig::default();
        for kind in ServiceKind::ALL {
            *config.services.slot_mut(kind) = "localhost:1".into();
        }
        config.timeouts.dial_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::ZeroTimeout("dial_secs")]);
    }

    #[test]
    fn test_missing_message_names_env_key() {
        let err = ValidationError::MissingServiceAddr(ServiceKind::Checkout);
        assert_eq!(
            err.to_string(),
            "environment variable \"CHECKOUT_SERVICE_ADDR\" not set"
        );
    }

    #[test]
    fn test_bad_metrics_address_rejected() {
        let mut config = GatewayConfig::default();
        for kind in ServiceKind::ALL {
            *config.services.slot_mut(kind) = "localhost:1".into();
        }
        config.observability.metrics_address = Some("not-an-addr".into());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidMetricsAddress("not-an-addr".into())]
        );
    }
}
