//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that the generation route limit covers the backend wait
//! - Check that routed paths are literal and do not collide with `/healthz`
//! - Keep the pass-through's own timeout inside the server-wide one
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// Served by the gateway itself on every configuration.
pub const HEALTH_PATH: &str = "/healthz";

/// A single violated configuration rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("backend.base_url: {0}")]
    InvalidBackendUrl(String),

    #[error("{field}: must start with '/' (got {value:?})")]
    InvalidPath { field: &'static str, value: String },

    #[error("{field}: route paths must be literal, without '{{' or '}}' (got {value:?})")]
    RouteSyntax { field: &'static str, value: String },

    #[error("{field}: {value:?} is reserved for the health check")]
    ReservedPath { field: &'static str, value: String },

    #[error("{0}: must be greater than zero")]
    Zero(&'static str),

    #[error(
        "generation.timeout_ms ({timeout_ms}) exceeds generation.max_duration_secs ({max_duration_secs}s)"
    )]
    GenerationExceedsRouteLimit {
        timeout_ms: u64,
        max_duration_secs: u64,
    },

    #[error(
        "passthrough.timeout_secs ({passthrough_secs}) must be below timeouts.request_secs ({request_secs})"
    )]
    PassthroughExceedsRequestTimeout {
        passthrough_secs: u64,
        request_secs: u64,
    },

    #[error("passthrough requires an http backend (got scheme {0:?})")]
    PassthroughScheme(String),
}

/// Check every semantic rule, collecting all violations.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    match Url::parse(&config.backend.base_url) {
        Ok(url) if !matches!(url.scheme(), "http" | "https") => {
            errors.push(ValidationError::InvalidBackendUrl(format!(
                "unsupported scheme {:?}",
                url.scheme()
            )));
        }
        Ok(url) if url.host_str().is_none() => {
            errors.push(ValidationError::InvalidBackendUrl("missing host".into()));
        }
        Ok(url) => {
            if config.passthrough.enabled && url.scheme() != "http" {
                errors.push(ValidationError::PassthroughScheme(url.scheme().to_string()));
            }
        }
        Err(e) => errors.push(ValidationError::InvalidBackendUrl(e.to_string())),
    }

    for (field, value) in [
        ("generation.path", &config.generation.path),
        ("generation.upstream_path", &config.generation.upstream_path),
        ("passthrough.prefix", &config.passthrough.prefix),
    ] {
        if !value.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                field,
                value: value.clone(),
            });
        }
    }

    for (field, value) in [
        ("generation.path", &config.generation.path),
        ("passthrough.prefix", &config.passthrough.prefix),
    ] {
        if value.contains(['{', '}']) {
            errors.push(ValidationError::RouteSyntax {
                field,
                value: value.clone(),
            });
        }
    }

    if config.generation.path.trim_end_matches('/') == HEALTH_PATH {
        errors.push(ValidationError::ReservedPath {
            field: "generation.path",
            value: config.generation.path.clone(),
        });
    }

    for (field, value) in [
        ("backend.connect_timeout_secs", config.backend.connect_timeout_secs),
        ("generation.timeout_ms", config.generation.timeout_ms),
        ("generation.max_duration_secs", config.generation.max_duration_secs),
        ("passthrough.timeout_secs", config.passthrough.timeout_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("security.max_body_size", config.security.max_body_size as u64),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if config.generation.timeout_ms > config.generation.max_duration_secs.saturating_mul(1000) {
        errors.push(ValidationError::GenerationExceedsRouteLimit {
            timeout_ms: config.generation.timeout_ms,
            max_duration_secs: config.generation.max_duration_secs,
        });
    }

    if config.passthrough.enabled
        && config.passthrough.timeout_secs >= config.timeouts.request_secs
    {
        errors.push(ValidationError::PassthroughExceedsRequestTimeout {
            passthrough_secs: config.passthrough.timeout_secs,
            request_secs: config.timeouts.request_secs,
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
