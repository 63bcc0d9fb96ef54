//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - The default target set must cover every protocol
//! - Value ranges (intervals > 0, addresses parse, header names valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over the decoded config
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;

use crate::config::schema::{GlobalConfig, ServiceConfig};
use crate::resolve::{Protocol, TargetSet};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("default has no {0} target")]
    MissingDefault(Protocol),

    #[error("{scope}: {protocol} host is empty")]
    EmptyHost { scope: String, protocol: Protocol },

    #[error("template with empty name")]
    EmptyTemplateName,

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("invalid auth header name '{0}'")]
    InvalidHeader(String),
}

/// One-line summary of a list of problems.
pub fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check the decoded global targets.
pub fn validate_global(config: &GlobalConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors: Vec<ValidationError> = config
        .default
        .missing()
        .into_iter()
        .map(ValidationError::MissingDefault)
        .collect();

    check_hosts("default", &config.default, &mut errors);

    let mut names: Vec<&String> = config.templates.keys().collect();
    names.sort();
    for name in names {
        if name.is_empty() {
            errors.push(ValidationError::EmptyTemplateName);
        }
        check_hosts(&format!("template '{name}'"), &config.templates[name], &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_hosts(scope: &str, set: &TargetSet, errors: &mut Vec<ValidationError>) {
    for protocol in Protocol::ALL {
        if let Some(target) = set.get(protocol) {
            if target.host.trim().is_empty() {
                errors.push(ValidationError::EmptyHost {
                    scope: scope.to_string(),
                    protocol,
                });
            }
        }
    }
}

/// Check runtime settings.
pub fn validate_service(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listen",
            value: config.listener.bind_address.clone(),
        });
    }
    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field: "metrics-listen",
                value: addr.clone(),
            });
        }
    }
    if config.cache.ttl_ms == 0 {
        errors.push(ValidationError::ZeroDuration { field: "cache-ttl" });
    }
    if config.cache.cleanup_interval_ms == 0 {
        errors.push(ValidationError::ZeroDuration { field: "cache-cleanup" });
    }
    if config.timeouts.request_ms == 0 {
        errors.push(ValidationError::ZeroDuration { field: "request-timeout" });
    }
    if HeaderName::try_from(config.auth.header.as_str()).is_err() {
        errors.push(ValidationError::InvalidHeader(config.auth.header.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
