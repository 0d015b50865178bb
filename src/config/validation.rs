//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the probe list is coherent (ids present and unique, every probe
//!   has requests, request URLs are well-formed http/https)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>
//! - Runs before a document is accepted into the snapshot

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::MonitorConfig;

/// A single semantic violation in a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("configuration defines no probes")]
    NoProbes,

    #[error("probe at index {index} has an empty id")]
    EmptyProbeId { index: usize },

    #[error("duplicate probe id `{id}`")]
    DuplicateProbeId { id: String },

    #[error("probe `{id}` has no requests")]
    NoRequests { id: String },

    #[error("probe `{id}` has a zero interval")]
    ZeroInterval { id: String },

    #[error("probe `{id}` request {index} has invalid url `{url}`: {reason}")]
    InvalidUrl {
        id: String,
        index: usize,
        url: String,
        reason: String,
    },
}

/// Validate a parsed configuration document.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.probes.is_empty() {
        errors.push(ValidationError::NoProbes);
    }

    let mut seen_ids = HashSet::new();
    for (index, probe) in config.probes.iter().enumerate() {
        if probe.id.is_empty() {
            errors.push(ValidationError::EmptyProbeId { index });
        } else if !seen_ids.insert(probe.id.as_str()) {
            errors.push(ValidationError::DuplicateProbeId {
                id: probe.id.clone(),
            });
        }

        if probe.requests.is_empty() {
            errors.push(ValidationError::NoRequests {
                id: probe.id.clone(),
            });
        }

        if probe.interval == 0 {
            errors.push(ValidationError::ZeroInterval {
                id: probe.id.clone(),
            });
        }

        for (req_index, request) in probe.requests.iter().enumerate() {
            match Url::parse(&request.url) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => errors.push(ValidationError::InvalidUrl {
                    id: probe.id.clone(),
                    index: req_index,
                    url: request.url.clone(),
                    reason: format!("unsupported scheme `{}`", url.scheme()),
                }),
                Err(e) => errors.push(ValidationError::InvalidUrl {
                    id: probe.id.clone(),
                    index: req_index,
                    url: request.url.clone(),
                    reason: e.to_string(),
                }),
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
