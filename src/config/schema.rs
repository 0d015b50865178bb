//! Configuration schema definitions.
//!
//! This module defines the monitoring document structure. All types derive
//! Serde traits for deserialization from JSON config sources. Wire names
//! are camelCase.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root monitoring configuration document.
///
/// Immutable once accepted; a change at any source replaces the whole
/// document.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    /// Probe definitions to execute.
    #[serde(default)]
    pub probes: Vec<Probe>,

    /// Content checksum stamped when the document is accepted.
    /// Not supplied by operators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A single monitored target.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    /// Unique probe identifier.
    pub id: String,

    /// Human-readable name.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Seconds between probe executions.
    #[serde(default = "default_probe_interval")]
    pub interval: u64,

    /// HTTP requests executed in order on every probe cycle.
    pub requests: Vec<ProbeRequest>,

    /// Consecutive failures before an incident is raised.
    #[serde(default = "default_threshold")]
    pub incident_threshold: u32,

    /// Consecutive successes before a recovery is raised.
    #[serde(default = "default_threshold")]
    pub recovery_threshold: u32,
}

/// One HTTP request within a probe.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeRequest {
    /// Target URL (http or https).
    pub url: String,

    /// HTTP method.
    #[serde(default = "default_method")]
    pub method: String,

    /// Extra request headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,

    /// Request body sent as JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub timeout: u64,
}

fn default_probe_interval() -> u64 {
    10
}

fn default_threshold() -> u32 {
    5
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}
