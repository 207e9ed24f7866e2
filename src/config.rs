use std::collections::BTreeSet;
use std::env;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::level::HostLevel;

/// The number of buffered records after which an export is due.
pub const DEFAULT_EXPORT_INTERVAL: usize = 1000;

/// Reasons a forwarder ends up disabled.
///
/// None of these are raised to the host.  They only explain why forwarding
/// became a no-op.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Forwarding was switched off in the configuration.
    #[error("forwarding is disabled")]
    Disabled,
    /// No sink endpoint (DSN) was configured.
    #[error("no sink endpoint configured")]
    MissingEndpoint,
    /// The sink endpoint is not a valid DSN.
    #[error("invalid sink endpoint")]
    InvalidEndpoint(#[source] sentry::types::ParseDsnError),
    /// None of the configured levels can be forwarded.
    #[error("no forwardable levels configured")]
    NoLevels,
    /// The configuration document could not be parsed.
    #[error("could not parse forwarder configuration")]
    Parse(#[from] serde_json::Error),
}

/// Forwarder configuration.
///
/// Loaded once at startup and never mutated afterwards.  Every field has a
/// default so partial documents deserialize.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForwarderConfig {
    /// Switches forwarding on or off.
    pub enabled: bool,
    /// The Sentry DSN events are sent to.
    #[serde(alias = "dsn")]
    pub sink_endpoint: String,
    /// The release reported to Sentry.
    pub release: Option<String>,
    /// The environment reported to Sentry.
    pub environment: Option<String>,
    /// Never attach user information when set.
    #[serde(alias = "anonymous")]
    pub anonymize_user: bool,
    /// Requested levels.  Anything but warning and error is dropped.
    #[serde(deserialize_with = "deserialize_levels")]
    pub levels: Vec<HostLevel>,
    /// Additional suppressed categories (`prefix*` globs are supported).
    pub suppressed_categories: BTreeSet<String>,
    /// Free-text suppression regexes, matched in order.
    #[serde(alias = "excludedPatterns")]
    pub suppressed_patterns: Vec<String>,
    /// HTTP-style status codes whose exceptions are suppressed.
    #[serde(alias = "exceptCodes")]
    pub suppressed_codes: BTreeSet<i64>,
    /// Options passed through to the Sentry client.
    #[serde(alias = "options")]
    pub extra_sink_options: Map<String, Value>,
    /// Buffered records after which the log source reports an export as due.
    pub export_interval: usize,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        ForwarderConfig {
            enabled: true,
            sink_endpoint: String::new(),
            release: None,
            environment: None,
            anonymize_user: false,
            levels: HostLevel::FORWARDABLE.to_vec(),
            suppressed_categories: BTreeSet::new(),
            suppressed_patterns: Vec::new(),
            suppressed_codes: BTreeSet::new(),
            extra_sink_options: Map::new(),
            export_interval: DEFAULT_EXPORT_INTERVAL,
        }
    }
}

impl ForwarderConfig {
    /// Creates a config for the given DSN with all other values defaulted.
    pub fn new<S: Into<String>>(sink_endpoint: S) -> Self {
        ForwarderConfig {
            sink_endpoint: sink_endpoint.into(),
            ..Default::default()
        }
    }

    /// Parses a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Fills unset values from the `SENTRY_DSN`, `SENTRY_RELEASE` and
    /// `SENTRY_ENVIRONMENT` environment variables.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    pub(crate) fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.sink_endpoint.trim().is_empty() {
            if let Some(dsn) = lookup("SENTRY_DSN") {
                self.sink_endpoint = dsn;
            }
        }
        if self.release.is_none() {
            self.release = lookup("SENTRY_RELEASE");
        }
        if self.environment.is_none() {
            self.environment = lookup("SENTRY_ENVIRONMENT");
        }
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLevel {
    Bits(u32),
    Name(String),
}

/// Unknown names become an unsupported level, which initialization drops.
fn deserialize_levels<'de, D>(deserializer: D) -> Result<Vec<HostLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RawLevel>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|level| match level {
            RawLevel::Bits(bits) => HostLevel(bits),
            RawLevel::Name(name) => HostLevel::from_name(&name).unwrap_or(HostLevel(0)),
        })
        .collect())
}
