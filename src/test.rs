//! Helpers for testing host integrations.
//!
//! Provides a sink that records events instead of sending them and static
//! implementations of the host collaborators.
//!
//! # Example
//!
//! ```
//! use sentry_log_forwarder::test::{CapturingSink, StaticEnvironment, StaticIdentity, StaticRequest};
//! use sentry_log_forwarder::{ForwarderConfig, HostContext, HostLevel, LogForwarder, LogRecord};
//!
//! let request = StaticRequest::web("https://example.com/");
//! let identity = StaticIdentity::anonymous();
//! let environment = StaticEnvironment::default();
//! let ctx = HostContext::new(&request, &identity, &environment);
//!
//! let sink = CapturingSink::new();
//! let forwarder = LogForwarder::new(ForwarderConfig::new("https://public@sentry.invalid/1"));
//! forwarder.forward(&[LogRecord::new("DB timeout", HostLevel::ERROR, "")], &ctx, &sink);
//! assert_eq!(sink.events()[0].message(), Some("DB timeout"));
//! ```
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard};

use url::Url;

use crate::context::{
    DriverInfo, EnvironmentProbe, Identity, IdentityProvider, ProbeError, RequestContext,
};
use crate::event::{EnrichedEvent, EventBody};
use crate::level::Severity;
use crate::record::Fault;
use crate::sink::EventSink;

/// Records every captured event.
#[derive(Debug, Default)]
pub struct CapturingSink {
    events: Mutex<Vec<EnrichedEvent>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        CapturingSink::default()
    }

    /// All captured events in capture order.
    pub fn events(&self) -> Vec<EnrichedEvent> {
        self.lock().clone()
    }

    /// The number of events captured as exceptions.
    pub fn exceptions(&self) -> usize {
        self.count(|event| matches!(event.body, EventBody::Exception(_)))
    }

    /// The number of events captured as messages.
    pub fn messages(&self) -> usize {
        self.count(|event| matches!(event.body, EventBody::Message(_)))
    }

    fn count<F: Fn(&EnrichedEvent) -> bool>(&self, f: F) -> usize {
        self.lock().iter().filter(|event| f(event)).count()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<EnrichedEvent>> {
        self.events.lock().unwrap_or_else(|x| x.into_inner())
    }
}

impl EventSink for CapturingSink {
    fn capture_exception(&self, event: &EnrichedEvent, error: &Fault) {
        self.lock().push(EnrichedEvent {
            body: EventBody::Exception(error.clone()),
            severity: Severity::Error,
            ..event.clone()
        });
    }

    fn capture_message(&self, event: &EnrichedEvent, message: &str, severity: Severity) {
        self.lock().push(EnrichedEvent {
            body: EventBody::Message(message.to_owned()),
            severity,
            ..event.clone()
        });
    }
}

/// A fixed request.
#[derive(Clone, Debug, Default)]
pub struct StaticRequest {
    pub console: bool,
    pub remote_ip: Option<IpAddr>,
    pub url: Option<Url>,
    pub script_path: Option<String>,
    pub params: Vec<String>,
}

impl StaticRequest {
    /// A web request for the given URL.  Unparsable URLs are left unset.
    pub fn web(url: &str) -> Self {
        StaticRequest {
            url: Url::parse(url).ok(),
            ..Default::default()
        }
    }

    /// A console request.
    pub fn console(script: &str, params: &[&str]) -> Self {
        StaticRequest {
            console: true,
            script_path: Some(script.to_owned()),
            params: params.iter().map(|&param| param.to_owned()).collect(),
            ..Default::default()
        }
    }

    /// Sets the remote address.  Unparsable addresses are left unset.
    pub fn with_ip(mut self, ip: &str) -> Self {
        self.remote_ip = ip.parse().ok();
        self
    }
}

impl RequestContext for StaticRequest {
    fn is_console_request(&self) -> bool {
        self.console
    }

    fn remote_ip(&self) -> Option<IpAddr> {
        self.remote_ip
    }

    fn url(&self) -> Option<Url> {
        self.url.clone()
    }

    fn script_path(&self) -> Option<String> {
        self.script_path.clone()
    }

    fn params(&self) -> Vec<String> {
        self.params.clone()
    }
}

/// A fixed identity, or none.
#[derive(Clone, Debug, Default)]
pub struct StaticIdentity(pub Option<Identity>);

impl StaticIdentity {
    pub fn new(identity: Identity) -> Self {
        StaticIdentity(Some(identity))
    }

    pub fn anonymous() -> Self {
        StaticIdentity(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn identity(&self) -> Option<Identity> {
        self.0.clone()
    }
}

/// A fixed environment.
///
/// A driver set to `None` makes its probe fail.
#[derive(Clone, Debug)]
pub struct StaticEnvironment {
    pub app_name: String,
    pub edition: String,
    pub version: String,
    pub schema_version: String,
    pub dev_mode: bool,
    pub environment: String,
    pub runtime_version: String,
    pub database: Option<DriverInfo>,
    pub image_driver: Option<DriverInfo>,
}

impl Default for StaticEnvironment {
    fn default() -> Self {
        StaticEnvironment {
            app_name: "Example".into(),
            edition: "Pro".into(),
            version: "4.5.0".into(),
            schema_version: "4.5.0.0".into(),
            dev_mode: false,
            environment: "test".into(),
            runtime_version: "1.81.0".into(),
            database: Some(DriverInfo::new("MySQL", "8.0.36")),
            image_driver: Some(DriverInfo::new("GD", "2.3.3")),
        }
    }
}

impl EnvironmentProbe for StaticEnvironment {
    fn app_name(&self) -> String {
        self.app_name.clone()
    }

    fn edition(&self) -> String {
        self.edition.clone()
    }

    fn version(&self) -> String {
        self.version.clone()
    }

    fn schema_version(&self) -> String {
        self.schema_version.clone()
    }

    fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    fn environment(&self) -> String {
        self.environment.clone()
    }

    fn runtime_version(&self) -> String {
        self.runtime_version.clone()
    }

    fn database(&self) -> Result<DriverInfo, ProbeError> {
        self.database
            .clone()
            .ok_or_else(|| ProbeError::failed("no database connection"))
    }

    fn image_driver(&self) -> Result<DriverInfo, ProbeError> {
        self.image_driver
            .clone()
            .ok_or_else(|| ProbeError::failed("no image driver loaded"))
    }
}
