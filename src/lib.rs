//! Forwards host application log records to Sentry.
//!
//! A [`LogForwarder`] takes batches of [`LogRecord`]s from the host logging
//! framework, drops everything that is not a warning or an error or that
//! matches a suppression rule, enriches the rest with request, user and
//! environment context and hands the resulting [`EnrichedEvent`]s to an
//! [`EventSink`].  Error objects become Sentry exceptions, everything else is
//! rendered into a message event.
//!
//! Forwarding never fails loudly.  A configuration that cannot be used leaves
//! the forwarder disabled and optional context that cannot be read is left
//! out.
//!
//! # Examples
//!
//! ```
//! use sentry_log_forwarder::test::{StaticEnvironment, StaticIdentity, StaticRequest};
//! use sentry_log_forwarder::{
//!     init_sentry, ForwarderConfig, HostContext, HubSink, LogForwarder, LogSource, RecordBuffer,
//! };
//!
//! let config = ForwarderConfig::from_json(r#"{
//!     "dsn": "https://public@sentry.invalid/1",
//!     "exceptCodes": [404],
//!     "suppressedPatterns": ["^Deprecated:"]
//! }"#).unwrap();
//! let _sentry = init_sentry(&config);
//! let buffer = RecordBuffer::from_config(&config);
//! let forwarder = LogForwarder::new(config);
//!
//! log::Log::log(&buffer, &log::Record::builder()
//!     .args(format_args!("Deprecated: old api"))
//!     .level(log::Level::Warn)
//!     .build());
//!
//! let request = StaticRequest::web("https://example.com/");
//! let identity = StaticIdentity::anonymous();
//! let environment = StaticEnvironment::default();
//! let ctx = HostContext::new(&request, &identity, &environment);
//! let report = forwarder.drain(&buffer, &ctx, &HubSink::new());
//! assert_eq!(report.suppressed, 1);
//! ```

#[macro_use]
mod macros;

mod config;
mod context;
mod converters;
mod event;
mod filters;
mod forwarder;
mod init;
mod level;
mod logger;
mod record;
mod sink;
pub mod test;

pub use crate::config::{ConfigError, ForwarderConfig, DEFAULT_EXPORT_INTERVAL};
pub use crate::context::{
    build_extras, build_user_context, DriverInfo, EnvironmentProbe, HostContext, Identity,
    IdentityProvider, ProbeError, RequestContext, UserContext,
};
pub use crate::converters::{
    configure_scope, event_from_enriched, event_from_fault, event_from_message,
    stacktrace_from_location, user_from_context,
};
pub use crate::event::{EnrichedEvent, EventBody, APP_TAG, CATEGORY_TAG};
pub use crate::filters::{
    category_matches, http_exception_category, initialize, Ready, SuppressionPattern,
    HTTP_EXCEPTION_PREFIX, MESSAGE_SOURCE_CATEGORY,
};
pub use crate::forwarder::{ForwardReport, LogForwarder};
pub use crate::init::{client_options, init_sentry};
pub use crate::level::{severity_of, HostLevel, Severity, UnsupportedLevelError};
pub use crate::logger::{LogSource, RecordBuffer};
pub use crate::macros::DIAGNOSTICS_TARGET;
pub use crate::record::{Fault, Location, LogRecord, Payload};
pub use crate::sink::{EventSink, HubSink};
