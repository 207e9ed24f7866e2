use std::collections::BTreeMap;

use crate::config::{ConfigError, ForwarderConfig};
use crate::context::{build_extras, build_user_context, HostContext, UserContext};
use crate::event::{EnrichedEvent, EventBody, APP_TAG, CATEGORY_TAG};
use crate::filters::{initialize, Ready};
use crate::level::{severity_of, Severity, UnsupportedLevelError};
use crate::logger::LogSource;
use crate::record::{LogRecord, Payload};
use crate::sink::EventSink;

/// The result of a [`LogForwarder::forward`] call.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ForwardReport {
    /// Records handed to the sink.
    pub forwarded: usize,
    /// Records dropped by level, category or pattern rules.
    pub suppressed: usize,
    /// Records that could not be dispatched, by position in the batch.
    pub failed: Vec<(usize, UnsupportedLevelError)>,
}

/// Context shared by all events of one forwarding call.
struct ScopeTemplate {
    app_name: String,
    user: Option<UserContext>,
    extras: BTreeMap<String, String>,
}

impl ScopeTemplate {
    fn collect(ready: &Ready, ctx: &HostContext<'_>) -> Self {
        let identity = ctx.identity.identity();
        ScopeTemplate {
            app_name: ctx.environment.app_name(),
            user: build_user_context(
                identity.as_ref(),
                ctx.request,
                ready.config().anonymize_user,
            ),
            extras: build_extras(ctx.request, ctx.environment),
        }
    }
}

/// Filters host log records and forwards the rest to an [`EventSink`].
///
/// A forwarder whose configuration is unusable is still constructed, it
/// simply never forwards anything.
#[derive(Debug)]
pub struct LogForwarder {
    state: Result<Ready, ConfigError>,
}

impl LogForwarder {
    /// Creates a forwarder, disabling it if the configuration is unusable.
    pub fn new(config: ForwarderConfig) -> Self {
        let state = initialize(config);
        if let Err(ref err) = state {
            forwarder_debug!("log forwarding disabled: {}", err);
        }
        LogForwarder { state }
    }

    /// Returns `true` if records can be forwarded at all.
    pub fn is_enabled(&self) -> bool {
        self.state.is_ok()
    }

    /// Explains why the forwarder is disabled.
    pub fn disabled_reason(&self) -> Option<&ConfigError> {
        self.state.as_ref().err()
    }

    /// Forwards a batch of records in order.
    ///
    /// A record failing to dispatch is reported and does not stop the rest
    /// of the batch.
    pub fn forward<S>(&self, records: &[LogRecord], ctx: &HostContext<'_>, sink: &S) -> ForwardReport
    where
        S: EventSink + ?Sized,
    {
        let mut report = ForwardReport::default();
        let ready = match self.state {
            Ok(ref ready) => ready,
            Err(_) => return report,
        };

        let mut template = None;
        for (idx, record) in records.iter().enumerate() {
            if !self.passes(ready, record) {
                report.suppressed += 1;
                continue;
            }
            let template = template.get_or_insert_with(|| ScopeTemplate::collect(ready, ctx));
            match enrich(record, template) {
                Ok(event) => {
                    dispatch(&event, sink);
                    report.forwarded += 1;
                }
                Err(err) => {
                    forwarder_debug!("dropping record {}: {}", idx, err);
                    report.failed.push((idx, err));
                }
            }
        }

        report
    }

    /// Takes the next batch from a log source and forwards it.
    ///
    /// The batch is consumed even when the forwarder is disabled.
    pub fn drain<L, S>(&self, source: &L, ctx: &HostContext<'_>, sink: &S) -> ForwardReport
    where
        L: LogSource + ?Sized,
        S: EventSink + ?Sized,
    {
        self.forward(&source.next_batch(), ctx, sink)
    }

    /// Builds the event for a record without applying any suppression rule.
    pub fn enrich(
        &self,
        record: &LogRecord,
        ctx: &HostContext<'_>,
    ) -> Result<Option<EnrichedEvent>, UnsupportedLevelError> {
        match self.state {
            Ok(ref ready) => enrich(record, &ScopeTemplate::collect(ready, ctx)).map(Some),
            Err(_) => Ok(None),
        }
    }

    fn passes(&self, ready: &Ready, record: &LogRecord) -> bool {
        if !ready.accepts(record) {
            return false;
        }
        match ready.matching_pattern(&record.message()) {
            Some(pattern) => {
                forwarder_debug!("record suppressed by pattern {:?}", pattern.source());
                false
            }
            None => true,
        }
    }
}

fn enrich(record: &LogRecord, template: &ScopeTemplate) -> Result<EnrichedEvent, UnsupportedLevelError> {
    let (body, severity) = match record.payload {
        Payload::Fault(ref fault) => (EventBody::Exception(fault.clone()), Severity::Error),
        ref payload => (
            EventBody::Message(payload.render().into_owned()),
            severity_of(record.level)?,
        ),
    };

    let mut tags = BTreeMap::new();
    tags.insert(APP_TAG.to_owned(), template.app_name.clone());
    if !record.category.is_empty() {
        tags.insert(CATEGORY_TAG.to_owned(), record.category.clone());
    }

    Ok(EnrichedEvent {
        severity,
        body,
        tags,
        user: template.user.clone(),
        extras: template.extras.clone(),
        timestamp: record.timestamp,
        location: record.location.clone(),
    })
}

fn dispatch<S: EventSink + ?Sized>(event: &EnrichedEvent, sink: &S) {
    match event.body {
        EventBody::Exception(ref fault) => sink.capture_exception(event, fault),
        EventBody::Message(ref message) => sink.capture_message(event, message, event.severity),
    }
}
