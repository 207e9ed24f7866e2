use std::fmt;
use std::sync::Arc;

use sentry::protocol::Event;
use sentry::Hub;

use crate::converters::{configure_scope, event_from_fault, event_from_message};
use crate::event::EnrichedEvent;
use crate::level::Severity;
use crate::record::Fault;

/// Receives the events a forwarder emits.
///
/// Both operations are fire and forget.  Delivery, batching and retries are
/// the sink's business.
pub trait EventSink {
    /// Captures an error object.  The severity is implied by the error.
    fn capture_exception(&self, event: &EnrichedEvent, error: &Fault);

    /// Captures a rendered message with an explicit severity.
    fn capture_message(&self, event: &EnrichedEvent, message: &str, severity: Severity);
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn capture_exception(&self, event: &EnrichedEvent, error: &Fault) {
        (**self).capture_exception(event, error)
    }

    fn capture_message(&self, event: &EnrichedEvent, message: &str, severity: Severity) {
        (**self).capture_message(event, message, severity)
    }
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn capture_exception(&self, event: &EnrichedEvent, error: &Fault) {
        (**self).capture_exception(event, error)
    }

    fn capture_message(&self, event: &EnrichedEvent, message: &str, severity: Severity) {
        (**self).capture_message(event, message, severity)
    }
}

/// A sink sending events through a Sentry [`Hub`].
///
/// Every event is captured inside its own pushed scope so tags, user and
/// extras never leak into other events.
#[derive(Clone, Default)]
pub struct HubSink {
    hub: Option<Arc<Hub>>,
}

impl HubSink {
    /// Sends to whichever hub is active at capture time.
    pub fn new() -> Self {
        HubSink::default()
    }

    /// Sends to the given hub.
    pub fn with_hub(hub: Arc<Hub>) -> Self {
        HubSink { hub: Some(hub) }
    }

    fn capture(&self, event: &EnrichedEvent, mut sentry_event: Event<'static>) {
        sentry_event.timestamp = event.timestamp;
        let capture = |hub: &Hub| {
            hub.with_scope(
                |scope| configure_scope(scope, event),
                || hub.capture_event(sentry_event),
            );
        };
        match self.hub {
            Some(ref hub) => capture(hub),
            None => Hub::with_active(|hub| capture(hub)),
        }
    }
}

impl fmt::Debug for HubSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubSink")
            .field("bound", &self.hub.is_some())
            .finish()
    }
}

impl EventSink for HubSink {
    fn capture_exception(&self, event: &EnrichedEvent, error: &Fault) {
        self.capture(event, event_from_fault(error));
    }

    fn capture_message(&self, event: &EnrichedEvent, message: &str, severity: Severity) {
        self.capture(
            event,
            event_from_message(message, severity, event.location.as_ref()),
        );
    }
}
