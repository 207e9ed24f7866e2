use sentry::protocol::{Event, Frame, IpAddress, Map, Stacktrace, User, Value};
use sentry::Scope;

use crate::context::UserContext;
use crate::event::{EnrichedEvent, EventBody};
use crate::level::Severity;
use crate::record::{Fault, Location};

/// Creates a Sentry [`User`] from a [`UserContext`].
///
/// The admin flag and groups travel as additional user fields.
pub fn user_from_context(user: &UserContext) -> User {
    let mut other = Map::new();
    other.insert("Admin".to_owned(), Value::from(user.admin.clone()));
    other.insert("Groups".to_owned(), Value::from(user.groups.clone()));
    User {
        id: Some(user.id.clone()),
        email: user.email.clone(),
        username: user.username.clone(),
        ip_address: user.ip_address.map(IpAddress::Exact),
        other,
        ..Default::default()
    }
}

/// Creates a single frame [`Stacktrace`] from a record location.
pub fn stacktrace_from_location(location: &Location) -> Stacktrace {
    let frame = Frame {
        module: location.module.clone(),
        filename: location.file.clone(),
        lineno: location.line.map(Into::into),
        ..Default::default()
    };
    Stacktrace {
        frames: vec![frame],
        ..Default::default()
    }
}

/// Creates a Sentry [`Event`] for an error and its source chain.
///
/// The event keeps the level Sentry assigns to errors.
pub fn event_from_fault(fault: &Fault) -> Event<'static> {
    sentry::event_from_error(&**fault)
}

/// Creates a Sentry message [`Event`], with a stacktrace when the location
/// is known.
pub fn event_from_message(
    message: &str,
    severity: Severity,
    location: Option<&Location>,
) -> Event<'static> {
    Event {
        message: Some(message.to_owned()),
        level: severity.into(),
        stacktrace: location.map(stacktrace_from_location),
        ..Default::default()
    }
}

/// Creates a Sentry [`Event`] from an [`EnrichedEvent`].
pub fn event_from_enriched(event: &EnrichedEvent) -> Event<'static> {
    let mut rv = match event.body {
        EventBody::Exception(ref fault) => event_from_fault(fault),
        EventBody::Message(ref message) => {
            event_from_message(message, event.severity, event.location.as_ref())
        }
    };
    rv.timestamp = event.timestamp;
    rv
}

/// Writes the tags, user and extras of an event into a scope.
pub fn configure_scope(scope: &mut Scope, event: &EnrichedEvent) {
    for (key, value) in &event.tags {
        scope.set_tag(key, value);
    }
    if let Some(ref user) = event.user {
        scope.set_user(Some(user_from_context(user)));
    }
    for (key, value) in &event.extras {
        scope.set_extra(key, Value::from(value.as_str()));
    }
}
