use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

use crate::context::UserContext;
use crate::level::Severity;
use crate::record::{Fault, Location};

/// Tag carrying the host application name.
pub const APP_TAG: &str = "app";

/// Tag carrying the record category.
pub const CATEGORY_TAG: &str = "category";

/// The body of an event.
#[derive(Clone)]
pub enum EventBody {
    /// A rendered log message.
    Message(String),
    /// An error object, captured as an exception.
    Exception(Fault),
}

impl fmt::Debug for EventBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventBody::Message(message) => f.debug_tuple("Message").field(message).finish(),
            EventBody::Exception(fault) => {
                f.debug_tuple("Exception").field(&fault.to_string()).finish()
            }
        }
    }
}

/// The unit handed to an [`EventSink`](crate::EventSink).
///
/// Built fresh for every record.  Tags, user and extras form the event's
/// scope and are never shared with other events.
#[derive(Clone, Debug)]
pub struct EnrichedEvent {
    /// The mapped severity.  Always `Error` for exceptions.
    pub severity: Severity,
    /// The rendered message or the error object.
    pub body: EventBody,
    /// The `app` tag and, for categorized records, the `category` tag.
    pub tags: BTreeMap<String, String>,
    /// The acting user, unless anonymous or anonymized.
    pub user: Option<UserContext>,
    /// Request and environment details.
    pub extras: BTreeMap<String, String>,
    /// The timestamp of the source record.
    pub timestamp: SystemTime,
    /// The location of the source record.
    pub location: Option<Location>,
}

impl EnrichedEvent {
    /// The rendered message of a message event.
    pub fn message(&self) -> Option<&str> {
        match self.body {
            EventBody::Message(ref message) => Some(message),
            EventBody::Exception(_) => None,
        }
    }

    /// The error of an exception event.
    pub fn fault(&self) -> Option<&Fault> {
        match self.body {
            EventBody::Exception(ref fault) => Some(fault),
            EventBody::Message(_) => None,
        }
    }

    /// Looks up a tag.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}
