use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use serde_json::Value;

use crate::level::HostLevel;

/// An error object logged by the host.
pub type Fault = Arc<dyn Error + Send + Sync + 'static>;

/// What a host log record carries.
#[derive(Clone)]
pub enum Payload {
    /// A plain message.
    Text(String),
    /// A structured value such as an array or object.
    Structured(Value),
    /// An error object.
    Fault(Fault),
}

impl Payload {
    /// Wraps an error into a payload.
    pub fn fault<E: Error + Send + Sync + 'static>(error: E) -> Self {
        Payload::Fault(Arc::new(error))
    }

    /// Renders the payload to the string suppression patterns see.
    ///
    /// Structured values are pretty printed as JSON.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Payload::Text(text) => Cow::Borrowed(text),
            Payload::Structured(value) => Cow::Owned(render_value(value)),
            Payload::Fault(fault) => Cow::Owned(fault.to_string()),
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(string) => string.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Payload::Structured(value) => f.debug_tuple("Structured").field(value).finish(),
            Payload::Fault(fault) => f.debug_tuple("Fault").field(&fault.to_string()).finish(),
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl<'a> From<&'a str> for Payload {
    fn from(text: &'a str) -> Self {
        Payload::Text(text.to_owned())
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Structured(value)
    }
}

/// Where a record was logged from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    /// The module path.
    pub module: Option<String>,
    /// The source file.
    pub file: Option<String>,
    /// The line in the source file.
    pub line: Option<u32>,
}

/// A single record produced by the host logging framework.
#[derive(Clone, Debug)]
pub struct LogRecord {
    /// What was logged.
    pub payload: Payload,
    /// The raw host level.
    pub level: HostLevel,
    /// The logging category, empty if none.
    pub category: String,
    /// When the record was created.
    pub timestamp: SystemTime,
    /// Where the record was logged from, if known.
    pub location: Option<Location>,
}

impl LogRecord {
    /// Creates a record timestamped now.
    pub fn new<P, C>(payload: P, level: HostLevel, category: C) -> Self
    where
        P: Into<Payload>,
        C: Into<String>,
    {
        LogRecord {
            payload: payload.into(),
            level,
            category: category.into(),
            timestamp: SystemTime::now(),
            location: None,
        }
    }

    /// Attaches the logging location.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Converts a [`log::Record`], using the target as category.
    pub fn from_log(record: &log::Record<'_>) -> Self {
        let location = Location {
            module: record.module_path().map(ToOwned::to_owned),
            file: record.file().map(ToOwned::to_owned),
            line: record.line(),
        };
        LogRecord::new(
            format!("{}", record.args()),
            record.level().into(),
            record.target(),
        )
        .with_location(location)
    }

    /// The message suppression patterns are matched against.
    pub fn message(&self) -> Cow<'_, str> {
        self.payload.render()
    }
}
