use std::fmt;

use thiserror::Error;

/// A raw log level as produced by the host logging framework.
///
/// Host levels are bit flags.  The type is deliberately open so that any raw
/// value a host hands over can be represented; only the associated constants
/// are known to [`severity_of`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostLevel(pub u32);

impl HostLevel {
    /// An error message.
    pub const ERROR: HostLevel = HostLevel(0x01);
    /// A warning message.
    pub const WARNING: HostLevel = HostLevel(0x02);
    /// An informational message.
    pub const INFO: HostLevel = HostLevel(0x04);
    /// A tracing message, used for debugging output.
    pub const TRACE: HostLevel = HostLevel(0x08);
    /// A profiling message.
    pub const PROFILE: HostLevel = HostLevel(0x40);
    /// Marks the start of a profiling block.
    pub const PROFILE_BEGIN: HostLevel = HostLevel(0x50);
    /// Marks the end of a profiling block.
    pub const PROFILE_END: HostLevel = HostLevel(0x60);

    /// The only levels that can ever be forwarded.
    pub const FORWARDABLE: [HostLevel; 2] = [HostLevel::WARNING, HostLevel::ERROR];

    /// Returns the canonical name of a known level.
    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            HostLevel::ERROR => "error",
            HostLevel::WARNING => "warning",
            HostLevel::INFO => "info",
            HostLevel::TRACE => "trace",
            HostLevel::PROFILE => "profile",
            HostLevel::PROFILE_BEGIN => "profile-begin",
            HostLevel::PROFILE_END => "profile-end",
            _ => return None,
        })
    }

    /// Looks up a level by its canonical name.
    pub fn from_name(name: &str) -> Option<HostLevel> {
        Some(match name {
            "error" => HostLevel::ERROR,
            "warning" => HostLevel::WARNING,
            "info" => HostLevel::INFO,
            "trace" => HostLevel::TRACE,
            "profile" => HostLevel::PROFILE,
            "profile-begin" => HostLevel::PROFILE_BEGIN,
            "profile-end" => HostLevel::PROFILE_END,
            _ => return None,
        })
    }

    /// Checks if records of this level may be forwarded at all.
    pub fn is_forwardable(self) -> bool {
        HostLevel::FORWARDABLE.contains(&self)
    }
}

impl fmt::Display for HostLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "level({:#x})", self.0),
        }
    }
}

impl From<log::Level> for HostLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => HostLevel::ERROR,
            log::Level::Warn => HostLevel::WARNING,
            log::Level::Info => HostLevel::INFO,
            log::Level::Debug | log::Level::Trace => HostLevel::TRACE,
        }
    }
}

/// The severity attached to an event sent to Sentry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Debug output.
    Debug,
    /// Informational.
    Info,
    /// A warning.
    Warning,
    /// An error.
    Error,
}

impl From<Severity> for sentry::Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Debug => sentry::Level::Debug,
            Severity::Info => sentry::Level::Info,
            Severity::Warning => sentry::Level::Warning,
            Severity::Error => sentry::Level::Error,
        }
    }
}

/// Raised when a host level has no Sentry severity.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("unsupported log level {0}")]
pub struct UnsupportedLevelError(pub HostLevel);

/// Maps a host level to the Sentry severity.
pub fn severity_of(level: HostLevel) -> Result<Severity, UnsupportedLevelError> {
    match level {
        HostLevel::TRACE
        | HostLevel::PROFILE_BEGIN
        | HostLevel::PROFILE_END
        | HostLevel::PROFILE => Ok(Severity::Debug),
        HostLevel::INFO => Ok(Severity::Info),
        HostLevel::WARNING => Ok(Severity::Warning),
        HostLevel::ERROR => Ok(Severity::Error),
        other => Err(UnsupportedLevelError(other)),
    }
}
