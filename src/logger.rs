use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use crate::config::{ForwarderConfig, DEFAULT_EXPORT_INTERVAL};
use crate::level::HostLevel;
use crate::macros::DIAGNOSTICS_TARGET;
use crate::record::LogRecord;

/// Buffered records per export interval kept before the oldest are dropped.
const CAPACITY_FACTOR: usize = 10;

/// Yields batches of host log records.
pub trait LogSource {
    /// Takes all records collected since the previous batch.
    fn next_batch(&self) -> Vec<LogRecord>;
}

/// Collects [`log`] records for forwarding.
///
/// Install it with [`RecordBuffer::install`] or wrap it in another logger.
/// Records emitted by this crate itself are never collected.  A destination
/// logger set with [`RecordBuffer::with_dest`] still sees every record it
/// enables, including the ones collected here.
///
/// The buffer holds at most ten export intervals worth of records.  Once
/// full, the oldest records are dropped.
pub struct RecordBuffer {
    records: Mutex<VecDeque<LogRecord>>,
    filter: log::LevelFilter,
    export_interval: usize,
    capacity: usize,
    dest: Option<Box<dyn log::Log>>,
}

impl Default for RecordBuffer {
    fn default() -> Self {
        RecordBuffer::new(log::LevelFilter::Warn, DEFAULT_EXPORT_INTERVAL)
    }
}

impl fmt::Debug for RecordBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordBuffer")
            .field("buffered", &self.len())
            .field("filter", &self.filter)
            .field("export_interval", &self.export_interval)
            .field("capacity", &self.capacity)
            .field("dest", &self.dest.is_some())
            .finish()
    }
}

impl RecordBuffer {
    /// Creates a buffer collecting records up to `filter`.
    pub fn new(filter: log::LevelFilter, export_interval: usize) -> Self {
        let export_interval = export_interval.max(1);
        RecordBuffer {
            records: Mutex::new(VecDeque::new()),
            filter,
            export_interval,
            capacity: export_interval.saturating_mul(CAPACITY_FACTOR),
            dest: None,
        }
    }

    /// Creates a buffer for the levels and export interval of a config.
    ///
    /// Only levels that can actually be forwarded are collected.
    pub fn from_config(config: &ForwarderConfig) -> Self {
        let filter = [
            log::Level::Trace,
            log::Level::Debug,
            log::Level::Info,
            log::Level::Warn,
            log::Level::Error,
        ]
        .iter()
        .find(|&&level| {
            let level = HostLevel::from(level);
            level.is_forwardable() && config.levels.contains(&level)
        })
        .map_or(log::LevelFilter::Off, |level| level.to_level_filter());
        RecordBuffer::new(filter, config.export_interval)
    }

    /// Passes every record on to another logger as well.
    pub fn with_dest(mut self, dest: Box<dyn log::Log>) -> Self {
        self.dest = Some(dest);
        self
    }

    /// Caps the number of buffered records.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Registers a buffer as the global logger.
    ///
    /// With a destination logger the global max level is lifted to `Trace`
    /// and the destination decides what it wants.  Fails if a logger has
    /// already been set.
    pub fn install(buffer: &'static RecordBuffer) -> Result<(), log::SetLoggerError> {
        log::set_logger(buffer)?;
        let filter = if buffer.dest.is_some() {
            log::LevelFilter::Trace
        } else {
            buffer.filter
        };
        if filter > log::max_level() {
            log::set_max_level(filter);
        }
        Ok(())
    }

    /// The number of buffered records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns `true` once enough records are buffered for an export.
    pub fn export_due(&self) -> bool {
        self.len() >= self.export_interval
    }

    /// Buffers a record directly, dropping the oldest one if full.
    pub fn push(&self, record: LogRecord) {
        let dropped = {
            let mut records = self.lock();
            let dropped = if records.len() >= self.capacity {
                records.pop_front()
            } else {
                None
            };
            records.push_back(record);
            dropped
        };
        if let Some(dropped) = dropped {
            forwarder_debug!(
                "record buffer full ({}), dropped record from {}",
                self.capacity,
                dropped.category
            );
        }
    }

    fn collects(&self, md: &log::Metadata<'_>) -> bool {
        md.level() <= self.filter && !md.target().starts_with(DIAGNOSTICS_TARGET)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogRecord>> {
        self.records.lock().unwrap_or_else(|x| x.into_inner())
    }
}

impl LogSource for RecordBuffer {
    fn next_batch(&self) -> Vec<LogRecord> {
        self.lock().drain(..).collect()
    }
}

impl log::Log for RecordBuffer {
    fn enabled(&self, md: &log::Metadata<'_>) -> bool {
        self.collects(md) || self.dest.as_ref().map_or(false, |x| x.enabled(md))
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.collects(record.metadata()) {
            self.push(LogRecord::from_log(record));
        }
        if let Some(ref log) = self.dest {
            if log.enabled(record.metadata()) {
                log.log(record);
            }
        }
    }

    fn flush(&self) {
        if let Some(ref log) = self.dest {
            log.flush();
        }
    }
}
