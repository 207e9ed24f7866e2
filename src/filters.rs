//! Suppression rules and forwarder initialization.
use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::config::{ConfigError, ForwarderConfig};
use crate::level::HostLevel;
use crate::record::LogRecord;

/// Records from the host's translation message source are always dropped.
pub const MESSAGE_SOURCE_CATEGORY: &str = "message-source:*";

/// Category prefix for exceptions carrying an HTTP-style status code.
pub const HTTP_EXCEPTION_PREFIX: &str = "http-exception:";

/// Patterns larger than this fail to compile and never match.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

lazy_static! {
    static ref STATUS_CODE: Regex = Regex::new(r"^[1-5][0-9]{2}$").unwrap();
}

/// Returns the suppression category for a status code.
///
/// Only codes of the form `[1-5][0-9]{2}` produce a category.
pub fn http_exception_category(code: i64) -> Option<String> {
    let code = code.to_string();
    if STATUS_CODE.is_match(&code) {
        Some(format!("{}{}", HTTP_EXCEPTION_PREFIX, code))
    } else {
        None
    }
}

/// Checks a category against a suppression rule.
///
/// A rule ending in `*` matches every category starting with the rest of the
/// rule, any other rule has to match exactly.
pub fn category_matches(rule: &str, category: &str) -> bool {
    match rule.strip_suffix('*') {
        Some(prefix) => category.starts_with(prefix),
        None => rule == category,
    }
}

/// A free-text suppression pattern.
#[derive(Clone, Debug)]
pub struct SuppressionPattern {
    source: String,
    regex: Option<Regex>,
}

impl SuppressionPattern {
    /// Compiles a pattern.
    ///
    /// A pattern that does not compile is kept but never matches.
    pub fn new(source: &str) -> Self {
        let regex = match RegexBuilder::new(source)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
        {
            Ok(regex) => Some(regex),
            Err(err) => {
                forwarder_debug!("ignoring suppression pattern {:?}: {}", source, err);
                None
            }
        };
        SuppressionPattern {
            source: source.to_owned(),
            regex,
        }
    }

    /// The pattern as configured.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the pattern compiled.
    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }

    /// Checks a rendered message against the pattern.
    pub fn is_match(&self, message: &str) -> bool {
        self.regex.as_ref().map_or(false, |regex| regex.is_match(message))
    }
}

/// An initialized, enabled forwarder configuration.
///
/// Holds the level allow-list and all suppression rules.  Nothing in here
/// changes after [`initialize`].
#[derive(Clone, Debug)]
pub struct Ready {
    config: ForwarderConfig,
    levels: BTreeSet<HostLevel>,
    categories: BTreeSet<String>,
    patterns: Vec<SuppressionPattern>,
}

/// Validates a configuration and builds the suppression rules.
///
/// Errors are soft: the caller is expected to treat any of them as
/// "forwarding disabled".
pub fn initialize(config: ForwarderConfig) -> Result<Ready, ConfigError> {
    if !config.enabled {
        return Err(ConfigError::Disabled);
    }

    let endpoint = config.sink_endpoint.trim();
    if endpoint.is_empty() {
        return Err(ConfigError::MissingEndpoint);
    }
    endpoint
        .parse::<sentry::types::Dsn>()
        .map_err(ConfigError::InvalidEndpoint)?;

    let levels: BTreeSet<HostLevel> = config
        .levels
        .iter()
        .copied()
        .filter(|level| level.is_forwardable())
        .collect();
    if levels.is_empty() {
        return Err(ConfigError::NoLevels);
    }

    let mut categories = BTreeSet::new();
    categories.insert(MESSAGE_SOURCE_CATEGORY.to_owned());
    categories.extend(config.suppressed_categories.iter().cloned());
    categories.extend(
        config
            .suppressed_codes
            .iter()
            .filter_map(|&code| http_exception_category(code)),
    );

    let patterns = config
        .suppressed_patterns
        .iter()
        .map(|source| SuppressionPattern::new(source))
        .collect();

    Ok(Ready {
        config,
        levels,
        categories,
        patterns,
    })
}

impl Ready {
    /// The configuration this was built from.
    pub fn config(&self) -> &ForwarderConfig {
        &self.config
    }

    /// The allowed levels, always a subset of warning and error.
    pub fn levels(&self) -> &BTreeSet<HostLevel> {
        &self.levels
    }

    /// All suppressed categories.
    pub fn suppressed_categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// The free-text patterns in configured order.
    pub fn patterns(&self) -> &[SuppressionPattern] {
        &self.patterns
    }

    /// Checks level and category rules.
    pub fn accepts(&self, record: &LogRecord) -> bool {
        self.levels.contains(&record.level) && !self.is_suppressed_category(&record.category)
    }

    /// Checks the category against all suppressed categories.
    pub fn is_suppressed_category(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|rule| category_matches(rule, category))
    }

    /// Returns the first pattern matching the message.
    pub fn matching_pattern(&self, message: &str) -> Option<&SuppressionPattern> {
        self.patterns.iter().find(|pattern| pattern.is_match(message))
    }
}
