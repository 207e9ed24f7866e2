use sentry_log_forwarder::test::{StaticEnvironment, StaticIdentity, StaticRequest};
use sentry_log_forwarder::{
    ForwarderConfig, HostContext, HostLevel, HubSink, Identity, LogForwarder, LogRecord, Payload,
};
use sentry::protocol::Event;

const DSN: &str = "https://public@sentry.invalid/1";

#[derive(Debug, thiserror::Error)]
#[error("template not found")]
struct TemplateNotFound;

fn capture(
    config: ForwarderConfig,
    identity: StaticIdentity,
    records: &[LogRecord],
) -> Vec<Event<'static>> {
    let request = StaticRequest::web("https://example.com/blog").with_ip("10.1.2.3");
    let environment = StaticEnvironment::default();
    let ctx = HostContext::new(&request, &identity, &environment);
    let forwarder = LogForwarder::new(config);

    sentry::test::with_captured_events(|| {
        forwarder.forward(records, &ctx, &HubSink::new());
    })
}

#[test]
fn test_message_event() {
    let events = capture(
        ForwarderConfig::new(DSN),
        StaticIdentity::anonymous(),
        &[LogRecord::new("DB timeout", HostLevel::ERROR, "")],
    );

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.level, sentry::Level::Error);
    assert_eq!(event.message.as_deref(), Some("DB timeout"));
    assert_eq!(event.tags.get("app").map(String::as_str), Some("Example"));
    assert!(!event.tags.contains_key("category"));
    assert_eq!(event.extra["Request Type"], "Web");
    assert_eq!(event.extra["Url"], "https://example.com/blog");
    assert_eq!(event.extra["Database Driver & Version"], "MySQL 8.0.36");
    assert!(event.user.is_none());
}

#[test]
fn test_warning_event_with_category() {
    let events = capture(
        ForwarderConfig::new(DSN),
        StaticIdentity::anonymous(),
        &[LogRecord::new("cache miss storm", HostLevel::WARNING, "app::cache")],
    );

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, sentry::Level::Warning);
    assert_eq!(events[0].tags["category"], "app::cache");
}

#[test]
fn test_exception_event() {
    let events = capture(
        ForwarderConfig::new(DSN),
        StaticIdentity::anonymous(),
        &[LogRecord::new(
            Payload::fault(TemplateNotFound),
            HostLevel::WARNING,
            "app::views",
        )],
    );

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.level, sentry::Level::Error);
    assert_eq!(event.exception.len(), 1);
    assert_eq!(event.exception[0].ty, "TemplateNotFound");
    assert_eq!(event.exception[0].value.as_deref(), Some("template not found"));
    assert_eq!(event.tags["category"], "app::views");
}

#[test]
fn test_user_is_attached() {
    let identity = StaticIdentity::new(Identity {
        id: "7".into(),
        email: Some("a@b.com".into()),
        username: Some("editor".into()),
        admin: true,
        groups: vec!["Editors".into()],
    });
    let records = [LogRecord::new("boom", HostLevel::ERROR, "")];

    let events = capture(ForwarderConfig::new(DSN), identity.clone(), &records);
    let user = events[0].user.as_ref().unwrap();
    assert_eq!(user.id.as_deref(), Some("7"));
    assert_eq!(user.email.as_deref(), Some("a@b.com"));
    assert_eq!(user.username.as_deref(), Some("editor"));
    assert_eq!(user.ip_address.as_ref().unwrap().to_string(), "10.1.2.3");
    assert_eq!(user.other["Admin"], "Yes");
    assert_eq!(user.other["Groups"], "Editors");

    let anonymous = ForwarderConfig {
        anonymize_user: true,
        ..ForwarderConfig::new(DSN)
    };
    let events = capture(anonymous, identity, &records);
    assert!(events[0].user.is_none());
}

#[test]
fn test_suppressed_records_send_nothing() {
    let config = ForwarderConfig {
        suppressed_patterns: vec!["^Deprecated:".into()],
        suppressed_codes: [404, 999].iter().copied().collect(),
        ..ForwarderConfig::new(DSN)
    };
    let events = capture(
        config,
        StaticIdentity::anonymous(),
        &[
            LogRecord::new("Deprecated: foo()", HostLevel::WARNING, "app"),
            LogRecord::new("page not found", HostLevel::ERROR, "http-exception:404"),
            LogRecord::new("missing translation", HostLevel::ERROR, "message-source:site"),
            LogRecord::new("request served", HostLevel::INFO, "app"),
            LogRecord::new("cache warmed", HostLevel::TRACE, "app"),
        ],
    );
    assert!(events.is_empty());
}

#[test]
fn test_scopes_do_not_leak() {
    let request = StaticRequest::web("https://example.com/");
    let identity = StaticIdentity::anonymous();
    let environment = StaticEnvironment::default();
    let ctx = HostContext::new(&request, &identity, &environment);
    let forwarder = LogForwarder::new(ForwarderConfig::new(DSN));

    let events = sentry::test::with_captured_events(|| {
        forwarder.forward(
            &[
                LogRecord::new("first", HostLevel::ERROR, "app::one"),
                LogRecord::new("second", HostLevel::ERROR, ""),
            ],
            &ctx,
            &HubSink::new(),
        );
        sentry::capture_message("unrelated", sentry::Level::Info);
    });

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].tags["category"], "app::one");
    assert!(!events[1].tags.contains_key("category"));
    assert!(events[2].tags.is_empty());
    assert!(events[2].extra.is_empty());
}

#[test]
fn test_disabled_forwarder_sends_nothing() {
    let events = capture(
        ForwarderConfig {
            enabled: false,
            ..ForwarderConfig::new(DSN)
        },
        StaticIdentity::anonymous(),
        &[LogRecord::new("boom", HostLevel::ERROR, "")],
    );
    assert!(events.is_empty());
}
