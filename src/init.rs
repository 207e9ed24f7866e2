use std::borrow::Cow;

use serde_json::Value;

use crate::config::ForwarderConfig;
use crate::filters::initialize;

/// Builds Sentry client options from a forwarder configuration.
///
/// Returns `None` if the configuration leaves forwarding disabled.
pub fn client_options(config: &ForwarderConfig) -> Option<sentry::ClientOptions> {
    let ready = match initialize(config.clone()) {
        Ok(ready) => ready,
        Err(err) => {
            forwarder_debug!("not binding a sentry client: {}", err);
            return None;
        }
    };
    let config = ready.config();

    let mut options = sentry::ClientOptions {
        dsn: config.sink_endpoint.trim().parse().ok(),
        release: config.release.clone().map(Cow::Owned),
        environment: config.environment.clone().map(Cow::Owned),
        ..Default::default()
    };
    for (key, value) in &config.extra_sink_options {
        apply_option(&mut options, key, value);
    }
    Some(options)
}

fn apply_option(options: &mut sentry::ClientOptions, key: &str, value: &Value) {
    let applied = match key {
        "sample_rate" => value.as_f64().map(|rate| options.sample_rate = rate as f32),
        "debug" => value.as_bool().map(|debug| options.debug = debug),
        "server_name" => value
            .as_str()
            .map(|name| options.server_name = Some(Cow::Owned(name.to_owned()))),
        "max_breadcrumbs" => value
            .as_u64()
            .map(|max| options.max_breadcrumbs = max as usize),
        "attach_stacktrace" => value
            .as_bool()
            .map(|attach| options.attach_stacktrace = attach),
        "send_default_pii" => value
            .as_bool()
            .map(|send| options.send_default_pii = send),
        _ => None,
    };
    if applied.is_none() {
        forwarder_debug!("ignoring sink option {}={}", key, value);
    }
}

/// Binds a Sentry client for an enabled configuration.
///
/// The returned guard flushes pending events when dropped and has to be kept
/// alive as long as events are forwarded.
pub fn init_sentry(config: &ForwarderConfig) -> Option<sentry::ClientInitGuard> {
    client_options(config).map(sentry::init)
}
