/// The `log` target all diagnostics of this crate are emitted under.
pub const DIAGNOSTICS_TARGET: &str = "sentry_log_forwarder";

/// Emits a debug diagnostic through the `log` facade.
///
/// Records of this target are never buffered for forwarding, see
/// `RecordBuffer`.
macro_rules! forwarder_debug {
    ($($arg:tt)*) => {
        ::log::debug!(target: $crate::macros::DIAGNOSTICS_TARGET, $($arg)*)
    };
}
