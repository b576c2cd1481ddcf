//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! Behavior:
//! - LOG_LEVEL controls the filter (e.g. "debug" or detailed directives like
//!   "info,session=debug,tower_http=info"). Without it, the per-target
//!   defaults below apply.
//! - LOG_FORMAT selects "pretty" (default), "compact", or "json".
//!
//! Notes:
//! - We include targets in the output to disambiguate sources.
//! - Tower HTTP TraceLayer still adds per-request spans; this complements it.

use tracing_subscriber::EnvFilter;

/// Default per-target verbosity. The session core and the generator are the
/// two places worth watching at debug level in normal operation; the store
/// and the HTTP stack stay at info.
const DEFAULT_DIRECTIVES: &[&str] = &[
    "info",
    "session=debug",
    "generator=debug",
    "newslex_backend=debug",
    "store=info",
    "tower_http=info",
    "axum=info",
];

fn default_filter() -> String {
    DEFAULT_DIRECTIVES.join(",")
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(default_filter()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // Choose the output format; don't try to store different layer types.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        Ok("compact") => builder.compact().init(),
        _ => builder.init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_cover_the_core_targets() {
        let filter = default_filter();
        assert!(filter.starts_with("info,"));
        assert!(filter.contains("session=debug"));
        assert!(filter.contains("generator=debug"));
        // must parse as a valid EnvFilter directive list
        assert!(EnvFilter::try_new(&filter).is_ok());
    }
}
