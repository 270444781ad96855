//! Structured logging around a `slog::Logger`, built the way the reference stack's
//! `flux::logging` does it: a `sloggers` drain whose shape is described by a small TOML blob fed
//! through `serdeconv`, rather than wiring up `slog-term` by hand.

use sloggers::{Config, LoggerConfig};

/// A terminal drain at `debug` level writing to stderr — the reference's default, used whenever
/// an embedder doesn't supply its own `slog::Logger`.
pub fn init() -> slog::Logger {
    let config: LoggerConfig = serdeconv::from_toml_str(
        r#"
type = "terminal"
level = "debug"
destination = "stderr"
"#,
    )
    .expect("built-in default logging config is malformed");

    config.build_logger().expect("failed to build default logger")
}

/// A logger that drops every record — for tests and for embedders who do their own logging.
pub fn discard() -> slog::Logger {
    slog::Logger::root(slog::Discard, slog::o!())
}
