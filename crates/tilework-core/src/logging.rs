//! Logging setup.
//!
//! All tilework crates log through `tracing` with targets under `tilework.`
//! (`tilework.tile`, `tilework.compositor`, `tilework.workbench`,
//! `tilework.config`, `tilework.host`). Installing a subscriber is the
//! host's business; [`init`] is a convenience for hosts without one.

/// Environment variable holding a filter directive for tilework targets.
pub const ENV_LOG: &str = "TILEWORK_LOG";
/// Fallback filter variable.
pub const ENV_RUST_LOG: &str = "RUST_LOG";
/// Directive used when neither variable is set.
pub const DEFAULT_DIRECTIVE: &str = "tilework=info";

/// Output format for [`init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one event per line.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Resolve the filter directive from a custom environment lookup.
///
/// `TILEWORK_LOG` wins over `RUST_LOG`; blank values are skipped.
#[must_use]
pub fn filter_directive_with<F>(get_env: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    [ENV_LOG, ENV_RUST_LOG]
        .into_iter()
        .filter_map(|key| get_env(key))
        .map(|value| value.trim().to_owned())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_owned())
}

/// Install a global subscriber filtered by `TILEWORK_LOG`/`RUST_LOG`.
///
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init(format: LogFormat) -> bool {
    use tracing_subscriber::EnvFilter;

    let directive = filter_directive_with(|key| std::env::var(key).ok());
    let filter =
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}
