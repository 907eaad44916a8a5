//! Process wide tracing setup for hosts and tests.
//!
//! Every integration test calls [`init_logging`], and a host embedding the
//! auction or the delayer may already own the global subscriber. Both
//! cases are fine: installation is attempted once per process and a
//! subscriber that is already in place is left alone.

use std::{env, sync::Once};

use tracing_subscriber::EnvFilter;

static LOG_INIT: Once = Once::new();

/// Output format of the log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text { ansi: bool },
    Json,
}

impl LogFormat {
    /// `RUST_LOG_FORMAT=json` selects JSON, anything else text. Text is
    /// coloured unless `NO_COLOR` is set to a non-empty value.
    fn from_env() -> Self {
        Self::new(
            env::var("RUST_LOG_FORMAT").ok().as_deref(),
            env::var("NO_COLOR").ok().as_deref(),
        )
    }

    fn new(format: Option<&str>, no_color: Option<&str>) -> Self {
        match format {
            Some("json") => Self::Json,
            _ => Self::Text {
                ansi: no_color.is_none_or(str::is_empty),
            },
        }
    }
}

/// Install the global tracing subscriber, filtered by `RUST_LOG`.
pub fn init_logging() {
    LOG_INIT.call_once(|| {
        let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
        let installed = match LogFormat::from_env() {
            LogFormat::Json => builder.json().try_init(),
            LogFormat::Text { ansi } => builder.with_ansi(ansi).try_init(),
        };
        if installed.is_err() {
            tracing::debug!("keeping the existing global subscriber");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::{LogFormat, init_logging};

    #[test]
    fn format_selection() {
        assert_eq!(LogFormat::new(Some("json"), None), LogFormat::Json);
        assert_eq!(LogFormat::new(Some("json"), Some("1")), LogFormat::Json);
        assert_eq!(LogFormat::new(None, None), LogFormat::Text { ansi: true });
        assert_eq!(LogFormat::new(Some("text"), Some("")), LogFormat::Text { ansi: true });
        assert_eq!(LogFormat::new(None, Some("1")), LogFormat::Text { ansi: false });
    }

    #[test]
    fn existing_subscriber_is_kept() {
        let _ = tracing::subscriber::set_global_default(tracing::subscriber::NoSubscriber::default());
        init_logging();
        init_logging();
        tracing::info!("still logging");
    }
}
