//! Structured logging setup.
//!
//! The library never installs a global subscriber. Components receive a
//! [`tracing::Span`] at construction and parent every event to it; the
//! embedding application decides where those events go, typically with a
//! [`Dispatch`] built here and installed via
//! [`tracing::dispatcher::with_default`] or `set_global_default`.

use tracing::{Dispatch, Span};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{AmnError, Result};

/// Build a subscriber dispatch from the logging configuration.
///
/// # Errors
/// Returns `AmnError::Config` if the level is not a valid filter directive.
pub fn build_dispatch(config: &LoggingConfig) -> Result<Dispatch> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| AmnError::Config(format!("invalid log filter '{}': {e}", config.level)))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let dispatch = if config.json {
        Dispatch::new(builder.json().finish())
    } else {
        Dispatch::new(builder.finish())
    };
    Ok(dispatch)
}

/// Root span for one conversation session. Components created for the
/// session log beneath it.
#[must_use]
pub fn session_span(session: &str) -> Span {
    tracing::info_span!("amn_session", session = %session)
}

/// Truncate text for log records without splitting a UTF-8 character.
#[must_use]
pub fn truncate_for_log(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
