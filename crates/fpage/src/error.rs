#![forbid(unsafe_code)]

//! FrankenPage error model and graceful degradation.
//!
//! # Design Principles
//!
//! 1. **Result at the edges**: page behaviours never fail the page; only the
//!    host-facing surfaces (config loading, input records, replay) return
//!    errors.
//! 2. **Domain-specific errors**: each crate keeps its own error type and
//!    the facade wraps them so callers can match on what matters.
//! 3. **Graceful degradation**: every variant maps to a
//!    [`DegradationAction`] the host can apply instead of giving up.

use std::fmt;

use fpage_core::{ConfigError, SelectorError};

/// Top-level error type for FrankenPage hosts.
#[derive(Debug)]
pub enum Error {
    /// A selector failed to parse.
    Selector(SelectorError),
    /// Configuration could not be loaded or validated.
    Config(ConfigError),
    /// The host driver rejected input.
    #[cfg(feature = "web")]
    Web(fpage_web::WebPageError),
    /// A recorded session could not be replayed.
    #[cfg(feature = "input-parser")]
    Replay(fpage_web::session_record::ReplayError),
    /// Raw I/O error (convenience variant for `?` on io::Result).
    Io(std::io::Error),
}

/// Standard result type for FrankenPage APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// What the host should do when an error occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationAction {
    /// Leave the affected behaviour unmounted; the rest of the page runs.
    SkipBehaviour,
    /// Fall back to the default configuration.
    UseDefaults,
    /// Drop the offending input and keep going.
    DropInput,
    /// Stop driving the page.
    Shutdown,
}

impl Error {
    /// Determine the graceful degradation action for this error.
    pub fn degradation(&self) -> DegradationAction {
        match self {
            Self::Selector(_) => DegradationAction::SkipBehaviour,
            Self::Config(_) => DegradationAction::UseDefaults,
            #[cfg(feature = "web")]
            Self::Web(fpage_web::WebPageError::Disposed) => DegradationAction::Shutdown,
            #[cfg(feature = "input-parser")]
            Self::Web(fpage_web::WebPageError::Input(_)) => DegradationAction::DropInput,
            #[cfg(feature = "input-parser")]
            Self::Replay(_) => DegradationAction::DropInput,
            Self::Io(_) => DegradationAction::Shutdown,
        }
    }

    /// Error type label for logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Selector(_) => "selector",
            Self::Config(_) => "config",
            #[cfg(feature = "web")]
            Self::Web(_) => "web",
            #[cfg(feature = "input-parser")]
            Self::Replay(_) => "replay",
            Self::Io(_) => "io",
        }
    }

    /// Whether the error is recoverable (does not require shutdown).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.degradation(), DegradationAction::Shutdown)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector(err) => write!(f, "selector: {err}"),
            Self::Config(err) => write!(f, "config: {err}"),
            #[cfg(feature = "web")]
            Self::Web(err) => write!(f, "{err}"),
            #[cfg(feature = "input-parser")]
            Self::Replay(err) => write!(f, "replay: {err}"),
            Self::Io(err) => write!(f, "I/O: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Selector(err) => Some(err),
            Self::Config(err) => Some(err),
            #[cfg(feature = "web")]
            Self::Web(err) => Some(err),
            #[cfg(feature = "input-parser")]
            Self::Replay(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<SelectorError> for Error {
    fn from(err: SelectorError) -> Self {
        Self::Selector(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(feature = "web")]
impl From<fpage_web::WebPageError> for Error {
    fn from(err: fpage_web::WebPageError) -> Self {
        Self::Web(err)
    }
}

#[cfg(feature = "input-parser")]
impl From<fpage_web::input_parser::InputParseError> for Error {
    fn from(err: fpage_web::input_parser::InputParseError) -> Self {
        Self::Web(fpage_web::WebPageError::Input(err))
    }
}

#[cfg(feature = "input-parser")]
impl From<fpage_web::session_record::ReplayError> for Error {
    fn from(err: fpage_web::session_record::ReplayError) -> Self {
        Self::Replay(err)
    }
}
