#![forbid(unsafe_code)]

//! Structured logging.
//!
//! Every crate in the workspace logs through `tracing`. Nothing installs a
//! subscriber implicitly; embedders either bring their own or call
//! [`init_json_logging`] (feature `tracing-json`) for newline-delimited JSON
//! on stderr.
//!
//! Targets used across the workspace:
//!
//! | Target | Emits |
//! |--------|-------|
//! | `fpage::nav` | menu transitions, height recomputation |
//! | `fpage::viewport` | spy/reveal/count-up/sticky changes |
//! | `fpage::forms` | validation outcomes, submission |
//! | `fpage::widgets` | poll, modal, media |
//! | `fpage::runtime` | bootstrap, dispatch, timers |

/// Environment variable holding the filter directive for
/// [`init_json_logging`].
pub const LOG_ENV: &str = "FPAGE_LOG";

/// Install a JSON `tracing` subscriber filtered by `FPAGE_LOG`
/// (default `info`).
///
/// Returns an error if a global subscriber is already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
}
