#![forbid(unsafe_code)]

//! Page runtime configuration.
//!
//! [`PageConfig`] gathers every tunable the components use. Defaults match
//! the reference page script, so `PageConfig::default()` reproduces its
//! behaviour exactly.
//!
//! # Defaults
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `header_height` | 72px | Header height at or above the phone breakpoint |
//! | `header_height_mobile` | 64px | Header height below the phone breakpoint |
//! | `breakpoint_mobile` | 1024px | Collapsed navigation below this width |
//! | `breakpoint_phone` | 768px | Compact header below this width |
//! | `resize_debounce_ms` | 250 | Resize settle window |
//! | `scroll_throttle_ms` | 100 | Scroll polling window |
//! | `sticky_threshold` | 100px | Scroll offset for the pronounced header shadow |
//! | `scroll_top_threshold` | 300px | Scroll offset that reveals the back-to-top button |
//! | `count_up_duration_ms` | 2000 | Count-up ramp length |
//! | `frame_interval_ms` | 16 | Animation frame step |
//! | `submit_delay_ms` | 1000 | Simulated submission delay |
//! | `ripple_lifetime_ms` | 600 | Ripple span lifetime |
//! | `confirmation_url` | `thank_you.html` | Destination after a successful submit |
//!
//! # Environment Variables
//!
//! | Variable | Type | Field |
//! |----------|------|-------|
//! | `FPAGE_BREAKPOINT_MOBILE` | f64 | `breakpoint_mobile` |
//! | `FPAGE_BREAKPOINT_PHONE` | f64 | `breakpoint_phone` |
//! | `FPAGE_RESIZE_DEBOUNCE_MS` | u64 | `resize_debounce_ms` |
//! | `FPAGE_SCROLL_THROTTLE_MS` | u64 | `scroll_throttle_ms` |
//! | `FPAGE_FRAME_INTERVAL_MS` | u64 | `frame_interval_ms` |
//! | `FPAGE_SUBMIT_DELAY_MS` | u64 | `submit_delay_ms` |
//! | `FPAGE_CONFIRMATION_URL` | string | `confirmation_url` |
//!
//! # Loading
//!
//! With the `page-config` feature the config also loads from TOML or JSON:
//!
//! ```toml
//! breakpoint_mobile = 992.0
//! submit_delay_ms = 500
//! confirmation_url = "/danke"
//! ```

#[cfg(feature = "page-config")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "page-config")]
use serde::{Deserialize, Serialize};

use crate::geometry::BreakpointClass;

/// Default header height (px).
pub const DEFAULT_HEADER_HEIGHT: f64 = 72.0;
/// Default compact header height (px).
pub const DEFAULT_HEADER_HEIGHT_MOBILE: f64 = 64.0;
/// Default mobile breakpoint (px).
pub const DEFAULT_BREAKPOINT_MOBILE: f64 = 1024.0;
/// Default phone breakpoint (px).
pub const DEFAULT_BREAKPOINT_PHONE: f64 = 768.0;
/// Default resize debounce.
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 250;
/// Default scroll throttle.
pub const DEFAULT_SCROLL_THROTTLE_MS: u64 = 100;
/// Default simulated submission delay.
pub const DEFAULT_SUBMIT_DELAY_MS: u64 = 1000;
/// Default confirmation destination.
pub const DEFAULT_CONFIRMATION_URL: &str = "thank_you.html";

/// Upper bound for any configured delay.
pub const MAX_DELAY_MS: u64 = 60_000;

/// Configuration for every page component.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "page-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "page-config", serde(default))]
pub struct PageConfig {
    pub header_height: f64,
    pub header_height_mobile: f64,
    pub breakpoint_mobile: f64,
    pub breakpoint_phone: f64,
    pub resize_debounce_ms: u64,
    pub scroll_throttle_ms: u64,
    pub sticky_threshold: f64,
    pub scroll_top_threshold: f64,
    pub count_up_duration_ms: u64,
    pub frame_interval_ms: u64,
    pub submit_delay_ms: u64,
    pub ripple_lifetime_ms: u64,
    pub confirmation_url: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            header_height: DEFAULT_HEADER_HEIGHT,
            header_height_mobile: DEFAULT_HEADER_HEIGHT_MOBILE,
            breakpoint_mobile: DEFAULT_BREAKPOINT_MOBILE,
            breakpoint_phone: DEFAULT_BREAKPOINT_PHONE,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            scroll_throttle_ms: DEFAULT_SCROLL_THROTTLE_MS,
            sticky_threshold: 100.0,
            scroll_top_threshold: 300.0,
            count_up_duration_ms: 2000,
            frame_interval_ms: 16,
            submit_delay_ms: DEFAULT_SUBMIT_DELAY_MS,
            ripple_lifetime_ms: 600,
            confirmation_url: DEFAULT_CONFIRMATION_URL.to_string(),
        }
    }
}

impl PageConfig {
    /// Builder: set both breakpoints.
    #[must_use]
    pub fn with_breakpoints(mut self, mobile: f64, phone: f64) -> Self {
        self.breakpoint_mobile = mobile;
        self.breakpoint_phone = phone;
        self
    }

    /// Builder: set the simulated submission delay.
    #[must_use]
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Builder: set the confirmation destination.
    #[must_use]
    pub fn with_confirmation_url(mut self, url: impl Into<String>) -> Self {
        self.confirmation_url = url.into();
        self
    }

    /// Resize settle window.
    #[must_use]
    pub const fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// Scroll polling window.
    #[must_use]
    pub const fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }

    /// Animation frame step.
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Simulated submission delay.
    #[must_use]
    pub const fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    /// Ripple span lifetime.
    #[must_use]
    pub const fn ripple_lifetime(&self) -> Duration {
        Duration::from_millis(self.ripple_lifetime_ms)
    }

    /// Breakpoint class for a viewport width.
    #[must_use]
    pub fn breakpoint(&self, width: f64) -> BreakpointClass {
        BreakpointClass::classify(width, self.breakpoint_mobile, self.breakpoint_phone)
    }

    /// Load overrides from environment variables on top of the defaults.
    ///
    /// Unparseable values are ignored. The result is [`validated`](Self::validated).
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (env-like).
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let float = |key: &str| lookup(key).and_then(|v| v.trim().parse::<f64>().ok());
        let millis = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        if let Some(v) = float("FPAGE_BREAKPOINT_MOBILE") {
            self.breakpoint_mobile = v;
        }
        if let Some(v) = float("FPAGE_BREAKPOINT_PHONE") {
            self.breakpoint_phone = v;
        }
        if let Some(v) = millis("FPAGE_RESIZE_DEBOUNCE_MS") {
            self.resize_debounce_ms = v;
        }
        if let Some(v) = millis("FPAGE_SCROLL_THROTTLE_MS") {
            self.scroll_throttle_ms = v;
        }
        if let Some(v) = millis("FPAGE_FRAME_INTERVAL_MS") {
            self.frame_interval_ms = v;
        }
        if let Some(v) = millis("FPAGE_SUBMIT_DELAY_MS") {
            self.submit_delay_ms = v;
        }
        if let Some(v) = lookup("FPAGE_CONFIRMATION_URL").filter(|v| !v.trim().is_empty()) {
            self.confirmation_url = v.trim().to_string();
        }
        self.validated()
    }

    /// Clamp values to safe ranges.
    ///
    /// - Non-finite or negative pixel values fall back to their defaults.
    /// - The phone breakpoint never exceeds the mobile breakpoint.
    /// - Delays are capped at [`MAX_DELAY_MS`]; the frame step is at least 1ms
    ///   and the count-up lasts at least one frame.
    #[must_use]
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        let px = |v: f64, fallback: f64| if v.is_finite() && v >= 0.0 { v } else { fallback };

        self.header_height = px(self.header_height, defaults.header_height);
        self.header_height_mobile = px(self.header_height_mobile, defaults.header_height_mobile);
        self.breakpoint_mobile = px(self.breakpoint_mobile, defaults.breakpoint_mobile);
        self.breakpoint_phone =
            px(self.breakpoint_phone, defaults.breakpoint_phone).min(self.breakpoint_mobile);
        self.sticky_threshold = px(self.sticky_threshold, defaults.sticky_threshold);
        self.scroll_top_threshold = px(self.scroll_top_threshold, defaults.scroll_top_threshold);

        self.resize_debounce_ms = self.resize_debounce_ms.min(MAX_DELAY_MS);
        self.scroll_throttle_ms = self.scroll_throttle_ms.min(MAX_DELAY_MS);
        self.submit_delay_ms = self.submit_delay_ms.min(MAX_DELAY_MS);
        self.ripple_lifetime_ms = self.ripple_lifetime_ms.min(MAX_DELAY_MS);
        self.frame_interval_ms = self.frame_interval_ms.clamp(1, 1000);
        self.count_up_duration_ms = self
            .count_up_duration_ms
            .clamp(self.frame_interval_ms, MAX_DELAY_MS);

        if self.confirmation_url.trim().is_empty() {
            self.confirmation_url = defaults.confirmation_url;
        }
        self
    }

    /// Human-readable list of problems; empty means the config is usable
    /// as-is without clamping.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.breakpoint_phone > self.breakpoint_mobile {
            errors.push(format!(
                "breakpoint_phone ({}) must not exceed breakpoint_mobile ({})",
                self.breakpoint_phone, self.breakpoint_mobile
            ));
        }
        if self.frame_interval_ms == 0 {
            errors.push("frame_interval_ms must be > 0".into());
        }
        if self.count_up_duration_ms < self.frame_interval_ms {
            errors.push("count_up_duration_ms must cover at least one frame".into());
        }
        if self.confirmation_url.trim().is_empty() {
            errors.push("confirmation_url must not be empty".into());
        }
        for (name, v) in [
            ("header_height", self.header_height),
            ("header_height_mobile", self.header_height_mobile),
            ("breakpoint_mobile", self.breakpoint_mobile),
            ("breakpoint_phone", self.breakpoint_phone),
        ] {
            if !v.is_finite() || v < 0.0 {
                errors.push(format!("{name} must be a non-negative number, got {v}"));
            }
        }
        errors
    }

    /// Load from a TOML string.
    #[cfg(feature = "page-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "page-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "page-config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a TOML string and reject anything that would need clamping.
    #[cfg(feature = "page-config")]
    pub fn from_toml_str_strict(s: &str) -> Result<Self, ConfigError> {
        let config = Self::from_toml_str(s)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors from loading a [`PageConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "page-config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "page-config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "page-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "page-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "page-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "page-config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
