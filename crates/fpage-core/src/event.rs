#![forbid(unsafe_code)]

//! Canonical input events and outward effects.
//!
//! The host translates platform callbacks (DOM listeners, a test script, a
//! recorded session) into [`PageEvent`] values and pushes them into the
//! runtime one at a time. Components never see raw platform events.
//!
//! Components answer with document mutations plus, occasionally, a
//! [`PageEffect`] the host must carry out on the real page (navigation, an
//! alert, a scroll).

use crate::dom::NodeId;

/// Keyboard key, normalised from DOM `KeyboardEvent.key` values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Char(char),
    /// Any other named key, kept verbatim.
    Named(String),
}

impl Key {
    /// Map a DOM `key` string.
    #[must_use]
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Named(other.to_string()),
                }
            }
        }
    }
}

/// A single input delivered to the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Pointer activation. Coordinates are viewport-relative.
    Click {
        target: NodeId,
        client_x: f64,
        client_y: f64,
    },
    /// Key pressed anywhere on the page.
    KeyDown(Key),
    /// Viewport resized.
    Resize { width: f64, height: f64 },
    /// Page scrolled to a new vertical offset.
    Scroll { y: f64 },
    /// Focus left a control.
    Blur(NodeId),
    /// Text control edited; `value` is the control's new value.
    Input { target: NodeId, value: String },
    /// Checkbox or radio toggled.
    Toggle { target: NodeId, checked: bool },
    /// Form submission requested.
    Submit(NodeId),
    /// Pointer entered an element.
    PointerEnter(NodeId),
    /// Pointer left an element.
    PointerLeave(NodeId),
    /// An image or video failed to load.
    MediaError(NodeId),
}

impl PageEvent {
    /// Click at the viewport origin.
    #[must_use]
    pub const fn click(target: NodeId) -> Self {
        Self::Click {
            target,
            client_x: 0.0,
            client_y: 0.0,
        }
    }

    /// Short, stable name for logs and traces.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Click { .. } => "click",
            Self::KeyDown(_) => "key",
            Self::Resize { .. } => "resize",
            Self::Scroll { .. } => "scroll",
            Self::Blur(_) => "blur",
            Self::Input { .. } => "input",
            Self::Toggle { .. } => "toggle",
            Self::Submit(_) => "submit",
            Self::PointerEnter(_) => "pointerenter",
            Self::PointerLeave(_) => "pointerleave",
            Self::MediaError(_) => "mediaerror",
        }
    }

    /// Target node for element-bound events.
    #[must_use]
    pub const fn target(&self) -> Option<NodeId> {
        match self {
            Self::Click { target, .. }
            | Self::Input { target, .. }
            | Self::Toggle { target, .. } => Some(*target),
            Self::Blur(n)
            | Self::Submit(n)
            | Self::PointerEnter(n)
            | Self::PointerLeave(n)
            | Self::MediaError(n) => Some(*n),
            Self::KeyDown(_) | Self::Resize { .. } | Self::Scroll { .. } => None,
        }
    }

    /// Whether the event can move elements relative to the viewport.
    #[must_use]
    pub const fn affects_viewport(&self) -> bool {
        matches!(self, Self::Resize { .. } | Self::Scroll { .. })
    }
}

/// Side effect the host performs outside the document model.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEffect {
    /// Leave the page for `url`.
    Navigate(String),
    /// Show a blocking alert.
    Alert(String),
    /// Scroll the window to an absolute offset.
    ScrollTo { top: f64, smooth: bool },
}
