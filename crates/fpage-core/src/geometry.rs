#![forbid(unsafe_code)]

//! Geometry: document rectangles, the viewport, breakpoint classes and
//! observer root margins.
//!
//! All values are CSS pixels. Element rectangles live in document
//! coordinates (origin at the top of the page), so the visible region is the
//! viewport rectangle offset by the current scroll position.

use std::fmt;

/// Axis-aligned rectangle in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Area, treating negative extents as empty.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlap of two rectangles.
    ///
    /// Returns `None` when the rectangles are disjoint. Rectangles that only
    /// touch along an edge produce a zero-sized overlap, which still counts
    /// as an intersection (matching how browsers report edge-adjacent
    /// targets).
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

/// Visible area of the page plus the current vertical scroll offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_y: f64,
}

impl Viewport {
    /// Create a viewport scrolled to the top.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_y: 0.0,
        }
    }

    /// Builder: set the scroll offset.
    #[must_use]
    pub const fn with_scroll(mut self, scroll_y: f64) -> Self {
        self.scroll_y = scroll_y;
        self
    }

    /// The visible region in document coordinates.
    #[must_use]
    pub fn visible_rect(&self) -> Rect {
        Rect::new(0.0, self.scroll_y, self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// Layout class derived from the viewport width.
///
/// Never stored: recompute from the current width whenever it is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreakpointClass {
    /// At or above the mobile breakpoint.
    Desktop,
    /// Below the mobile breakpoint, at or above the phone breakpoint.
    Tablet,
    /// Below the phone breakpoint.
    Phone,
}

impl BreakpointClass {
    /// Classify a width against the two thresholds.
    #[must_use]
    pub fn classify(width: f64, mobile_breakpoint: f64, phone_breakpoint: f64) -> Self {
        if width >= mobile_breakpoint {
            Self::Desktop
        } else if width >= phone_breakpoint {
            Self::Tablet
        } else {
            Self::Phone
        }
    }

    /// Whether the collapsed (burger) navigation layout applies.
    #[inline]
    #[must_use]
    pub const fn is_mobile(self) -> bool {
        !matches!(self, Self::Desktop)
    }
}

/// One side of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    /// Percentage of the root dimension on the same axis.
    Percent(f64),
}

impl Length {
    /// Resolve against the root dimension on the same axis.
    #[must_use]
    pub fn resolve(self, basis: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => basis * pct / 100.0,
        }
    }

    fn parse(token: &str) -> Result<Self, MarginParseError> {
        let bad = || MarginParseError::InvalidLength(token.to_string());
        if let Some(num) = token.strip_suffix('%') {
            let value = num.parse::<f64>().map_err(|_| bad())?;
            return value.is_finite().then_some(Self::Percent(value)).ok_or_else(bad);
        }
        let num = token.strip_suffix("px").unwrap_or(token);
        let value = num.parse::<f64>().map_err(|_| bad())?;
        // Bare numbers other than zero need a unit.
        if !token.ends_with("px") && value != 0.0 {
            return Err(bad());
        }
        value.is_finite().then_some(Self::Px(value)).ok_or_else(bad)
    }
}

/// Error from [`RootMargin::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarginParseError {
    /// No lengths given.
    Empty,
    /// More than four lengths given.
    TooManyValues(usize),
    /// A token is not a `px`/`%` length.
    InvalidLength(String),
}

impl fmt::Display for MarginParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "root margin is empty"),
            Self::TooManyValues(n) => write!(f, "root margin has {n} values, expected 1-4"),
            Self::InvalidLength(tok) => write!(f, "invalid root margin length: {tok:?}"),
        }
    }
}

impl std::error::Error for MarginParseError {}

/// Margin applied to the observer root before intersecting.
///
/// Positive values grow the root, negative values shrink it. Written in CSS
/// shorthand order (`top right bottom left`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl RootMargin {
    /// No margin.
    pub const ZERO: Self = Self {
        top: Length::Px(0.0),
        right: Length::Px(0.0),
        bottom: Length::Px(0.0),
        left: Length::Px(0.0),
    };

    /// Parse CSS margin shorthand with one to four values.
    pub fn parse(src: &str) -> Result<Self, MarginParseError> {
        let tokens = src
            .split_whitespace()
            .map(Length::parse)
            .collect::<Result<Vec<_>, _>>()?;
        let [top, right, bottom, left] = match tokens.as_slice() {
            [] => return Err(MarginParseError::Empty),
            [all] => [*all; 4],
            [v, h] => [*v, *h, *v, *h],
            [t, h, b] => [*t, *h, *b, *h],
            [t, r, b, l] => [*t, *r, *b, *l],
            more => return Err(MarginParseError::TooManyValues(more.len())),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    /// Apply the margin to a root rectangle.
    #[must_use]
    pub fn apply(&self, root: Rect) -> Rect {
        let top = self.top.resolve(root.height);
        let bottom = self.bottom.resolve(root.height);
        let left = self.left.resolve(root.width);
        let right = self.right.resolve(root.width);
        Rect::new(
            root.x - left,
            root.y - top,
            root.width + left + right,
            root.height + top + bottom,
        )
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Fraction of `target` that lies inside `root`.
///
/// `None` when the two do not touch at all. A zero-area target that touches
/// the root is fully visible.
#[must_use]
pub fn intersection_ratio(target: &Rect, root: &Rect) -> Option<f64> {
    let overlap = target.intersection(root)?;
    let area = target.area();
    if area <= 0.0 {
        return Some(1.0);
    }
    Some((overlap.area() / area).clamp(0.0, 1.0))
}
