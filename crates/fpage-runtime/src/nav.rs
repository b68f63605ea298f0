#![forbid(unsafe_code)]

//! Responsive navigation controller.
//!
//! A two-state machine (`Closed` → `Open` → `Closed`) over the burger menu.
//! Opening styles the nav and toggle, sets `aria-expanded`, locks page scroll
//! and shows a dimming overlay; every close path reverts exactly that.
//!
//! # Close triggers
//!
//! | Trigger | Condition |
//! |---------|-----------|
//! | toggle click | menu open |
//! | overlay click | always |
//! | `Escape` | menu open |
//! | nav link click | viewport below the mobile breakpoint |
//! | resize settle | width at/above the mobile breakpoint and menu open |
//!
//! Resizes are debounced; the settled width also recomputes the menu height.

use fpage_core::{
    Document, Element, Key, NodeId, PageConfig, PageEvent, RateLimiter, SelectorChain, TimerId,
    Viewport,
};

use crate::program::{RuntimeCx, TimerToken};

/// Nav container strategies, first hit wins.
pub const NAV_STRATEGIES: [&str; 3] = [".c-nav", "#navbarNav", ".navbar-collapse"];
/// Toggle strategies, first hit wins.
pub const TOGGLE_STRATEGIES: [&str; 2] = [".c-nav__toggle", ".navbar-toggler"];

const LINKS: &str = ".c-nav__item, .nav-link";
const OPEN_CLASS: &str = "is-open";
const SCROLL_LOCK: &str = "u-no-scroll";

/// Menu state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

/// Burger menu controller.
#[derive(Debug, Clone)]
pub struct NavController {
    nav: NodeId,
    toggle: NodeId,
    overlay: NodeId,
    links: Vec<NodeId>,
    state: MenuState,
    resize: RateLimiter<f64>,
}

impl NavController {
    /// Locate nav and toggle, create the overlay and apply the initial
    /// height. `None` (and no document changes) when either is missing.
    pub fn mount(doc: &mut Document, viewport: Viewport, config: &PageConfig) -> Option<Self> {
        let root = doc.root();
        let nav = SelectorChain::parse(NAV_STRATEGIES).ok()?.first_match(doc, root);
        let toggle = SelectorChain::parse(TOGGLE_STRATEGIES).ok()?.first_match(doc, root);
        let (Some(nav), Some(toggle)) = (nav, toggle) else {
            tracing::debug!(target: "fpage::nav", ?nav, ?toggle, "navigation markup missing");
            return None;
        };
        let links = doc.query_all(nav, &crate::selector(LINKS)?);

        let body = doc.body();
        let overlay = doc.append(
            body,
            Element::new("div")
                .with_class("menu-overlay")
                .with_style("position", "fixed")
                .with_style("top", "0")
                .with_style("left", "0")
                .with_style("right", "0")
                .with_style("bottom", "0")
                .with_style("background", "rgba(0, 0, 0, 0.5)")
                .with_style("opacity", "0")
                .with_style("visibility", "hidden")
                .with_style(
                    "transition",
                    "opacity 0.3s ease-in-out, visibility 0.3s ease-in-out",
                )
                .with_style("z-index", "998"),
        );

        let controller = Self {
            nav,
            toggle,
            overlay,
            links,
            state: MenuState::Closed,
            resize: RateLimiter::debounce(config.resize_debounce()),
        };
        controller.set_height(doc, viewport.width, config);
        tracing::debug!(target: "fpage::nav", links = controller.links.len(), "navigation mounted");
        Some(controller)
    }

    #[must_use]
    pub const fn state(&self) -> MenuState {
        self.state
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, MenuState::Open)
    }

    /// The nav container.
    #[must_use]
    pub const fn nav(&self) -> NodeId {
        self.nav
    }

    /// The toggle control.
    #[must_use]
    pub const fn toggle(&self) -> NodeId {
        self.toggle
    }

    /// The dimming overlay created on mount.
    #[must_use]
    pub const fn overlay(&self) -> NodeId {
        self.overlay
    }

    /// Nav links captured on mount.
    #[must_use]
    pub fn links(&self) -> &[NodeId] {
        &self.links
    }

    pub fn open(&mut self, doc: &mut Document) {
        self.state = MenuState::Open;
        doc.add_class(self.nav, OPEN_CLASS);
        doc.add_class(self.nav, "show");
        doc.add_class(self.toggle, OPEN_CLASS);
        doc.set_attr(self.toggle, "aria-expanded", "true");
        let body = doc.body();
        doc.add_class(body, SCROLL_LOCK);
        doc.set_style(self.overlay, "opacity", "1");
        doc.set_style(self.overlay, "visibility", "visible");
        tracing::debug!(target: "fpage::nav", "menu opened");
    }

    pub fn close(&mut self, doc: &mut Document) {
        let was_open = self.is_open();
        self.state = MenuState::Closed;
        doc.remove_class(self.nav, OPEN_CLASS);
        doc.remove_class(self.nav, "show");
        doc.remove_class(self.toggle, OPEN_CLASS);
        doc.set_attr(self.toggle, "aria-expanded", "false");
        let body = doc.body();
        doc.remove_class(body, SCROLL_LOCK);
        doc.set_style(self.overlay, "opacity", "0");
        doc.set_style(self.overlay, "visibility", "hidden");
        if was_open {
            tracing::debug!(target: "fpage::nav", "menu closed");
        }
    }

    /// Flip between open and closed.
    pub fn toggle_menu(&mut self, doc: &mut Document) {
        if self.is_open() {
            self.close(doc);
        } else {
            self.open(doc);
        }
    }

    /// Constrain the menu height below the mobile breakpoint, clear it
    /// otherwise.
    fn set_height(&self, doc: &mut Document, width: f64, config: &PageConfig) {
        if config.breakpoint(width).is_mobile() {
            let header = if width < config.breakpoint_phone {
                config.header_height_mobile
            } else {
                config.header_height
            };
            doc.set_style(self.nav, "height", &format!("calc(100vh - {header}px)"));
        } else {
            doc.remove_style(self.nav, "height");
        }
    }

    /// React to an event. Returns whether the controller acted on it.
    pub fn handle(&mut self, event: &PageEvent, cx: &mut RuntimeCx<'_>) -> bool {
        match event {
            PageEvent::Click { target, .. } => {
                let target = *target;
                if cx.doc.contains(self.toggle, target) {
                    self.toggle_menu(cx.doc);
                    true
                } else if target == self.overlay {
                    self.close(cx.doc);
                    true
                } else if self.links.iter().any(|&l| cx.doc.contains(l, target))
                    && cx.config.breakpoint(cx.viewport.width).is_mobile()
                {
                    self.close(cx.doc);
                    true
                } else {
                    false
                }
            }
            PageEvent::KeyDown(Key::Escape) if self.is_open() => {
                self.close(cx.doc);
                true
            }
            PageEvent::Resize { width, .. } => {
                self.resize.call(*width, cx.timers, TimerToken::NavResize);
                true
            }
            _ => false,
        }
    }

    /// Debounced resize landed.
    pub fn on_resize_settled(&mut self, id: TimerId, cx: &mut RuntimeCx<'_>) {
        let Some(width) = self.resize.fire(id) else {
            return;
        };
        tracing::trace!(target: "fpage::nav", width, "resize settled");
        self.set_height(cx.doc, width, cx.config);
        if !cx.config.breakpoint(width).is_mobile() && self.is_open() {
            self.close(cx.doc);
        }
    }

    /// Cancel the pending resize timer and stop listening for resizes.
    pub fn dispose(&mut self, cx: &mut RuntimeCx<'_>) {
        self.resize.dispose(cx.timers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::test_support::Rig;

    struct Page {
        doc: Document,
        nav: NodeId,
        toggle: NodeId,
        link_text: NodeId,
    }

    fn page(legacy: bool) -> Page {
        let mut doc = Document::new();
        let body = doc.body();
        let header = doc.append(body, Element::new("header"));
        let (nav_class, toggle_class, link_class) = if legacy {
            ("navbar-collapse", "navbar-toggler", "nav-link")
        } else {
            ("c-nav", "c-nav__toggle", "c-nav__item")
        };
        let toggle = doc.append(header, Element::new("button").with_class(toggle_class));
        let nav = doc.append(header, Element::new("nav").with_class(nav_class));
        let link = doc.append(
            nav,
            Element::new("a").with_class(link_class).with_attr("href", "#a"),
        );
        let link_text = doc.append(link, Element::new("span").with_text("A"));
        Page {
            doc,
            nav,
            toggle,
            link_text,
        }
    }

    #[test]
    fn missing_toggle_means_no_controller() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append(body, Element::new("nav").with_class("c-nav"));
        let before = doc.len();
        let nav = NavController::mount(&mut doc, Viewport::default(), &PageConfig::default());
        assert!(nav.is_none());
        assert_eq!(doc.len(), before);
    }

    #[test]
    fn legacy_markup_is_found_by_fallback_strategy() {
        let mut p = page(true);
        let nav = NavController::mount(&mut p.doc, Viewport::default(), &PageConfig::default())
            .expect("legacy markup");
        assert_eq!(nav.nav(), p.nav);
        assert_eq!(nav.toggle(), p.toggle);
        assert_eq!(nav.links().len(), 1);
    }

    #[test]
    fn toggle_opens_then_closes() {
        let p = page(false);
        let mut rig = Rig::new(p.doc);
        let mut nav = rig.mount_nav();

        assert!(rig.send_nav(&mut nav, PageEvent::click(p.toggle)));
        assert!(nav.is_open());
        let body = rig.doc.body();
        assert!(rig.doc.has_class(p.nav, "is-open"));
        assert!(rig.doc.has_class(p.nav, "show"));
        assert!(rig.doc.has_class(body, "u-no-scroll"));
        assert_eq!(rig.doc.attr(p.toggle, "aria-expanded"), Some("true"));
        assert_eq!(rig.doc.style(nav.overlay(), "visibility"), Some("visible"));

        rig.send_nav(&mut nav, PageEvent::click(p.toggle));
        assert_eq!(nav.state(), MenuState::Closed);
        assert!(!rig.doc.has_class(p.nav, "is-open"));
        assert!(!rig.doc.has_class(body, "u-no-scroll"));
        assert_eq!(rig.doc.attr(p.toggle, "aria-expanded"), Some("false"));
        assert_eq!(rig.doc.style(nav.overlay(), "opacity"), Some("0"));
    }

    #[test]
    fn overlay_and_escape_close() {
        let p = page(false);
        let mut rig = Rig::new(p.doc);
        let mut nav = rig.mount_nav();

        rig.send_nav(&mut nav, PageEvent::click(p.toggle));
        let overlay = nav.overlay();
        rig.send_nav(&mut nav, PageEvent::click(overlay));
        assert!(!nav.is_open());

        rig.send_nav(&mut nav, PageEvent::click(p.toggle));
        rig.send_nav(&mut nav, PageEvent::KeyDown(Key::Escape));
        assert!(!nav.is_open());
        assert!(!rig.send_nav(&mut nav, PageEvent::KeyDown(Key::Escape)));
    }

    #[test]
    fn link_click_closes_only_below_mobile_breakpoint() {
        let p = page(false);
        let mut rig = Rig::new(p.doc);
        let mut nav = rig.mount_nav();

        rig.send_nav(&mut nav, PageEvent::click(p.toggle));
        rig.send_nav(&mut nav, PageEvent::click(p.link_text));
        assert!(nav.is_open(), "desktop link click keeps the menu");

        rig.viewport = Viewport::new(800.0, 600.0);
        rig.send_nav(&mut nav, PageEvent::click(p.link_text));
        assert!(!nav.is_open());
    }

    #[test]
    fn height_depends_on_breakpoint_class() {
        let mut p = page(false);
        let config = PageConfig::default();
        NavController::mount(&mut p.doc, Viewport::new(375.0, 700.0), &config).unwrap();
        assert_eq!(p.doc.style(p.nav, "height"), Some("calc(100vh - 64px)"));

        let mut p = page(false);
        NavController::mount(&mut p.doc, Viewport::new(900.0, 700.0), &config).unwrap();
        assert_eq!(p.doc.style(p.nav, "height"), Some("calc(100vh - 72px)"));

        let mut p = page(false);
        NavController::mount(&mut p.doc, Viewport::new(1280.0, 700.0), &config).unwrap();
        assert_eq!(p.doc.style(p.nav, "height"), None);
    }
}
