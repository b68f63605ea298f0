#![forbid(unsafe_code)]

//! Bootstrap and dispatch.
//!
//! [`PageRuntime`] is the single owner of the document, the timer queue and
//! every mounted component. There is no global state: the host calls
//! [`PageRuntime::bootstrap`] once, then drives the page with
//! [`dispatch`](PageRuntime::dispatch) and [`advance`](PageRuntime::advance)
//! and drains [`take_effects`](PageRuntime::take_effects).
//!
//! # Ordering
//!
//! Components mount, and receive events, in a fixed order: navigation,
//! viewport engine, smooth scroll, micro-interactions, forms, count-up,
//! media, poll, privacy modal. Handlers never wait on each other; every
//! deferred action goes through the timer queue as a [`TimerToken`].

use std::time::Duration;

use fpage_core::{
    Document, NodeId, PageConfig, PageEffect, PageEvent, TimerQueue, Viewport,
    scheduler::{Fired, PendingTimer},
};
use fpage_widgets::{
    MediaOptimizer, Microinteractions, Poll, PrivacyModal, SmoothScroll, Widget, WidgetCx,
    WidgetTask,
};

use crate::forms::FormEngine;
use crate::nav::NavController;
use crate::viewport::{CountUp, ViewportEngine};

/// Routes a fired timer back to the component that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerToken {
    /// Debounced resize for the navigation controller.
    NavResize,
    /// Throttled scroll for the sticky header.
    StickyScroll,
    /// Throttled scroll for the back-to-top button.
    ScrollTopScroll,
    /// Next animation frame of a count-up ramp.
    CountUpFrame(NodeId),
    /// End of the simulated submission delay.
    SubmitRedirect(NodeId),
    /// Deferred widget work.
    Widget(WidgetTask),
}

/// Everything a runtime component may touch while handling an event.
pub struct RuntimeCx<'a> {
    pub doc: &'a mut Document,
    pub viewport: Viewport,
    pub config: &'a PageConfig,
    pub timers: &'a mut TimerQueue<TimerToken>,
    pub effects: &'a mut Vec<PageEffect>,
}

/// The mounted page.
#[derive(Debug)]
pub struct PageRuntime {
    doc: Document,
    viewport: Viewport,
    config: PageConfig,
    timers: TimerQueue<TimerToken>,
    effects: Vec<PageEffect>,
    nav: Option<NavController>,
    viewport_engine: ViewportEngine,
    smooth_scroll: Option<SmoothScroll>,
    micro: Option<Microinteractions>,
    forms: Option<FormEngine>,
    count_up: Option<CountUp>,
    media: Option<MediaOptimizer>,
    poll: Option<Poll>,
    privacy: Option<PrivacyModal>,
    disposed: bool,
}

/// Borrowing the runtime's fields one by one keeps the components mutable
/// alongside the context.
macro_rules! runtime_cx {
    ($self:ident) => {
        RuntimeCx {
            doc: &mut $self.doc,
            viewport: $self.viewport,
            config: &$self.config,
            timers: &mut $self.timers,
            effects: &mut $self.effects,
        }
    };
}

impl PageRuntime {
    /// Mount every component and take the initial visibility measurement.
    #[must_use]
    pub fn bootstrap(mut document: Document, viewport: Viewport, config: PageConfig) -> Self {
        let config = config.validated();
        let _span = tracing::debug_span!(target: "fpage::runtime", "bootstrap").entered();

        let nav = NavController::mount(&mut document, viewport, &config);
        let viewport_engine = ViewportEngine::mount(&mut document, &config);
        let smooth_scroll = SmoothScroll::mount(&mut document, &config);
        let micro = Microinteractions::mount(&mut document, &config);
        let forms = FormEngine::mount(&document);
        let count_up = CountUp::mount(&document);
        let media = MediaOptimizer::mount(&mut document, &config);
        let poll = Poll::mount(&mut document, &config);
        let privacy = PrivacyModal::mount(&mut document, &config);

        tracing::info!(
            target: "fpage::runtime",
            nav = nav.is_some(),
            forms = forms.is_some(),
            count_up = count_up.is_some(),
            media = media.is_some(),
            poll = poll.is_some(),
            privacy = privacy.is_some(),
            "page bootstrapped"
        );

        let mut runtime = Self {
            doc: document,
            viewport,
            config,
            timers: TimerQueue::new(),
            effects: Vec::new(),
            nav,
            viewport_engine,
            smooth_scroll,
            micro,
            forms,
            count_up,
            media,
            poll,
            privacy,
            disposed: false,
        };
        runtime.refresh_visibility();
        runtime
    }

    // --- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable document access for host reflows (e.g. updated rects).
    /// Call [`refresh_visibility`](Self::refresh_visibility) afterwards.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub const fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Current runtime time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Pending timers in firing order.
    #[must_use]
    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.timers.pending()
    }

    #[must_use]
    pub const fn nav(&self) -> Option<&NavController> {
        self.nav.as_ref()
    }

    #[must_use]
    pub const fn viewport_engine(&self) -> &ViewportEngine {
        &self.viewport_engine
    }

    #[must_use]
    pub const fn forms(&self) -> Option<&FormEngine> {
        self.forms.as_ref()
    }

    #[must_use]
    pub const fn count_up(&self) -> Option<&CountUp> {
        self.count_up.as_ref()
    }

    #[must_use]
    pub const fn media(&self) -> Option<&MediaOptimizer> {
        self.media.as_ref()
    }

    #[must_use]
    pub const fn poll(&self) -> Option<&Poll> {
        self.poll.as_ref()
    }

    #[must_use]
    pub const fn privacy_modal(&self) -> Option<&PrivacyModal> {
        self.privacy.as_ref()
    }

    #[must_use]
    pub const fn micro(&self) -> Option<&Microinteractions> {
        self.micro.as_ref()
    }

    // --- Driving ------------------------------------------------------------

    /// Route one event to every component.
    pub fn dispatch(&mut self, event: PageEvent) {
        if self.disposed {
            return;
        }
        tracing::trace!(target: "fpage::runtime", kind = event.kind_name(), "dispatch");

        if let PageEvent::Click { target, .. } = event
            && self.inside_disabled_control(target)
        {
            tracing::trace!(target: "fpage::runtime", "click on disabled control dropped");
            return;
        }

        match &event {
            PageEvent::Input { target, value } => self.doc.set_value(*target, value),
            PageEvent::Toggle { target, checked } => self.doc.set_checked(*target, *checked),
            PageEvent::Resize { width, height } => {
                self.viewport.width = *width;
                self.viewport.height = *height;
            }
            PageEvent::Scroll { y } => self.viewport.scroll_y = *y,
            _ => {}
        }

        let mut deferred = Vec::new();
        {
            let mut cx = runtime_cx!(self);
            if let Some(nav) = self.nav.as_mut() {
                nav.handle(&event, &mut cx);
            }
            self.viewport_engine.handle(&event, &mut cx);
        }
        {
            let mut wcx = WidgetCx {
                doc: &mut self.doc,
                viewport: self.viewport,
                config: &self.config,
                effects: &mut self.effects,
                deferred: &mut deferred,
            };
            if let Some(w) = self.smooth_scroll.as_mut() {
                w.handle(&event, &mut wcx);
            }
            if let Some(w) = self.micro.as_mut() {
                w.handle(&event, &mut wcx);
            }
        }
        if let Some(forms) = self.forms.as_mut() {
            let mut cx = runtime_cx!(self);
            forms.handle(&event, &mut cx);
        }
        {
            let mut wcx = WidgetCx {
                doc: &mut self.doc,
                viewport: self.viewport,
                config: &self.config,
                effects: &mut self.effects,
                deferred: &mut deferred,
            };
            if let Some(w) = self.media.as_mut() {
                w.handle(&event, &mut wcx);
            }
            if let Some(w) = self.poll.as_mut() {
                w.handle(&event, &mut wcx);
            }
            if let Some(w) = self.privacy.as_mut() {
                w.handle(&event, &mut wcx);
            }
        }
        for (delay, task) in deferred {
            self.timers.schedule(delay, TimerToken::Widget(task));
        }

        if event.affects_viewport() {
            self.refresh_visibility();
        }
    }

    /// Advance time by `dt`, firing due timers one at a time. Returns how
    /// many fired.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let until = self.timers.now().saturating_add(dt);
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(until) {
            self.fire(timer);
            fired += 1;
        }
        self.timers.settle(until);
        fired
    }

    /// Drain outward effects in emission order.
    pub fn take_effects(&mut self) -> Vec<PageEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Re-measure every observer against the current layout and viewport.
    pub fn refresh_visibility(&mut self) {
        self.viewport_engine.refresh(&mut self.doc, &self.viewport);
        if let Some(count_up) = self.count_up.as_mut() {
            let batch = count_up.observer_mut().collect(&self.doc, &self.viewport);
            let mut cx = runtime_cx!(self);
            count_up.apply(&batch, &mut cx);
        }
    }

    /// Cancel rate-limited timers and ignore further events. Count-up ramps
    /// and a pending submission still run to completion.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let mut cx = runtime_cx!(self);
        if let Some(nav) = self.nav.as_mut() {
            nav.dispose(&mut cx);
        }
        self.viewport_engine.dispose(&mut cx);
        self.disposed = true;
        tracing::debug!(target: "fpage::runtime", "runtime disposed");
    }

    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn fire(&mut self, timer: Fired<TimerToken>) {
        let mut cx = runtime_cx!(self);
        match timer.payload {
            TimerToken::NavResize => {
                if let Some(nav) = self.nav.as_mut() {
                    nav.on_resize_settled(timer.id, &mut cx);
                }
            }
            TimerToken::StickyScroll => self.viewport_engine.on_sticky_timer(timer.id, &mut cx),
            TimerToken::ScrollTopScroll => {
                self.viewport_engine.on_scroll_top_timer(timer.id, &mut cx);
            }
            TimerToken::CountUpFrame(node) => {
                if let Some(count_up) = self.count_up.as_mut() {
                    count_up.frame(node, &mut cx);
                }
            }
            TimerToken::SubmitRedirect(form) => {
                if let Some(forms) = self.forms.as_ref() {
                    forms.on_redirect(form, &mut cx);
                }
            }
            TimerToken::Widget(task) => task.run(cx.doc),
        }
    }

    fn inside_disabled_control(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.doc.disabled(current) {
                return true;
            }
            cursor = self.doc.parent(current);
        }
        false
    }
}
