#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use fpage_core::{Document, Element, Key, NodeId, PageConfig, PageEvent, Rect, Viewport};
use fpage_runtime::PageRuntime;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Click(u8),
    Escape,
    Tab,
    Resize(u16, u16),
    Scroll(u16),
    Input(u8, String),
    Toggle(u8, bool),
    Blur(u8),
    Submit,
    Hover(u8, bool),
    Advance(u16),
}

fn landing() -> (Document, Vec<NodeId>, NodeId) {
    let mut doc = Document::new();
    let body = doc.body();
    let mut nodes = Vec::new();
    let header = doc.append(
        body,
        Element::new("header")
            .with_class("l-header")
            .with_rect(Rect::new(0.0, 0.0, 1280.0, 72.0)),
    );
    nodes.push(doc.append(header, Element::new("button").with_class("c-nav__toggle")));
    let nav = doc.append(header, Element::new("nav").with_class("c-nav"));
    nodes.push(doc.append(nav, Element::new("a").with_attr("href", "#a")));
    doc.append(
        body,
        Element::new("section")
            .with_id("a")
            .with_rect(Rect::new(0.0, 800.0, 1280.0, 800.0)),
    );
    nodes.push(doc.append(
        body,
        Element::new("span")
            .with_attr("data-count", "120")
            .with_rect(Rect::new(0.0, 1200.0, 40.0, 20.0)),
    ));
    let form = doc.append(body, Element::new("form").with_id("contact"));
    let group = doc.append(form, Element::new("div").with_class("c-form__group"));
    nodes.push(doc.append(
        group,
        Element::new("input")
            .with_id("email")
            .with_attr("type", "email")
            .with_attr("required", ""),
    ));
    doc.append(group, Element::new("div").with_class("c-form__error"));
    nodes.push(doc.append(
        form,
        Element::new("input")
            .with_id("privacy")
            .with_attr("type", "checkbox")
            .with_attr("required", ""),
    ));
    nodes.push(doc.append(form, Element::new("button").with_attr("type", "submit")));
    (doc, nodes, form)
}

fuzz_target!(|ops: Vec<Op>| {
    if ops.len() > 256 {
        return;
    }
    let (doc, nodes, form) = landing();
    let pick = |i: u8| nodes[usize::from(i) % nodes.len()];
    let mut page = PageRuntime::bootstrap(doc, Viewport::default(), PageConfig::default());

    for op in ops {
        let event = match op {
            Op::Click(i) => PageEvent::click(pick(i)),
            Op::Escape => PageEvent::KeyDown(Key::Escape),
            Op::Tab => PageEvent::KeyDown(Key::Tab),
            Op::Resize(w, h) => PageEvent::Resize {
                width: f64::from(w),
                height: f64::from(h),
            },
            Op::Scroll(y) => PageEvent::Scroll { y: f64::from(y) },
            Op::Input(i, value) => PageEvent::Input {
                target: pick(i),
                value,
            },
            Op::Toggle(i, checked) => PageEvent::Toggle {
                target: pick(i),
                checked,
            },
            Op::Blur(i) => PageEvent::Blur(pick(i)),
            Op::Submit => PageEvent::Submit(form),
            Op::Hover(i, true) => PageEvent::PointerEnter(pick(i)),
            Op::Hover(i, false) => PageEvent::PointerLeave(pick(i)),
            Op::Advance(ms) => {
                page.advance(Duration::from_millis(u64::from(ms)));
                continue;
            }
        };
        page.dispatch(event);
    }

    // At most one navigation per submission lifecycle.
    page.advance(Duration::from_secs(5));
    let navigations = page
        .take_effects()
        .iter()
        .filter(|e| matches!(e, fpage_core::PageEffect::Navigate(_)))
        .count();
    assert!(navigations <= 1);

    page.dispose();
    assert!(page.pending_timers().is_empty());
});
