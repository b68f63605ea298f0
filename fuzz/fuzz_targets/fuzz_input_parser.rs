#![no_main]

use std::time::Duration;

use fpage_core::{Document, Element, PageConfig, Viewport};
use fpage_web::WebPage;
use fpage_web::input_parser::parse_input;
use libfuzzer_sys::fuzz_target;

fn page_document() -> Document {
    let mut doc = Document::new();
    let body = doc.body();
    let header = doc.append(body, Element::new("header").with_class("l-header"));
    doc.append(header, Element::new("button").with_class("c-nav__toggle"));
    doc.append(header, Element::new("nav").with_class("c-nav"));
    let form = doc.append(body, Element::new("form").with_id("contact"));
    let group = doc.append(form, Element::new("div").with_class("c-form__group"));
    doc.append(
        group,
        Element::new("input")
            .with_id("email")
            .with_attr("type", "email")
            .with_attr("required", ""),
    );
    doc.append(group, Element::new("div").with_class("c-form__error"));
    doc.append(form, Element::new("button").with_attr("type", "submit"));
    doc
}

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    if json.len() > 4096 {
        return;
    }

    let doc = page_document();
    let Ok(Some(event)) = parse_input(&doc, json) else {
        return;
    };

    // Any event the parser accepts must be safe to dispatch.
    let mut page = WebPage::new(doc, Viewport::default(), PageConfig::default());
    if page.push_event(event).is_ok() {
        page.advance(Duration::from_secs(3));
    }
    page.dispose();
    assert!(page.runtime().pending_timers().is_empty());
});
