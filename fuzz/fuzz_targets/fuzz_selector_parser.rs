#![no_main]

use fpage_core::{Document, Element, SelectorList};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(src) = std::str::from_utf8(data) else {
        return;
    };
    if src.len() > 1024 {
        return;
    }

    let Ok(list) = SelectorList::parse(src) else {
        return;
    };

    // A parsed selector keeps its source text.
    assert_eq!(list.as_str(), src.trim());

    let mut doc = Document::new();
    let body = doc.body();
    let header = doc.append(body, Element::new("header").with_class("l-header"));
    let nav = doc.append(header, Element::new("nav").with_class("c-nav is-open"));
    doc.append(nav, Element::new("a").with_attr("href", "#kontakt"));
    doc.append(body, Element::new("input").with_id("email").with_attr("type", "email"));

    // Every query result must actually match, and the first hit leads.
    let hits = doc.query_all(doc.root(), &list);
    for &node in &hits {
        assert!(list.matches(doc.element(node)));
    }
    assert_eq!(doc.query(doc.root(), &list), hits.first().copied());
});
