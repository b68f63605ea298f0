//! Property-based invariant tests for geometry and the selector engine.
//!
//! ## Invariants
//!
//! 1. Intersection ratio is within `[0, 1]` and present iff the rectangles
//!    touch.
//! 2. Rectangle intersection is symmetric.
//! 3. A zero margin leaves the root unchanged; a uniform pixel margin grows
//!    each side by exactly that amount.
//! 4. The selector parser never panics and parsed selectors display as their
//!    source.
//! 5. A class selector matches exactly the elements carrying the class.

use fpage_core::geometry::intersection_ratio;
use fpage_core::{Document, Element, Rect, RootMargin, SelectorList};
use proptest::prelude::*;

// ── Strategies ────────────────────────────────────────────────────────────

fn arb_rect() -> impl Strategy<Value = Rect> {
    (-500i32..2000, -500i32..4000, 0i32..800, 0i32..800)
        .prop_map(|(x, y, w, h)| Rect::new(x.into(), y.into(), w.into(), h.into()))
}

fn arb_class() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_-]{0,10}").unwrap()
}

// ── 1. Ratio bounds ───────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn ratio_is_bounded(target in arb_rect(), root in arb_rect()) {
        let ratio = intersection_ratio(&target, &root);
        prop_assert_eq!(ratio.is_some(), target.intersection(&root).is_some());
        if let Some(r) = ratio {
            prop_assert!((0.0..=1.0).contains(&r), "ratio={r}");
        }
    }
}

// ── 2. Symmetry ───────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn intersection_is_symmetric(a in arb_rect(), b in arb_rect()) {
        prop_assert_eq!(a.intersection(&b), b.intersection(&a));
    }
}

// ── 3. Margins ────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn zero_margin_is_identity(root in arb_rect()) {
        prop_assert_eq!(RootMargin::ZERO.apply(root), root);
    }

    #[test]
    fn uniform_px_margin_grows_every_side(root in arb_rect(), px in 0i32..200) {
        let margin = RootMargin::parse(&format!("{px}px")).unwrap();
        let grown = margin.apply(root);
        let px = f64::from(px);
        prop_assert_eq!(grown.x, root.x - px);
        prop_assert_eq!(grown.y, root.y - px);
        prop_assert_eq!(grown.right(), root.right() + px);
        prop_assert_eq!(grown.bottom(), root.bottom() + px);
    }
}

// ── 4. Parser robustness ──────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn parser_never_panics(src in ".{0,40}") {
        if let Ok(sel) = SelectorList::parse(&src) {
            prop_assert_eq!(sel.to_string(), sel.as_str().to_string());
        }
    }
}

// ── 5. Class matching ─────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn class_selector_matches_exactly_tagged_elements(
        wanted in arb_class(),
        tags in prop::collection::vec(any::<bool>(), 0..30),
    ) {
        let mut doc = Document::new();
        let body = doc.body();
        let mut expected = Vec::new();
        for (i, tagged) in tags.iter().enumerate() {
            let class = if *tagged { wanted.clone() } else { format!("{wanted}-other{i}") };
            let node = doc.append(body, Element::new("div").with_class(&class));
            if *tagged {
                expected.push(node);
            }
        }
        let sel = SelectorList::parse(&format!(".{wanted}")).unwrap();
        prop_assert_eq!(doc.query_all(doc.root(), &sel), expected);
    }
}
