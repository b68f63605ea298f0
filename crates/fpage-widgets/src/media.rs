#![forbid(unsafe_code)]

//! Deferred-loading hints and the broken-image fallback.
//!
//! On mount every `img` without a `loading` attribute (logos excepted) and
//! every `video` without one is tagged `loading="lazy"`, and every image
//! gets the responsive `img-fluid` class. A load failure on a tracked image
//! swaps its `src` for a small inline SVG placeholder, once.

use fpage_core::{Document, NodeId, PageConfig, PageEvent};

use crate::{Widget, WidgetCx, builtin_selector};

/// Inline SVG placeholder ("Bild" on a light grey square).
pub const FALLBACK_IMAGE: &str = "data:image/svg+xml;base64,PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciIHdpZHRoPSIxMDAiIGhlaWdodD0iMTAwIj48cmVjdCB3aWR0aD0iMTAwIiBoZWlnaHQ9IjEwMCIgZmlsbD0iI2Y4ZjlmYSIvPjx0ZXh0IHg9IjUwIiB5PSI1MCIgdGV4dC1hbmNob3I9Im1pZGRsZSIgZHk9Ii4zZW0iIGZpbGw9IiM2Yzc1N2QiPkJpbGQ8L3RleHQ+PC9zdmc+";

const LOGO_CLASS: &str = "c-logo__img";
const FLUID_CLASS: &str = "img-fluid";

/// Tracks the page's media elements.
#[derive(Debug, Clone)]
pub struct MediaOptimizer {
    images: Vec<NodeId>,
    videos: Vec<NodeId>,
}

impl MediaOptimizer {
    /// Images tagged on mount.
    #[must_use]
    pub fn images(&self) -> &[NodeId] {
        &self.images
    }

    /// Videos seen on mount.
    #[must_use]
    pub fn videos(&self) -> &[NodeId] {
        &self.videos
    }
}

impl Widget for MediaOptimizer {
    const NAME: &'static str = "media";

    fn mount(doc: &mut Document, _config: &PageConfig) -> Option<Self> {
        let images = doc.query_all(doc.root(), &builtin_selector("img")?);
        let videos = doc.query_all(doc.root(), &builtin_selector("video")?);
        if images.is_empty() && videos.is_empty() {
            return None;
        }

        for &img in &images {
            if !doc.has_attr(img, "loading") && !doc.has_class(img, LOGO_CLASS) {
                doc.set_attr(img, "loading", "lazy");
            }
            doc.add_class(img, FLUID_CLASS);
        }
        for &video in &videos {
            if !doc.has_attr(video, "loading") {
                doc.set_attr(video, "loading", "lazy");
            }
        }
        tracing::debug!(
            target: "fpage::widgets",
            images = images.len(),
            videos = videos.len(),
            "media tagged"
        );
        Some(Self { images, videos })
    }

    fn handle(&mut self, event: &PageEvent, cx: &mut WidgetCx<'_>) -> bool {
        let PageEvent::MediaError(node) = *event else {
            return false;
        };
        if !self.images.contains(&node) || cx.doc.attr(node, "src") == Some(FALLBACK_IMAGE) {
            return false;
        }
        tracing::debug!(
            target: "fpage::widgets",
            src = cx.doc.attr(node, "src").unwrap_or_default(),
            "image failed, using fallback"
        );
        cx.doc.set_attr(node, "src", FALLBACK_IMAGE);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;
    use fpage_core::Element;

    fn page() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let logo = doc.append(
            body,
            Element::new("img").with_class("c-logo__img").with_attr("src", "logo.svg"),
        );
        let eager = doc.append(
            body,
            Element::new("img")
                .with_attr("loading", "eager")
                .with_attr("src", "hero.jpg"),
        );
        let plain = doc.append(body, Element::new("img").with_attr("src", "a.jpg"));
        doc.append(body, Element::new("video"));
        (doc, logo, eager, plain)
    }

    #[test]
    fn mount_tags_images_and_videos() {
        let (doc, logo, eager, plain) = page();
        let mut h = Harness::new(doc);
        let media: MediaOptimizer = h.mount().expect("media present");

        assert_eq!(h.doc.attr(logo, "loading"), None);
        assert_eq!(h.doc.attr(eager, "loading"), Some("eager"));
        assert_eq!(h.doc.attr(plain, "loading"), Some("lazy"));
        for &img in media.images() {
            assert!(h.doc.has_class(img, FLUID_CLASS));
        }
        assert_eq!(h.doc.attr(media.videos()[0], "loading"), Some("lazy"));
    }

    #[test]
    fn error_swaps_in_fallback_once() {
        let (doc, _, _, plain) = page();
        let mut h = Harness::new(doc);
        let mut media: MediaOptimizer = h.mount().unwrap();

        assert!(h.send(&mut media, PageEvent::MediaError(plain)));
        assert_eq!(h.doc.attr(plain, "src"), Some(FALLBACK_IMAGE));
        assert!(!h.send(&mut media, PageEvent::MediaError(plain)));
    }

    #[test]
    fn page_without_media_does_not_mount() {
        let mut h = Harness::new(Document::new());
        assert!(h.mount::<MediaOptimizer>().is_none());
    }
}
