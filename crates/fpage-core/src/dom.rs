#![forbid(unsafe_code)]

//! Host-supplied document model.
//!
//! A [`Document`] is an arena of element nodes addressed by [`NodeId`]. The
//! host builds it from the real page (or a test builds it by hand), including
//! each element's layout rectangle, and the runtime mutates classes,
//! attributes, inline styles and text in place. The host mirrors those
//! mutations back onto the real page.
//!
//! # Invariants
//!
//! 1. `NodeId`s are never reused; detached nodes keep their id and data.
//! 2. A node has at most one parent and appears once in that parent's
//!    children.
//! 3. Queries only see nodes connected to the root.
//! 4. The `id` index always reflects the current `id` attribute.

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::geometry::Rect;
use crate::selector::SelectorList;

/// Stable handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A single element: tag, attributes, classes, inline style, text and form
/// state.
///
/// Built with the `with_*` builder methods before insertion; mutated through
/// [`Document`] afterwards so the id index stays consistent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    text: String,
    value: String,
    checked: bool,
    disabled: bool,
    rect: Rect,
}

impl Element {
    /// Create an element with a (case-insensitive) tag name.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Builder: set the `id` attribute.
    #[must_use]
    pub fn with_id(self, id: &str) -> Self {
        self.with_attr("id", id)
    }

    /// Builder: add one or more whitespace-separated classes.
    #[must_use]
    pub fn with_class(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            self.add_class(class);
        }
        self
    }

    /// Builder: set an attribute.
    ///
    /// `class`, `value`, `checked` and `disabled` also seed the matching
    /// element state, the way markup does.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "class" => return self.with_class(value),
            "value" => self.value = value.to_string(),
            "checked" => self.checked = true,
            "disabled" => self.disabled = true,
            _ => {}
        }
        self.attrs.insert(name, value.to_string());
        self
    }

    /// Builder: set the element's own text.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Builder: set the current form value.
    #[must_use]
    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    /// Builder: set the checked state.
    #[must_use]
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Builder: set an inline style property.
    #[must_use]
    pub fn with_style(mut self, property: &str, value: &str) -> Self {
        self.style.insert(property.to_string(), value.to_string());
        self
    }

    /// Builder: set the layout rectangle.
    #[must_use]
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Lowercase tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attribute value, if present.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Whether the attribute is present.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Whether the class is present.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Classes in insertion order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Inline style property, if set.
    #[must_use]
    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    /// Own text (not including descendants).
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current form value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Current checked state.
    #[must_use]
    pub const fn checked(&self) -> bool {
        self.checked
    }

    /// Current disabled state.
    #[must_use]
    pub const fn disabled(&self) -> bool {
        self.disabled
    }

    /// Layout rectangle in document coordinates.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    /// Effective control type: the lowercase `type` attribute for inputs
    /// (defaulting to `text`), `textarea`/`select` for those tags, and the
    /// `type` attribute (default `submit`) for buttons.
    #[must_use]
    pub fn control_type(&self) -> String {
        match self.tag.as_str() {
            "input" => self
                .attr("type")
                .map_or_else(|| "text".to_string(), str::to_ascii_lowercase),
            "button" => self
                .attr("type")
                .map_or_else(|| "submit".to_string(), str::to_ascii_lowercase),
            other => other.to_string(),
        }
    }

    fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        self.classes.push(class.to_string());
        true
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    element: Element,
}

/// Arena-backed document.
///
/// Starts with `html`, `head` and `body`; everything else is appended by the
/// host or by components.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    id_index: AHashMap<String, Vec<NodeId>>,
    focused: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with `html`, `head` and `body`.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                element: Element::new("html"),
            }],
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            id_index: AHashMap::new(),
            focused: None,
        };
        doc.head = doc.append(doc.root, Element::new("head"));
        doc.body = doc.append(doc.root, Element::new("body"));
        doc
    }

    /// The `html` element.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// The `head` element.
    #[must_use]
    pub const fn head(&self) -> NodeId {
        self.head
    }

    /// The `body` element.
    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Number of nodes ever created (connected or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a document holds at least `html`, `head` and `body`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a new element as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id = NodeId(self.nodes.len());
        let element_id = element.attr("id").map(str::to_string);
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            element,
        });
        self.nodes[parent.0].children.push(id);
        if let Some(element_id) = element_id {
            self.index_id(&element_id, id);
        }
        id
    }

    /// Insert a new element as the first child of `parent`.
    pub fn prepend(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id = self.append(parent, element);
        let children = &mut self.nodes[parent.0].children;
        children.pop();
        children.insert(0, id);
        id
    }

    /// Detach a node (and its subtree) from its parent.
    ///
    /// The node keeps its data and id; it simply stops being reachable from
    /// the root. Focus inside the detached subtree is cleared.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes[node.0].parent.take() else {
            return;
        };
        self.nodes[parent.0].children.retain(|&c| c != node);
        if let Some(focused) = self.focused
            && self.contains(node, focused)
        {
            self.focused = None;
        }
    }

    /// Detach every child of `node`.
    pub fn clear_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
            if let Some(focused) = self.focused
                && self.contains(child, focused)
            {
                self.focused = None;
            }
        }
    }

    /// Whether the node is reachable from the root.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.nodes[current.0].parent;
        }
        false
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes[current.0].parent;
        }
        false
    }

    /// Element data for a node.
    #[must_use]
    pub fn element(&self, node: NodeId) -> &Element {
        &self.nodes[node.0].element
    }

    fn element_mut(&mut self, node: NodeId) -> &mut Element {
        &mut self.nodes[node.0].element
    }

    /// Parent node, if attached.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Direct children in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// All descendants of `node` in document (pre-)order, excluding `node`.
    #[must_use]
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[node.0].children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        out
    }

    // --- Attributes ---------------------------------------------------------

    /// Lowercase tag name.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> &str {
        self.element(node).tag()
    }

    /// Attribute value, if present.
    #[must_use]
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).attr(name)
    }

    /// Whether the attribute is present.
    #[must_use]
    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.element(node).has_attr(name)
    }

    /// Set an attribute, keeping the id index current.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if name == "id" {
            if let Some(old) = self.element(node).attr("id").map(str::to_string) {
                self.unindex_id(&old, node);
            }
            self.index_id(value, node);
        }
        self.element_mut(node)
            .attrs
            .insert(name, value.to_string());
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attr(&mut self, node: NodeId, name: &str) -> bool {
        let removed = self.element_mut(node).attrs.remove(name);
        if name == "id"
            && let Some(old) = &removed
        {
            self.unindex_id(old, node);
        }
        removed.is_some()
    }

    /// The `id` attribute.
    #[must_use]
    pub fn id_of(&self, node: NodeId) -> Option<&str> {
        self.attr(node, "id")
    }

    /// First connected element with the given id, in document order.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        let candidates = self
            .id_index
            .get(id)?
            .iter()
            .copied()
            .filter(|&n| self.is_connected(n))
            .collect::<Vec<_>>();
        match candidates.as_slice() {
            [] => None,
            [only] => Some(*only),
            _ => self
                .descendants(self.root())
                .into_iter()
                .find(|n| candidates.contains(n)),
        }
    }

    fn index_id(&mut self, id: &str, node: NodeId) {
        if id.is_empty() {
            return;
        }
        self.id_index.entry(id.to_string()).or_default().push(node);
    }

    fn unindex_id(&mut self, id: &str, node: NodeId) {
        let Some(nodes) = self.id_index.get_mut(id) else {
            return;
        };
        nodes.retain(|&n| n != node);
        if nodes.is_empty() {
            self.id_index.remove(id);
        }
    }

    // --- Classes ------------------------------------------------------------

    /// Whether the class is present.
    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).has_class(class)
    }

    /// Add a class. Returns whether it was newly added.
    pub fn add_class(&mut self, node: NodeId, class: &str) -> bool {
        self.element_mut(node).add_class(class)
    }

    /// Remove a class. Returns whether it was present.
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> bool {
        let classes = &mut self.element_mut(node).classes;
        let before = classes.len();
        classes.retain(|c| c != class);
        classes.len() != before
    }

    // --- Inline style -------------------------------------------------------

    /// Inline style property, if set.
    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node).style(property)
    }

    /// Set an inline style property.
    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        self.element_mut(node)
            .style
            .insert(property.to_string(), value.to_string());
    }

    /// Clear an inline style property.
    pub fn remove_style(&mut self, node: NodeId, property: &str) {
        self.element_mut(node).style.remove(property);
    }

    // --- Text and form state ------------------------------------------------

    /// Own text of the element.
    #[must_use]
    pub fn text(&self, node: NodeId) -> &str {
        self.element(node).text()
    }

    /// Replace the element's own text.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        text.clone_into(&mut self.element_mut(node).text);
    }

    /// Own text followed by the text of every descendant, in document order.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = self.text(node).to_string();
        for d in self.descendants(node) {
            out.push_str(self.text(d));
        }
        out
    }

    /// Current form value.
    #[must_use]
    pub fn value(&self, node: NodeId) -> &str {
        self.element(node).value()
    }

    /// Set the current form value.
    pub fn set_value(&mut self, node: NodeId, value: &str) {
        value.clone_into(&mut self.element_mut(node).value);
    }

    /// Current checked state.
    #[must_use]
    pub fn checked(&self, node: NodeId) -> bool {
        self.element(node).checked()
    }

    /// Set the checked state.
    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        self.element_mut(node).checked = checked;
    }

    /// Current disabled state.
    #[must_use]
    pub fn disabled(&self, node: NodeId) -> bool {
        self.element(node).disabled()
    }

    /// Set the disabled state.
    pub fn set_disabled(&mut self, node: NodeId, disabled: bool) {
        self.element_mut(node).disabled = disabled;
    }

    // --- Layout and focus ---------------------------------------------------

    /// Layout rectangle in document coordinates.
    #[must_use]
    pub fn rect(&self, node: NodeId) -> Rect {
        self.element(node).rect()
    }

    /// Update the layout rectangle (host reflow).
    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        self.element_mut(node).rect = rect;
    }

    /// Move focus to a connected node.
    pub fn focus(&mut self, node: NodeId) {
        if self.is_connected(node) {
            self.focused = Some(node);
        }
    }

    /// Drop focus from whatever holds it.
    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Currently focused node.
    #[must_use]
    pub const fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    // --- Queries ------------------------------------------------------------

    /// Whether the node matches the selector list.
    #[must_use]
    pub fn matches(&self, node: NodeId, selector: &SelectorList) -> bool {
        selector.matches(self.element(node))
    }

    /// All descendants of `scope` matching the selector, in document order.
    #[must_use]
    pub fn query_all(&self, scope: NodeId, selector: &SelectorList) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| self.matches(n, selector))
            .collect()
    }

    /// First descendant of `scope` matching the selector.
    #[must_use]
    pub fn query(&self, scope: NodeId, selector: &SelectorList) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&n| self.matches(n, selector))
    }

    /// Nearest inclusive ancestor of `node` matching the selector.
    #[must_use]
    pub fn closest(&self, node: NodeId, selector: &SelectorList) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.matches(current, selector) {
                return Some(current);
            }
            cursor = self.nodes[current.0].parent;
        }
        None
    }
}
