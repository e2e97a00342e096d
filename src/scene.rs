//! Retained element tree that charts draw into.
//!
//! Elements carry a tag, classes, attributes, inline styles and an optional
//! text run. Charts find their scaffolding again on every render through
//! class selectors, which gives the usual enter/update behaviour: create an
//! element when the selector comes back empty, update it otherwise.

use crate::{ChartError, Result};
use error_stack::Report;
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use unicode_width::UnicodeWidthStr;

/// Slot index plus the generation it was issued in. Ids of removed
/// elements stay dead even after their slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    index: usize,
    generation: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Element {
    pub tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    attached: bool,
    generation: u32,
}

impl Element {
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn style(&self, name: &str) -> Option<&str> {
        self.styles.get(name).map(String::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

/// Rendered width of a text run, in surface pixels.
pub trait TextMeasure: Send + Sync {
    fn text_width(&self, text: &str) -> f64;
}

/// Fixed advance per terminal column; wide glyphs count twice.
#[derive(Clone, Copy, Debug)]
pub struct MonospaceMeasure {
    pub column_width: f64,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self { column_width: 6.0 }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn text_width(&self, text: &str) -> f64 {
        UnicodeWidthStr::width(text) as f64 * self.column_width
    }
}

/// `tag.class.class` or `.class` compound selector.
#[derive(Clone, Debug, PartialEq)]
struct Selector<'a> {
    tag: Option<&'a str>,
    classes: Vec<&'a str>,
}

impl<'a> Selector<'a> {
    fn parse(s: &'a str) -> Self {
        let mut parts = s.trim().split('.');
        let tag = parts.next().filter(|t| !t.is_empty());
        Self {
            tag,
            classes: parts.filter(|c| !c.is_empty()).collect(),
        }
    }

    fn matches(&self, el: &Element) -> bool {
        self.tag.is_none_or(|t| t == el.tag) && self.classes.iter().all(|c| el.has_class(c))
    }
}

pub struct Scene {
    elements: Vec<Element>,
    free: Vec<usize>,
    root: ElementId,
    measure: Box<dyn TextMeasure>,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("elements", &self.len())
            .field("slots", &self.elements.len())
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::with_measure(Box::new(MonospaceMeasure::default()))
    }

    pub fn with_measure(measure: Box<dyn TextMeasure>) -> Self {
        let root = Element {
            tag: "svg".into(),
            attached: true,
            ..Element::default()
        };
        Self {
            elements: vec![root],
            free: Vec::new(),
            root: ElementId {
                index: 0,
                generation: 0,
            },
            measure,
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements
            .get(id.index)
            .filter(|e| e.attached && e.generation == id.generation)
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements
            .get_mut(id.index)
            .filter(|e| e.attached && e.generation == id.generation)
    }

    /// Live elements, root included.
    pub fn len(&self) -> usize {
        self.elements.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots held, live or waiting for reuse.
    pub fn capacity(&self) -> usize {
        self.elements.len()
    }

    /// Error unless `id` is a live element of this scene.
    pub fn check(&self, id: ElementId) -> Result<()> {
        match self.element(id) {
            Some(_) => Ok(()),
            None => Err(Report::new(ChartError::Surface).attach(format!("no live element {id:?}"))),
        }
    }

    /// Append a `tag` element under `parent`. Under a dead parent the
    /// returned id is already dead.
    pub fn append(&mut self, parent: ElementId, tag: &str) -> ElementId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.elements.push(Element::default());
                self.elements.len() - 1
            }
        };
        let generation = self.elements[index].generation;
        let id = ElementId { index, generation };
        self.elements[index] = Element {
            tag: tag.into(),
            parent: Some(parent),
            attached: true,
            generation,
            ..Element::default()
        };
        match self.element_mut(parent) {
            Some(p) => p.children.push(id),
            None => self.release(index),
        }
        id
    }

    /// Detach `id` and its subtree; their slots are reused by later appends.
    pub fn remove(&mut self, id: ElementId) {
        if id == self.root || self.element(id).is_none() {
            return;
        }
        if let Some(parent) = self.element(id).and_then(|e| e.parent) {
            if let Some(p) = self.element_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }
        let mut stack = vec![id];
        while let Some(at) = stack.pop() {
            if let Some(el) = self.element(at) {
                stack.extend(el.children.iter().copied());
                self.release(at.index);
            }
        }
    }

    fn release(&mut self, index: usize) {
        let el = &mut self.elements[index];
        let generation = el.generation.wrapping_add(1);
        *el = Element {
            generation,
            ..Element::default()
        };
        self.free.push(index);
    }

    pub fn clear_children(&mut self, id: ElementId) {
        for child in self.children(id).to_vec() {
            self.remove(child);
        }
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.element(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    pub fn set_class(&mut self, id: ElementId, classes: &str) {
        if let Some(el) = self.element_mut(id) {
            el.classes = classes.split_whitespace().map(str::to_owned).collect();
        }
    }

    pub fn classed(&mut self, id: ElementId, class: &str, on: bool) {
        if let Some(el) = self.element_mut(id) {
            let present = el.has_class(class);
            if on && !present {
                el.classes.push(class.to_owned());
            } else if !on && present {
                el.classes.retain(|c| c != class);
            }
        }
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: impl ToString) {
        if let Some(el) = self.element_mut(id) {
            el.attrs.insert(name.to_owned(), value.to_string());
        }
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attr(name))
    }

    pub fn set_style(&mut self, id: ElementId, name: &str, value: impl ToString) {
        if let Some(el) = self.element_mut(id) {
            el.styles.insert(name.to_owned(), value.to_string());
        }
    }

    pub fn style(&self, id: ElementId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.style(name))
    }

    pub fn set_text(&mut self, id: ElementId, text: Option<String>) {
        if let Some(el) = self.element_mut(id) {
            el.text = text;
        }
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.element(id).and_then(|e| e.text())
    }

    /// Leading number of a style (falling back to the attribute), e.g. `"400px"` -> 400.
    pub fn dimension(&self, id: ElementId, name: &str) -> Option<f64> {
        let raw = self.style(id, name).or_else(|| self.attr(id, name))?;
        let end = raw
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
            .unwrap_or(raw.len());
        raw[..end].parse::<f64>().ok().filter(|v| *v > 0.0)
    }

    pub fn text_width(&self, text: &str) -> f64 {
        self.measure.text_width(text)
    }

    /// First descendant of `from`, in document order, matching `selector`.
    pub fn select(&self, from: ElementId, selector: &str) -> Option<ElementId> {
        let sel = Selector::parse(selector);
        self.descendants(from)
            .into_iter()
            .find(|id| self.element(*id).is_some_and(|e| sel.matches(e)))
    }

    pub fn select_all(&self, from: ElementId, selector: &str) -> Vec<ElementId> {
        let sel = Selector::parse(selector);
        self.descendants(from)
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(|e| sel.matches(e)))
            .collect()
    }

    fn descendants(&self, from: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(from).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        self.write_element(self.root, &mut out);
        out
    }

    fn write_element(&self, id: ElementId, out: &mut String) {
        let Some(el) = self.element(id) else { return };
        let _ = write!(out, "<{}", el.tag);
        if id == self.root {
            out.push_str(r#" xmlns="http://www.w3.org/2000/svg""#);
        }
        if !el.classes.is_empty() {
            let _ = write!(out, r#" class="{}""#, escape(&el.classes.join(" ")));
        }
        for (k, v) in &el.attrs {
            let _ = write!(out, r#" {k}="{}""#, escape(v));
        }
        if !el.styles.is_empty() {
            let style: Vec<String> = el.styles.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            let _ = write!(out, r#" style="{}""#, escape(&style.join("; ")));
        }
        if el.children.is_empty() && el.text.is_none() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &el.text {
            out.push_str(&escape(text));
        }
        for child in &el.children {
            self.write_element(*child, out);
        }
        let _ = write!(out, "</{}>", el.tag);
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Surface elements bound to one datum each.
#[derive(Clone, Debug)]
pub struct Selection<D> {
    bindings: Vec<(ElementId, D)>,
}

impl<D> Selection<D> {
    pub fn new() -> Self {
        Self { bindings: vec![] }
    }

    pub fn single(target: ElementId, datum: D) -> Self {
        Self {
            bindings: vec![(target, datum)],
        }
    }

    pub fn bind(mut self, target: ElementId, datum: D) -> Self {
        self.bindings.push((target, datum));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &D)> {
        self.bindings.iter().map(|(id, d)| (*id, d))
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<D> Default for Selection<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_matches_tag_and_classes() {
        let mut scene = Scene::new();
        let root = scene.root();
        let g = scene.append(root, "g");
        scene.set_class(g, "nvd3 nv-wrap nv-sunburst");
        let t = scene.append(g, "text");
        scene.set_class(t, "nv-noData");

        assert_eq!(scene.select(root, "g.nv-wrap.nv-sunburst"), Some(g));
        assert_eq!(scene.select(root, ".nv-noData"), Some(t));
        assert_eq!(scene.select(root, "text.nv-wrap"), None);
        assert_eq!(scene.select_all(root, "g").len(), 1);
    }

    #[test]
    fn removed_subtrees_disappear() {
        let mut scene = Scene::new();
        let root = scene.root();
        let g = scene.append(root, "g");
        let p = scene.append(g, "path");
        scene.remove(g);
        assert!(scene.element(p).is_none());
        assert!(scene.children(root).is_empty());
        assert!(scene.check(g).is_err());
        // writes on dead elements are ignored
        scene.set_attr(p, "d", "M0,0Z");
        assert_eq!(scene.attr(p, "d"), None);
    }

    #[test]
    fn removed_slots_are_reused_without_reviving_old_ids() {
        let mut scene = Scene::new();
        let root = scene.root();
        let g = scene.append(root, "g");
        let p = scene.append(g, "path");
        scene.remove(g);
        assert_eq!(scene.len(), 1);

        let text = scene.append(root, "text");
        let tspan = scene.append(text, "tspan");
        assert_eq!(scene.capacity(), 3);
        assert!(scene.element(g).is_none());
        assert!(scene.element(p).is_none());
        assert_eq!(scene.element(text).map(|e| e.tag.as_str()), Some("text"));
        assert_eq!(scene.children(text), [tspan]);

        // stale ids cannot touch the new occupants
        scene.remove(g);
        scene.set_attr(p, "d", "M0,0Z");
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.attr(tspan, "d"), None);
    }

    #[test]
    fn append_under_dead_parent_is_dead() {
        let mut scene = Scene::new();
        let g = scene.append(scene.root(), "g");
        scene.remove(g);
        let orphan = scene.append(g, "path");
        assert!(scene.element(orphan).is_none());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn classed_toggles_once() {
        let mut scene = Scene::new();
        let g = scene.append(scene.root(), "g");
        scene.classed(g, "hover", true);
        scene.classed(g, "hover", true);
        assert_eq!(scene.element(g).unwrap().classes(), ["hover"]);
        scene.classed(g, "hover", false);
        assert!(!scene.has_class(g, "hover"));
    }

    #[test]
    fn dimensions_parse_px() {
        let mut scene = Scene::new();
        let root = scene.root();
        scene.set_style(root, "width", "400px");
        scene.set_attr(root, "height", "300");
        assert_eq!(scene.dimension(root, "width"), Some(400.0));
        assert_eq!(scene.dimension(root, "height"), Some(300.0));
        scene.set_style(root, "height", "auto");
        assert_eq!(scene.dimension(root, "height"), None);
    }

    #[test]
    fn svg_output_escapes_text() {
        let mut scene = Scene::new();
        let t = scene.append(scene.root(), "text");
        scene.set_attr(t, "x", 5);
        scene.set_text(t, Some("a < b".into()));
        assert_eq!(
            scene.to_svg(),
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text x="5">a &lt; b</text></svg>"#
        );
    }

    #[test]
    fn monospace_measure_counts_columns() {
        let m = MonospaceMeasure { column_width: 5.0 };
        assert_eq!(m.text_width("abc"), 15.0);
        assert_eq!(m.text_width("日本"), 20.0);
    }
}
