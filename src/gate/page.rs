//! Page surface the gate acts on when it denies a page load.
//!
//! [`Document`] is a small arena-backed DOM. Elements are never freed, so a
//! handle taken before the content is replaced still reaches the (now
//! detached) element.

use super::config::GateConfig;
use std::fmt::Write as _;
use url::Url;

pub const DENIAL_CLASS: &str = "auth-error";

const DENIAL_STYLE: &str = "
.auth-error {
    font-family: 'Poppins', sans-serif;
    max-width: 500px;
    margin: 100px auto;
    padding: 20px;
    background-color: #fff;
    border-radius: 8px;
    box-shadow: 0 4px 8px rgba(0,0,0,0.1);
    text-align: center;
}
.auth-error h2 {
    color: #e53935;
    margin-bottom: 20px;
}
.auth-error a {
    color: #1e88e5;
    text-decoration: none;
    font-weight: 500;
}
";

/// Opacity applied to elements the gate disables.
pub const DISABLED_OPACITY: f32 = 0.5;

/// What the user sees instead of the page after a denial.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenialNotice {
    pub reason: String,
    pub canonical_origin: Url,
    pub site_name: String,
}

impl DenialNotice {
    #[must_use]
    pub fn new(reason: impl Into<String>, config: &GateConfig) -> Self {
        Self {
            reason: reason.into(),
            canonical_origin: config.canonical_origin.clone(),
            site_name: config.site_name.clone(),
        }
    }
}

/// Operations the gate needs from the hosting page.
pub trait PageSurface {
    type Element: Copy + PartialEq + std::fmt::Debug;

    /// Buttons, links, inputs, selects and text areas currently in the page.
    fn interactive_elements(&self) -> Vec<Self::Element>;

    /// Replaces the whole page content with the notice and returns its container.
    fn replace_content(&mut self, notice: &DenialNotice) -> Self::Element;

    /// Whether `element` is `container` or one of its descendants.
    fn is_within(&self, element: Self::Element, container: Self::Element) -> bool;

    /// Disables the element and suppresses pointer interaction with it.
    fn disable(&mut self, element: Self::Element);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    A,
    Button,
    Div,
    Form,
    H1,
    H2,
    Input,
    Label,
    Option,
    P,
    Select,
    Span,
    Style,
    Table,
    Tbody,
    Td,
    Text,
    TextArea,
    Th,
    Thead,
    Tr,
}

impl Tag {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::Button => "button",
            Self::Div => "div",
            Self::Form => "form",
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::Input => "input",
            Self::Label => "label",
            Self::Option => "option",
            Self::P => "p",
            Self::Select => "select",
            Self::Span => "span",
            Self::Style => "style",
            Self::Table => "table",
            Self::Tbody => "tbody",
            Self::Td => "td",
            Self::Text => "#text",
            Self::TextArea => "textarea",
            Self::Th => "th",
            Self::Thead => "thead",
            Self::Tr => "tr",
        }
    }

    #[must_use]
    pub const fn is_interactive(self) -> bool {
        matches!(
            self,
            Self::A | Self::Button | Self::Input | Self::Select | Self::TextArea
        )
    }

    const fn is_void(self) -> bool {
        matches!(self, Self::Input)
    }

    /// Form controls that carry a real `disabled` attribute.
    const fn has_disabled_attribute(self) -> bool {
        matches!(
            self,
            Self::Button | Self::Input | Self::Select | Self::TextArea
        )
    }
}

#[derive(Clone, Debug)]
pub struct Element {
    tag: Tag,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
    disabled: bool,
    pointer_events: bool,
    opacity: Option<f32>,
}

impl Element {
    fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
            parent: None,
            disabled: false,
            pointer_events: true,
            opacity: None,
        }
    }

    #[must_use]
    pub const fn tag(&self) -> Tag {
        self.tag
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[must_use]
    pub const fn pointer_events_suppressed(&self) -> bool {
        !self.pointer_events
    }

    #[must_use]
    pub const fn opacity(&self) -> Option<f32> {
        self.opacity
    }
}

#[derive(Clone, Debug, Default)]
pub struct Document {
    title: String,
    nodes: Vec<Element>,
    head: Vec<ElementId>,
    body: Vec<ElementId>,
}

impl Document {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    fn create(&mut self, tag: Tag, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.nodes.len());
        let mut element = Element::new(tag);
        // An id from another document leaves the new element detached.
        if let Some(parent) = parent {
            if let Some(node) = self.nodes.get_mut(parent.0) {
                node.children.push(id);
                element.parent = Some(parent);
            }
        }
        self.nodes.push(element);
        id
    }

    pub fn append_to_body(&mut self, tag: Tag) -> ElementId {
        let id = self.create(tag, None);
        self.body.push(id);
        id
    }

    pub fn append_to_head(&mut self, tag: Tag) -> ElementId {
        let id = self.create(tag, None);
        self.head.push(id);
        id
    }

    pub fn append_child(&mut self, parent: ElementId, tag: Tag) -> ElementId {
        self.create(tag, Some(parent))
    }

    pub fn append_text(&mut self, parent: ElementId, text: &str) -> ElementId {
        let id = self.create(Tag::Text, Some(parent));
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.text = text.to_string();
        }
        id
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> &mut Self {
        let Some(element) = self.nodes.get_mut(id.0) else {
            return self;
        };
        let attributes = &mut element.attributes;
        match attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
        self
    }

    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn body(&self) -> &[ElementId] {
        &self.body
    }

    #[must_use]
    pub fn head(&self) -> &[ElementId] {
        &self.head
    }

    /// Concatenated text of the element and its descendants.
    #[must_use]
    pub fn text_content(&self, id: ElementId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: ElementId, out: &mut String) {
        let Some(element) = self.nodes.get(id.0) else {
            return;
        };
        out.push_str(&element.text);
        for child in &element.children {
            self.collect_text(*child, out);
        }
    }

    /// Text of everything currently in the body.
    #[must_use]
    pub fn body_text(&self) -> String {
        self.body
            .iter()
            .map(|id| self.text_content(*id))
            .collect::<Vec<_>>()
            .join("")
    }

    /// Whether the element is reachable from the head or body.
    #[must_use]
    pub fn is_attached(&self, id: ElementId) -> bool {
        let root = self.root_of(id);
        self.head.contains(&root) || self.body.contains(&root)
    }

    fn root_of(&self, mut id: ElementId) -> ElementId {
        while let Some(parent) = self.nodes.get(id.0).and_then(|node| node.parent) {
            id = parent;
        }
        id
    }

    fn attached(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.head.iter().chain(&self.body).rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    fn has_denial_style(&self) -> bool {
        self.head.iter().any(|id| {
            let element = &self.nodes[id.0];
            element.tag == Tag::Style && element.attribute("data-gate").is_some()
        })
    }

    /// Serializes the attached document to HTML.
    #[must_use]
    pub fn render(&self) -> String {
        let mut html = String::from("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
        let _ = write!(html, "<title>{}</title>", escape(&self.title));
        for id in &self.head {
            self.render_node(*id, &mut html);
        }
        html.push_str("</head><body>");
        for id in &self.body {
            self.render_node(*id, &mut html);
        }
        html.push_str("</body></html>\n");
        html
    }

    fn render_node(&self, id: ElementId, html: &mut String) {
        let element = &self.nodes[id.0];
        if element.tag == Tag::Text {
            let raw = element
                .parent
                .is_some_and(|parent| self.nodes[parent.0].tag == Tag::Style);
            if raw {
                html.push_str(&element.text);
            } else {
                html.push_str(&escape(&element.text));
            }
            return;
        }

        let name = element.tag.name();
        let _ = write!(html, "<{name}");
        for (key, value) in &element.attributes {
            let _ = write!(html, " {key}=\"{}\"", escape(value));
        }
        if element.disabled {
            if element.tag.has_disabled_attribute() {
                html.push_str(" disabled");
            } else {
                html.push_str(" aria-disabled=\"true\"");
            }
        }
        let mut style = Vec::new();
        if !element.pointer_events {
            style.push("pointer-events: none".to_string());
        }
        if let Some(opacity) = element.opacity {
            style.push(format!("opacity: {opacity}"));
        }
        if !style.is_empty() {
            let _ = write!(html, " style=\"{}\"", style.join("; "));
        }
        html.push('>');

        if element.tag.is_void() {
            return;
        }
        for child in &element.children {
            self.render_node(*child, html);
        }
        let _ = write!(html, "</{name}>");
    }
}

impl PageSurface for Document {
    type Element = ElementId;

    fn interactive_elements(&self) -> Vec<ElementId> {
        self.attached()
            .into_iter()
            .filter(|id| self.nodes[id.0].tag.is_interactive())
            .collect()
    }

    fn replace_content(&mut self, notice: &DenialNotice) -> ElementId {
        self.body.clear();

        let container = self.append_to_body(Tag::Div);
        self.set_attribute(container, "class", DENIAL_CLASS);

        let heading = self.append_child(container, Tag::H2);
        self.append_text(heading, "Access Denied");

        let reason = self.append_child(container, Tag::P);
        self.append_text(reason, &notice.reason);

        let back = self.append_child(container, Tag::P);
        self.append_text(back, "Please access this application through the ");
        let link = self.append_child(back, Tag::A);
        self.set_attribute(link, "href", notice.canonical_origin.as_str());
        self.append_text(link, &notice.site_name);
        self.append_text(back, " website.");

        if !self.has_denial_style() {
            let style = self.append_to_head(Tag::Style);
            self.set_attribute(style, "data-gate", "denied");
            self.append_text(style, DENIAL_STYLE);
        }

        container
    }

    fn is_within(&self, element: ElementId, container: ElementId) -> bool {
        let mut current = Some(element);
        while let Some(id) = current {
            if id == container {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|node| node.parent);
        }
        false
    }

    fn disable(&mut self, element: ElementId) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.disabled = true;
            node.pointer_events = false;
            node.opacity = Some(DISABLED_OPACITY);
        }
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
