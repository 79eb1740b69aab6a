use std::fmt::Write as _;

/// Class marking a list item which contains a nested list.
pub const PARENT_CLASS: &str = "parent_li";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Container,
    List,
    ListItem,
    Label,
}

impl ElementKind {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Container => "div",
            Self::List => "ul",
            Self::ListItem => "li",
            Self::Label => "span",
        }
    }
}

/// A node of the document the file tree is rendered into.
///
/// This is an owned stand-in for a browser DOM subtree.
/// The renderer only ever appends, existing children are never touched.
///
/// # Example
///
/// ```
/// # use edfs_tree::{Element, ElementKind};
/// let mut container = Element::container("tree");
/// container.append_child(Element::new(ElementKind::List));
/// assert_eq!(container.to_html(), r#"<div id="tree"><ul></ul></div>"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    kind: ElementKind,
    id: Option<String>,
    classes: Vec<String>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    #[must_use]
    pub const fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            id: None,
            classes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Create an empty container with the given `id`.
    #[must_use]
    pub fn container(id: impl Into<String>) -> Self {
        let mut element = Self::new(ElementKind::Container);
        element.id = Some(id.into());
        element
    }

    /// Create a label element showing `text`.
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        let mut element = Self::new(ElementKind::Label);
        element.text = Some(text.into());
        element
    }

    /// Create a list item with a label showing `label`.
    #[must_use]
    pub fn list_item(label: impl Into<String>) -> Self {
        let mut element = Self::new(ElementKind::ListItem);
        element.append_child(Self::label(label));
        element
    }

    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|existing| existing == class)
    }

    /// Add a class. Adding an existing class does nothing.
    pub fn add_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Self> {
        self.children.get(index)
    }

    pub fn append_child(&mut self, child: Self) {
        self.children.push(child);
    }

    /// All direct children which are lists.
    pub fn lists(&self) -> impl Iterator<Item = &Self> {
        self.children
            .iter()
            .filter(|child| child.kind == ElementKind::List)
    }

    /// Text of the label of a list item.
    #[must_use]
    pub fn label_text(&self) -> Option<&str> {
        self.children
            .iter()
            .find(|child| child.kind == ElementKind::Label)
            .and_then(Self::text)
    }

    /// The list nested inside a list item.
    #[must_use]
    pub fn nested_list(&self) -> Option<&Self> {
        self.lists().next()
    }

    #[must_use]
    pub fn is_parent(&self) -> bool {
        self.has_class(PARENT_CLASS)
    }

    /// Serialize this element and its subtree as HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        self.write_html(&mut html);
        html
    }

    fn write_html(&self, html: &mut String) {
        let tag = self.kind.tag();
        html.push('<');
        html.push_str(tag);
        if let Some(id) = &self.id {
            html.push_str(" id=\"");
            escape_into(html, id);
            html.push('"');
        }
        if !self.classes.is_empty() {
            html.push_str(" class=\"");
            escape_into(html, &self.classes.join(" "));
            html.push('"');
        }
        html.push('>');
        if let Some(text) = &self.text {
            escape_into(html, text);
        }
        for child in &self.children {
            child.write_html(html);
        }
        let _ = write!(html, "</{tag}>");
    }

    /// Indented plain text view of all list items below this element.
    ///
    /// Two spaces per level, `+` in front of parents, `-` in front of leaves.
    #[must_use]
    pub fn outline(&self) -> String {
        let mut result = String::new();
        self.write_outline(&mut result, 0);
        result
    }

    fn write_outline(&self, result: &mut String, depth: usize) {
        for list in self.lists() {
            for item in &list.children {
                let marker = if item.is_parent() { '+' } else { '-' };
                let label = item.label_text().unwrap_or_default();
                let _ = writeln!(result, "{:indent$}{marker} {label}", "", indent = depth * 2);
                item.write_outline(result, depth + 1);
            }
        }
    }
}

fn escape_into(html: &mut String, text: &str) {
    for character in text.chars() {
        match character {
            '&' => html.push_str("&amp;"),
            '<' => html.push_str("&lt;"),
            '>' => html.push_str("&gt;"),
            '"' => html.push_str("&quot;"),
            '\'' => html.push_str("&#39;"),
            _ => html.push(character),
        }
    }
}

#[cfg(test)]
fn item(label: &str) -> Element {
    Element::list_item(label)
}

#[test]
fn only_containers_get_an_id() {
    let container = Element::container("tree");
    assert_eq!(container.id(), Some("tree"));
    assert_eq!(container.kind(), ElementKind::Container);
    assert_eq!(item("a").id(), None);
}

#[test]
fn add_class_keeps_classes_unique() {
    let mut element = Element::new(ElementKind::ListItem);
    element.add_class(PARENT_CLASS);
    element.add_class(PARENT_CLASS);
    assert_eq!(element.classes(), [PARENT_CLASS]);
    assert!(element.is_parent());
}

#[test]
fn html_escapes_text() {
    let element = Element::label("<a> & \"b\"");
    assert_eq!(
        element.to_html(),
        "<span>&lt;a&gt; &amp; &quot;b&quot;</span>"
    );
}

#[test]
fn html_contains_classes() {
    let mut parent = item("b");
    parent.add_class(PARENT_CLASS);
    assert_eq!(
        parent.to_html(),
        r#"<li class="parent_li"><span>b</span></li>"#
    );
}

#[test]
fn outline_indents_nested_items() {
    let mut inner = Element::new(ElementKind::List);
    inner.append_child(item("c"));
    let mut parent = item("b");
    parent.add_class(PARENT_CLASS);
    parent.append_child(inner);

    let mut list = Element::new(ElementKind::List);
    list.append_child(item("a"));
    list.append_child(parent);
    let mut container = Element::container("tree");
    container.append_child(list);

    assert_eq!(container.outline(), "- a\n+ b\n  - c\n");
}

#[test]
fn label_text_of_item() {
    let item = item("notes.txt");
    assert_eq!(item.label_text(), Some("notes.txt"));
    assert_eq!(item.nested_list(), None);
}
