//! Tiny component tree for card markup.
//!
//! Tag and attribute names are `&'static str` and therefore always come from
//! this crate. Every piece of text and every attribute value goes through
//! [`escape`] when the tree is rendered, so a field cannot be placed into
//! the output unescaped.

use crate::escape::{escape, escape_lines};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Escaped text
    Text(String),
    /// Escaped text with newlines rendered as `<br>`
    Lines(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn class(self, value: impl Into<String>) -> Self {
        self.attr("class", value)
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    pub fn lines(self, text: impl Into<String>) -> Self {
        self.child(Node::Lines(text.into()))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(Some(value)));
            out.push('"');
        }
        out.push('>');
        for child in &self.children {
            child.render_into(out);
        }
        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }
}

impl Node {
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Node::Element(element) => element.render_into(out),
            Node::Text(text) => out.push_str(&escape(Some(text))),
            Node::Lines(text) => out.push_str(&escape_lines(text)),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested() {
        let html = Element::new("div")
            .class("recipe-card")
            .child(Element::new("h2").text("Pad Thai"))
            .render();
        assert_eq!(html, r#"<div class="recipe-card"><h2>Pad Thai</h2></div>"#);
    }

    #[test]
    fn test_text_and_attributes_escaped() {
        let html = Element::new("button")
            .attr("data-recipe-id", r#"1" onclick="x"#)
            .text("<script>alert('hi')</script>")
            .render();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.starts_with(r#"<button data-recipe-id="1&quot; onclick=&quot;x">"#));
    }

    #[test]
    fn test_lines_escape_before_breaks() {
        let html = Element::new("li").lines("a < b\nc").render();
        assert_eq!(html, "<li>a &lt; b<br>c</li>");
    }
}
