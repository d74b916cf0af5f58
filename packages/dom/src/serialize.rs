//! HTML serialization of the live tree
//!
//! Output is deterministic: `class`, `style` and `value` first, then content
//! attributes and properties in name order. Boolean properties render as bare
//! attributes when true and are omitted when false.

use crate::node::{DomValue, NodeData};
use crate::{Document, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

impl Document {
    /// Markup of the node itself and its subtree
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Markup of the node's content
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_children(id, &mut out);
        out
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        if let Some(raw) = self.raw_inner_html(id) {
            out.push_str(raw);
            return;
        }
        for &child in self.children(id) {
            self.write_node(child, out);
        }
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else { return };

        let element = match &node.data {
            NodeData::Text(text) => {
                escape_text(text, out);
                return;
            }
            NodeData::Fragment => {
                self.write_children(id, out);
                return;
            }
            NodeData::Element(element) => element,
        };

        out.push('<');
        out.push_str(&element.tag);

        if !element.class_name.is_empty() {
            write_attr(out, "class", &element.class_name);
        }
        if !element.style.is_empty() {
            write_attr(out, "style", &element.style);
        }
        if !element.value.is_empty() {
            write_attr(out, "value", &element.value);
        }
        for (name, value) in &element.attributes {
            write_attr(out, name, value);
        }
        for (name, value) in &element.properties {
            match value {
                DomValue::Bool(true) => {
                    out.push(' ');
                    out.push_str(name);
                }
                DomValue::Bool(false) => {}
                other => write_attr(out, name, &other.to_string()),
            }
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&element.tag.as_str()) {
            return;
        }

        self.write_children(id, out);
        out.push_str("</");
        out.push_str(&element.tag);
        out.push('>');
    }
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
