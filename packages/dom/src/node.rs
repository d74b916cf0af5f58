//! DOM Node - arena entry
//!
//! Nodes reference each other through `NodeId`s; the document owns them all.

use crate::selection::{SelectionRange, SelectionSnapshot};
use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (None while detached)
    pub parent: Option<NodeId>,
    /// Ordered child list
    pub children: Vec<NodeId>,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Check if this is a detached fragment container
    #[inline]
    pub fn is_fragment(&self) -> bool {
        matches!(self.data, NodeData::Fragment)
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Document fragment: a detached container whose children move out on insertion
    Fragment,
}

/// Element-specific data
#[derive(Debug, Default)]
pub struct ElementData {
    /// Lowercase tag name
    pub tag: String,
    /// Content attributes (`data-*`, `aria-*`, `role`, ...)
    pub attributes: BTreeMap<String, String>,
    /// IDL properties assigned directly on the element
    pub properties: BTreeMap<String, DomValue>,
    /// `className`
    pub class_name: String,
    /// `style.cssText`
    pub style: String,
    /// Raw markup set through `innerHTML`
    pub inner_html: Option<String>,
    /// Live form control value
    pub value: String,
    /// Live selection of a form control
    pub selection: Option<SelectionRange>,
    /// Selection captured by a controlled-input interceptor
    pub selection_snapshot: Option<SelectionSnapshot>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// Whether this element is a form control that carries a live value
    pub fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea" | "select")
    }
}

/// Primitive value assignable to an element property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomValue {
    Bool(bool),
    Number(f64),
    Str(String),
}

impl DomValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DomValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for DomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomValue::Bool(b) => write!(f, "{b}"),
            DomValue::Number(n) => write!(f, "{n}"),
            DomValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for DomValue {
    fn from(s: &str) -> Self {
        DomValue::Str(s.to_string())
    }
}

impl From<String> for DomValue {
    fn from(s: String) -> Self {
        DomValue::Str(s)
    }
}

impl From<bool> for DomValue {
    fn from(b: bool) -> Self {
        DomValue::Bool(b)
    }
}

impl From<f64> for DomValue {
    fn from(n: f64) -> Self {
        DomValue::Number(n)
    }
}
