//! Frames file format
//!
//! A frames file is a JSON array; every entry is one full tree to render
//! into the replay root, in order.
//!
//! ```json
//! [
//!   { "tag": "ul", "fastList": true, "children": [
//!       { "tag": "li", "key": "a", "children": ["a"] },
//!       { "tag": "li", "key": "b", "children": ["b"] }
//!   ] },
//!   null
//! ]
//! ```
//!
//! `null` is an empty placeholder inside a child list and unmounts the root
//! when it is a whole frame. Strings are text, `{"fragment": [...]}` groups
//! children without a node of their own.

use serde::Deserialize;
use serde_json::Value;
use sprig_vdom::{Key, PropValue, VirtualElement};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid frames file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One node description
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Empty,
    Text(String),
    Fragment { fragment: Vec<NodeSpec> },
    Tag(TagSpec),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSpec {
    pub tag: String,
    #[serde(default)]
    pub props: serde_json::Map<String, Value>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
    #[serde(default)]
    pub key: Option<KeySpec>,
    #[serde(default)]
    pub fast_list: bool,
    #[serde(default)]
    pub order_key: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum KeySpec {
    Int(i64),
    Str(String),
}

impl From<KeySpec> for Key {
    fn from(key: KeySpec) -> Self {
        match key {
            KeySpec::Int(n) => Key::from(n),
            KeySpec::Str(s) => Key::from(s),
        }
    }
}

impl NodeSpec {
    pub fn into_element(self) -> VirtualElement {
        match self {
            NodeSpec::Empty => VirtualElement::empty(),
            NodeSpec::Text(text) => VirtualElement::text(text),
            NodeSpec::Fragment { fragment } => {
                VirtualElement::fragment(fragment.into_iter().map(NodeSpec::into_element).collect())
            }
            NodeSpec::Tag(spec) => spec.into_element(),
        }
    }

    /// Tree to render for a whole frame; `None` unmounts the root
    pub fn into_frame(self) -> Option<VirtualElement> {
        match self {
            NodeSpec::Empty => None,
            spec => Some(spec.into_element()),
        }
    }
}

impl TagSpec {
    fn into_element(self) -> VirtualElement {
        let mut element = VirtualElement::tag(self.tag);
        for (name, value) in self.props {
            if let Some(value) = prop_value(&name, value) {
                element = element.with_prop(name, value);
            }
        }
        if let Some(key) = self.key {
            element = element.with_key(key);
        }
        if let Some(order_key) = self.order_key {
            element = element.with_order_key(order_key);
        }
        if self.fast_list {
            element = element.with_fast_list();
        }
        element.with_children(self.children.into_iter().map(NodeSpec::into_element))
    }
}

fn prop_value(name: &str, value: Value) -> Option<PropValue> {
    match value {
        Value::String(s) => Some(s.into()),
        Value::Bool(b) => Some(b.into()),
        Value::Number(n) => n.as_f64().map(PropValue::from),
        Value::Object(mut object) if name == "dangerouslySetInnerHTML" => {
            match object.remove("__html") {
                Some(Value::String(html)) => Some(PropValue::html(html)),
                _ => {
                    warn!(prop = name, "expected {{\"__html\": string}}");
                    None
                }
            }
        }
        Value::Null => None,
        other => {
            warn!(prop = name, value = %other, "unsupported prop value skipped");
            None
        }
    }
}

pub fn parse_frames(json: &str) -> Result<Vec<NodeSpec>, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn load_frames(path: &Path) -> Result<Vec<NodeSpec>, FrameError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| FrameError::Io {
        path: display.clone(),
        source,
    })?;
    parse_frames(&content).map_err(|source| FrameError::Json {
        path: display,
        source,
    })
}
