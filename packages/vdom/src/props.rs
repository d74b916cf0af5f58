//! Props, keys and element refs
//!
//! Prop equality is shallow: primitives compare by value, handlers, raw HTML
//! and opaque data compare by pointer. Producers must hand over a new `Rc`
//! to trigger an update.

use sprig_dom::{DomValue, EventHandler, NodeId};
use std::any::Any;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Props mapping of a tag or component element
pub type Props = BTreeMap<String, PropValue>;

#[derive(Clone, Debug)]
pub enum PropValue {
    Str(String),
    Number(f64),
    Bool(bool),
    Handler(EventHandler),
    /// Pre-sanitized markup for `dangerouslySetInnerHTML`
    Html(Rc<str>),
    /// Opaque data passed down to components
    Any(Rc<dyn Any>),
}

impl PropValue {
    pub fn html(markup: impl Into<Rc<str>>) -> Self {
        PropValue::Html(markup.into())
    }

    pub fn any<T: Any>(value: T) -> Self {
        PropValue::Any(Rc::new(value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            PropValue::Handler(h) => Some(h),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            PropValue::Any(value) => value.downcast_ref(),
            _ => None,
        }
    }

    /// JS-like truthiness, used for `defaultChecked` and friends
    pub fn is_truthy(&self) -> bool {
        match self {
            PropValue::Str(s) => !s.is_empty(),
            PropValue::Number(n) => *n != 0.0 && !n.is_nan(),
            PropValue::Bool(b) => *b,
            PropValue::Html(_) | PropValue::Handler(_) | PropValue::Any(_) => true,
        }
    }

    /// Text form written into string-typed DOM slots (`className`, `value`, ...)
    pub fn to_text(&self) -> String {
        match self {
            PropValue::Str(s) => s.clone(),
            PropValue::Number(n) => n.to_string(),
            PropValue::Bool(b) => b.to_string(),
            PropValue::Html(html) => html.to_string(),
            PropValue::Handler(_) | PropValue::Any(_) => String::new(),
        }
    }

    /// Primitive assignable to a DOM property, if any
    pub fn to_dom_value(&self) -> Option<DomValue> {
        match self {
            PropValue::Str(s) => Some(DomValue::Str(s.clone())),
            PropValue::Number(n) => Some(DomValue::Number(*n)),
            PropValue::Bool(b) => Some(DomValue::Bool(*b)),
            PropValue::Html(_) | PropValue::Handler(_) | PropValue::Any(_) => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Number(a), PropValue::Number(b)) => a == b,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => a.ptr_eq(b),
            (PropValue::Html(a), PropValue::Html(b)) => Rc::ptr_eq(a, b),
            (PropValue::Any(a), PropValue::Any(b)) => {
                std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
            }
            _ => false,
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Str(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Str(s)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Number(n)
    }
}

impl From<i32> for PropValue {
    fn from(n: i32) -> Self {
        PropValue::Number(n.into())
    }
}

impl From<EventHandler> for PropValue {
    fn from(h: EventHandler) -> Self {
        PropValue::Handler(h)
    }
}

/// Sibling key used by keyed reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Rc<str>);

impl Key {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key(s.into())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key(s.into())
    }
}

impl From<usize> for Key {
    fn from(n: usize) -> Self {
        Key(n.to_string().into())
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key(n.to_string().into())
    }
}

/// Receives the DOM node of a mounted tag (and `None` when it goes away)
#[derive(Clone)]
pub enum ElementRef {
    Slot(Rc<Cell<Option<NodeId>>>),
    Callback(Rc<dyn Fn(Option<NodeId>)>),
}

impl ElementRef {
    /// Ref object whose `current` is kept up to date
    pub fn new() -> Self {
        ElementRef::Slot(Rc::new(Cell::new(None)))
    }

    pub fn callback(f: impl Fn(Option<NodeId>) + 'static) -> Self {
        ElementRef::Callback(Rc::new(f))
    }

    /// Current node of a ref object; always `None` for callback refs
    pub fn current(&self) -> Option<NodeId> {
        match self {
            ElementRef::Slot(slot) => slot.get(),
            ElementRef::Callback(_) => None,
        }
    }

    pub(crate) fn set(&self, node: Option<NodeId>) {
        match self {
            ElementRef::Slot(slot) => slot.set(node),
            ElementRef::Callback(f) => f(node),
        }
    }
}

impl Default for ElementRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Slot(slot) => f.debug_tuple("ElementRef::Slot").field(&slot.get()).finish(),
            ElementRef::Callback(_) => f.write_str("ElementRef::Callback"),
        }
    }
}
