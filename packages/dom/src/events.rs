//! DOM Events
//!
//! Listener registry and a two-phase (capture, then bubble) dispatcher.
//! Handlers receive the document mutably so they can read and force form
//! state; they are compared by pointer identity, never structurally.

use crate::{Document, DomResult, NodeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

type HandlerFn = dyn Fn(&mut Document, &mut Event) -> DomResult<()>;

/// Shared event callback
#[derive(Clone)]
pub struct EventHandler(Rc<HandlerFn>);

impl EventHandler {
    pub fn new(f: impl Fn(&mut Document, &mut Event) -> DomResult<()> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, document: &mut Document, event: &mut Event) -> DomResult<()> {
        (self.0)(document, event)
    }

    /// Identity comparison (the data pointer only, vtables may be duplicated)
    pub fn ptr_eq(&self, other: &EventHandler) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.0) as *const (),
            Rc::as_ptr(&other.0) as *const (),
        )
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Shorthand for [`EventHandler::new`]
pub fn handler(f: impl Fn(&mut Document, &mut Event) -> DomResult<()> + 'static) -> EventHandler {
    EventHandler::new(f)
}

/// Event being dispatched
#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub target: NodeId,
    pub current_target: NodeId,
    propagation_stopped: bool,
    default_prevented: bool,
}

impl Event {
    pub fn new(name: impl Into<String>, target: NodeId) -> Self {
        Self {
            name: name.into(),
            target,
            current_target: target,
            propagation_stopped: false,
            default_prevented: false,
        }
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Resolve an event-binding prop name to `(event name, capture)`.
///
/// `onClick` → `("click", false)`, `onKeyDownCapture` → `("keydown", true)`.
/// Returns `None` for names that are not event bindings.
pub fn event_name_from_prop(prop: &str) -> Option<(String, bool)> {
    let rest = prop.strip_prefix("on")?;
    if !rest.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }

    let (base, capture) = match rest.strip_suffix("Capture") {
        Some(base) if !base.is_empty() => (base, true),
        _ => (rest, false),
    };

    let name = match base {
        "DoubleClick" => "dblclick".to_string(),
        other => other.to_ascii_lowercase(),
    };

    Some((name, capture))
}

#[derive(Debug, Clone)]
struct Listener {
    event: String,
    handler: EventHandler,
    capture: bool,
}

/// Listeners keyed by node
#[derive(Debug, Default)]
pub(crate) struct ListenerRegistry {
    by_node: HashMap<NodeId, Vec<Listener>>,
}

impl ListenerRegistry {
    fn matching(&self, node: NodeId, event: &str, capture: bool) -> Vec<EventHandler> {
        self.by_node
            .get(&node)
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|l| l.capture == capture && l.event == event)
                    .map(|l| l.handler.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn remove_all(&mut self, node: NodeId) -> usize {
        self.by_node.remove(&node).map_or(0, |l| l.len())
    }
}

impl Document {
    /// Register `handler` for `event` on `node`
    pub fn add_listener(
        &mut self,
        node: NodeId,
        event: &str,
        handler: EventHandler,
        capture: bool,
    ) -> DomResult<()> {
        self.node(node)?;
        trace!(%node, event, capture, "add listener");
        self.listeners
            .by_node
            .entry(node)
            .or_default()
            .push(Listener {
                event: event.to_string(),
                handler,
                capture,
            });
        Ok(())
    }

    /// Remove a previously registered listener; returns whether one was found
    pub fn remove_listener(
        &mut self,
        node: NodeId,
        event: &str,
        handler: &EventHandler,
        capture: bool,
    ) -> bool {
        let Some(listeners) = self.listeners.by_node.get_mut(&node) else {
            return false;
        };

        let position = listeners
            .iter()
            .position(|l| l.capture == capture && l.event == event && l.handler.ptr_eq(handler));

        let removed = match position {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        };

        if listeners.is_empty() {
            self.listeners.by_node.remove(&node);
        }

        trace!(%node, event, capture, removed, "remove listener");
        removed
    }

    /// Drop every listener of `node`
    pub fn remove_all_listeners(&mut self, node: NodeId) {
        let count = self.listeners.remove_all(node);
        if count > 0 {
            trace!(%node, count, "removed all listeners");
        }
    }

    /// Number of listeners currently bound to `node`
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.listeners.by_node.get(&node).map_or(0, Vec::len)
    }

    /// Dispatch `event` at `target`: capture listeners from the top-most
    /// ancestor down, then bubble listeners from the target up.
    ///
    /// Returns `false` if a handler called `prevent_default`.
    pub fn dispatch(&mut self, target: NodeId, event: &str) -> DomResult<bool> {
        self.node(target)?;

        let mut path = vec![target];
        let mut cursor = self.parent(target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.parent(node);
        }

        let mut event = Event::new(event, target);

        for &node in path.iter().rev() {
            self.invoke(node, &mut event, true)?;
            if event.is_propagation_stopped() {
                return Ok(!event.is_default_prevented());
            }
        }

        for &node in path.iter() {
            self.invoke(node, &mut event, false)?;
            if event.is_propagation_stopped() {
                break;
            }
        }

        Ok(!event.is_default_prevented())
    }

    fn invoke(&mut self, node: NodeId, event: &mut Event, capture: bool) -> DomResult<()> {
        let handlers = self.listeners.matching(node, &event.name, capture);
        event.current_target = node;
        for handler in handlers {
            handler.call(self, event)?;
        }
        Ok(())
    }

    /// Simulate native editing of a text control: the value and caret change
    /// first, then an `input` event is dispatched.
    pub fn input_text(&mut self, node: NodeId, value: &str, caret: usize) -> DomResult<bool> {
        self.set_value(node, value)?;
        self.set_selection_range(node, caret, caret)?;
        self.dispatch(node, "input")
    }

    /// Simulate a click on a checkbox-like control: `checked` flips before
    /// `input` and `change` are dispatched.
    pub fn toggle_checked(&mut self, node: NodeId) -> DomResult<bool> {
        let checked = self
            .property(node, "checked")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        self.set_property(node, "checked", (!checked).into())?;
        let proceed = self.dispatch(node, "input")?;
        Ok(proceed && self.dispatch(node, "change")?)
    }
}
