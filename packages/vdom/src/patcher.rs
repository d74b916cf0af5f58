//! # Attribute Patcher
//!
//! Translates tag props into document writes.
//!
//! ## Prop routing
//!
//! | Prop                         | Target                                   |
//! |------------------------------|------------------------------------------|
//! | `className`                  | class name, merged with extra classes    |
//! | `value`                      | live value (+ pending selection restore) |
//! | `style`                      | whole inline style text                  |
//! | `dangerouslySetInnerHTML`    | raw inner markup                         |
//! | `on<Event>[Capture]`         | event listener                           |
//! | `data-*`, `aria-*`, `dir`, `role`, `form` | content attribute           |
//! | `key`, `ref`, `fastList`, `orderKey`      | never written               |
//! | anything else                | element property (`autoPlay` and `autoComplete` lowercased) |
//!
//! Handlers are compared by identity: a changed handler is removed before
//! the new one is added, so a node never carries both.

use crate::props::{PropValue, Props};
use sprig_dom::{event_name_from_prop, Document, DomResult, NodeId};
use tracing::{trace, warn};

pub(crate) const INNER_HTML: &str = "dangerouslySetInnerHTML";

const FILTERED_PROPS: &[&str] = &["key", "ref", "fastList", "orderKey"];
const HTML_ATTRIBUTES: &[&str] = &["dir", "role", "form"];
const MAPPED_PROPS: &[(&str, &str)] = &[("autoPlay", "autoplay"), ("autoComplete", "autocomplete")];

pub(crate) const CONTROLLABLE_TAGS: &[&str] = &["input", "textarea", "select"];

pub(crate) fn is_controllable(tag: &str) -> bool {
    CONTROLLABLE_TAGS
        .iter()
        .any(|t| t.eq_ignore_ascii_case(tag))
}

fn is_html_attribute(name: &str) -> bool {
    name.starts_with("data-") || name.starts_with("aria-") || HTML_ATTRIBUTES.contains(&name)
}

fn property_name(name: &str) -> &str {
    MAPPED_PROPS
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
        .unwrap_or(name)
}

/// Write every prop of a freshly created element
pub(crate) fn apply_props(doc: &mut Document, node: NodeId, tag: &str, props: &Props) -> DomResult<()> {
    for (name, value) in props {
        set_prop(doc, node, name, value)?;
    }
    apply_uncontrolled_defaults(doc, node, tag, props)
}

/// Seed `defaultValue` / `defaultChecked` of form controls at creation
fn apply_uncontrolled_defaults(doc: &mut Document, node: NodeId, tag: &str, props: &Props) -> DomResult<()> {
    if !is_controllable(tag) {
        return Ok(());
    }
    if let Some(default_value) = props.get("defaultValue") {
        if !default_value.to_text().is_empty() {
            set_prop(doc, node, "value", default_value)?;
        }
    }
    if let Some(default_checked) = props.get("defaultChecked") {
        if default_checked.is_truthy() {
            set_prop(doc, node, "checked", &PropValue::Bool(true))?;
        }
    }
    Ok(())
}

/// Diff `current` against `next` and apply the difference.
///
/// Returns the number of props written or removed.
pub(crate) fn update_props(
    doc: &mut Document,
    node: NodeId,
    current: &Props,
    next: &Props,
) -> DomResult<usize> {
    let mut writes = 0;

    for (name, value) in current {
        let remove = match next.get(name) {
            None => true,
            Some(next_value) => next_value != value && is_event_prop(name),
        };
        if remove {
            remove_prop(doc, node, name, value)?;
            writes += 1;
        }
    }

    for (name, value) in next {
        if current.get(name) != Some(value) {
            set_prop(doc, node, name, value)?;
            writes += 1;
        }
    }

    if writes > 0 {
        trace!(%node, writes, "props patched");
    }
    Ok(writes)
}

fn is_event_prop(name: &str) -> bool {
    event_name_from_prop(name).is_some()
}

pub(crate) fn set_prop(doc: &mut Document, node: NodeId, name: &str, value: &PropValue) -> DomResult<()> {
    match name {
        "className" => write_class_name(doc, node, &value.to_text()),
        "value" => write_value(doc, node, &value.to_text()),
        "style" => doc.set_style(node, &value.to_text()),
        INNER_HTML => doc.set_inner_html(node, &value.to_text()),
        _ if FILTERED_PROPS.contains(&name) => Ok(()),
        _ => {
            if let Some((event, capture)) = event_name_from_prop(name) {
                return match value.as_handler() {
                    Some(handler) => doc.add_listener(node, &event, handler.clone(), capture),
                    None => {
                        warn!(%node, prop = name, "event prop without a handler ignored");
                        Ok(())
                    }
                };
            }
            if is_html_attribute(name) {
                return doc.set_attribute(node, name, &value.to_text());
            }
            match value.to_dom_value() {
                Some(dom_value) => doc.set_property(node, property_name(name), dom_value),
                None => {
                    warn!(%node, prop = name, "non-primitive prop can not be written to the element");
                    Ok(())
                }
            }
        }
    }
}

pub(crate) fn remove_prop(doc: &mut Document, node: NodeId, name: &str, value: &PropValue) -> DomResult<()> {
    match name {
        "className" => write_class_name(doc, node, ""),
        "value" => doc.set_value(node, ""),
        "style" => doc.set_style(node, ""),
        INNER_HTML => doc.set_inner_html(node, ""),
        _ if FILTERED_PROPS.contains(&name) => Ok(()),
        _ => {
            if let Some((event, capture)) = event_name_from_prop(name) {
                if let Some(handler) = value.as_handler() {
                    doc.remove_listener(node, &event, handler, capture);
                }
                return Ok(());
            }
            if is_html_attribute(name) {
                return doc.remove_attribute(node, name);
            }
            doc.remove_property(node, property_name(name))
        }
    }
}

/// Extra classes come first so `className` edits never drop them
fn write_class_name(doc: &mut Document, node: NodeId, class_name: &str) -> DomResult<()> {
    let extra = doc.extra_classes(node);
    if extra.is_empty() {
        return doc.set_class_name(node, class_name);
    }
    let mut tokens: Vec<&str> = extra.iter().map(String::as_str).collect();
    if !class_name.is_empty() {
        tokens.push(class_name);
    }
    let merged = tokens.join(" ");
    doc.set_class_name(node, &merged)
}

/// Write the live value and apply a selection snapshot left by a controlled
/// input handler. The snapshot is consumed.
fn write_value(doc: &mut Document, node: NodeId, value: &str) -> DomResult<()> {
    if doc.value(node) == Some(value) {
        return Ok(());
    }
    doc.set_value(node, value)?;
    if let Some(snapshot) = doc.take_selection_snapshot(node) {
        let range = snapshot.resolve(value.chars().count());
        doc.set_selection_range(node, range.start, range.end)?;
    }
    Ok(())
}
