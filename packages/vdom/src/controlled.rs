//! Controlled form inputs
//!
//! A form control whose props impose `value` or `checked` must not drift
//! from them when the user edits it. Its `onInput` is replaced by a wrapper
//! that runs the original `onInput` and `onChange`, then forces the live
//! state back to the imposed one. The selection at that moment is stored on
//! the node so the next value write by the patcher can put the caret back.

use crate::patcher::is_controllable;
use crate::props::{PropValue, Props};
use sprig_dom::{Document, DomResult, EventHandler, NodeId, SelectionSnapshot};
use tracing::trace;

/// Rewrite `props` of a controlled form control in place
pub(crate) fn process_controlled(tag: &str, props: &mut Props) {
    let value = props
        .get("value")
        .filter(|v| v.to_dom_value().is_some())
        .map(PropValue::to_text);
    let checked = props.get("checked").map(PropValue::is_truthy);

    if (value.is_none() && checked.is_none()) || !is_controllable(tag) {
        return;
    }

    let on_input = props
        .get("onInput")
        .and_then(PropValue::as_handler)
        .cloned();
    let on_change = props
        .remove("onChange")
        .and_then(|h| h.as_handler().cloned());

    let wrapper = EventHandler::new(move |doc, event| {
        if let Some(on_input) = &on_input {
            on_input.call(doc, event)?;
        }
        if let Some(on_change) = &on_change {
            on_change.call(doc, event)?;
        }

        let node = event.current_target;
        if let Some(value) = &value {
            force_value(doc, node, value)?;
        }
        if let Some(checked) = checked {
            doc.set_property(node, "checked", checked.into())?;
        }
        Ok(())
    });

    props.insert("onInput".to_string(), PropValue::Handler(wrapper));
}

fn force_value(doc: &mut Document, node: NodeId, value: &str) -> DomResult<()> {
    let live = doc.value(node).unwrap_or_default().to_string();
    if live == value {
        return Ok(());
    }

    let selection = doc.selection(node);
    doc.set_value(node, value)?;

    if let Some(selection) = selection {
        let is_caret_at_end = selection.is_collapsed() && selection.end == live.chars().count();
        doc.set_selection_range(node, selection.start, selection.end)?;
        doc.store_selection_snapshot(
            node,
            SelectionSnapshot {
                selection_start: selection.start,
                selection_end: selection.end,
                is_caret_at_end,
            },
        )?;
        trace!(%node, start = selection.start, end = selection.end, "controlled value forced back");
    }
    Ok(())
}
