//! Positional children reconciliation
//!
//! Slot `i` of the current list is reconciled against slot `i` of the next
//! one. When the list grows, every appended element is created inside one
//! detached fragment which is inserted with a single document operation
//! after the loop.

use crate::element::VirtualElement;
use crate::error::RenderResult;
use crate::reconciler::{first_node, Placement, Reconciler};
use sprig_dom::NodeId;
use tracing::trace;

impl Reconciler<'_> {
    pub(crate) fn render_positional(
        &mut self,
        parent: NodeId,
        current: Vec<VirtualElement>,
        next: Vec<VirtualElement>,
        placement: Placement,
    ) -> RenderResult<Vec<VirtualElement>> {
        let current_len = current.len();
        let next_len = next.len();

        let fragment = (next_len > current_len).then(|| self.doc.create_fragment());
        // Resolved up front: the loop may replace the last current child
        let fragment_next_sibling = match fragment {
            Some(_) => placement
                .next_sibling
                .or_else(|| current.last().and_then(|last| self.next_sibling_of(last)))
                .or(placement.tail),
            None => None,
        };

        let mut current = current.into_iter();
        let mut next = next.into_iter();
        let mut retained = Vec::with_capacity(next_len);

        for i in 0..current_len.max(next_len) {
            let slot_placement = match fragment {
                Some(fragment) if i >= current_len => Placement::batched(fragment),
                _ => {
                    // what follows this slot: the next sibling with a node, else our own tail
                    let tail = current
                        .as_slice()
                        .get(1..)
                        .and_then(|rest| rest.iter().find_map(first_node))
                        .or(placement.tail);
                    Placement {
                        fragment: None,
                        tail,
                        ..placement
                    }
                }
            };
            if let Some(child) =
                self.reconcile(parent, current.next(), next.next(), i, slot_placement, false)?
            {
                retained.push(child);
            }
        }

        if let Some(fragment) = fragment {
            trace!(%parent, appended = next_len - current_len, "batched insert");
            self.doc.insert_before(parent, fragment, fragment_next_sibling)?;
            self.doc.release(fragment);
        }

        Ok(retained)
    }
}
