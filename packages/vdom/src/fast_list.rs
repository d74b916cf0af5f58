//! # Fast List
//!
//! Keyed children reconciliation. Retained children are matched by key
//! (unkeyed ones by index) and moved only when they are out of place.
//!
//! ## Walk
//!
//! ```text
//!   current   a b c d         retained index:  a0 b1 c2 d3
//!   next      d a b c
//!
//!   d: index 3, expected 0 → move before childNodes[0]
//!   a: index 0, expected 0 → stays          (expected → 1)
//!   b: index 1, expected 1 → stays          (expected → 2)
//!   c: index 2, expected 2 → stays
//! ```
//!
//! A child whose `order_key` is unchanged is never moved, even when it is
//! out of place. Runs of new children are batched into one insertion.

use crate::element::VirtualElement;
use crate::error::{RenderResult, StructuralViolation};
use crate::props::Key;
use crate::reconciler::{last_node, Placement, Reconciler};
use sprig_dom::NodeId;
use std::collections::{HashMap, HashSet};
use std::mem;
use tracing::{trace, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SlotKey {
    Keyed(Key),
    /// Unkeyed child matched by its position
    Index(usize),
}

struct RetainedChild {
    element: VirtualElement,
    /// Position among retained children, in current order
    index: usize,
    order_key: Option<i64>,
}

impl Reconciler<'_> {
    pub(crate) fn render_fast_list(
        &mut self,
        parent: NodeId,
        current: Vec<VirtualElement>,
        next: Vec<VirtualElement>,
    ) -> RenderResult<Vec<VirtualElement>> {
        let mut next_keys = HashSet::new();
        for child in &next {
            if self.config.debug_checks {
                if child.is_fragment() {
                    return Err(StructuralViolation::FragmentInFastList.into());
                }
                if child.is_component() && child.key().is_none() {
                    warn!(%parent, "fast list child component has no key");
                }
            }
            if let Some(key) = child.key() {
                next_keys.insert(key.clone());
            }
        }

        let mut remaining: HashMap<SlotKey, RetainedChild> = HashMap::new();
        let mut retained_count = 0;
        for (i, child) in current.into_iter().enumerate() {
            let slot_key = match child.key() {
                Some(key) if next_keys.contains(key) => SlotKey::Keyed(key.clone()),
                Some(_) => {
                    self.reconcile(parent, Some(child), None, i, Placement::default(), false)?;
                    continue;
                }
                None if next.get(i).is_some_and(|n| n.key().is_none()) => SlotKey::Index(i),
                None => {
                    self.reconcile(parent, Some(child), None, i, Placement::default(), false)?;
                    continue;
                }
            };

            let order_key = child.order_key();
            let displaced = remaining.insert(
                slot_key,
                RetainedChild {
                    element: child,
                    index: retained_count,
                    order_key,
                },
            );
            if let Some(displaced) = displaced {
                self.reconcile(parent, Some(displaced.element), None, i, Placement::default(), false)?;
            }
            retained_count += 1;
        }

        let mut rendered = Vec::with_capacity(next.len());
        let mut run: Vec<VirtualElement> = Vec::new();
        let mut run_start = 0;
        let mut expected_index = 0;

        for (i, child) in next.into_iter().enumerate() {
            let slot_key = match child.key() {
                Some(key) => SlotKey::Keyed(key.clone()),
                None => SlotKey::Index(i),
            };

            let Some(retained) = remaining.remove(&slot_key) else {
                if run.is_empty() {
                    run_start = i;
                }
                run.push(child);
                continue;
            };

            if !run.is_empty() {
                let batch = mem::take(&mut run);
                rendered.extend(self.insert_run(parent, batch, run_start)?);
            }

            let new_order_key = child.order_key();
            let should_move = retained.index != expected_index
                && (new_order_key.is_none() || retained.order_key != new_order_key);
            let is_moving_down = should_move && expected_index > retained.index;

            if !should_move || is_moving_down {
                expected_index += 1;
            }

            let placement = if should_move {
                let anchor_index = if is_moving_down { i + 1 } else { i };
                match self.doc.child_at(parent, anchor_index) {
                    Some(sibling) => Placement::before(Some(sibling)),
                    None => Placement::move_to_end(),
                }
            } else {
                // Content of a slot without nodes goes right after the ones placed so far
                let tail = match rendered.iter().rev().find_map(last_node) {
                    Some(node) => self.doc.next_sibling(node),
                    None => self.doc.child_at(parent, 0),
                };
                Placement {
                    tail,
                    ..Placement::default()
                }
            };

            if let Some(element) =
                self.reconcile(parent, Some(retained.element), Some(child), i, placement, false)?
            {
                rendered.push(element);
            }
        }

        if !run.is_empty() {
            rendered.extend(self.insert_run(parent, run, run_start)?);
        }

        // Index-matched entries whose slot became keyed are never claimed
        for (_, leftover) in remaining {
            self.reconcile(parent, Some(leftover.element), None, leftover.index, Placement::default(), false)?;
        }

        Ok(rendered)
    }

    /// Mount a run of consecutive new children starting at `start`
    fn insert_run(
        &mut self,
        parent: NodeId,
        run: Vec<VirtualElement>,
        start: usize,
    ) -> RenderResult<Vec<VirtualElement>> {
        let next_sibling = self.doc.child_at(parent, start);
        let mut mounted = Vec::with_capacity(run.len());

        if run.len() == 1 {
            for element in run {
                let placement = Placement::before(next_sibling);
                if let Some(element) = self.reconcile(parent, None, Some(element), start, placement, false)? {
                    mounted.push(element);
                }
            }
            return Ok(mounted);
        }

        let fragment = self.doc.create_fragment();
        for (offset, element) in run.into_iter().enumerate() {
            let placement = Placement::batched(fragment);
            if let Some(element) =
                self.reconcile(parent, None, Some(element), start + offset, placement, false)?
            {
                mounted.push(element);
            }
        }
        trace!(%parent, start, count = mounted.len(), "batched run");
        self.doc.insert_before(parent, fragment, next_sibling)?;
        self.doc.release(fragment);
        Ok(mounted)
    }
}
