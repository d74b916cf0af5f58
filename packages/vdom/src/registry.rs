//! Component instance registry
//!
//! A component asks for a re-render through its [`UpdateHandle`], which
//! only enqueues the instance id. Where the instance currently lives in the
//! retained tree is recorded here, relative to the nearest enclosing
//! component (its anchor), and refreshed every time a reconciliation pass
//! visits the component. Resolving an id therefore always yields the latest
//! slot even after ancestors reordered their children.
//!
//! ```text
//!   Root(#1)   path [0]        → App
//!   App        path [0, 2]     → <ul> child 2 → Row
//!   Row        path [0]        → ...
//! ```

use sprig_dom::NodeId;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Identifier of a mounted component instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Pending re-render requests, in request order without duplicates
#[derive(Debug, Clone, Default)]
pub(crate) struct UpdateQueue(Rc<RefCell<VecDeque<InstanceId>>>);

impl UpdateQueue {
    fn push(&self, id: InstanceId) {
        let mut queue = self.0.borrow_mut();
        if !queue.contains(&id) {
            queue.push_back(id);
        }
    }

    pub(crate) fn pop(&self) -> Option<InstanceId> {
        self.0.borrow_mut().pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub(crate) fn remove(&self, id: InstanceId) {
        self.0.borrow_mut().retain(|&queued| queued != id);
    }
}

/// Re-render trigger handed to a component instance
#[derive(Debug, Clone)]
pub struct UpdateHandle {
    id: InstanceId,
    queue: UpdateQueue,
}

impl UpdateHandle {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Schedule a re-render; applied by the next `Renderer::flush_updates`
    pub fn request_update(&self) {
        trace!(instance = %self.id, "update requested");
        self.queue.push(self.id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    /// Child list of a render root (the retained head)
    Root(NodeId),
    /// Child list of a mounted component
    Component(InstanceId),
}

#[derive(Debug, Clone)]
pub(crate) struct SlotLocation {
    pub anchor: Anchor,
    pub path: Vec<usize>,
    /// DOM node the component's children are inserted into
    pub parent: NodeId,
}

/// Slot of an instance, expressed from its render root
#[derive(Debug, Clone)]
pub(crate) struct ResolvedSlot {
    pub root: NodeId,
    /// Indices from the head list down to the component element
    pub path: Vec<usize>,
    pub parent: NodeId,
    pub location: SlotLocation,
}

#[derive(Debug, Default)]
pub(crate) struct InstanceRegistry {
    next_id: u64,
    slots: HashMap<InstanceId, SlotLocation>,
    pub(crate) queue: UpdateQueue,
}

impl InstanceRegistry {
    pub(crate) fn allocate(&mut self) -> (InstanceId, UpdateHandle) {
        self.next_id += 1;
        let id = InstanceId(self.next_id);
        let handle = UpdateHandle {
            id,
            queue: self.queue.clone(),
        };
        (id, handle)
    }

    pub(crate) fn register(&mut self, id: InstanceId, location: SlotLocation) {
        self.slots.insert(id, location);
    }

    pub(crate) fn unregister(&mut self, id: InstanceId) {
        self.slots.remove(&id);
        self.queue.remove(id);
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn resolve(&self, id: InstanceId) -> Option<ResolvedSlot> {
        let location = self.slots.get(&id)?;
        let mut path = location.path.clone();
        let mut anchor = location.anchor;

        // Anchors form a chain towards a root; the bound guards stale cycles
        for _ in 0..=self.slots.len() {
            match anchor {
                Anchor::Root(root) => {
                    return Some(ResolvedSlot {
                        root,
                        path,
                        parent: location.parent,
                        location: location.clone(),
                    });
                }
                Anchor::Component(owner) => {
                    let owner_location = self.slots.get(&owner)?;
                    let mut full = owner_location.path.clone();
                    full.extend(path);
                    path = full;
                    anchor = owner_location.anchor;
                }
            }
        }
        None
    }
}
