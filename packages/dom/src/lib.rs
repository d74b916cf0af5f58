//! # Sprig DOM
//!
//! In-memory live document tree that the reconciler mutates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ vdom: virtual trees → reconciliation        │
//! └─────────────────────────────────────────────┘
//!                     ↓  (imperative mutations)
//! ┌─────────────────────────────────────────────┐
//! │ dom: Document                               │
//! │  - node arena keyed by stable NodeId        │
//! │  - attributes, properties, form state       │
//! │  - listener registry + event dispatch       │
//! │  - extra-class side table                   │
//! │  - mutation records (observer)              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Node ids are never reused: a released id stays dead, so identity checks
//! across renders (`a == b`) are meaningful.

mod classes;
mod document;
mod error;
mod events;
mod mutation;
mod node;
mod selection;
mod serialize;

pub use document::Document;
pub use error::{DomError, DomResult};
pub use events::{event_name_from_prop, handler, Event, EventHandler};
pub use mutation::MutationRecord;
pub use node::{DomValue, ElementData, Node, NodeData};
pub use selection::{SelectionRange, SelectionSnapshot};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node identifier (key into the document arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Raw numeric value, for logging and diagnostics
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
