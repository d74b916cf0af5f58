//! Mutation records
//!
//! The document can be observed like a MutationObserver: once recording is
//! on, every observable change appends one record. Selection changes and
//! listener bookkeeping are not observable and produce no record.

use crate::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MutationRecord {
    /// A node without a parent (or coming out of a fragment) was attached
    Inserted { parent: NodeId, node: NodeId },
    /// An attached node was repositioned
    Moved { parent: NodeId, node: NodeId },
    /// A node was detached from its parent
    Removed { parent: NodeId, node: NodeId },
    Attribute { node: NodeId, name: String },
    Property { node: NodeId, name: String },
    ClassName { node: NodeId },
    Style { node: NodeId },
    Value { node: NodeId },
    Text { node: NodeId },
    InnerHtml { node: NodeId },
}

impl MutationRecord {
    pub fn is_move(&self) -> bool {
        matches!(self, MutationRecord::Moved { .. })
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, MutationRecord::Removed { .. })
    }

    pub fn is_insertion(&self) -> bool {
        matches!(self, MutationRecord::Inserted { .. })
    }

    /// Node the record is about
    pub fn node(&self) -> NodeId {
        match self {
            MutationRecord::Inserted { node, .. }
            | MutationRecord::Moved { node, .. }
            | MutationRecord::Removed { node, .. }
            | MutationRecord::Attribute { node, .. }
            | MutationRecord::Property { node, .. }
            | MutationRecord::ClassName { node }
            | MutationRecord::Style { node }
            | MutationRecord::Value { node }
            | MutationRecord::Text { node }
            | MutationRecord::InnerHtml { node } => *node,
        }
    }
}

/// Recording state owned by the document
#[derive(Debug, Default)]
pub(crate) struct MutationLog {
    records: Option<Vec<MutationRecord>>,
}

impl MutationLog {
    pub(crate) fn start(&mut self) {
        if self.records.is_none() {
            self.records = Some(Vec::new());
        }
    }

    pub(crate) fn stop(&mut self) -> Vec<MutationRecord> {
        self.records.take().unwrap_or_default()
    }

    pub(crate) fn take(&mut self) -> Vec<MutationRecord> {
        self.records.as_mut().map(std::mem::take).unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.as_ref().map_or(0, Vec::len)
    }

    #[inline]
    pub(crate) fn push(&mut self, record: MutationRecord) {
        if let Some(records) = &mut self.records {
            records.push(record);
        }
    }
}
