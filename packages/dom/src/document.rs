//! # Document
//!
//! Arena-backed live document. Every node lives in one map keyed by a
//! `NodeId` that is never reused; tree structure is expressed through parent
//! and child id lists.
//!
//! ## Tree operations
//!
//! Insertion follows browser semantics:
//! - inserting an attached node moves it (one `Moved` record)
//! - inserting a fragment moves all of its children, in order, and leaves
//!   the fragment empty
//! - inserting a node right before itself (or where it already is) is a no-op
//!
//! ## Ownership
//!
//! Detaching a node does not free it. The owner calls [`Document::release`]
//! once the node will never be used again; this also drops its listeners and
//! extra classes.

use crate::events::ListenerRegistry;
use crate::mutation::{MutationLog, MutationRecord};
use crate::node::{DomValue, ElementData, Node, NodeData};
use crate::selection::{SelectionRange, SelectionSnapshot};
use crate::{DomError, DomResult, NodeId};
use std::collections::HashMap;
use tracing::trace;

/// Live document tree
#[derive(Debug)]
pub struct Document {
    nodes: HashMap<NodeId, Node>,
    next_id: u32,
    body: NodeId,
    pub(crate) listeners: ListenerRegistry,
    pub(crate) extra_classes: HashMap<NodeId, Vec<String>>,
    pub(crate) log: MutationLog,
}

impl Document {
    /// Create a document with an empty `<body>` element
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: HashMap::new(),
            next_id: 1,
            body: NodeId(0),
            listeners: ListenerRegistry::default(),
            extra_classes: HashMap::new(),
            log: MutationLog::default(),
        };
        doc.body = doc.create_element("body");
        doc
    }

    /// The `<body>` element created with the document
    pub fn body(&self) -> NodeId {
        self.body
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(data));
        id
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element(ElementData::new(tag)))
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.alloc(NodeData::Text(content.to_string()))
    }

    /// Create a detached container used to batch several insertions
    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeData::Fragment)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Number of live (unreleased) nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.nodes.get(&id).ok_or(DomError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.nodes.get_mut(&id).ok_or(DomError::NodeNotFound(id))
    }

    pub fn element(&self, id: NodeId) -> DomResult<&ElementData> {
        self.node(id)?.as_element().ok_or(DomError::NotAnElement(id))
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        self.node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.tag.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).get(index).copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|&c| c == id)?;
        siblings.get(position + 1).copied()
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.parent(node) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    // ========================================================================
    // Tree mutation
    // ========================================================================

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `before` (or at the end)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> DomResult<()> {
        if self.node(parent)?.is_text() || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        let is_fragment = self.node(child)?.is_fragment();

        if let Some(reference) = before {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }

        let before = if before == Some(child) {
            self.next_sibling(child)
        } else {
            before
        };

        if is_fragment {
            let moved = std::mem::take(&mut self.node_mut(child)?.children);
            for node in moved {
                self.node_mut(node)?.parent = None;
                self.place(parent, node, before)?;
                self.log.push(MutationRecord::Inserted { parent, node });
            }
            trace!(%parent, fragment = %child, "inserted fragment");
            return Ok(());
        }

        let old_parent = self.parent(child);
        if old_parent == Some(parent) && self.is_in_place(parent, child, before) {
            return Ok(());
        }

        let was_attached = old_parent
            .and_then(|p| self.get(p))
            .is_some_and(|p| !p.is_fragment());

        self.detach(child);
        self.place(parent, child, before)?;

        if was_attached {
            trace!(%parent, node = %child, "moved");
            self.log.push(MutationRecord::Moved {
                parent,
                node: child,
            });
        } else {
            trace!(%parent, node = %child, "inserted");
            self.log.push(MutationRecord::Inserted {
                parent,
                node: child,
            });
        }
        Ok(())
    }

    fn is_in_place(&self, parent: NodeId, child: NodeId, before: Option<NodeId>) -> bool {
        let siblings = self.children(parent);
        let Some(position) = siblings.iter().position(|&c| c == child) else {
            return false;
        };
        match before {
            Some(reference) => siblings.get(position + 1) == Some(&reference),
            None => position + 1 == siblings.len(),
        }
    }

    fn place(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) -> DomResult<()> {
        let siblings = &mut self.node_mut(parent)?.children;
        let index = before
            .and_then(|reference| siblings.iter().position(|&c| c == reference))
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn detach(&mut self, child: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get_mut(&child)?.parent.take()?;
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|&c| c != child);
        }
        Some(parent)
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.node(child)?;
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        trace!(%parent, node = %child, "removed");
        self.log.push(MutationRecord::Removed {
            parent,
            node: child,
        });
        Ok(())
    }

    /// Put `new_child` where `old_child` is and detach `old_child`
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> DomResult<()> {
        if new_child == old_child {
            return Ok(());
        }
        self.insert_before(parent, new_child, Some(old_child))?;
        self.remove_child(parent, old_child)
    }

    /// Free a node. It is detached first if still attached; its children are
    /// left detached for their own owners to release.
    pub fn release(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            if self.contains(parent) {
                self.detach(id);
                self.log.push(MutationRecord::Removed { parent, node: id });
            }
        }

        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        for child in node.children {
            if let Some(child_node) = self.nodes.get_mut(&child) {
                child_node.parent = None;
            }
        }
        self.listeners.remove_all(id);
        self.extra_classes.remove(&id);
    }

    /// Free a node and every descendant
    pub fn release_subtree(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        for child in children {
            self.release_subtree(child);
        }
        self.release(id);
    }

    // ========================================================================
    // Text
    // ========================================================================

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_text()
    }

    pub fn set_text(&mut self, id: NodeId, content: &str) -> DomResult<()> {
        let NodeData::Text(text) = &mut self.node_mut(id)?.data else {
            return Err(DomError::NotText(id));
        };
        if text != content {
            *text = content.to_string();
            self.log.push(MutationRecord::Text { node: id });
        }
        Ok(())
    }

    /// Concatenated text of the subtree
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else { return };
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element(ElementData {
                inner_html: Some(html),
                ..
            }) => out.push_str(html),
            _ => {
                for &child in &node.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    // ========================================================================
    // Attributes & properties
    // ========================================================================

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).ok()?.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let element = self.element_mut(id)?;
        if element.attributes.get(name).map(String::as_str) == Some(value) {
            return Ok(());
        }
        element.attributes.insert(name.to_string(), value.to_string());
        self.log.push(MutationRecord::Attribute {
            node: id,
            name: name.to_string(),
        });
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        if self.element_mut(id)?.attributes.remove(name).is_some() {
            self.log.push(MutationRecord::Attribute {
                node: id,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn property(&self, id: NodeId, name: &str) -> Option<&DomValue> {
        self.element(id).ok()?.properties.get(name)
    }

    pub fn set_property(&mut self, id: NodeId, name: &str, value: DomValue) -> DomResult<()> {
        let element = self.element_mut(id)?;
        if element.properties.get(name) == Some(&value) {
            return Ok(());
        }
        element.properties.insert(name.to_string(), value);
        self.log.push(MutationRecord::Property {
            node: id,
            name: name.to_string(),
        });
        Ok(())
    }

    pub fn remove_property(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        if self.element_mut(id)?.properties.remove(name).is_some() {
            self.log.push(MutationRecord::Property {
                node: id,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn class_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|e| e.class_name.as_str())
    }

    pub fn set_class_name(&mut self, id: NodeId, value: &str) -> DomResult<()> {
        let element = self.element_mut(id)?;
        if element.class_name != value {
            element.class_name = value.to_string();
            self.log.push(MutationRecord::ClassName { node: id });
        }
        Ok(())
    }

    pub fn style(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|e| e.style.as_str())
    }

    /// Replace the whole `style` text
    pub fn set_style(&mut self, id: NodeId, css_text: &str) -> DomResult<()> {
        let element = self.element_mut(id)?;
        if element.style != css_text {
            element.style = css_text.to_string();
            self.log.push(MutationRecord::Style { node: id });
        }
        Ok(())
    }

    pub fn raw_inner_html(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok()?.inner_html.as_deref()
    }

    /// Replace the element's content with raw markup; an empty string clears it
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> DomResult<()> {
        self.element(id)?;
        let children = self.children(id).to_vec();
        for child in children {
            self.release_subtree(child);
        }

        let next = (!html.is_empty()).then(|| html.to_string());
        let element = self.element_mut(id)?;
        if element.inner_html != next {
            element.inner_html = next;
            self.log.push(MutationRecord::InnerHtml { node: id });
        }
        Ok(())
    }

    // ========================================================================
    // Form state
    // ========================================================================

    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|e| e.value.as_str())
    }

    /// Write the live value; like a browser, the caret moves to the end
    pub fn set_value(&mut self, id: NodeId, value: &str) -> DomResult<()> {
        let element = self.element_mut(id)?;
        if element.value == value {
            return Ok(());
        }
        element.value = value.to_string();
        element.selection = Some(SelectionRange::caret(value.chars().count()));
        self.log.push(MutationRecord::Value { node: id });
        Ok(())
    }

    pub fn selection(&self, id: NodeId) -> Option<SelectionRange> {
        self.element(id).ok()?.selection
    }

    pub fn set_selection_range(&mut self, id: NodeId, start: usize, end: usize) -> DomResult<()> {
        let element = self.element_mut(id)?;
        let len = element.value.chars().count();
        element.selection = Some(SelectionRange::clamped(start, end, len));
        Ok(())
    }

    pub fn store_selection_snapshot(
        &mut self,
        id: NodeId,
        snapshot: SelectionSnapshot,
    ) -> DomResult<()> {
        self.element_mut(id)?.selection_snapshot = Some(snapshot);
        Ok(())
    }

    pub fn selection_snapshot(&self, id: NodeId) -> Option<SelectionSnapshot> {
        self.element(id).ok()?.selection_snapshot
    }

    pub fn take_selection_snapshot(&mut self, id: NodeId) -> Option<SelectionSnapshot> {
        self.element_mut(id).ok()?.selection_snapshot.take()
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Start recording mutations (no-op if already recording)
    pub fn observe(&mut self) {
        self.log.start();
    }

    /// Stop recording and return what was pending
    pub fn disconnect(&mut self) -> Vec<MutationRecord> {
        self.log.stop()
    }

    /// Drain pending records, keep recording
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        self.log.take()
    }

    /// Number of pending records
    pub fn pending_records(&self) -> usize {
        self.log.len()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
