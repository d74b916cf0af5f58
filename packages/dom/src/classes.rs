//! Extra classes
//!
//! Classes added out-of-band by application code (highlight, drag state, ...)
//! are tracked per node so that a later `className` patch from a virtual tree
//! merges with them instead of wiping them. Entries live until the class is
//! removed or the node is released.

use crate::{Document, DomResult, NodeId};
use tracing::trace;

impl Document {
    /// Class tokens currently in `className`
    pub fn class_list(&self, node: NodeId) -> Vec<&str> {
        self.class_name(node)
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.class_list(node).contains(&class)
    }

    fn add_class_token(&mut self, node: NodeId, class: &str) -> DomResult<()> {
        if self.has_class(node, class) {
            return Ok(());
        }
        let mut tokens: Vec<String> = self.class_list(node).into_iter().map(String::from).collect();
        tokens.push(class.to_string());
        self.set_class_name(node, &tokens.join(" "))
    }

    fn remove_class_token(&mut self, node: NodeId, class: &str) -> DomResult<()> {
        if !self.has_class(node, class) {
            return Ok(());
        }
        let tokens: Vec<&str> = self
            .class_list(node)
            .into_iter()
            .filter(|&token| token != class)
            .collect();
        let joined = tokens.join(" ");
        self.set_class_name(node, &joined)
    }

    /// Add one or more space-separated classes that survive `className` patches
    pub fn add_extra_class(&mut self, node: NodeId, class_name: &str) -> DomResult<()> {
        for class in class_name.split_whitespace() {
            self.add_class_token(node, class)?;

            let extra = self.extra_classes.entry(node).or_default();
            if !extra.iter().any(|c| c == class) {
                extra.push(class.to_string());
            }
            trace!(%node, class, "extra class added");
        }
        Ok(())
    }

    pub fn remove_extra_class(&mut self, node: NodeId, class_name: &str) -> DomResult<()> {
        for class in class_name.split_whitespace() {
            self.remove_class_token(node, class)?;

            if let Some(extra) = self.extra_classes.get_mut(&node) {
                extra.retain(|c| c != class);
                if extra.is_empty() {
                    self.extra_classes.remove(&node);
                }
            }
            trace!(%node, class, "extra class removed");
        }
        Ok(())
    }

    /// Toggle each class; `force` pins the result like `classList.toggle`
    pub fn toggle_extra_class(
        &mut self,
        node: NodeId,
        class_name: &str,
        force: Option<bool>,
    ) -> DomResult<()> {
        for class in class_name.split_whitespace() {
            let add = force.unwrap_or_else(|| !self.has_class(node, class));
            if add {
                self.add_extra_class(node, class)?;
            } else {
                self.remove_extra_class(node, class)?;
            }
        }
        Ok(())
    }

    /// Extra classes registered for `node`, in insertion order
    pub fn extra_classes(&self, node: NodeId) -> &[String] {
        self.extra_classes
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn clear_extra_classes(&mut self, node: NodeId) {
        self.extra_classes.remove(&node);
    }
}
