//! # Reconciler
//!
//! Turns one virtual slot from its retained state into the next one,
//! touching the document only where they differ.
//!
//! ## Slot decision
//!
//! ```text
//!   current   next      action
//!   ───────   ───────   ─────────────────────────────────────────
//!   none      none      nothing
//!   none      some      mount (create + insert, or mount children)
//!   some      none      unmount (remove + release, run hooks)
//!   some      some      changed? → remount in place
//!                       same     → patch (props, children, move)
//! ```
//!
//! Component elements are offered their new props first; an instance that
//! declines to re-render keeps its retained element untouched.
//!
//! The reconciler also tracks where it is in the retained tree (anchor plus
//! index path) so every component it passes can be registered for later
//! update requests.

use crate::component::ComponentRef;
use crate::config::RendererConfig;
use crate::controlled::process_controlled;
use crate::element::{has_element_changed, VComponent, VirtualElement};
use crate::error::{RenderResult, StructuralViolation};
use crate::lifecycle::{self, Rendered};
use crate::patcher;
use crate::registry::{Anchor, InstanceId, InstanceRegistry, SlotLocation};
use crate::renderer::RenderStats;
use sprig_dom::{Document, NodeId};
use std::mem;
use tracing::{debug, trace};

/// Where a newly created or moved node goes
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Placement {
    /// Insert before this node; `None` appends
    pub next_sibling: Option<NodeId>,
    /// Move an existing node to the end even without a sibling
    pub force_move_to_end: bool,
    /// Collect new nodes into this fragment instead of the parent
    pub fragment: Option<NodeId>,
    /// Node following the slot's content, for slots with no node of their own
    pub tail: Option<NodeId>,
}

impl Placement {
    pub(crate) fn before(next_sibling: Option<NodeId>) -> Self {
        Self {
            next_sibling,
            ..Self::default()
        }
    }

    pub(crate) fn move_to_end() -> Self {
        Self {
            force_move_to_end: true,
            ..Self::default()
        }
    }

    pub(crate) fn batched(fragment: NodeId) -> Self {
        Self {
            fragment: Some(fragment),
            ..Self::default()
        }
    }

    fn requests_move(&self) -> bool {
        self.next_sibling.is_some() || self.force_move_to_end
    }
}

enum ComponentUpdate {
    Unchanged,
    Rerendered(VirtualElement),
}

pub(crate) struct Reconciler<'a> {
    pub(crate) doc: &'a mut Document,
    pub(crate) registry: &'a mut InstanceRegistry,
    pub(crate) config: &'a RendererConfig,
    pub(crate) stats: &'a mut RenderStats,
    anchor: Anchor,
    path: Vec<usize>,
    /// Instances mounted during this pass, children before parents
    pending_mounted: Vec<ComponentRef>,
}

impl<'a> Reconciler<'a> {
    pub(crate) fn new(
        doc: &'a mut Document,
        registry: &'a mut InstanceRegistry,
        config: &'a RendererConfig,
        stats: &'a mut RenderStats,
        anchor: Anchor,
        path: Vec<usize>,
    ) -> Self {
        Self {
            doc,
            registry,
            config,
            stats,
            anchor,
            path,
            pending_mounted: Vec::new(),
        }
    }

    /// Run `mounted` hooks of every component mounted during the pass
    pub(crate) fn finish(self) {
        for instance in self.pending_mounted {
            lifecycle::notify_mounted(&instance);
        }
    }

    /// Reconcile the slot at `index` of the current child list
    pub(crate) fn reconcile(
        &mut self,
        parent: NodeId,
        current: Option<VirtualElement>,
        next: Option<VirtualElement>,
        index: usize,
        placement: Placement,
        skip_component_update: bool,
    ) -> RenderResult<Option<VirtualElement>> {
        self.path.push(index);
        let result = self.reconcile_slot(parent, current, next, placement, skip_component_update);
        self.path.pop();
        result
    }

    fn reconcile_slot(
        &mut self,
        parent: NodeId,
        current: Option<VirtualElement>,
        mut next: Option<VirtualElement>,
        placement: Placement,
        skip_component_update: bool,
    ) -> RenderResult<Option<VirtualElement>> {
        let update = match (&current, &next) {
            (Some(VirtualElement::Component(cur)), Some(VirtualElement::Component(new)))
                if !skip_component_update && cur.kind() == new.kind() && cur.key == new.key =>
            {
                Some(self.update_component(cur, new))
            }
            _ => None,
        };

        match update {
            Some(ComponentUpdate::Unchanged) => {
                if let Some(element @ VirtualElement::Component(cur)) = &current {
                    self.register(&cur.instance, parent);
                    self.move_into_place(parent, element, placement)?;
                }
                return Ok(current);
            }
            Some(ComponentUpdate::Rerendered(element)) => next = Some(element),
            None => {}
        }

        if !skip_component_update {
            if let Some(VirtualElement::Component(new)) = &next {
                if new.instance.is_mounted() {
                    self.register(&new.instance, parent);
                }
            }
        }

        if self.config.debug_checks {
            if let Some(node) = next.as_ref().and_then(VirtualElement::target) {
                if current.as_ref().and_then(VirtualElement::target) != Some(node) {
                    return Err(StructuralViolation::RelocatedElement { node }.into());
                }
            }
        }

        match (current, next) {
            (None, None) => Ok(None),
            (None, Some(next)) => self.mount(parent, next, placement).map(Some),
            (Some(current), None) => {
                self.unmount(parent, current, None, None)?;
                Ok(None)
            }
            (Some(current), Some(next)) if has_element_changed(&current, &next) => {
                self.remount(parent, current, next, placement).map(Some)
            }
            (Some(current), Some(next)) => self.patch(parent, current, next, placement).map(Some),
        }
    }

    fn update_component(&mut self, current: &VComponent, next: &VComponent) -> ComponentUpdate {
        let props = next.instance.props();
        match lifecycle::update(&current.instance, props) {
            Rendered::Unchanged => ComponentUpdate::Unchanged,
            Rendered::Fresh(output) => {
                self.stats.components_rendered += 1;
                ComponentUpdate::Rerendered(VirtualElement::Component(VComponent {
                    instance: current.instance.clone(),
                    key: next.key.clone(),
                    order_key: next.order_key,
                    children: vec![output],
                }))
            }
        }
    }

    fn register(&mut self, instance: &ComponentRef, parent: NodeId) {
        let Some(id) = instance.id() else { return };
        self.registry.register(
            id,
            SlotLocation {
                anchor: self.anchor,
                path: self.path.clone(),
                parent,
            },
        );
    }

    /// Run `f` with the position reset to the children of instance `owner`
    fn within_component<T>(
        &mut self,
        owner: Option<InstanceId>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let Some(id) = owner else {
            return f(self);
        };
        let saved_anchor = mem::replace(&mut self.anchor, Anchor::Component(id));
        let saved_path = mem::take(&mut self.path);
        let result = f(self);
        self.anchor = saved_anchor;
        self.path = saved_path;
        result
    }

    // ========================================================================
    // Mount
    // ========================================================================

    fn mount(
        &mut self,
        parent: NodeId,
        next: VirtualElement,
        placement: Placement,
    ) -> RenderResult<VirtualElement> {
        self.stats.mounted += 1;
        if next.is_parent() {
            return self.mount_parent(parent, next, placement);
        }
        let mut real = next;
        if let Some(node) = self.create_node(&mut real)? {
            self.insert(parent, node, placement)?;
        }
        Ok(real)
    }

    /// Mount the children of a component or fragment straight into `parent`
    fn mount_parent(
        &mut self,
        parent: NodeId,
        next: VirtualElement,
        placement: Placement,
    ) -> RenderResult<VirtualElement> {
        match next {
            VirtualElement::Component(component) => {
                let fresh = !component.instance.is_mounted();
                let component = self.init_component(parent, component);
                self.mount_component(parent, component, placement, fresh)
            }
            VirtualElement::Fragment(mut fragment) => {
                let children = mem::take(&mut fragment.children);
                fragment.children = self.mount_children(parent, children, placement)?;
                Ok(VirtualElement::Fragment(fragment))
            }
            real => Ok(real),
        }
    }

    fn mount_children(
        &mut self,
        parent: NodeId,
        children: Vec<VirtualElement>,
        placement: Placement,
    ) -> RenderResult<Vec<VirtualElement>> {
        if self.config.debug_checks {
            check_unique_keys(&children)?;
        }
        let placement = Placement {
            force_move_to_end: false,
            ..placement
        };
        let mut mounted = Vec::with_capacity(children.len());
        for (i, child) in children.into_iter().enumerate() {
            if let Some(child) = self.reconcile(parent, None, Some(child), i, placement, false)? {
                mounted.push(child);
            }
        }
        Ok(mounted)
    }

    /// Mount the output of an initialized component. `fresh` queues its
    /// mounted hook.
    fn mount_component(
        &mut self,
        parent: NodeId,
        mut component: VComponent,
        placement: Placement,
        fresh: bool,
    ) -> RenderResult<VirtualElement> {
        let children = mem::take(&mut component.children);
        let mounted = self.within_component(component.instance.id(), |this| {
            this.mount_children(parent, children, placement)
        })?;
        component.children = mounted;
        if fresh {
            self.pending_mounted.push(component.instance.clone());
        }
        Ok(VirtualElement::Component(component))
    }

    /// First render of a fresh component instance
    fn init_component(&mut self, parent: NodeId, mut component: VComponent) -> VComponent {
        if component.instance.is_mounted() {
            return component;
        }
        let output = lifecycle::mount(&component.instance, self.registry);
        self.stats.components_rendered += 1;
        self.register(&component.instance, parent);
        component.children = vec![output];
        component
    }

    /// Create the live node of a real element, props and children included.
    /// Returns `None` for fragments and components.
    fn create_node(&mut self, element: &mut VirtualElement) -> RenderResult<Option<NodeId>> {
        let node = match element {
            VirtualElement::Empty(_) => self.doc.create_text(""),
            VirtualElement::Text(text) => self.doc.create_text(&text.value),
            VirtualElement::Tag(tag) => {
                let node = self.doc.create_element(&tag.tag);
                if self.config.controlled_inputs {
                    process_controlled(&tag.tag, &mut tag.props);
                }
                patcher::apply_props(self.doc, node, &tag.tag, &tag.props)?;
                let children = mem::take(&mut tag.children);
                tag.children = self.mount_children(node, children, Placement::default())?;
                if let Some(element_ref) = &tag.element_ref {
                    element_ref.set(Some(node));
                }
                node
            }
            VirtualElement::Fragment(_) | VirtualElement::Component(_) => return Ok(None),
        };
        element.set_target(node);
        trace!(%node, kind = element.kind_name(), "node created");
        Ok(Some(node))
    }

    fn insert(&mut self, parent: NodeId, node: NodeId, placement: Placement) -> RenderResult<()> {
        match placement.fragment {
            Some(fragment) => self.doc.append_child(fragment, node)?,
            None => self.doc.insert_before(parent, node, placement.next_sibling)?,
        }
        Ok(())
    }

    // ========================================================================
    // Unmount
    // ========================================================================

    /// Take `current` out of the document, optionally putting `replacement`
    /// where it was (before `next_sibling` when `current` is a parent).
    fn unmount(
        &mut self,
        parent: NodeId,
        current: VirtualElement,
        replacement: Option<NodeId>,
        next_sibling: Option<NodeId>,
    ) -> RenderResult<()> {
        self.stats.unmounted += 1;
        match current {
            VirtualElement::Component(component) => {
                self.unmount_instance(&component.instance);
                self.unmount_children(parent, component.children)?;
                if let Some(node) = replacement {
                    self.doc.insert_before(parent, node, next_sibling)?;
                }
            }
            VirtualElement::Fragment(fragment) => {
                self.unmount_children(parent, fragment.children)?;
                if let Some(node) = replacement {
                    self.doc.insert_before(parent, node, next_sibling)?;
                }
            }
            real => {
                if let Some(target) = real.target() {
                    match replacement {
                        Some(node) => self.doc.replace_child(parent, node, target)?,
                        None => self.doc.remove_child(parent, target)?,
                    }
                }
                self.release_tree(real);
            }
        }
        Ok(())
    }

    fn unmount_children(&mut self, parent: NodeId, children: Vec<VirtualElement>) -> RenderResult<()> {
        for (i, child) in children.into_iter().enumerate() {
            self.reconcile(parent, Some(child), None, i, Placement::default(), false)?;
        }
        Ok(())
    }

    fn unmount_instance(&mut self, instance: &ComponentRef) {
        if let Some(id) = lifecycle::unmount(instance) {
            self.registry.unregister(id);
        }
    }

    /// Tear down a subtree that is already out of the document: hooks run,
    /// refs clear, side-table entries and nodes are released.
    pub(crate) fn release_tree(&mut self, element: VirtualElement) {
        match element {
            VirtualElement::Component(component) => {
                self.unmount_instance(&component.instance);
                for child in component.children {
                    self.release_tree(child);
                }
            }
            VirtualElement::Fragment(fragment) => {
                for child in fragment.children {
                    self.release_tree(child);
                }
            }
            VirtualElement::Tag(tag) => {
                if let Some(element_ref) = &tag.element_ref {
                    element_ref.set(None);
                }
                if let Some(node) = tag.target {
                    self.doc.clear_extra_classes(node);
                    self.doc.remove_all_listeners(node);
                    self.doc.release(node);
                }
                for child in tag.children {
                    self.release_tree(child);
                }
            }
            VirtualElement::Text(text) => {
                if let Some(node) = text.target {
                    self.doc.release(node);
                }
            }
            VirtualElement::Empty(empty) => {
                if let Some(node) = empty.target {
                    self.doc.release(node);
                }
            }
        }
    }

    // ========================================================================
    // Remount
    // ========================================================================

    fn remount(
        &mut self,
        parent: NodeId,
        current: VirtualElement,
        next: VirtualElement,
        placement: Placement,
    ) -> RenderResult<VirtualElement> {
        self.stats.remounted += 1;
        trace!(from = current.kind_name(), to = next.kind_name(), "remount");

        if next.is_parent() {
            let next_sibling = if placement.force_move_to_end {
                None
            } else {
                placement
                    .next_sibling
                    .or_else(|| self.next_sibling_of(&current))
                    .or(placement.tail)
            };
            let placement = Placement {
                next_sibling,
                force_move_to_end: false,
                ..placement
            };
            // The replacement renders before the old element goes away
            if let VirtualElement::Component(component) = next {
                let fresh = !component.instance.is_mounted();
                let component = self.init_component(parent, component);
                self.unmount(parent, current, None, None)?;
                return self.mount_component(parent, component, placement, fresh);
            }
            self.unmount(parent, current, None, None)?;
            return self.mount_parent(parent, next, placement);
        }

        let mut real = next;
        let current_target = current.target();
        let next_sibling = if current.is_real() {
            None
        } else {
            self.next_sibling_of(&current).or(placement.tail)
        };
        let node = self.create_node(&mut real)?;
        self.unmount(parent, current, node, next_sibling)?;

        // The replacement took the old node's place; honour a requested move
        if let Some(node) = node {
            if placement.requests_move() && placement.next_sibling != current_target {
                self.doc.insert_before(parent, node, placement.next_sibling)?;
                self.stats.moved += 1;
            }
        }
        Ok(real)
    }

    /// Move every top-level node of an untouched element to `placement`
    fn move_into_place(
        &mut self,
        parent: NodeId,
        element: &VirtualElement,
        placement: Placement,
    ) -> RenderResult<()> {
        if !placement.requests_move() {
            return Ok(());
        }
        let mut nodes = Vec::new();
        collect_top_nodes(element, &mut nodes);
        for &node in &nodes {
            self.doc.insert_before(parent, node, placement.next_sibling)?;
        }
        if !nodes.is_empty() {
            self.stats.moved += 1;
        }
        Ok(())
    }

    /// Live node following everything `element` put into the document
    pub(crate) fn next_sibling_of(&self, element: &VirtualElement) -> Option<NodeId> {
        last_node(element).and_then(|node| self.doc.next_sibling(node))
    }

    // ========================================================================
    // Patch
    // ========================================================================

    fn patch(
        &mut self,
        parent: NodeId,
        current: VirtualElement,
        next: VirtualElement,
        placement: Placement,
    ) -> RenderResult<VirtualElement> {
        match (current, next) {
            (VirtualElement::Component(current), VirtualElement::Component(mut next)) => {
                let children = mem::take(&mut next.children);
                let rendered = self.within_component(next.instance.id(), |this| {
                    this.render_children(parent, current.children, children, placement, false)
                })?;
                next.children = rendered;
                Ok(VirtualElement::Component(next))
            }
            (VirtualElement::Fragment(current), VirtualElement::Fragment(mut next)) => {
                let children = mem::take(&mut next.children);
                next.children =
                    self.render_children(parent, current.children, children, placement, false)?;
                Ok(VirtualElement::Fragment(next))
            }
            (VirtualElement::Tag(current), VirtualElement::Tag(mut next)) => {
                let Some(target) = current.target else {
                    self.release_tree(VirtualElement::Tag(current));
                    return self.mount(parent, VirtualElement::Tag(next), placement);
                };
                self.stats.patched += 1;
                next.target = Some(target);

                if let Some(element_ref) = &current.element_ref {
                    element_ref.set(None);
                }
                if let Some(element_ref) = &next.element_ref {
                    element_ref.set(Some(target));
                }

                if placement.requests_move() {
                    self.doc.insert_before(parent, target, placement.next_sibling)?;
                    self.stats.moved += 1;
                    trace!(node = %target, before = ?placement.next_sibling, "moved");
                }

                if self.config.controlled_inputs {
                    process_controlled(&next.tag, &mut next.props);
                }
                patcher::update_props(self.doc, target, &current.props, &next.props)?;

                let children = mem::take(&mut next.children);
                next.children = self.render_children(
                    target,
                    current.children,
                    children,
                    Placement::default(),
                    next.fast_list,
                )?;
                Ok(VirtualElement::Tag(next))
            }
            (current, mut next) if current.is_real() && next.is_real() => {
                // text with equal value, or empty placeholder
                if let Some(target) = current.target() {
                    next.set_target(target);
                    if placement.requests_move() {
                        self.doc.insert_before(parent, target, placement.next_sibling)?;
                        self.stats.moved += 1;
                    }
                }
                Ok(next)
            }
            (current, next) => self.remount(parent, current, next, placement),
        }
    }

    /// Children strategy dispatch: keyed fast list or positional
    fn render_children(
        &mut self,
        parent: NodeId,
        current: Vec<VirtualElement>,
        next: Vec<VirtualElement>,
        placement: Placement,
        fast_list: bool,
    ) -> RenderResult<Vec<VirtualElement>> {
        if self.config.debug_checks {
            check_unique_keys(&next)?;
        }
        if fast_list {
            debug!(parent = %parent, current = current.len(), next = next.len(), "fast list");
            return self.render_fast_list(parent, current, next);
        }
        self.render_positional(parent, current, next, placement)
    }
}

/// First live node an element put into the document
pub(crate) fn first_node(element: &VirtualElement) -> Option<NodeId> {
    element
        .target()
        .or_else(|| element.children().iter().find_map(first_node))
}

pub(crate) fn last_node(element: &VirtualElement) -> Option<NodeId> {
    element
        .target()
        .or_else(|| element.children().iter().rev().find_map(last_node))
}

fn collect_top_nodes(element: &VirtualElement, out: &mut Vec<NodeId>) {
    match element.target() {
        Some(node) => out.push(node),
        None => {
            for child in element.children() {
                collect_top_nodes(child, out);
            }
        }
    }
}

fn check_unique_keys(children: &[VirtualElement]) -> RenderResult<()> {
    let mut seen = std::collections::HashSet::new();
    let mut duplicates = Vec::new();
    for key in children.iter().filter_map(VirtualElement::key) {
        if !seen.insert(key) && !duplicates.contains(key) {
            duplicates.push(key.clone());
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(StructuralViolation::DuplicateKeys { keys: duplicates }.into())
    }
}
