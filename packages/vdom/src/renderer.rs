//! # Renderer
//!
//! Entry point of the engine. Owns the live [`Document`], the retained
//! virtual tree of every render root (its head) and the component registry.
//!
//! ```text
//!   render(tree, root)        head[root] ──reconcile──▶ head[root]'
//!   request_update()          queue ◀── instance id
//!   flush_updates()           queue ──resolve slot──▶ re-render in place
//! ```
//!
//! A failed pass leaves the affected head empty; the document keeps whatever
//! mutations were applied before the failure.

use crate::config::RendererConfig;
use crate::element::{VComponent, VirtualElement};
use crate::error::{RenderError, RenderResult};
use crate::lifecycle;
use crate::reconciler::{first_node, Placement, Reconciler};
use crate::registry::{Anchor, InstanceId, InstanceRegistry, ResolvedSlot};
use serde::Serialize;
use sprig_dom::{Document, NodeId};
use std::collections::HashMap;
use std::mem;
use tracing::{debug, info, instrument, warn};

/// Work done by one render or flush
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderStats {
    pub mounted: usize,
    pub unmounted: usize,
    pub remounted: usize,
    pub patched: usize,
    pub moved: usize,
    pub components_rendered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_tree_size: Option<usize>,
}

impl RenderStats {
    fn absorb(&mut self, other: RenderStats) {
        self.mounted += other.mounted;
        self.unmounted += other.unmounted;
        self.remounted += other.remounted;
        self.patched += other.patched;
        self.moved += other.moved;
        self.components_rendered += other.components_rendered;
        if other.virtual_tree_size.is_some() {
            self.virtual_tree_size = other.virtual_tree_size;
        }
    }
}

pub struct Renderer {
    document: Document,
    /// Retained tree per root; holds zero or one element
    heads: HashMap<NodeId, Vec<VirtualElement>>,
    registry: InstanceRegistry,
    config: RendererConfig,
}

impl Renderer {
    pub fn new(document: Document) -> Self {
        Self::with_config(document, RendererConfig::default())
    }

    pub fn with_config(document: Document, config: RendererConfig) -> Self {
        Self {
            document,
            heads: HashMap::new(),
            registry: InstanceRegistry::default(),
            config,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Retained virtual tree rendered into `root`
    pub fn tree(&self, root: NodeId) -> Option<&VirtualElement> {
        self.heads.get(&root).and_then(|head| head.first())
    }

    /// Number of mounted component instances across all roots
    pub fn mounted_components(&self) -> usize {
        self.registry.len()
    }

    pub fn pending_updates(&self) -> usize {
        self.registry.queue.len()
    }

    /// Reconcile `tree` against what was last rendered into `root`.
    ///
    /// `None` unmounts the previous tree. Mount hooks of new components run
    /// once the whole pass is applied.
    #[instrument(skip_all, fields(root = %root))]
    pub fn render(&mut self, tree: Option<VirtualElement>, root: NodeId) -> RenderResult<RenderStats> {
        if !self.document.contains(root) {
            return Err(RenderError::UnknownRoot(root));
        }

        let mut head = self.heads.remove(&root).unwrap_or_default();
        let current = head.pop();
        let mut stats = RenderStats::default();

        let mut reconciler = Reconciler::new(
            &mut self.document,
            &mut self.registry,
            &self.config,
            &mut stats,
            Anchor::Root(root),
            Vec::new(),
        );
        let retained = reconciler.reconcile(root, current, tree, 0, Placement::default(), false)?;
        reconciler.finish();

        if let Some(element) = retained {
            self.heads.insert(root, vec![element]);
        }
        if self.config.measure_tree_size {
            stats.virtual_tree_size = Some(self.tree(root).map_or(0, VirtualElement::tree_size));
        }

        info!(
            mounted = stats.mounted,
            unmounted = stats.unmounted,
            patched = stats.patched,
            moved = stats.moved,
            "render complete"
        );
        Ok(stats)
    }

    /// Apply every pending component update request, including requests
    /// raised while flushing.
    #[instrument(skip(self))]
    pub fn flush_updates(&mut self) -> RenderResult<RenderStats> {
        let mut total = RenderStats::default();
        while let Some(id) = self.registry.queue.pop() {
            let Some(slot) = self.registry.resolve(id) else {
                debug!(instance = %id, "update for unmounted instance dropped");
                continue;
            };
            let Some(mut head) = self.heads.remove(&slot.root) else {
                continue;
            };

            let result = self.rerender_slot(&mut head, id, &slot);
            self.heads.insert(slot.root, head);
            total.absorb(result?);
        }

        if self.config.measure_tree_size {
            let size = self.heads.values().flatten().map(VirtualElement::tree_size).sum::<usize>();
            total.virtual_tree_size = Some(size);
        }
        Ok(total)
    }

    fn rerender_slot(
        &mut self,
        head: &mut [VirtualElement],
        id: InstanceId,
        slot: &ResolvedSlot,
    ) -> RenderResult<RenderStats> {
        let mut stats = RenderStats::default();
        let path = slot.path.as_slice();
        let tail = slot_tail(head, path);
        let Some(element) = slot_mut(head, path) else {
            warn!(?path, "stale component slot");
            return Ok(stats);
        };
        let VirtualElement::Component(component) = &*element else {
            warn!(?path, kind = element.kind_name(), "slot no longer holds a component");
            return Ok(stats);
        };
        if component.instance.id() != Some(id) || !component.instance.is_mounted() {
            warn!(instance = %id, ?path, "slot holds another instance");
            return Ok(stats);
        }

        let output = lifecycle::force_render(&component.instance);
        stats.components_rendered += 1;
        let next = VirtualElement::Component(VComponent {
            instance: component.instance.clone(),
            key: component.key.clone(),
            order_key: component.order_key,
            children: vec![output],
        });
        let current = mem::replace(element, VirtualElement::empty());

        let mut base_path = slot.location.path.clone();
        let index = base_path.pop().unwrap_or_default();
        let mut reconciler = Reconciler::new(
            &mut self.document,
            &mut self.registry,
            &self.config,
            &mut stats,
            slot.location.anchor,
            base_path,
        );
        let placement = Placement {
            tail,
            ..Placement::default()
        };
        let retained = reconciler.reconcile(slot.parent, Some(current), Some(next), index, placement, true)?;
        reconciler.finish();

        if let Some(retained) = retained {
            *element = retained;
        }
        Ok(stats)
    }

    /// Dispatch a DOM event, then apply the updates its handlers requested
    pub fn dispatch_event(&mut self, target: NodeId, event: &str) -> RenderResult<bool> {
        let proceed = self.document.dispatch(target, event)?;
        self.flush_updates()?;
        Ok(proceed)
    }

    /// Simulate typing into a text control, then apply requested updates
    pub fn input_text(&mut self, target: NodeId, value: &str, caret: usize) -> RenderResult<bool> {
        let proceed = self.document.input_text(target, value, caret)?;
        self.flush_updates()?;
        Ok(proceed)
    }

    /// Simulate clicking a checkbox, then apply requested updates
    pub fn toggle_checked(&mut self, target: NodeId) -> RenderResult<bool> {
        let proceed = self.document.toggle_checked(target)?;
        self.flush_updates()?;
        Ok(proceed)
    }
}

/// Node following the slot at `path` under the same live parent. Fragments
/// and components on the way share their parent, so their later siblings count.
fn slot_tail(children: &[VirtualElement], path: &[usize]) -> Option<NodeId> {
    let (&index, rest) = path.split_first()?;
    let element = children.get(index)?;
    if rest.is_empty() {
        return children[index + 1..].iter().find_map(first_node);
    }
    let inner = slot_tail(element.children(), rest);
    if element.target().is_some() {
        return inner;
    }
    inner.or_else(|| children[index + 1..].iter().find_map(first_node))
}

fn slot_mut<'a>(children: &'a mut [VirtualElement], path: &[usize]) -> Option<&'a mut VirtualElement> {
    let (&first, rest) = path.split_first()?;
    let element = children.get_mut(first)?;
    if rest.is_empty() {
        return Some(element);
    }
    slot_mut(element.children_mut()?, rest)
}
