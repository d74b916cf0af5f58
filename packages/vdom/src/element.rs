//! Virtual element model
//!
//! A virtual tree is an owned value. Rendering consumes the next tree and
//! hands back the retained one, with every real element bound to the live
//! node it produced (`target`). Tags, text and empty placeholders are
//! "real": they map to exactly one DOM node. Fragments and components are
//! "parents": their children map into the parent's DOM node directly.

use crate::component::{Component, ComponentInstance, ComponentKind, ComponentRef};
use crate::props::{ElementRef, Key, PropValue, Props};
use sprig_dom::{EventHandler, NodeId};

/// Virtual DOM element
#[derive(Debug, Clone)]
pub enum VirtualElement {
    /// Placeholder, rendered as an empty text node
    Empty(VEmpty),
    Text(VText),
    Tag(VTag),
    Fragment(VFragment),
    Component(VComponent),
}

#[derive(Debug, Clone, Default)]
pub struct VEmpty {
    pub(crate) target: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct VText {
    pub value: String,
    pub(crate) target: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct VTag {
    pub tag: String,
    pub props: Props,
    pub children: Vec<VirtualElement>,
    pub key: Option<Key>,
    pub element_ref: Option<ElementRef>,
    /// Reconcile children by key instead of position
    pub fast_list: bool,
    /// Position hint inside a fast list; equal hints suppress moves
    pub order_key: Option<i64>,
    pub(crate) target: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct VFragment {
    pub children: Vec<VirtualElement>,
}

#[derive(Debug, Clone)]
pub struct VComponent {
    pub instance: ComponentRef,
    pub key: Option<Key>,
    pub order_key: Option<i64>,
    /// Last rendered output (at most one element once mounted)
    pub children: Vec<VirtualElement>,
}

impl VComponent {
    pub fn kind(&self) -> ComponentKind {
        self.instance.kind()
    }
}

impl VirtualElement {
    pub fn empty() -> Self {
        VirtualElement::Empty(VEmpty::default())
    }

    pub fn text(value: impl Into<String>) -> Self {
        VirtualElement::Text(VText {
            value: value.into(),
            target: None,
        })
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        VirtualElement::Tag(VTag {
            tag: tag.into(),
            props: Props::new(),
            children: Vec::new(),
            key: None,
            element_ref: None,
            fast_list: false,
            order_key: None,
            target: None,
        })
    }

    pub fn fragment(children: Vec<VirtualElement>) -> Self {
        VirtualElement::Fragment(VFragment { children })
    }

    /// Element for a fresh component instance; the instance is only kept if
    /// this element ends up mounted.
    pub fn component<C: Component>(component: C, props: Props) -> Self {
        VirtualElement::Component(VComponent {
            instance: ComponentInstance::new(component, props).into_ref(),
            key: None,
            order_key: None,
            children: Vec::new(),
        })
    }

    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        if let VirtualElement::Tag(ref mut tag) = self {
            tag.props.insert(name.into(), value.into());
        }
        self
    }

    pub fn with_class_name(self, class_name: impl Into<String>) -> Self {
        self.with_prop("className", class_name.into())
    }

    /// Bind a handler under an `on*` prop, e.g. `onClick`
    pub fn with_handler(self, prop: impl Into<String>, handler: EventHandler) -> Self {
        self.with_prop(prop, handler)
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        match self {
            VirtualElement::Tag(ref mut tag) => tag.key = Some(key.into()),
            VirtualElement::Component(ref mut component) => component.key = Some(key.into()),
            _ => {}
        }
        self
    }

    pub fn with_order_key(mut self, order_key: i64) -> Self {
        match self {
            VirtualElement::Tag(ref mut tag) => tag.order_key = Some(order_key),
            VirtualElement::Component(ref mut component) => component.order_key = Some(order_key),
            _ => {}
        }
        self
    }

    pub fn with_ref(mut self, element_ref: ElementRef) -> Self {
        if let VirtualElement::Tag(ref mut tag) = self {
            tag.element_ref = Some(element_ref);
        }
        self
    }

    pub fn with_fast_list(mut self) -> Self {
        if let VirtualElement::Tag(ref mut tag) = self {
            tag.fast_list = true;
        }
        self
    }

    pub fn with_child(mut self, child: VirtualElement) -> Self {
        match self {
            VirtualElement::Tag(ref mut tag) => tag.children.push(child),
            VirtualElement::Fragment(ref mut fragment) => fragment.children.push(child),
            _ => {}
        }
        self
    }

    pub fn with_children(mut self, new_children: impl IntoIterator<Item = VirtualElement>) -> Self {
        match self {
            VirtualElement::Tag(ref mut tag) => tag.children.extend(new_children),
            VirtualElement::Fragment(ref mut fragment) => fragment.children.extend(new_children),
            _ => {}
        }
        self
    }

    // ========================================================================
    // Predicates
    // ========================================================================

    pub fn is_empty(&self) -> bool {
        matches!(self, VirtualElement::Empty(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, VirtualElement::Text(_))
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, VirtualElement::Tag(_))
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self, VirtualElement::Fragment(_))
    }

    pub fn is_component(&self) -> bool {
        matches!(self, VirtualElement::Component(_))
    }

    /// Maps to exactly one DOM node
    pub fn is_real(&self) -> bool {
        matches!(
            self,
            VirtualElement::Empty(_) | VirtualElement::Text(_) | VirtualElement::Tag(_)
        )
    }

    /// Holds children that are inserted into the enclosing DOM parent
    pub fn is_parent(&self) -> bool {
        matches!(
            self,
            VirtualElement::Fragment(_) | VirtualElement::Component(_)
        )
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Live node bound to a real element
    pub fn target(&self) -> Option<NodeId> {
        match self {
            VirtualElement::Empty(e) => e.target,
            VirtualElement::Text(t) => t.target,
            VirtualElement::Tag(t) => t.target,
            VirtualElement::Fragment(_) | VirtualElement::Component(_) => None,
        }
    }

    pub(crate) fn set_target(&mut self, node: NodeId) {
        match self {
            VirtualElement::Empty(e) => e.target = Some(node),
            VirtualElement::Text(t) => t.target = Some(node),
            VirtualElement::Tag(t) => t.target = Some(node),
            VirtualElement::Fragment(_) | VirtualElement::Component(_) => {}
        }
    }

    pub fn key(&self) -> Option<&Key> {
        match self {
            VirtualElement::Tag(t) => t.key.as_ref(),
            VirtualElement::Component(c) => c.key.as_ref(),
            _ => None,
        }
    }

    pub fn order_key(&self) -> Option<i64> {
        match self {
            VirtualElement::Tag(t) => t.order_key,
            VirtualElement::Component(c) => c.order_key,
            _ => None,
        }
    }

    pub fn children(&self) -> &[VirtualElement] {
        match self {
            VirtualElement::Tag(t) => &t.children,
            VirtualElement::Fragment(f) => &f.children,
            VirtualElement::Component(c) => &c.children,
            VirtualElement::Empty(_) | VirtualElement::Text(_) => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<VirtualElement>> {
        match self {
            VirtualElement::Tag(t) => Some(&mut t.children),
            VirtualElement::Fragment(f) => Some(&mut f.children),
            VirtualElement::Component(c) => Some(&mut c.children),
            VirtualElement::Empty(_) | VirtualElement::Text(_) => None,
        }
    }

    /// Number of virtual elements in this subtree, self included
    pub fn tree_size(&self) -> usize {
        1 + self.children().iter().map(Self::tree_size).sum::<usize>()
    }

    /// Short kind name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            VirtualElement::Empty(_) => "empty",
            VirtualElement::Text(_) => "text",
            VirtualElement::Tag(_) => "tag",
            VirtualElement::Fragment(_) => "fragment",
            VirtualElement::Component(_) => "component",
        }
    }
}

impl From<&str> for VirtualElement {
    fn from(value: &str) -> Self {
        VirtualElement::text(value)
    }
}

impl From<String> for VirtualElement {
    fn from(value: String) -> Self {
        VirtualElement::text(value)
    }
}

/// Whether `next` can not be patched onto `current` and must replace it.
///
/// Elements of different kinds always differ. Tags differ by tag name or key,
/// components by component type or key, text by value. Two empties or two
/// fragments never differ.
pub fn has_element_changed(current: &VirtualElement, next: &VirtualElement) -> bool {
    match (current, next) {
        (VirtualElement::Empty(_), VirtualElement::Empty(_)) => false,
        (VirtualElement::Text(a), VirtualElement::Text(b)) => a.value != b.value,
        (VirtualElement::Tag(a), VirtualElement::Tag(b)) => a.tag != b.tag || a.key != b.key,
        (VirtualElement::Fragment(_), VirtualElement::Fragment(_)) => false,
        (VirtualElement::Component(a), VirtualElement::Component(b)) => {
            a.kind() != b.kind() || a.key != b.key
        }
        _ => true,
    }
}
