//! Components
//!
//! A component is a stateful producer of a virtual subtree. Each mounted
//! component element owns one [`ComponentInstance`] shared through a
//! [`ComponentRef`]; the element built by a parent's render carries a fresh
//! instance that is thrown away when an existing instance of the same kind
//! already occupies the slot.

use crate::element::VirtualElement;
use crate::props::Props;
use crate::registry::{InstanceId, UpdateHandle};
use std::any::{type_name, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub trait Component: 'static {
    fn render(&mut self, props: &Props, updater: &UpdateHandle) -> VirtualElement;

    /// Called once the rendered subtree is in the document
    fn mounted(&mut self, _updater: &UpdateHandle) {}

    /// Called before the rendered subtree is torn down
    fn unmounted(&mut self) {}

    /// Re-render decision when the parent passes new props
    fn should_update(&self, previous: &Props, next: &Props) -> bool {
        previous != next
    }
}

/// Identity of a component type
#[derive(Debug, Clone, Copy)]
pub struct ComponentKind {
    type_id: TypeId,
    name: &'static str,
}

impl ComponentKind {
    pub fn of<C: Component>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: type_name::<C>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ComponentKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentKind {}

pub struct ComponentInstance {
    kind: ComponentKind,
    pub(crate) component: Box<dyn Component>,
    pub(crate) props: Props,
    pub(crate) id: Option<InstanceId>,
    pub(crate) updater: Option<UpdateHandle>,
    pub(crate) is_mounted: bool,
}

impl ComponentInstance {
    pub fn new<C: Component>(component: C, props: Props) -> Self {
        Self {
            kind: ComponentKind::of::<C>(),
            component: Box::new(component),
            props,
            id: None,
            updater: None,
            is_mounted: false,
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub(crate) fn into_ref(self) -> ComponentRef {
        ComponentRef(Rc::new(RefCell::new(self)))
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("kind", &self.kind.name)
            .field("id", &self.id)
            .field("is_mounted", &self.is_mounted)
            .field("props", &self.props)
            .finish()
    }
}

/// Shared handle to a component instance
#[derive(Debug, Clone)]
pub struct ComponentRef(pub(crate) Rc<RefCell<ComponentInstance>>);

impl ComponentRef {
    pub fn kind(&self) -> ComponentKind {
        self.0.borrow().kind
    }

    pub fn id(&self) -> Option<InstanceId> {
        self.0.borrow().id
    }

    pub fn is_mounted(&self) -> bool {
        self.0.borrow().is_mounted
    }

    pub fn props(&self) -> Props {
        self.0.borrow().props.clone()
    }

    pub fn ptr_eq(&self, other: &ComponentRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
