//! Component lifecycle: mount, re-render, unmount

use crate::component::{ComponentInstance, ComponentRef};
use crate::element::VirtualElement;
use crate::props::Props;
use crate::registry::{InstanceId, InstanceRegistry};
use tracing::debug;

/// Outcome of offering new props to a mounted instance
#[derive(Debug)]
pub(crate) enum Rendered {
    /// Props did not warrant a re-render; the previous output stands
    Unchanged,
    Fresh(VirtualElement),
}

fn render_now(instance: &mut ComponentInstance) -> VirtualElement {
    let ComponentInstance {
        component,
        props,
        updater,
        ..
    } = instance;
    match updater {
        Some(updater) => component.render(props, updater),
        None => VirtualElement::empty(),
    }
}

/// Give the instance an id and update handle, then render it for the first time
pub(crate) fn mount(instance: &ComponentRef, registry: &mut InstanceRegistry) -> VirtualElement {
    let (id, updater) = registry.allocate();
    let mut inner = instance.0.borrow_mut();
    inner.id = Some(id);
    inner.updater = Some(updater);
    let output = render_now(&mut inner);
    inner.is_mounted = true;
    debug!(instance = %id, component = inner.kind().name(), "component mounted");
    output
}

/// Hand new props from a parent re-render to a mounted instance
pub(crate) fn update(instance: &ComponentRef, props: Props) -> Rendered {
    let mut inner = instance.0.borrow_mut();
    let should_update = inner.component.should_update(&inner.props, &props);
    inner.props = props;
    if !should_update {
        return Rendered::Unchanged;
    }
    Rendered::Fresh(render_now(&mut inner))
}

/// Re-render with current props, as requested through the update handle
pub(crate) fn force_render(instance: &ComponentRef) -> VirtualElement {
    render_now(&mut instance.0.borrow_mut())
}

pub(crate) fn notify_mounted(instance: &ComponentRef) {
    let mut inner = instance.0.borrow_mut();
    if !inner.is_mounted {
        return;
    }
    let ComponentInstance {
        component, updater, ..
    } = &mut *inner;
    if let Some(updater) = updater {
        component.mounted(updater);
    }
}

/// Run the unmount hook and mark the instance dead; returns its id if it was mounted
pub(crate) fn unmount(instance: &ComponentRef) -> Option<InstanceId> {
    let mut inner = instance.0.borrow_mut();
    if !inner.is_mounted {
        return None;
    }
    inner.component.unmounted();
    inner.is_mounted = false;
    debug!(instance = ?inner.id, component = inner.kind().name(), "component unmounted");
    inner.id
}
