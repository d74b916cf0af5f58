//! # Sprig VDOM
//!
//! Declarative virtual trees reconciled into a live [`sprig_dom::Document`].
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   render(tree, root)   ┌──────────────┐
//! │ VirtualElement│ ─────────────────────▶ │  Reconciler  │
//! └──────────────┘                        └──────┬───────┘
//!                                                │ per slot
//!        ┌────────────────────┬──────────────────┼──────────────────┐
//!        ▼                    ▼                  ▼                  ▼
//!   lifecycle            patcher            children           fast_list
//!   (components)     (props → DOM)       (positional)         (keyed)
//! ```
//!
//! Components request re-renders through an [`UpdateHandle`]; requests are
//! queued and applied by [`Renderer::flush_updates`].

mod children;
mod component;
mod config;
mod controlled;
mod element;
mod error;
mod fast_list;
mod lifecycle;
mod patcher;
mod props;
mod reconciler;
mod registry;
mod renderer;


#[cfg(test)]
mod tests_fast_list;

#[cfg(test)]
mod tests_components;


pub use component::{Component, ComponentInstance, ComponentKind, ComponentRef};
pub use config::RendererConfig;
pub use element::{
    has_element_changed, VComponent, VEmpty, VFragment, VTag, VText, VirtualElement,
};
pub use error::{RenderError, RenderResult, StructuralViolation};
pub use props::{ElementRef, Key, PropValue, Props};
pub use registry::{InstanceId, UpdateHandle};
pub use renderer::{RenderStats, Renderer};

/// Build a [`Props`] map from `name => value` pairs
#[macro_export]
macro_rules! props {
    () => {
        $crate::Props::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut props = $crate::Props::new();
        $(props.insert(::std::string::String::from($name), $crate::PropValue::from($value));)+
        props
    }};
}
