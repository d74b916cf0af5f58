//! Renderer configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RendererConfig {
    /// Verify key uniqueness, element relocation and fast-list content
    pub debug_checks: bool,

    /// Keep `value`/`checked` of form controls pinned to their props
    pub controlled_inputs: bool,

    /// Report the retained virtual tree size after each pass
    pub measure_tree_size: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            debug_checks: cfg!(debug_assertions),
            controlled_inputs: true,
            measure_tree_size: false,
        }
    }
}

impl RendererConfig {
    /// Configuration for production use: no structural checks
    pub fn release() -> Self {
        Self {
            debug_checks: false,
            ..Self::default()
        }
    }

    pub fn with_debug_checks(mut self, enabled: bool) -> Self {
        self.debug_checks = enabled;
        self
    }

    pub fn with_controlled_inputs(mut self, enabled: bool) -> Self {
        self.controlled_inputs = enabled;
        self
    }

    pub fn with_tree_size(mut self, enabled: bool) -> Self {
        self.measure_tree_size = enabled;
        self
    }
}
