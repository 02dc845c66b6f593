//! Codec configuration

use serde::{Deserialize, Serialize};

/// Default nesting limit for decoded input
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Limits applied to every reader a registry constructs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireConfig {
    /// Maximum container nesting (objects and arrays, wrappers included)
    pub max_depth: usize,
}

impl Default for WireConfig {
    fn default() -> Self {
        WireConfig {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl WireConfig {
    /// Set the nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
