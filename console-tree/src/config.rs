//! Tree view configuration.
//!
//! Controls which gestures a [`TreeView`](crate::TreeView) accepts and how
//! checkboxes behave. Configuration can be built in code or loaded from
//! environment variables with defaults matching a read-only picker.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Expand depth value meaning "expand every level".
pub const EXPAND_ALL: usize = usize::MAX;

/// Behavior switches for a tree view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeConfig {
    /// Render checkboxes and accept check gestures.
    pub checkable: bool,

    /// Accept drag-and-drop gestures.
    pub draggable: bool,

    /// Check nodes independently instead of cascading.
    pub check_strictly: bool,

    /// Levels expanded initially (0 = collapsed, [`EXPAND_ALL`] = all).
    pub default_expand_depth: usize,
}

impl Default for TreeConfig {
    /// Returns a plain, collapsed, read-only tree.
    fn default() -> Self {
        Self {
            checkable: false,
            draggable: false,
            check_strictly: false,
            default_expand_depth: 0,
        }
    }
}

impl TreeConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TREE_CHECKABLE`: Render checkboxes (default: false)
    /// - `TREE_DRAGGABLE`: Allow drag-and-drop (default: false)
    /// - `TREE_CHECK_STRICTLY`: Independent checkboxes (default: false)
    /// - `TREE_EXPAND_DEPTH`: Initially expanded levels, or `all` (default: 0)
    ///
    /// Flags accept `true`/`false`/`1`/`0`. Unparseable values are logged
    /// and the default is kept.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            checkable: env_flag("TREE_CHECKABLE").unwrap_or(default.checkable),
            draggable: env_flag("TREE_DRAGGABLE").unwrap_or(default.draggable),
            check_strictly: env_flag("TREE_CHECK_STRICTLY").unwrap_or(default.check_strictly),
            default_expand_depth: std::env::var("TREE_EXPAND_DEPTH")
                .ok()
                .and_then(|s| parse_expand_depth(&s))
                .unwrap_or(default.default_expand_depth),
        }
    }

    /// A checkable tree with cascading checkboxes.
    pub fn checkable() -> Self {
        Self {
            checkable: true,
            ..Self::default()
        }
    }

    /// Enable drag-and-drop.
    pub fn with_draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    /// Switch checkboxes to strict mode.
    pub fn with_check_strictly(mut self, check_strictly: bool) -> Self {
        self.check_strictly = check_strictly;
        self
    }

    /// Set the initially expanded depth.
    pub fn with_expand_depth(mut self, depth: usize) -> Self {
        self.default_expand_depth = depth;
        self
    }

    /// Validate that the switches are consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.check_strictly && !self.checkable {
            return Err(ConfigError::InvalidValue {
                key: "check_strictly".to_string(),
                message: "requires checkable".to_string(),
            });
        }
        Ok(())
    }
}

fn env_flag(key: &str) -> Option<bool> {
    let value = std::env::var(key).ok()?;
    match parse_flag(key, &value) {
        Ok(flag) => Some(flag),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring tree configuration flag");
            None
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected true, false, 1 or 0, got {value:?}"),
        }),
    }
}

fn parse_expand_depth(value: &str) -> Option<usize> {
    if value.eq_ignore_ascii_case("all") {
        Some(EXPAND_ALL)
    } else {
        value.parse().ok()
    }
}
