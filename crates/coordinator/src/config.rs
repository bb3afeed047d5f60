//! Coordinator configuration.
//!
//! Stored as TOML:
//!
//! ```toml
//! [filters]
//! status = "open"
//!
//! [routes]
//! conversation = ["conversation_through_inbox"]
//! conversation_base = ["home"]
//! inbox_view = ["inbox_view_conversation"]
//! inbox_view_base = ["inbox_view"]
//! notification = ["notifications_index"]
//! ```
//!
//! The reload threshold is fixed and deliberately absent here.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::navigation::RouteTable;
use crate::types::Filters;

/// Coordinator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Base filter context for list refetches.
    #[serde(default)]
    pub filters: Filters,

    /// Route names per view.
    #[serde(default)]
    pub routes: RouteTable,
}

impl CoordinatorConfig {
    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
