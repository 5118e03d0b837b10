//! Canvas configuration: layout spacing and default node sizes.

use crate::error::CanvasError;
use kurbo::Size;
use serde::{Deserialize, Serialize};

// ─── Layout ───────────────────────────────────────────────────────────────

/// Spacing rules for `layout_group`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Padding between a group's border and its children, on every side.
    pub margin: f64,

    /// Horizontal and vertical gap between packed children.
    pub gap: f64,

    /// Smallest size a group may collapse to (also the size of an empty group).
    pub min_group_size: Size,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 20.0,
            gap: 20.0,
            min_group_size: Size::new(120.0, 80.0),
        }
    }
}

// ─── Canvas ───────────────────────────────────────────────────────────────

/// Top-level configuration for a `CanvasStore`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub layout: LayoutConfig,

    /// Size given to content nodes created with `add_node`.
    pub content_size: Size,

    /// Size given to group nodes created with `add_node`.
    pub group_size: Size,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            content_size: Size::new(240.0, 120.0),
            group_size: Size::new(400.0, 300.0),
        }
    }
}

impl CanvasConfig {
    /// Parse a JSON config. Missing fields fall back to their defaults.
    ///
    /// # Errors
    /// Returns `CanvasError::Config` if the input is not valid JSON for this shape.
    pub fn from_json(text: &str) -> Result<Self, CanvasError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_json_yields_defaults() {
        let config = CanvasConfig::from_json("{}").unwrap();
        assert_eq!(config, CanvasConfig::default());
    }

    #[test]
    fn partial_layout_override() {
        let config = CanvasConfig::from_json(r#"{ "layout": { "margin": 8.0 } }"#).unwrap();
        assert_eq!(config.layout.margin, 8.0);
        assert_eq!(config.layout.gap, 20.0);
        assert_eq!(config.content_size, Size::new(240.0, 120.0));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = CanvasConfig::from_json("{ layout: ").unwrap_err();
        assert!(matches!(err, CanvasError::Config(_)));
    }
}
