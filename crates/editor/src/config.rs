use glam::Vec2;
use node::{CanvasDelta, CanvasSize};
use serde::{Deserialize, Serialize};

/// Editor session settings.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo (and redo) entries kept. Oldest are dropped.
    pub max_history: usize,
    /// Size of shapes created without an explicit size.
    pub default_size: CanvasSize,
    /// Offset applied to duplicated nodes.
    pub duplicate_offset: CanvasDelta,
    /// Name of the page a new document starts with.
    pub default_page_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: 100,
            default_size: CanvasSize(Vec2::splat(100.0)),
            duplicate_offset: CanvasDelta(Vec2::splat(20.0)),
            default_page_name: "Page 1".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}
