//! Partial node updates.
//!
//! A [`NodePatch`] names the fields to change; everything left as `None` is
//! kept. Fields that the target node's kind does not carry are skipped and
//! reported back so callers can log them, but they are never an error.

use crate::coords::{CanvasPoint, CanvasSize};
use crate::style::{Color, Stroke};
use crate::Node;
use serde::{Deserialize, Deserializer, Serialize};

/// A partial update to a node.
///
/// Style fields use a double option: absent leaves the value alone,
/// `null` clears it, and a value replaces it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub fill: Option<Option<Color>>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub stroke: Option<Option<Stroke>>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "corner_radius")]
    pub corner_radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "clip_children")]
    pub clip_children: Option<bool>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, position: CanvasPoint) -> Self {
        self.x = Some(position.x());
        self.y = Some(position.y());
        self
    }

    pub fn size(mut self, size: CanvasSize) -> Self {
        self.width = Some(size.width());
        self.height = Some(size.height());
        self
    }

    pub fn fill(mut self, fill: Option<Color>) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn stroke(mut self, stroke: Option<Stroke>) -> Self {
        self.stroke = Some(stroke);
        self
    }

    pub fn corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = Some(radius);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(Some(name.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Node {
    /// Apply the fields of `patch` that are valid for this node's kind.
    ///
    /// Returns the names of the fields that were ignored.
    pub fn apply_patch(&mut self, patch: &NodePatch) -> Vec<&'static str> {
        let mut ignored = Vec::new();

        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(x) = patch.x {
            self.position.0.x = x;
        }
        if let Some(y) = patch.y {
            self.position.0.y = y;
        }
        if let Some(width) = patch.width {
            self.size.0.x = width;
        }
        if let Some(height) = patch.height {
            self.size.0.y = height;
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }

        if let Some(fill) = patch.fill {
            match self.fill_mut() {
                Some(slot) => *slot = fill,
                None => ignored.push("fill"),
            }
        }
        if let Some(stroke) = patch.stroke {
            match self.stroke_mut() {
                Some(slot) => *slot = stroke,
                None => ignored.push("stroke"),
            }
        }
        if let Some(radius) = patch.corner_radius {
            // Clamp to max valid radius
            let max_radius = (self.size.width().min(self.size.height()) / 2.0).max(0.0);
            match self.corner_radius_mut() {
                Some(slot) => *slot = radius.clamp(0.0, max_radius),
                None => ignored.push("cornerRadius"),
            }
        }
        if let Some(clip) = patch.clip_children {
            match self.clip_children_mut() {
                Some(slot) => *slot = clip,
                None => ignored.push("clipChildren"),
            }
        }

        ignored
    }
}
