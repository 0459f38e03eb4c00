use crate::coords::{Bounds, CanvasDelta, CanvasPoint, CanvasSize};
use crate::style::{Color, Stroke};
use crate::NodeId;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// The kind of a node.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Rectangle,
    Ellipse,
    Group,
    Frame,
}

impl NodeKind {
    /// Whether nodes of this kind own an ordered list of children.
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Group | NodeKind::Frame)
    }
}

/// Kind-specific node data.
///
/// Each variant carries only the fields that make sense for its kind, so a
/// group can never hold a fill and an ellipse can never hold children.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    Rectangle {
        fill: Option<Color>,
        stroke: Option<Stroke>,
        corner_radius: f32,
    },
    Ellipse {
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Group {
        children: Vec<NodeId>,
    },
    Frame {
        children: Vec<NodeId>,
        fill: Option<Color>,
        stroke: Option<Stroke>,
        corner_radius: f32,
        clip_children: bool,
    },
}

impl NodeData {
    /// Default data for a freshly created node of `kind`.
    pub fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Rectangle => NodeData::Rectangle {
                fill: None,
                stroke: Some(Stroke::default()),
                corner_radius: 0.0,
            },
            NodeKind::Ellipse => NodeData::Ellipse {
                fill: None,
                stroke: Some(Stroke::default()),
            },
            NodeKind::Group => NodeData::Group {
                children: Vec::new(),
            },
            // Frames clip by default
            NodeKind::Frame => NodeData::Frame {
                children: Vec::new(),
                fill: Some(Color::WHITE),
                stroke: None,
                corner_radius: 0.0,
                clip_children: true,
            },
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Rectangle { .. } => NodeKind::Rectangle,
            NodeData::Ellipse { .. } => NodeKind::Ellipse,
            NodeData::Group { .. } => NodeKind::Group,
            NodeData::Frame { .. } => NodeKind::Frame,
        }
    }
}

/// A node in the scene graph.
///
/// Geometry is absolute canvas space for every node, including children of
/// groups and frames. Hierarchy is stored twice: `parent` on the child and
/// `children` on the container, and the store keeps the two in agreement.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: Option<String>,
    pub position: CanvasPoint,
    pub size: CanvasSize,
    /// Parent container (None for top-level nodes on a page)
    pub parent: Option<NodeId>,
    pub visible: bool,
    pub locked: bool,
    pub data: NodeData,
}

impl Node {
    pub fn new(kind: NodeKind, position: CanvasPoint, size: CanvasSize) -> Self {
        Self {
            id: NodeId::new(),
            name: None,
            position,
            size,
            parent: None,
            visible: true,
            locked: false,
            data: NodeData::for_kind(kind),
        }
    }

    pub fn rectangle(position: Vec2, size: Vec2) -> Self {
        Self::new(NodeKind::Rectangle, CanvasPoint(position), CanvasSize(size))
    }

    pub fn ellipse(position: Vec2, size: Vec2) -> Self {
        Self::new(NodeKind::Ellipse, CanvasPoint(position), CanvasSize(size))
    }

    pub fn group(position: Vec2, size: Vec2) -> Self {
        Self::new(NodeKind::Group, CanvasPoint(position), CanvasSize(size))
    }

    pub fn frame(position: Vec2, size: Vec2) -> Self {
        Self::new(NodeKind::Frame, CanvasPoint(position), CanvasSize(size))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the fill. Has no effect on groups.
    pub fn with_fill(mut self, color: Color) -> Self {
        if let Some(fill) = self.fill_mut() {
            *fill = Some(color);
        }
        self
    }

    /// Set the stroke. Has no effect on groups.
    pub fn with_stroke(mut self, color: Color, width: f32) -> Self {
        if let Some(stroke) = self.stroke_mut() {
            *stroke = Some(Stroke::new(color, width));
        }
        self
    }

    /// Set the corner radius. Only rectangles and frames have one.
    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        if let Some(corner_radius) = self.corner_radius_mut() {
            *corner_radius = radius;
        }
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn is_container(&self) -> bool {
        self.kind().is_container()
    }

    /// Ordered child ids. Empty for leaf kinds.
    pub fn children(&self) -> &[NodeId] {
        match &self.data {
            NodeData::Group { children } | NodeData::Frame { children, .. } => children.as_slice(),
            NodeData::Rectangle { .. } | NodeData::Ellipse { .. } => &[],
        }
    }

    /// Mutable child list, `None` for leaf kinds.
    pub fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.data {
            NodeData::Group { children } | NodeData::Frame { children, .. } => Some(children),
            NodeData::Rectangle { .. } | NodeData::Ellipse { .. } => None,
        }
    }

    pub fn fill(&self) -> Option<Color> {
        match &self.data {
            NodeData::Rectangle { fill, .. }
            | NodeData::Ellipse { fill, .. }
            | NodeData::Frame { fill, .. } => *fill,
            NodeData::Group { .. } => None,
        }
    }

    pub fn stroke(&self) -> Option<Stroke> {
        match &self.data {
            NodeData::Rectangle { stroke, .. }
            | NodeData::Ellipse { stroke, .. }
            | NodeData::Frame { stroke, .. } => *stroke,
            NodeData::Group { .. } => None,
        }
    }

    pub fn corner_radius(&self) -> Option<f32> {
        match &self.data {
            NodeData::Rectangle { corner_radius, .. } | NodeData::Frame { corner_radius, .. } => {
                Some(*corner_radius)
            }
            NodeData::Ellipse { .. } | NodeData::Group { .. } => None,
        }
    }

    pub fn clip_children(&self) -> Option<bool> {
        match &self.data {
            NodeData::Frame { clip_children, .. } => Some(*clip_children),
            _ => None,
        }
    }

    pub(crate) fn fill_mut(&mut self) -> Option<&mut Option<Color>> {
        match &mut self.data {
            NodeData::Rectangle { fill, .. }
            | NodeData::Ellipse { fill, .. }
            | NodeData::Frame { fill, .. } => Some(fill),
            NodeData::Group { .. } => None,
        }
    }

    pub(crate) fn stroke_mut(&mut self) -> Option<&mut Option<Stroke>> {
        match &mut self.data {
            NodeData::Rectangle { stroke, .. }
            | NodeData::Ellipse { stroke, .. }
            | NodeData::Frame { stroke, .. } => Some(stroke),
            NodeData::Group { .. } => None,
        }
    }

    pub(crate) fn corner_radius_mut(&mut self) -> Option<&mut f32> {
        match &mut self.data {
            NodeData::Rectangle { corner_radius, .. } | NodeData::Frame { corner_radius, .. } => {
                Some(corner_radius)
            }
            NodeData::Ellipse { .. } | NodeData::Group { .. } => None,
        }
    }

    pub(crate) fn clip_children_mut(&mut self) -> Option<&mut bool> {
        match &mut self.data {
            NodeData::Frame { clip_children, .. } => Some(clip_children),
            _ => None,
        }
    }

    /// Bounding box in canvas space.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_origin_size(self.position, self.size)
    }

    /// Check if a point is inside this node's bounding box.
    pub fn contains_point(&self, point: CanvasPoint) -> bool {
        self.bounds().contains_point(point)
    }

    /// Move the node by a delta. Children are moved by the store.
    pub fn translate(&mut self, delta: CanvasDelta) {
        self.position += delta;
    }
}
