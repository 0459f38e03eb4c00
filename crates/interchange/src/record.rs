use crate::{CodecError, DEFAULT_SIZE};
use node::{CanvasPoint, CanvasSize, Color, Node, NodeData, NodeId, NodeKind, Page, Stroke};
use serde::{Deserialize, Serialize};

/// Serialized form of a page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Top-level node ids in z-order.
    #[serde(default)]
    pub children: Vec<String>,
}

impl PageRecord {
    pub fn from_page(page: &Page) -> Self {
        Self {
            id: page.id.to_string(),
            name: page.name.clone(),
            children: page.children.iter().map(|id| id.to_string()).collect(),
        }
    }
}

/// Serialized form of a node.
///
/// Carries every field of every kind as optional; a record only sets the
/// ones its `type` owns. Fields present on a kind that does not own them
/// are ignored when decoding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    #[serde(default = "default_visible", skip_serializing_if = "is_true")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_children: Option<bool>,
}

fn default_visible() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl NodeRecord {
    /// A bare record with no size, hierarchy or style.
    pub fn leaf(kind: NodeKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            name: None,
            x,
            y,
            width: None,
            height: None,
            parent: None,
            children: Vec::new(),
            visible: true,
            locked: false,
            fill: None,
            stroke: None,
            corner_radius: None,
            clip_children: None,
        }
    }

    pub fn from_node(node: &Node) -> Self {
        Self {
            kind: node.kind(),
            name: node.name.clone(),
            x: node.position.x(),
            y: node.position.y(),
            width: Some(node.size.width()),
            height: Some(node.size.height()),
            parent: node.parent.map(|id| id.to_string()),
            children: node.children().iter().map(|id| id.to_string()).collect(),
            visible: node.visible,
            locked: node.locked,
            fill: node.fill(),
            stroke: node.stroke(),
            corner_radius: node.corner_radius(),
            clip_children: node.clip_children(),
        }
    }

    /// Rebuild a node from this record with already-resolved hierarchy.
    pub(crate) fn to_node(
        &self,
        id: NodeId,
        parent: Option<NodeId>,
        children: Vec<NodeId>,
    ) -> Result<Node, CodecError> {
        if !self.kind.is_container() && !children.is_empty() {
            return Err(CodecError::malformed(format!(
                "node {} of type {} cannot have children",
                id, self.kind
            )));
        }

        let data = match self.kind {
            NodeKind::Rectangle => NodeData::Rectangle {
                fill: self.fill,
                stroke: self.stroke,
                corner_radius: self.corner_radius.unwrap_or(0.0),
            },
            NodeKind::Ellipse => NodeData::Ellipse {
                fill: self.fill,
                stroke: self.stroke,
            },
            NodeKind::Group => NodeData::Group { children },
            NodeKind::Frame => NodeData::Frame {
                children,
                fill: self.fill,
                stroke: self.stroke,
                corner_radius: self.corner_radius.unwrap_or(0.0),
                clip_children: self.clip_children.unwrap_or(true),
            },
        };

        Ok(Node {
            id,
            name: self.name.clone(),
            position: CanvasPoint::new(self.x, self.y),
            size: CanvasSize::new(
                self.width.unwrap_or(DEFAULT_SIZE),
                self.height.unwrap_or(DEFAULT_SIZE),
            ),
            parent,
            visible: self.visible,
            locked: self.locked,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn record_captures_kind_specific_fields() {
        let rect = Node::rectangle(Vec2::ZERO, Vec2::new(40.0, 40.0)).with_corner_radius(6.0);
        let record = NodeRecord::from_node(&rect);
        assert_eq!(record.corner_radius, Some(6.0));
        assert_eq!(record.clip_children, None);

        let group = Node::group(Vec2::ZERO, Vec2::splat(10.0));
        let record = NodeRecord::from_node(&group);
        assert_eq!(record.fill, None);
        assert_eq!(record.stroke, None);
        assert_eq!(record.corner_radius, None);
    }

    #[test]
    fn missing_size_falls_back_to_default() {
        let record: NodeRecord =
            serde_json::from_str(r#"{"type": "ELLIPSE", "x": 1, "y": 2}"#).unwrap();
        let node = record.to_node(NodeId::new(), None, Vec::new()).unwrap();
        assert_eq!(node.size, CanvasSize::new(DEFAULT_SIZE, DEFAULT_SIZE));
        assert!(node.visible);
        assert!(!node.locked);
    }

    #[test]
    fn leaf_with_children_is_malformed() {
        let record = NodeRecord::leaf(NodeKind::Rectangle, 0.0, 0.0);
        let err = record
            .to_node(NodeId::new(), None, vec![NodeId::new()])
            .unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
    }

    #[test]
    fn unknown_type_fails_to_parse() {
        let result = serde_json::from_str::<NodeRecord>(r#"{"type": "TRIANGLE", "x": 0, "y": 0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn hidden_and_locked_flags_serialize_only_when_set() {
        let mut node = Node::ellipse(Vec2::ZERO, Vec2::splat(10.0));
        let json = serde_json::to_value(NodeRecord::from_node(&node)).unwrap();
        assert!(json.get("visible").is_none());
        assert!(json.get("locked").is_none());

        node.visible = false;
        node.locked = true;
        let json = serde_json::to_value(NodeRecord::from_node(&node)).unwrap();
        assert_eq!(json["visible"], false);
        assert_eq!(json["locked"], true);
    }
}
