//! KDL rendering of a [`Document`].
//!
//! ```kdl
//! document version=1 {
//!     page "b1f2…" name="Page 1" {
//!         frame "9c0e…" x=0.0 y=0.0 width=400.0 height=300.0 clip=#true {
//!             fill "#FFFFFF"
//!             radius 0.0
//!             rect "41d7…" x=10.0 y=10.0 width=100.0 height=50.0 {
//!                 stroke "#000000" width=1.0
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! Hierarchy is expressed by nesting, so `parent` and `children` never
//! appear as properties.

use crate::{CodecError, Document, NodeMap, NodeRecord, PageRecord};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use node::{Color, NodeKind, Stroke};

impl Document {
    /// Serialize the document to a KDL string.
    ///
    /// Only nodes reachable from a page are written.
    pub fn to_kdl(&self) -> String {
        let mut doc = KdlDocument::new();

        let mut doc_node = KdlNode::new("document");
        doc_node.push(KdlEntry::new_prop("version", i128::from(self.format_version)));

        let pages = doc_node.children_mut().get_or_insert_with(KdlDocument::new);
        for page in &self.pages {
            let mut page_node = KdlNode::new("page");
            page_node.push(KdlEntry::new(page.id.clone()));
            page_node.push(KdlEntry::new_prop("name", page.name.clone()));

            let mut has_children = false;
            let children = page_node.children_mut().get_or_insert_with(KdlDocument::new);
            for child in &page.children {
                if let Some(record) = self.nodes.get(child) {
                    children
                        .nodes_mut()
                        .push(record_to_kdl(child, record, &self.nodes));
                    has_children = true;
                }
            }
            if !has_children {
                *page_node.children_mut() = None;
            }
            pages.nodes_mut().push(page_node);
        }

        doc.nodes_mut().push(doc_node);
        doc.to_string()
    }

    /// Parse a document from a KDL string.
    ///
    /// As with [`Document::from_json`], the graph itself is only checked by
    /// [`Document::into_parts`].
    pub fn from_kdl(input: &str) -> Result<Self, CodecError> {
        let doc: KdlDocument = input
            .parse()
            .map_err(|e| CodecError::Kdl(format!("{}", e)))?;

        let doc_node = doc
            .get("document")
            .ok_or_else(|| CodecError::malformed("missing 'document' node"))?;

        let format_version = doc_node
            .get("version")
            .and_then(KdlValue::as_integer)
            .ok_or_else(|| CodecError::malformed("missing document version"))?;
        let format_version = u32::try_from(format_version)
            .map_err(|_| CodecError::malformed(format!("invalid version {}", format_version)))?;

        let mut pages = Vec::new();
        let mut nodes = NodeMap::new();
        if let Some(children) = doc_node.children() {
            for page_node in children.nodes() {
                if page_node.name().value() != "page" {
                    return Err(CodecError::malformed(format!(
                        "unexpected '{}' node in document",
                        page_node.name().value()
                    )));
                }
                let id = first_argument(page_node)
                    .ok_or_else(|| CodecError::malformed("page is missing its id"))?;
                let name = page_node
                    .get("name")
                    .and_then(KdlValue::as_string)
                    .unwrap_or_default()
                    .to_string();

                let mut page = PageRecord {
                    id: id.to_string(),
                    name,
                    children: Vec::new(),
                };
                if let Some(children) = page_node.children() {
                    for child in children.nodes() {
                        let child_id = parse_record(child, None, &mut nodes)?;
                        page.children.push(child_id);
                    }
                }
                pages.push(page);
            }
        }

        Ok(Self {
            format_version,
            pages,
            nodes,
        })
    }
}

fn kind_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Rectangle => "rect",
        NodeKind::Ellipse => "ellipse",
        NodeKind::Group => "group",
        NodeKind::Frame => "frame",
    }
}

fn kind_from_name(name: &str) -> Option<NodeKind> {
    match name {
        "rect" => Some(NodeKind::Rectangle),
        "ellipse" => Some(NodeKind::Ellipse),
        "group" => Some(NodeKind::Group),
        "frame" => Some(NodeKind::Frame),
        _ => None,
    }
}

/// Convert a record to a KDL node, nesting its children.
fn record_to_kdl(id: &str, record: &NodeRecord, all: &NodeMap) -> KdlNode {
    let mut node = KdlNode::new(kind_name(record.kind));
    node.push(KdlEntry::new(id.to_string()));

    node.push(KdlEntry::new_prop("x", record.x as f64));
    node.push(KdlEntry::new_prop("y", record.y as f64));
    if let Some(width) = record.width {
        node.push(KdlEntry::new_prop("width", width as f64));
    }
    if let Some(height) = record.height {
        node.push(KdlEntry::new_prop("height", height as f64));
    }
    if let Some(name) = &record.name {
        node.push(KdlEntry::new_prop("name", name.clone()));
    }
    if !record.visible {
        node.push(KdlEntry::new_prop("visible", false));
    }
    if record.locked {
        node.push(KdlEntry::new_prop("locked", true));
    }
    if let Some(clip) = record.clip_children {
        node.push(KdlEntry::new_prop("clip", clip));
    }

    let mut has_children = false;
    let children = node.children_mut().get_or_insert_with(KdlDocument::new);

    if let Some(fill) = record.fill {
        let mut fill_node = KdlNode::new("fill");
        fill_node.push(KdlEntry::new(fill.to_string()));
        children.nodes_mut().push(fill_node);
        has_children = true;
    }

    if let Some(stroke) = record.stroke {
        let mut stroke_node = KdlNode::new("stroke");
        stroke_node.push(KdlEntry::new(stroke.color.to_string()));
        stroke_node.push(KdlEntry::new_prop("width", stroke.width as f64));
        children.nodes_mut().push(stroke_node);
        has_children = true;
    }

    if let Some(radius) = record.corner_radius {
        let mut radius_node = KdlNode::new("radius");
        radius_node.push(KdlEntry::new(radius as f64));
        children.nodes_mut().push(radius_node);
        has_children = true;
    }

    for child_id in &record.children {
        if let Some(child) = all.get(child_id) {
            children
                .nodes_mut()
                .push(record_to_kdl(child_id, child, all));
            has_children = true;
        }
    }

    if !has_children {
        *node.children_mut() = None;
    }

    node
}

/// Parse a node and its nested nodes into `nodes`, parent first.
fn parse_record(
    node: &KdlNode,
    parent: Option<&str>,
    nodes: &mut NodeMap,
) -> Result<String, CodecError> {
    let kind = kind_from_name(node.name().value()).ok_or_else(|| {
        CodecError::malformed(format!("unknown node type '{}'", node.name().value()))
    })?;
    let id = first_argument(node)
        .ok_or_else(|| CodecError::malformed(format!("{} is missing its id", node.name().value())))?
        .to_string();

    let mut record = NodeRecord::leaf(
        kind,
        f32_prop(node, "x").unwrap_or(0.0),
        f32_prop(node, "y").unwrap_or(0.0),
    );
    record.width = f32_prop(node, "width");
    record.height = f32_prop(node, "height");
    record.name = node
        .get("name")
        .and_then(KdlValue::as_string)
        .map(str::to_string);
    record.parent = parent.map(str::to_string);
    record.visible = node.get("visible").and_then(KdlValue::as_bool).unwrap_or(true);
    record.locked = node.get("locked").and_then(KdlValue::as_bool).unwrap_or(false);
    record.clip_children = node.get("clip").and_then(KdlValue::as_bool);

    let mut nested = Vec::new();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "fill" => record.fill = Some(color_argument(child)?),
                "stroke" => {
                    let color = color_argument(child)?;
                    let width = f32_prop(child, "width").unwrap_or(1.0);
                    record.stroke = Some(Stroke::new(color, width));
                }
                "radius" => {
                    record.corner_radius = child.entries().first().and_then(|e| as_f32(e.value()));
                }
                _ => nested.push(child),
            }
        }
    }

    // Reserve the parent's slot so document order stays pre-order
    nodes.insert(id.clone(), record);
    let mut child_ids = Vec::with_capacity(nested.len());
    for child in nested {
        child_ids.push(parse_record(child, Some(&id), nodes)?);
    }
    if let Some(record) = nodes.get_mut(&id) {
        record.children = child_ids;
    }

    Ok(id)
}

fn first_argument(node: &KdlNode) -> Option<&str> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
}

fn color_argument(node: &KdlNode) -> Result<Color, CodecError> {
    let value = first_argument(node).ok_or_else(|| {
        CodecError::malformed(format!("{} is missing its color", node.name().value()))
    })?;
    value.parse().map_err(CodecError::malformed)
}

fn as_f32(value: &KdlValue) -> Option<f32> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|v| v as f64))
        .map(|v| v as f32)
}

fn f32_prop(node: &KdlNode, name: &str) -> Option<f32> {
    node.get(name).and_then(as_f32)
}
