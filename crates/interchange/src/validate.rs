//! Structural validation of decoded documents.

use crate::{CodecError, Document, FORMAT_VERSION};
use node::{Node, NodeId, Page, PageId};
use std::collections::{HashMap, HashSet};

/// Validated pages and nodes, ready to replace a live store.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentParts {
    pub pages: Vec<Page>,
    /// Nodes in document order.
    pub nodes: Vec<Node>,
}

impl Document {
    /// Validate the document and convert it into live pages and nodes.
    ///
    /// Fails with [`CodecError::UnsupportedVersion`] for a newer format and
    /// with [`CodecError::Malformed`] when an id does not parse, a referenced
    /// node is missing, parent and child lists disagree, a node is listed
    /// twice, or a node cannot be reached from exactly one page.
    pub fn into_parts(self) -> Result<DocumentParts, CodecError> {
        if self.format_version > FORMAT_VERSION {
            return Err(CodecError::UnsupportedVersion {
                found: self.format_version,
                supported: FORMAT_VERSION,
            });
        }
        if self.format_version == 0 {
            return Err(CodecError::malformed("format version 0 is not valid"));
        }
        if self.pages.is_empty() {
            return Err(CodecError::malformed("document has no pages"));
        }

        let mut ids: HashMap<&str, NodeId> = HashMap::with_capacity(self.nodes.len());
        for key in self.nodes.keys() {
            let id: NodeId = key
                .parse()
                .map_err(|_| CodecError::malformed(format!("invalid node id {:?}", key)))?;
            if ids.insert(key, id).is_some() {
                return Err(CodecError::malformed(format!("duplicate node id {}", key)));
            }
        }
        let resolve = |reference: &str, owner: &str| -> Result<NodeId, CodecError> {
            ids.get(reference).copied().ok_or_else(|| {
                CodecError::malformed(format!("{} references missing node {}", owner, reference))
            })
        };

        // Child -> the container that lists it.
        let mut claimed: HashMap<NodeId, NodeId> = HashMap::new();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (key, record) in self.nodes.iter() {
            let id = ids[key];
            let parent = record
                .parent
                .as_deref()
                .map(|parent| resolve(parent, key))
                .transpose()?;
            let children = record
                .children
                .iter()
                .map(|child| resolve(child, key))
                .collect::<Result<Vec<_>, _>>()?;
            for child in &children {
                if claimed.insert(*child, id).is_some() {
                    return Err(CodecError::malformed(format!(
                        "node {} is listed as a child more than once",
                        child
                    )));
                }
            }
            nodes.push(record.to_node(id, parent, children)?);
        }

        for node in &nodes {
            match (node.parent, claimed.get(&node.id)) {
                (Some(parent), Some(owner)) if parent == *owner => {}
                (Some(parent), _) => {
                    return Err(CodecError::malformed(format!(
                        "node {} names parent {} which does not list it",
                        node.id, parent
                    )))
                }
                (None, Some(owner)) => {
                    return Err(CodecError::malformed(format!(
                        "node {} is a child of {} but has no parent",
                        node.id, owner
                    )))
                }
                (None, None) => {}
            }
        }

        let parents: HashMap<NodeId, Option<NodeId>> =
            nodes.iter().map(|node| (node.id, node.parent)).collect();
        let mut page_ids: HashSet<PageId> = HashSet::new();
        let mut on_page: HashSet<NodeId> = HashSet::new();
        let mut pages = Vec::with_capacity(self.pages.len());
        for record in &self.pages {
            let id: PageId = record
                .id
                .parse()
                .map_err(|_| CodecError::malformed(format!("invalid page id {:?}", record.id)))?;
            if !page_ids.insert(id) {
                return Err(CodecError::malformed(format!("duplicate page id {}", id)));
            }
            let owner = format!("page {}", record.id);
            let mut children = Vec::with_capacity(record.children.len());
            for child in &record.children {
                let child = resolve(child, &owner)?;
                if parents.get(&child).copied().flatten().is_some() {
                    return Err(CodecError::malformed(format!(
                        "{} lists node {} which has a parent",
                        owner, child
                    )));
                }
                if !on_page.insert(child) {
                    return Err(CodecError::malformed(format!(
                        "node {} is listed on more than one page",
                        child
                    )));
                }
                children.push(child);
            }
            pages.push(Page {
                id,
                name: record.name.clone(),
                children,
            });
        }

        for node in nodes.iter().filter(|node| node.parent.is_none()) {
            if !on_page.contains(&node.id) {
                return Err(CodecError::malformed(format!(
                    "top-level node {} is not on any page",
                    node.id
                )));
            }
        }

        // Every node must be reached exactly once walking down from the pages.
        // Parent/child agreement above makes any cycle unreachable.
        let children_of: HashMap<NodeId, &[NodeId]> = nodes
            .iter()
            .map(|node| (node.id, node.children()))
            .collect();
        let mut visited: HashSet<NodeId> = HashSet::with_capacity(nodes.len());
        let mut stack: Vec<NodeId> = pages
            .iter()
            .flat_map(|page| page.children.iter().copied())
            .collect();
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                return Err(CodecError::malformed(format!(
                    "node {} is reachable more than once",
                    id
                )));
            }
            if let Some(children) = children_of.get(&id) {
                stack.extend(children.iter().copied());
            }
        }
        if visited.len() != nodes.len() {
            return Err(CodecError::malformed(format!(
                "{} node(s) are not reachable from any page",
                nodes.len() - visited.len()
            )));
        }

        Ok(DocumentParts { pages, nodes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeRecord, PageRecord};
    use node::NodeKind;

    fn id(n: u128) -> String {
        NodeId::from_u128(n).to_string()
    }

    fn page(children: &[u128]) -> PageRecord {
        PageRecord {
            id: PageId::from_u128(1000).to_string(),
            name: "Page 1".into(),
            children: children.iter().map(|n| id(*n)).collect(),
        }
    }

    fn group_with(children: &[u128]) -> NodeRecord {
        let mut record = NodeRecord::leaf(NodeKind::Group, 0.0, 0.0);
        record.children = children.iter().map(|n| id(*n)).collect();
        record
    }

    fn child_of(parent: u128) -> NodeRecord {
        let mut record = NodeRecord::leaf(NodeKind::Rectangle, 0.0, 0.0);
        record.parent = Some(id(parent));
        record
    }

    fn doc(pages: Vec<PageRecord>, nodes: Vec<(u128, NodeRecord)>) -> Document {
        Document {
            format_version: FORMAT_VERSION,
            pages,
            nodes: nodes.into_iter().map(|(n, r)| (id(n), r)).collect(),
        }
    }

    fn assert_malformed(document: Document, needle: &str) {
        match document.into_parts() {
            Err(CodecError::Malformed(message)) => {
                assert!(message.contains(needle), "unexpected message: {}", message)
            }
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn valid_group_decodes() {
        let parts = doc(vec![page(&[1])], vec![(1, group_with(&[2])), (2, child_of(1))])
            .into_parts()
            .unwrap();
        assert_eq!(parts.nodes.len(), 2);
        assert_eq!(parts.nodes[0].children(), &[NodeId::from_u128(2)]);
        assert_eq!(parts.nodes[1].parent, Some(NodeId::from_u128(1)));
    }

    #[test]
    fn missing_child_is_malformed() {
        assert_malformed(doc(vec![page(&[1])], vec![(1, group_with(&[2]))]), "missing node");
    }

    #[test]
    fn missing_page_child_is_malformed() {
        assert_malformed(doc(vec![page(&[7])], vec![]), "missing node");
    }

    #[test]
    fn parent_disagreement_is_malformed() {
        assert_malformed(
            doc(
                vec![page(&[1, 2])],
                vec![(1, group_with(&[])), (2, child_of(1))],
            ),
            "does not list it",
        );
    }

    #[test]
    fn cycle_is_malformed() {
        let mut a = group_with(&[2]);
        a.parent = Some(id(2));
        let mut b = group_with(&[1]);
        b.parent = Some(id(1));
        assert_malformed(doc(vec![page(&[])], vec![(1, a), (2, b)]), "not reachable");
    }

    #[test]
    fn orphan_is_malformed() {
        assert_malformed(
            doc(
                vec![page(&[])],
                vec![(1, NodeRecord::leaf(NodeKind::Ellipse, 0.0, 0.0))],
            ),
            "not on any page",
        );
    }

    #[test]
    fn shared_child_is_malformed() {
        assert_malformed(
            doc(
                vec![page(&[1, 2])],
                vec![(1, group_with(&[3])), (2, group_with(&[3])), (3, child_of(1))],
            ),
            "more than once",
        );
    }

    #[test]
    fn node_on_two_pages_is_malformed() {
        let mut second = page(&[1]);
        second.id = PageId::from_u128(2000).to_string();
        assert_malformed(
            doc(
                vec![page(&[1]), second],
                vec![(1, NodeRecord::leaf(NodeKind::Ellipse, 0.0, 0.0))],
            ),
            "more than one page",
        );
    }

    #[test]
    fn bad_id_is_malformed() {
        let document = Document {
            format_version: FORMAT_VERSION,
            pages: vec![page(&[])],
            nodes: vec![("abc".to_string(), NodeRecord::leaf(NodeKind::Ellipse, 0.0, 0.0))]
                .into_iter()
                .collect(),
        };
        assert_malformed(document, "invalid node id");
    }

    #[test]
    fn non_canonical_ids_are_malformed() {
        let upper_simple = id(1).replace('-', "").to_uppercase();
        let mut first = page(&[]);
        first.children = vec![upper_simple.clone()];
        let document = Document {
            format_version: FORMAT_VERSION,
            pages: vec![first],
            nodes: vec![(upper_simple, NodeRecord::leaf(NodeKind::Ellipse, 0.0, 0.0))]
                .into_iter()
                .collect(),
        };
        assert_malformed(document, "invalid node id");

        let mut braced = page(&[]);
        braced.id = format!("{{{}}}", PageId::from_u128(1000));
        assert_malformed(doc(vec![braced], vec![]), "invalid page id");
    }

    #[test]
    fn no_pages_is_malformed() {
        assert_malformed(doc(vec![], vec![]), "no pages");
    }
}
