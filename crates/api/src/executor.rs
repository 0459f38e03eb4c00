//! Command and query execution against an Editor.
//!
//! This module connects the abstract Command/Query types to the actual
//! Editor implementation, executing operations and returning results.

use crate::{Command, CommandResult, NodeInfo, PageInfo, Query, QueryResult, ShapeQuery, Target};
use editor::{Editor, EditorError};
use glam::Vec2;
use node::{CanvasDelta, CanvasSize, NodeId, NodeKind, NodePatch};
use std::collections::HashSet;
use tracing::debug;

/// Execute a command against an editor.
pub fn execute_command(editor: &mut Editor, command: Command) -> CommandResult {
    match command {
        Command::CreateShape {
            kind,
            position,
            size,
            name,
            fill,
            stroke,
            corner_radius,
        } => {
            let id = editor.create_shape(kind, position.x, position.y, size.map(CanvasSize));

            let mut patch = NodePatch::new();
            if let Some(name) = name {
                patch = patch.name(name);
            }
            if fill.is_some() {
                patch = patch.fill(fill);
            }
            if stroke.is_some() {
                patch = patch.stroke(stroke);
            }
            if let Some(radius) = corner_radius {
                patch = patch.corner_radius(radius);
            }
            if !patch.is_empty() {
                if let Err(e) = editor.update_node(id, &patch) {
                    return CommandResult::error(e.to_string());
                }
            }
            CommandResult::created(vec![id])
        }

        Command::UpdateNode { target, patch } => {
            let ids = resolve_target(editor, &target);
            if let Some(missing) = ids.iter().find(|id| !editor.store().contains(**id)) {
                return CommandResult::error(EditorError::NotFound(*missing).to_string());
            }
            let mut modified = Vec::new();
            for id in ids {
                if let Err(e) = editor.update_node(id, &patch) {
                    return CommandResult::error(e.to_string());
                }
                modified.push(id);
            }
            CommandResult::modified(modified)
        }

        Command::Delete { target } => {
            let ids = resolve_target(editor, &target);
            CommandResult::deleted(editor.delete_nodes(&ids))
        }

        Command::Select {
            target,
            add_to_selection,
        } => {
            let ids = resolve_target(editor, &target);
            match editor.select(&ids, add_to_selection) {
                Ok(()) => CommandResult::success(),
                Err(e) => CommandResult::error(e.to_string()),
            }
        }

        Command::ClearSelection => {
            editor.clear_selection();
            CommandResult::success()
        }

        Command::SelectAll => {
            editor.select_all();
            CommandResult::success()
        }

        Command::Move { target, delta } => {
            let ids = resolve_target(editor, &target);
            match editor.translate_nodes(&ids, CanvasDelta(delta)) {
                Ok(moved) => CommandResult::modified(moved),
                Err(e) => CommandResult::error(e.to_string()),
            }
        }

        Command::Group { target } => {
            let ids = resolve_target(editor, &target);
            match editor.group_nodes(&ids) {
                Ok(group) => CommandResult::Success {
                    created: vec![group],
                    modified: ids,
                    deleted: vec![],
                },
                Err(e) => CommandResult::error(e.to_string()),
            }
        }

        Command::Ungroup { target } => {
            let mut ids = resolve_target(editor, &target);
            let mut seen = HashSet::new();
            ids.retain(|id| seen.insert(*id));
            if let Err(e) = check_groups(editor, &ids) {
                return CommandResult::error(e.to_string());
            }
            let mut released = Vec::new();
            for id in &ids {
                match editor.ungroup_nodes(*id) {
                    Ok(children) => released.extend(children),
                    Err(e) => return CommandResult::error(e.to_string()),
                }
            }
            CommandResult::Success {
                created: vec![],
                modified: released,
                deleted: ids,
            }
        }

        Command::Reparent { id, parent, index } => match editor.reparent(id, parent, index) {
            Ok(()) => CommandResult::modified(vec![id]),
            Err(e) => CommandResult::error(e.to_string()),
        },

        Command::BringToFront { target } => {
            let ids = resolve_target(editor, &target);
            restack_result(editor.bring_to_front(&ids), ids)
        }

        Command::SendToBack { target } => {
            let ids = resolve_target(editor, &target);
            restack_result(editor.send_to_back(&ids), ids)
        }

        Command::BringForward { target } => {
            let ids = resolve_target(editor, &target);
            restack_result(editor.bring_forward(&ids), ids)
        }

        Command::SendBackward { target } => {
            let ids = resolve_target(editor, &target);
            restack_result(editor.send_backward(&ids), ids)
        }

        Command::Copy { target } => {
            let ids = resolve_target(editor, &target);
            match editor.copy_nodes(&ids) {
                Ok(()) => CommandResult::success(),
                Err(e) => CommandResult::error(e.to_string()),
            }
        }

        Command::Cut { target } => {
            let ids = resolve_target(editor, &target);
            match editor.cut_nodes(&ids) {
                Ok(deleted) => CommandResult::deleted(deleted),
                Err(e) => CommandResult::error(e.to_string()),
            }
        }

        Command::Paste => CommandResult::created(editor.paste_nodes()),

        Command::Duplicate { target } => {
            let ids = resolve_target(editor, &target);
            match editor.duplicate_nodes(&ids) {
                Ok(created) => CommandResult::created(created),
                Err(e) => CommandResult::error(e.to_string()),
            }
        }

        Command::PushHistory => {
            editor.push_history();
            CommandResult::success()
        }

        Command::Undo => {
            if editor.undo() {
                CommandResult::success()
            } else {
                CommandResult::error("Nothing to undo")
            }
        }

        Command::Redo => {
            if editor.redo() {
                CommandResult::success()
            } else {
                CommandResult::error("Nothing to redo")
            }
        }

        Command::AddPage { name } => {
            editor.add_page(name);
            CommandResult::success()
        }

        Command::SetActivePage { page } => match editor.set_active_page(page) {
            Ok(()) => CommandResult::success(),
            Err(e) => CommandResult::error(e.to_string()),
        },

        Command::Batch { commands } => {
            let mut all_created = Vec::new();
            let mut all_modified = Vec::new();
            let mut all_deleted = Vec::new();

            for cmd in commands {
                match execute_command(editor, cmd) {
                    CommandResult::Success {
                        created,
                        modified,
                        deleted,
                    } => {
                        all_created.extend(created);
                        all_modified.extend(modified);
                        all_deleted.extend(deleted);
                    }
                    CommandResult::Error { message } => {
                        debug!(%message, "batch stopped");
                        return CommandResult::error(format!("Batch failed: {}", message));
                    }
                }
            }

            CommandResult::Success {
                created: all_created,
                modified: all_modified,
                deleted: all_deleted,
            }
        }
    }
}

/// Every id must name an existing group before any is dissolved.
fn check_groups(editor: &Editor, ids: &[NodeId]) -> editor::Result<()> {
    for &id in ids {
        let node = editor.store().get(id).ok_or(EditorError::NotFound(id))?;
        if node.kind() != NodeKind::Group {
            return Err(EditorError::InvalidKind {
                id,
                expected: "GROUP",
                found: node.kind(),
            });
        }
    }
    Ok(())
}

fn restack_result(outcome: editor::Result<bool>, ids: Vec<NodeId>) -> CommandResult {
    match outcome {
        Ok(true) => CommandResult::modified(ids),
        Ok(false) => CommandResult::success(),
        Err(e) => CommandResult::error(e.to_string()),
    }
}

/// Execute a query against an editor.
pub fn execute_query(editor: &Editor, query: Query) -> QueryResult {
    let store = editor.store();
    match query {
        Query::GetSelection => QueryResult::Selection {
            ids: editor.selection().ids().to_vec(),
        },

        Query::GetAllNodes => QueryResult::Nodes {
            nodes: store.iter().map(NodeInfo::from).collect(),
        },

        Query::GetNodes { target } => {
            let ids = resolve_target(editor, &target);
            QueryResult::Nodes {
                nodes: ids
                    .iter()
                    .filter_map(|id| store.get(*id))
                    .map(NodeInfo::from)
                    .collect(),
            }
        }

        Query::GetNode { id } => QueryResult::Node {
            node: store.get(id).map(NodeInfo::from),
        },

        Query::GetCanvasBounds => {
            let bounds = store
                .top_level(store.active_page())
                .ok()
                .and_then(|ids| store.bounds(ids));
            QueryResult::Bounds {
                min: bounds.map(|b| b.min.0),
                max: bounds.map(|b| b.max.0),
            }
        }

        Query::GetNodeCount => QueryResult::Count { count: store.len() },

        Query::GetHistory => {
            let history = editor.history();
            QueryResult::History {
                can_undo: history.can_undo(),
                can_redo: history.can_redo(),
                undo_count: history.undo_count(),
                redo_count: history.redo_count(),
            }
        }

        Query::GetPages => QueryResult::Pages {
            pages: store.pages().iter().map(PageInfo::from).collect(),
            active: store.active_page(),
        },
    }
}

/// Resolve a target to a list of node IDs.
fn resolve_target(editor: &Editor, target: &Target) -> Vec<NodeId> {
    match target {
        Target::Selection => editor.selection().ids().to_vec(),
        Target::Shape(id) => vec![*id],
        Target::Shapes(ids) => ids.clone(),
        Target::All => {
            let store = editor.store();
            store
                .top_level(store.active_page())
                .map(|ids| ids.to_vec())
                .unwrap_or_default()
        }
        Target::Query(query) => resolve_shape_query(editor, query),
    }
}

/// Resolve a shape query to matching IDs.
fn resolve_shape_query(editor: &Editor, query: &ShapeQuery) -> Vec<NodeId> {
    let store = editor.store();
    match query {
        ShapeQuery::ByKind(kind) => store
            .iter()
            .filter(|n| n.kind() == *kind)
            .map(|n| n.id)
            .collect(),
        ShapeQuery::ByName(name) => store
            .iter()
            .filter(|n| n.name.as_deref() == Some(name.as_str()))
            .map(|n| n.id)
            .collect(),
        ShapeQuery::InBounds {
            x,
            y,
            width,
            height,
        } => {
            let bounds_min = Vec2::new(*x, *y);
            let bounds_max = Vec2::new(x + width, y + height);
            store
                .iter()
                .filter(|n| {
                    let b = n.bounds();
                    // Check if node intersects bounds
                    b.min.x() < bounds_max.x
                        && b.max.x() > bounds_min.x
                        && b.min.y() < bounds_max.y
                        && b.max.y() > bounds_min.y
                })
                .map(|n| n.id)
                .collect()
        }
        ShapeQuery::ChildrenOf(target) => resolve_target(editor, target)
            .into_iter()
            .flat_map(|id| store.children(id).to_vec())
            .collect(),
        ShapeQuery::ParentOf(target) => {
            let mut parent_ids = Vec::new();
            for id in resolve_target(editor, target) {
                if let Some(parent_id) = store.parent(id) {
                    if !parent_ids.contains(&parent_id) {
                        parent_ids.push(parent_id);
                    }
                }
            }
            parent_ids
        }
    }
}
