use editor::Editor;
use node::{CanvasSize, NodeId, NodeKind};
use proptest::prelude::*;
use std::collections::HashSet;
use strum::IntoEnumIterator;

fn kind() -> impl Strategy<Value = NodeKind> {
    prop::sample::select(NodeKind::iter().collect::<Vec<_>>())
}

fn shape() -> impl Strategy<Value = (NodeKind, f32, f32, f32, f32)> {
    (
        kind(),
        -1000.0f32..1000.0,
        -1000.0f32..1000.0,
        1.0f32..500.0,
        1.0f32..500.0,
    )
}

fn populate(editor: &mut Editor, shapes: &[(NodeKind, f32, f32, f32, f32)]) -> Vec<NodeId> {
    shapes
        .iter()
        .map(|&(kind, x, y, w, h)| editor.create_shape(kind, x, y, Some(CanvasSize::new(w, h))))
        .collect()
}

proptest! {
    #[test]
    fn created_ids_are_fresh(shapes in prop::collection::vec(shape(), 1..30)) {
        let mut editor = Editor::new();
        let ids = populate(&mut editor, &shapes);
        let unique: HashSet<_> = ids.iter().collect();
        prop_assert_eq!(unique.len(), ids.len());

        for (id, (kind, x, y, w, h)) in ids.iter().zip(&shapes) {
            let node = editor.store().get(*id).unwrap();
            prop_assert_eq!(node.kind(), *kind);
            prop_assert_eq!(node.position.x(), *x);
            prop_assert_eq!(node.position.y(), *y);
            prop_assert_eq!(node.size, CanvasSize::new(*w, *h));
        }
    }

    #[test]
    fn delete_twice_is_idempotent(
        shapes in prop::collection::vec(shape(), 1..20),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let mut editor = Editor::new();
        let ids = populate(&mut editor, &shapes);
        let targets: Vec<_> = picks.iter().map(|i| ids[i.index(ids.len())]).collect();

        editor.delete_nodes(&targets);
        let after_first = editor.export_document();
        prop_assert!(editor.delete_nodes(&targets).is_empty());
        prop_assert_eq!(editor.export_document(), after_first);
    }

    #[test]
    fn group_then_ungroup_returns_members(shapes in prop::collection::vec(shape(), 1..12)) {
        let mut editor = Editor::new();
        let ids = populate(&mut editor, &shapes);
        let page = editor.store().active_page();
        let before = editor.store().top_level(page).unwrap().to_vec();

        let group = editor.group_nodes(&ids).unwrap();
        let released = editor.ungroup_nodes(group).unwrap();

        prop_assert_eq!(&released, &ids);
        prop_assert!(!editor.store().contains(group));
        prop_assert_eq!(editor.store().top_level(page).unwrap(), before.as_slice());
    }

    #[test]
    fn paste_never_reuses_ids(shapes in prop::collection::vec(shape(), 1..10), rounds in 1usize..4) {
        let mut editor = Editor::new();
        let ids = populate(&mut editor, &shapes);
        editor.copy_nodes(&ids).unwrap();

        let mut seen: HashSet<NodeId> = ids.iter().copied().collect();
        for _ in 0..rounds {
            for id in editor.paste_nodes() {
                prop_assert!(seen.insert(id));
            }
        }
        prop_assert_eq!(editor.store().len(), ids.len() * (rounds + 1));
    }

    #[test]
    fn undo_then_redo_round_trips(shapes in prop::collection::vec(shape(), 2..10)) {
        let mut editor = Editor::new();
        populate(&mut editor, &shapes[..1]);
        editor.push_history();
        let before = editor.export_document();

        populate(&mut editor, &shapes[1..]);
        let after = editor.export_document();

        prop_assert!(editor.undo());
        prop_assert_eq!(editor.export_document(), before);
        prop_assert!(editor.redo());
        prop_assert_eq!(editor.export_document(), after);
    }

    #[test]
    fn json_export_import_is_stable(shapes in prop::collection::vec(shape(), 0..15), group_len in 0usize..5) {
        let mut editor = Editor::new();
        let ids = populate(&mut editor, &shapes);
        if group_len > 0 && group_len <= ids.len() {
            editor.group_nodes(&ids[..group_len]).unwrap();
        }
        let first = editor.export_json().unwrap();

        let mut other = Editor::new();
        other.import_json(&first).unwrap();
        prop_assert_eq!(other.store().len(), editor.store().len());
        prop_assert_eq!(other.export_json().unwrap(), first);
    }
}
