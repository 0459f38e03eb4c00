//! Editing core for scene-graph documents.
//!
//! [`Editor`] owns one document session: the [`NodeStore`] with its pages,
//! the [`Selection`], a [`Clipboard`] of detached subtree copies and a
//! snapshot [`History`]. Every mutation goes through the editor, which
//! keeps the selection valid, invalidates redo when the document changes
//! and notifies subscribers.

mod clipboard;
mod config;
mod editor;
mod error;
mod events;
mod history;
mod selection;
mod store;
mod structure;

pub use clipboard::Clipboard;
pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{EditorError, Result};
pub use events::{EditorEvent, SubscriptionId};
pub use history::{History, Snapshot};
pub use selection::Selection;
pub use store::NodeStore;
