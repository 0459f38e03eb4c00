//! Command and query interface for editor operations.
//!
//! This crate defines the typed command language for the editor.
//! Commands represent user intent and are:
//! - Serializable (for recording, LLM generation, scripting)
//! - Intent-based (what to do, not how to do it)
//! - Resolved against the selection or explicit ids at execution time
//!
//! # Example
//! ```ignore
//! use api::{Command, execute_command};
//!
//! let cmd = Command::CreateShape {
//!     kind: NodeKind::Rectangle,
//!     position: Vec2::new(100.0, 100.0),
//!     size: Some(Vec2::new(50.0, 50.0)),
//!     name: None,
//!     fill: None,
//!     stroke: None,
//!     corner_radius: None,
//! };
//! let result = execute_command(&mut editor, cmd);
//! ```

mod command;
mod executor;
mod query;
mod target;

pub use command::*;
pub use executor::{execute_command, execute_query};
pub use query::*;
pub use target::*;
