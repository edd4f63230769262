//! Session layer: state, boundary operations, and the collaborators they talk to.

pub mod clipboard;
pub mod commands;
pub mod debounce;
pub mod events;
pub mod file_dialog;
pub mod git;
pub mod proxy;
pub mod state;
pub mod view_model;
pub mod watcher;
