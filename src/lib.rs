//! snipjar - A local note and snippet manager.
//!
//! Snippets live in a single JSON array persisted through a [`Store`]. A
//! [`Session`] applies user commands to the library and the editor, holding
//! destructive or state-losing actions behind a confirmation until answered.

pub mod cli;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod gate;
pub mod models;
pub mod repository;
pub mod session;
pub mod storage;
pub mod ui;

// Re-export
pub use cli::{Commands, Snipjar};
pub use clipboard::{ClipboardSink, MemoryClipboard, SystemClipboard};
pub use commands::{handle_command, run_subcommand};
pub use config::{get_config_dir, EXPORT_FILENAME, STORE_KEY};
pub use editor::{EditorState, EditorStatus};
pub use error::{Result, SnipjarError};
pub use gate::{Answer, ConfirmationGate, Prompt, Resolution};
pub use models::{Snippet, SnippetId, DEFAULT_TITLE};
pub use repository::{parse_collection, Repository};
pub use session::{Command, Outcome, Session, DELETE_MESSAGE, IMPORT_MESSAGE};
pub use storage::{FileStore, MemoryStore, Store};
pub use ui::display_snippet_manager;
