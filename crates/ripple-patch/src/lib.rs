//! Ripple Patch: drift-tolerant patch application, rollback and persisted history

pub mod document;
pub mod engine;
pub mod error;
pub mod history;


pub use document::Document;
pub use engine::PatchEngine;
pub use error::{HistoryError, PatchError};
pub use history::{clear_state, history_path, load_history, save_history, state_dir};
