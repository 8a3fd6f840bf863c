//! Persistence module — SQLite prompt source and append-only evaluation log.

pub mod db;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use db::{
    NewRecording, Prompt, RecordStore, StoreError, StoredRecording, DEFAULT_PROMPTS,
};
