//! SQLite-backed prompt source and evaluation log.
//!
//! Two relations:
//!
//! ```text
//! prompts    (id, expected_text)
//! recordings (id, prompt_id → prompts.id, file_path, recognized_text,
//!             score, ratio, partial, token_sort, passed, feedback)
//! ```
//!
//! `recordings` is an append-only log — rows are inserted once per completed
//! evaluation attempt and never updated or deleted. Write ordering is left to
//! SQLite's own transaction semantics; no extra locking here.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::score::Metrics;

/// The stock prompt sentences seeded into an empty database.
pub const DEFAULT_PROMPTS: [&str; 10] = [
    "Tower, November 1 2 3 Alfa Bravo ready for departure runway 18.",
    "Climb and maintain flight level 350.",
    "Request descent to flight level 200.",
    "Cleared for takeoff runway 27 left.",
    "Contact ground on 121.9.",
    "Maintain present heading and altitude.",
    "Descend and maintain 3000 feet.",
    "Cleared to land runway 18 right.",
    "Turn left heading 090.",
    "Report established on the localizer.",
];

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Errors surfaced by the record store. Persistence failures are fatal for
/// the evaluation attempt that hit them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// One target sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub id: i64,
    pub expected_text: String,
}

/// A not-yet-persisted evaluation outcome.
#[derive(Debug, Clone)]
pub struct NewRecording {
    pub prompt_id: i64,
    pub file_path: String,
    pub recognized_text: String,
    pub metrics: Metrics,
}

/// A persisted evaluation outcome, as read back from the log.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecording {
    pub id: i64,
    pub prompt_id: i64,
    pub file_path: String,
    pub recognized_text: String,
    pub metrics: Metrics,
}

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

/// Owns the SQLite connection and all SQL in the crate.
///
/// # Example
///
/// ```rust,no_run
/// use readback::store::RecordStore;
///
/// let store = RecordStore::open("speech_eval.db").unwrap();
/// store.seed_prompts(&readback::store::DEFAULT_PROMPTS).unwrap();
/// assert_eq!(store.expected_text(99).unwrap(), None);
/// ```
pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Open (creating if needed) the database at `path` and ensure the
    /// schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store, used by tests and throwaway runs.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS prompts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                expected_text TEXT
            );
            CREATE TABLE IF NOT EXISTS recordings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                prompt_id INTEGER,
                file_path TEXT,
                recognized_text TEXT,
                score INTEGER,
                ratio INTEGER,
                partial INTEGER,
                token_sort INTEGER,
                passed BOOLEAN,
                feedback TEXT,
                FOREIGN KEY(prompt_id) REFERENCES prompts(id)
            );",
        )?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Prompts
    // -----------------------------------------------------------------------

    /// Insert `sentences` into `prompts`, but only when the table is empty.
    ///
    /// Returns the number of rows inserted (0 when prompts already exist).
    pub fn seed_prompts(&self, sentences: &[&str]) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM prompts", [], |row| row.get(0))?;
        if count > 0 {
            log::debug!("prompts already seeded ({count} rows), skipping");
            return Ok(0);
        }

        for sentence in sentences {
            self.conn.execute(
                "INSERT INTO prompts (expected_text) VALUES (?1)",
                params![sentence],
            )?;
        }
        log::info!("seeded {} prompts", sentences.len());
        Ok(sentences.len())
    }

    /// The target sentence for `prompt_id`, or `None` when the id is
    /// unknown — callers branch on the option instead of handling an error.
    pub fn expected_text(&self, prompt_id: i64) -> Result<Option<String>, StoreError> {
        let text = self
            .conn
            .query_row(
                "SELECT expected_text FROM prompts WHERE id = ?1",
                params![prompt_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(text)
    }

    /// All prompts, ordered by id.
    pub fn prompts(&self) -> Result<Vec<Prompt>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, expected_text FROM prompts ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(Prompt {
                id: row.get(0)?,
                expected_text: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    // -----------------------------------------------------------------------
    // Recordings
    // -----------------------------------------------------------------------

    /// Append one evaluation outcome to the log. Returns the new row id.
    pub fn append(&self, rec: &NewRecording) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO recordings
             (prompt_id, file_path, recognized_text, score, ratio, partial,
              token_sort, passed, feedback)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                rec.prompt_id,
                rec.file_path,
                rec.recognized_text,
                rec.metrics.score,
                rec.metrics.ratio,
                rec.metrics.partial,
                rec.metrics.token_sort,
                rec.metrics.passed,
                rec.metrics.feedback,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All recordings for one prompt, oldest first.
    pub fn recordings_for_prompt(
        &self,
        prompt_id: i64,
    ) -> Result<Vec<StoredRecording>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, prompt_id, file_path, recognized_text, score, ratio,
                    partial, token_sort, passed, feedback
             FROM recordings WHERE prompt_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![prompt_id], |row| {
            Ok(StoredRecording {
                id: row.get(0)?,
                prompt_id: row.get(1)?,
                file_path: row.get(2)?,
                recognized_text: row.get(3)?,
                metrics: Metrics {
                    score: row.get(4)?,
                    ratio: row.get(5)?,
                    partial: row.get(6)?,
                    token_sort: row.get(7)?,
                    passed: row.get(8)?,
                    feedback: row.get(9)?,
                },
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Total number of rows in the evaluation log.
    pub fn recording_count(&self) -> Result<i64, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM recordings", [], |row| row.get(0))?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{ScorerConfig, Scorer};

    fn sample_metrics() -> Metrics {
        Scorer::new(ScorerConfig::default()).score("turn left heading 090", "turn left heading 090")
    }

    #[test]
    fn seed_inserts_all_sentences_once() {
        let store = RecordStore::open_in_memory().unwrap();
        assert_eq!(store.seed_prompts(&DEFAULT_PROMPTS).unwrap(), 10);
        // Second call is a no-op.
        assert_eq!(store.seed_prompts(&DEFAULT_PROMPTS).unwrap(), 0);
        assert_eq!(store.prompts().unwrap().len(), 10);
    }

    #[test]
    fn expected_text_returns_seeded_sentence() {
        let store = RecordStore::open_in_memory().unwrap();
        store.seed_prompts(&DEFAULT_PROMPTS).unwrap();
        assert_eq!(
            store.expected_text(2).unwrap().as_deref(),
            Some("Climb and maintain flight level 350.")
        );
    }

    #[test]
    fn expected_text_unknown_id_is_none_not_error() {
        let store = RecordStore::open_in_memory().unwrap();
        store.seed_prompts(&DEFAULT_PROMPTS).unwrap();
        assert_eq!(store.expected_text(999).unwrap(), None);
    }

    #[test]
    fn append_then_read_back_round_trips_every_field() {
        let store = RecordStore::open_in_memory().unwrap();
        store.seed_prompts(&DEFAULT_PROMPTS).unwrap();

        let rec = NewRecording {
            prompt_id: 2,
            file_path: "/tmp/attempt-1.wav".into(),
            recognized_text: "climb and maintain flight level 350".into(),
            metrics: sample_metrics(),
        };
        let id = store.append(&rec).unwrap();

        let stored = store.recordings_for_prompt(2).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].prompt_id, rec.prompt_id);
        assert_eq!(stored[0].file_path, rec.file_path);
        assert_eq!(stored[0].recognized_text, rec.recognized_text);
        assert_eq!(stored[0].metrics, rec.metrics);
    }

    #[test]
    fn append_is_append_only() {
        let store = RecordStore::open_in_memory().unwrap();
        store.seed_prompts(&DEFAULT_PROMPTS).unwrap();

        let rec = NewRecording {
            prompt_id: 1,
            file_path: "/tmp/a.wav".into(),
            recognized_text: "tower".into(),
            metrics: sample_metrics(),
        };
        store.append(&rec).unwrap();
        store.append(&rec).unwrap();
        assert_eq!(store.recording_count().unwrap(), 2);
        assert_eq!(store.recordings_for_prompt(1).unwrap().len(), 2);
    }

    #[test]
    fn prompts_are_ordered_by_id() {
        let store = RecordStore::open_in_memory().unwrap();
        store.seed_prompts(&DEFAULT_PROMPTS).unwrap();
        let prompts = store.prompts().unwrap();
        let ids: Vec<i64> = prompts.iter().map(|p| p.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<i64>>());
    }

    #[test]
    fn schema_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval.db");

        {
            let store = RecordStore::open(&path).unwrap();
            store.seed_prompts(&DEFAULT_PROMPTS).unwrap();
        }

        let store = RecordStore::open(&path).unwrap();
        assert_eq!(store.prompts().unwrap().len(), 10);
    }
}
