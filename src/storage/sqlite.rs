//! SQLite manifest implementation
//!
//! This module provides a SQLite-based implementation of the Manifest trait.

use crate::extract::ExtractorKind;
use crate::state::DownloadState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Manifest, StorageError, StorageResult};
use crate::storage::{DownloadJob, FailureRecord, FailureStage, ItemRecord, RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite manifest backend
pub struct SqliteManifest {
    conn: Connection,
}

impl SqliteManifest {
    /// Opens or creates a manifest database
    ///
    /// Missing parent directories are created.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory manifest
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Conversion error for a text column holding an unknown value
fn unknown_value(index: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        Type::Text,
        format!("unknown value '{}'", value).into(),
    )
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    let status: String = row.get(4)?;
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&status).ok_or_else(|| unknown_value(4, &status))?,
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<ItemRecord> {
    let kind: String = row.get(2)?;
    let state: String = row.get(11)?;
    Ok(ItemRecord {
        id: row.get(0)?,
        run_id: row.get(1)?,
        kind: ExtractorKind::from_db_string(&kind).ok_or_else(|| unknown_value(2, &kind))?,
        title: row.get(3)?,
        extension: row.get(4)?,
        origin_url: row.get(5)?,
        download_url: row.get(6)?,
        iframe_url: row.get(7)?,
        quality: row.get(8)?,
        storage_path: row.get(9)?,
        error_message: row.get(10)?,
        state: DownloadState::from_db_string(&state).ok_or_else(|| unknown_value(11, &state))?,
    })
}

fn failure_from_row(row: &Row<'_>) -> rusqlite::Result<FailureRecord> {
    let stage: String = row.get(1)?;
    let extractor: Option<String> = row.get(2)?;
    let extractor = match extractor {
        Some(value) => {
            Some(ExtractorKind::from_db_string(&value).ok_or_else(|| unknown_value(2, &value))?)
        }
        None => None,
    };

    Ok(FailureRecord {
        url: row.get(0)?,
        stage: FailureStage::from_db_string(&stage).ok_or_else(|| unknown_value(1, &stage))?,
        extractor,
        reason: row.get(3)?,
    })
}

impl Manifest for SqliteManifest {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Item Management =====

    fn record_item(&mut self, run_id: i64, job: &DownloadJob) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let item = &job.item;
        self.conn.execute(
            "INSERT INTO items (run_id, kind, title, extension, origin_url, download_url,
             iframe_url, quality, storage_path, state, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                run_id,
                item.kind().as_str(),
                item.title(),
                item.extension(),
                item.origin_url(),
                job.url,
                item.iframe_url(),
                item.quality(),
                job.path,
                DownloadState::Pending.to_db_string(),
                now
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_item_state(
        &mut self,
        item_id: i64,
        state: DownloadState,
        error_message: Option<&str>,
    ) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE items SET state = ?1, error_message = ?2 WHERE id = ?3",
            params![state.to_db_string(), error_message, item_id],
        )?;

        if updated == 0 {
            return Err(StorageError::ItemNotFound(item_id));
        }
        Ok(())
    }

    fn get_items(&self, run_id: i64) -> StorageResult<Vec<ItemRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, kind, title, extension, origin_url, download_url, iframe_url,
             quality, storage_path, error_message, state
             FROM items WHERE run_id = ?1 ORDER BY id",
        )?;

        let items = stmt
            .query_map(params![run_id], item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn count_items_by_state(&self, run_id: i64, state: DownloadState) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM items WHERE run_id = ?1 AND state = ?2",
            params![run_id, state.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_items_by_kind(&self, run_id: i64, kind: ExtractorKind) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM items WHERE run_id = ?1 AND kind = ?2",
            params![run_id, kind.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Failure Tracking =====

    fn record_failure(&mut self, run_id: i64, failure: &FailureRecord) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO failures (run_id, url, stage, extractor, reason, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run_id,
                failure.url,
                failure.stage.to_db_string(),
                failure.extractor.map(|k| k.as_str()),
                failure.reason,
                now
            ],
        )?;
        Ok(())
    }

    fn get_failures(&self, run_id: i64) -> StorageResult<Vec<FailureRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, stage, extractor, reason FROM failures WHERE run_id = ?1 ORDER BY id",
        )?;

        let failures = stmt
            .query_map(params![run_id], failure_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(failures)
    }
}
