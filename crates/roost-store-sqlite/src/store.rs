//! [`SqliteStore`] — the SQLite implementation of [`GridStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;

use roost_core::{
  entity::Entity,
  grid::{
    GridStore, NewValidation, PairSummary, ValidationCell, ValidationRecord,
    ValidationStatus,
  },
};

use crate::{
  Error, Result,
  encode::{RawCell, RawEntity, RawRecord, encode_dt},
  schema::SCHEMA,
};

const RECORD_COLUMNS: &str = "record_id, source_entity, mentioned_entity, \
                              raw_text, confidence_score, status, \
                              created_at, post_id, comment_id";

fn raw_record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
  Ok(RawRecord {
    record_id:        row.get(0)?,
    source_entity:    row.get(1)?,
    mentioned_entity: row.get(2)?,
    raw_text:         row.get(3)?,
    confidence_score: row.get(4)?,
    status:           row.get(5)?,
    created_at:       row.get(6)?,
    post_id:          row.get(7)?,
    comment_id:       row.get(8)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roost validation grid backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── GridStore impl ──────────────────────────────────────────────────────────

/// Outcome of the `set_status` transaction, carried out of the closure so
/// domain errors can be raised with the store's own error type.
enum StatusOutcome {
  NotFound,
  AlreadyFinal(String),
  Updated(RawRecord),
}

impl GridStore for SqliteStore {
  type Error = Error;

  // ── Entities ──────────────────────────────────────────────────────────────

  async fn register_entities(&self, names: Vec<String>) -> Result<()> {
    let at_str = encode_dt(Utc::now());
    let count = names.len();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for name in &names {
          tx.execute(
            "INSERT OR IGNORE INTO entities (name, created_at) VALUES (?1, ?2)",
            rusqlite::params![name, at_str],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    debug!(count, "registered entity universe");
    Ok(())
  }

  async fn list_entities(&self) -> Result<Vec<Entity>> {
    let raws: Vec<RawEntity> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT name, created_at FROM entities ORDER BY entity_seq",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawEntity { name: row.get(0)?, created_at: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntity::into_entity).collect()
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn record_validation(
    &self,
    input: NewValidation,
  ) -> Result<ValidationRecord> {
    let record = ValidationRecord {
      id:               input.resolved_id(),
      source_entity:    input.source_entity,
      mentioned_entity: input.mentioned_entity,
      raw_text:         input.raw_text,
      confidence_score: input.confidence_score,
      status:           input.status,
      created_at:       Utc::now(),
      post_id:          input.post_id,
      comment_id:       input.comment_id,
    };

    let r = record.clone();
    let at_str = encode_dt(record.created_at);
    let status_str = record.status.as_str();
    let verified_increment: i64 =
      i64::from(record.status == ValidationStatus::Verified);

    let existing: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Idempotent upsert: a known id leaves both record and cell alone.
        let existing = tx
          .query_row(
            &format!(
              "SELECT {RECORD_COLUMNS} FROM validation_records \
               WHERE record_id = ?1"
            ),
            rusqlite::params![r.id],
            raw_record_from_row,
          )
          .optional()?;
        if existing.is_some() {
          tx.commit()?;
          return Ok(existing);
        }

        // Lazy grid growth: unseen entities (self-pairs included) join the
        // universe on first observation.
        for name in [&r.source_entity, &r.mentioned_entity] {
          tx.execute(
            "INSERT OR IGNORE INTO entities (name, created_at) VALUES (?1, ?2)",
            rusqlite::params![name, at_str],
          )?;
        }

        tx.execute(
          "INSERT INTO validation_records (
             record_id, source_entity, mentioned_entity, raw_text,
             confidence_score, status, created_at, post_id, comment_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            r.id,
            r.source_entity,
            r.mentioned_entity,
            r.raw_text,
            r.confidence_score,
            status_str,
            at_str,
            r.post_id,
            r.comment_id,
          ],
        )?;

        tx.execute(
          "INSERT INTO validation_cells (
             source_entity, mentioned_entity, comment_count, verified_count,
             confidence_sum, average_confidence, last_updated
           ) VALUES (?1, ?2, 1, ?3, ?4, ?4, ?5)
           ON CONFLICT (source_entity, mentioned_entity) DO UPDATE SET
             comment_count      = validation_cells.comment_count + 1,
             verified_count     = validation_cells.verified_count
                                  + excluded.verified_count,
             confidence_sum     = validation_cells.confidence_sum
                                  + excluded.confidence_sum,
             average_confidence = (validation_cells.confidence_sum
                                   + excluded.confidence_sum)
                                  / (validation_cells.comment_count + 1),
             last_updated       = excluded.last_updated",
          rusqlite::params![
            r.source_entity,
            r.mentioned_entity,
            verified_increment,
            r.confidence_score,
            at_str,
          ],
        )?;

        tx.commit()?;
        Ok(None)
      })
      .await?;

    match existing {
      Some(raw) => Ok(raw.into_record()?),
      None => {
        debug!(
          source = %record.source_entity,
          mentioned = %record.mentioned_entity,
          confidence = record.confidence_score,
          "recorded validation"
        );
        Ok(record)
      }
    }
  }

  async fn set_status(
    &self,
    record_id: &str,
    status: ValidationStatus,
  ) -> Result<ValidationRecord> {
    let id = record_id.to_owned();
    let status_str = status.as_str();
    let at_str = encode_dt(Utc::now());
    let bump_verified = status == ValidationStatus::Verified;

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let raw = tx
          .query_row(
            &format!(
              "SELECT {RECORD_COLUMNS} FROM validation_records \
               WHERE record_id = ?1"
            ),
            rusqlite::params![id],
            raw_record_from_row,
          )
          .optional()?;

        let Some(mut raw) = raw else {
          return Ok(StatusOutcome::NotFound);
        };
        if raw.status != "pending" {
          return Ok(StatusOutcome::AlreadyFinal(raw.status));
        }

        tx.execute(
          "UPDATE validation_records SET status = ?1 WHERE record_id = ?2",
          rusqlite::params![status_str, id],
        )?;

        if bump_verified {
          tx.execute(
            "UPDATE validation_cells
             SET verified_count = verified_count + 1, last_updated = ?1
             WHERE source_entity = ?2 AND mentioned_entity = ?3",
            rusqlite::params![at_str, raw.source_entity, raw.mentioned_entity],
          )?;
        }

        tx.commit()?;
        raw.status = status_str.to_owned();
        Ok(StatusOutcome::Updated(raw))
      })
      .await?;

    match outcome {
      StatusOutcome::NotFound => Err(Error::RecordNotFound(record_id.into())),
      StatusOutcome::AlreadyFinal(s) => Err(Error::StatusFinal {
        id:     record_id.into(),
        status: ValidationStatus::parse(&s)?,
      }),
      StatusOutcome::Updated(raw) => Ok(raw.into_record()?),
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_cell(
    &self,
    source: &str,
    mentioned: &str,
  ) -> Result<ValidationCell> {
    let source = source.to_owned();
    let mentioned = mentioned.to_owned();

    let raw: Option<RawCell> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT comment_count, verified_count, confidence_sum,
                      average_confidence, last_updated
               FROM validation_cells
               WHERE source_entity = ?1 AND mentioned_entity = ?2",
              rusqlite::params![source, mentioned],
              |row| {
                Ok(RawCell {
                  comment_count:      row.get(0)?,
                  verified_count:     row.get(1)?,
                  confidence_sum:     row.get(2)?,
                  average_confidence: row.get(3)?,
                  last_updated:       row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    // Unobserved pairs read as the zero cell, never as an error.
    raw.map_or_else(|| Ok(ValidationCell::zero()), RawCell::into_cell)
  }

  async fn records_for_source(
    &self,
    entity: &str,
  ) -> Result<Vec<ValidationRecord>> {
    let entity = entity.to_owned();

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS} FROM validation_records \
           WHERE source_entity = ?1 ORDER BY record_seq"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![entity], raw_record_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn top_pairs(&self, n: usize) -> Result<Vec<PairSummary>> {
    let limit = i64::try_from(n).unwrap_or(i64::MAX);

    let raws: Vec<(String, String, RawCell)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT source_entity, mentioned_entity, comment_count,
                  verified_count, confidence_sum, average_confidence,
                  last_updated
           FROM validation_cells
           WHERE comment_count > 0
           ORDER BY comment_count DESC, cell_seq ASC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok((
              row.get(0)?,
              row.get(1)?,
              RawCell {
                comment_count:      row.get(2)?,
                verified_count:     row.get(3)?,
                confidence_sum:     row.get(4)?,
                average_confidence: row.get(5)?,
                last_updated:       row.get(6)?,
              },
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(source, mentioned, raw)| {
        Ok(PairSummary { source, mentioned, cell: raw.into_cell()? })
      })
      .collect()
  }
}
