//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings; statuses as their
//! lowercase discriminant strings.

use chrono::{DateTime, Utc};
use roost_core::{
  entity::Entity,
  grid::{ValidationCell, ValidationRecord, ValidationStatus},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `validation_records` row.
pub struct RawRecord {
  pub record_id:        String,
  pub source_entity:    String,
  pub mentioned_entity: String,
  pub raw_text:         String,
  pub confidence_score: f64,
  pub status:           String,
  pub created_at:       String,
  pub post_id:          Option<String>,
  pub comment_id:       Option<String>,
}

impl RawRecord {
  pub fn into_record(self) -> Result<ValidationRecord> {
    Ok(ValidationRecord {
      id:               self.record_id,
      source_entity:    self.source_entity,
      mentioned_entity: self.mentioned_entity,
      raw_text:         self.raw_text,
      confidence_score: self.confidence_score,
      status:           ValidationStatus::parse(&self.status)?,
      created_at:       decode_dt(&self.created_at)?,
      post_id:          self.post_id,
      comment_id:       self.comment_id,
    })
  }
}

/// Raw strings read directly from a `validation_cells` row.
pub struct RawCell {
  pub comment_count:      u64,
  pub verified_count:     u64,
  pub confidence_sum:     f64,
  pub average_confidence: f64,
  pub last_updated:       Option<String>,
}

impl RawCell {
  pub fn into_cell(self) -> Result<ValidationCell> {
    Ok(ValidationCell {
      comment_count:      self.comment_count,
      verified_count:     self.verified_count,
      confidence_sum:     self.confidence_sum,
      average_confidence: self.average_confidence,
      last_updated:       self
        .last_updated
        .as_deref()
        .map(decode_dt)
        .transpose()?,
    })
  }
}

/// Raw strings read directly from an `entities` row.
pub struct RawEntity {
  pub name:       String,
  pub created_at: String,
}

impl RawEntity {
  pub fn into_entity(self) -> Result<Entity> {
    Ok(Entity {
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
