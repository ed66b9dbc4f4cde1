//! The validation grid — cross-reference statistics between entity pairs.
//!
//! A comment gathered while searching for entity A that also names entity B
//! is evidence for the A→B edge. Each ordered pair accumulates a
//! [`ValidationCell`]; each observed comment persists as a
//! [`ValidationRecord`]. Cells are only ever accumulated, records only ever
//! appended; the single mutation after the fact is the record's verification
//! status, driven by an external review step.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, Result, entity::Entity};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Review state of one recorded comment. `Pending` is the only non-terminal
/// state: a record moves to `Verified` or `Invalid` exactly once.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
  #[default]
  Pending,
  Verified,
  Invalid,
}

impl ValidationStatus {
  /// The string stored in the `status` column / JSON field.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Verified => "verified",
      Self::Invalid => "invalid",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "pending" => Ok(Self::Pending),
      "verified" => Ok(Self::Verified),
      "invalid" => Ok(Self::Invalid),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }

  pub fn is_terminal(self) -> bool { !matches!(self, Self::Pending) }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// Accumulated statistics for one ordered `(source, mentioned)` pair.
///
/// Invariant: `average_confidence == confidence_sum / comment_count`, and is
/// exactly 0 while `comment_count` is 0. Absent pairs read as the zero cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationCell {
  pub comment_count:      u64,
  pub verified_count:     u64,
  pub confidence_sum:     f64,
  pub average_confidence: f64,
  pub last_updated:       Option<DateTime<Utc>>,
}

impl ValidationCell {
  pub fn zero() -> Self { Self::default() }

  /// Fold one new observation into the cell.
  pub fn observe(&mut self, confidence: f64, verified: bool, at: DateTime<Utc>) {
    self.comment_count += 1;
    self.confidence_sum += confidence;
    self.average_confidence = self.confidence_sum / self.comment_count as f64;
    if verified {
      self.verified_count += 1;
    }
    self.last_updated = Some(at);
  }

  /// A previously-counted pending record was verified after the fact.
  pub fn mark_verified(&mut self, at: DateTime<Utc>) {
    self.verified_count += 1;
    self.last_updated = Some(at);
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One persisted comment-level observation. Never destroyed; only `status`
/// changes after creation (and at most once).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRecord {
  pub id:               String,
  pub source_entity:    String,
  pub mentioned_entity: String,
  pub raw_text:         String,
  pub confidence_score: f64,
  pub status:           ValidationStatus,
  /// Store-assigned timestamp; never changes after creation.
  pub created_at:       DateTime<Utc>,
  /// External-source identifiers, when the searcher supplies them.
  pub post_id:          Option<String>,
  pub comment_id:       Option<String>,
}

/// Input to [`GridStore::record_validation`].
/// `created_at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewValidation {
  /// Caller-supplied id, or `None` to derive one deterministically.
  pub id:               Option<String>,
  pub source_entity:    String,
  pub mentioned_entity: String,
  pub raw_text:         String,
  pub confidence_score: f64,
  pub status:           ValidationStatus,
  pub post_id:          Option<String>,
  pub comment_id:       Option<String>,
}

impl NewValidation {
  /// Convenience constructor: pending status, no external ids.
  pub fn new(
    source_entity: impl Into<String>,
    mentioned_entity: impl Into<String>,
    raw_text: impl Into<String>,
    confidence_score: f64,
  ) -> Self {
    Self {
      id: None,
      source_entity: source_entity.into(),
      mentioned_entity: mentioned_entity.into(),
      raw_text: raw_text.into(),
      confidence_score,
      status: ValidationStatus::Pending,
      post_id: None,
      comment_id: None,
    }
  }

  /// The caller-supplied id, or the deterministic derived one.
  pub fn resolved_id(&self) -> String {
    self.id.clone().unwrap_or_else(|| {
      validation_id(&self.source_entity, &self.mentioned_entity, &self.raw_text)
    })
  }
}

/// Deterministic record id: SHA-256 over source, mentioned, and the first
/// 100 characters of the text. Re-ingesting the same comment for the same
/// pair always produces the same id, which is what makes
/// [`GridStore::record_validation`] idempotent.
pub fn validation_id(source: &str, mentioned: &str, text: &str) -> String {
  let prefix: String = text.chars().take(100).collect();
  let mut hasher = Sha256::new();
  hasher.update(source.as_bytes());
  hasher.update(mentioned.as_bytes());
  hasher.update(prefix.as_bytes());
  hex::encode(hasher.finalize())
}

// ─── Summaries ───────────────────────────────────────────────────────────────

/// One row of [`GridStore::top_pairs`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSummary {
  pub source:    String,
  pub mentioned: String,
  pub cell:      ValidationCell,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a validation-grid backend.
///
/// Implementations must apply [`record_validation`](Self::record_validation)
/// atomically per cell: concurrent writers to the same pair serialize (a
/// transaction, or one exclusive lock per process) so `comment_count` and
/// `confidence_sum` never lose updates.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait GridStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Entities ──────────────────────────────────────────────────────────

  /// Register the entity universe, preserving input order. Names already
  /// present are left untouched, so repeated loads are harmless.
  fn register_entities(
    &self,
    names: Vec<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All known entities in registration order, including any grown lazily
  /// by [`record_validation`](Self::record_validation).
  fn list_entities(
    &self,
  ) -> impl Future<Output = Result<Vec<Entity>, Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Upsert one observation and fold it into its cell.
  ///
  /// Keyed by [`NewValidation::resolved_id`]: re-ingesting an id that is
  /// already stored is a no-op returning the stored record, so the same
  /// comment never double-counts. Pairs naming unknown entities grow the
  /// grid lazily (self-pairs included); that is not an error. Fails only on
  /// persistence I/O, and is never retried here — retry policy belongs to
  /// the caller.
  fn record_validation(
    &self,
    input: NewValidation,
  ) -> impl Future<Output = Result<ValidationRecord, Self::Error>> + Send + '_;

  /// Resolve a pending record to `verified` or `invalid` (the external
  /// review step). Moving to `verified` also bumps the pair cell's
  /// `verified_count`. Errors if the record is unknown or already terminal.
  fn set_status<'a>(
    &'a self,
    record_id: &'a str,
    status: ValidationStatus,
  ) -> impl Future<Output = Result<ValidationRecord, Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// The cell for an ordered pair; the zero cell if nothing was recorded.
  fn get_cell<'a>(
    &'a self,
    source: &'a str,
    mentioned: &'a str,
  ) -> impl Future<Output = Result<ValidationCell, Self::Error>> + Send + 'a;

  /// All records whose source is `entity`, in insertion order.
  fn records_for_source<'a>(
    &'a self,
    entity: &'a str,
  ) -> impl Future<Output = Result<Vec<ValidationRecord>, Self::Error>> + Send + 'a;

  /// The `n` most-commented pairs, ordered by `comment_count` descending;
  /// ties keep the order in which the pair was first observed.
  fn top_pairs(
    &self,
    n: usize,
  ) -> impl Future<Output = Result<Vec<PairSummary>, Self::Error>> + Send + '_;
}

// ─── Tests ───────────────────────────────────────────────────────────────────
