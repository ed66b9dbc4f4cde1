//! [`JsonStore`] — the single-document implementation of [`GridStore`].

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use roost_core::{
  entity::Entity,
  grid::{
    GridStore, NewValidation, PairSummary, ValidationCell, ValidationRecord,
    ValidationStatus,
  },
};

use crate::{Error, Result};

// ─── Document ────────────────────────────────────────────────────────────────

/// On-disk shape of the whole store.
///
/// `record_order` and `pair_order` carry the insertion orders that JSON maps
/// do not preserve: the former drives `records_for_source`, the latter the
/// `top_pairs` tie-break.
#[derive(Debug, Default, Serialize, Deserialize)]
struct GridDocument {
  entities:     Vec<Entity>,
  grid:         BTreeMap<String, BTreeMap<String, ValidationCell>>,
  records:      BTreeMap<String, ValidationRecord>,
  #[serde(default)]
  record_order: Vec<String>,
  #[serde(default)]
  pair_order:   Vec<(String, String)>,
}

impl GridDocument {
  fn entity_known(&self, name: &str) -> bool {
    self.entities.iter().any(|e| e.name == name)
  }

  /// Add unseen entities on first observation (lazy grid growth).
  fn grow(&mut self, name: &str, at: chrono::DateTime<Utc>) {
    if !self.entity_known(name) {
      self.entities.push(Entity { name: name.to_owned(), created_at: at });
    }
  }

  fn cell_mut(&mut self, source: &str, mentioned: &str) -> &mut ValidationCell {
    let row = self.grid.entry(source.to_owned()).or_default();
    if !row.contains_key(mentioned) {
      self
        .pair_order
        .push((source.to_owned(), mentioned.to_owned()));
    }
    row.entry(mentioned.to_owned()).or_default()
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roost validation grid backed by one JSON document on disk.
pub struct JsonStore {
  path:  PathBuf,
  state: Mutex<GridDocument>,
}

impl JsonStore {
  /// Open a store at `path`, reading the existing document if one is there.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_owned();
    let doc = match tokio::fs::read(&path).await {
      Ok(bytes) => serde_json::from_slice(&bytes)?,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        GridDocument::default()
      }
      Err(e) => return Err(e.into()),
    };
    Ok(Self { path, state: Mutex::new(doc) })
  }

  async fn save(&self, doc: &GridDocument) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(doc)?;
    tokio::fs::write(&self.path, bytes).await?;
    Ok(())
  }
}

impl GridStore for JsonStore {
  type Error = Error;

  // ── Entities ──────────────────────────────────────────────────────────────

  async fn register_entities(&self, names: Vec<String>) -> Result<()> {
    let now = Utc::now();
    let mut doc = self.state.lock().await;
    for name in names {
      doc.grow(&name, now);
    }
    self.save(&doc).await
  }

  async fn list_entities(&self) -> Result<Vec<Entity>> {
    Ok(self.state.lock().await.entities.clone())
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn record_validation(
    &self,
    input: NewValidation,
  ) -> Result<ValidationRecord> {
    let id = input.resolved_id();
    let mut doc = self.state.lock().await;

    // Idempotent upsert: a known id leaves both record and cell alone.
    if let Some(existing) = doc.records.get(&id) {
      return Ok(existing.clone());
    }

    let now = Utc::now();
    let record = ValidationRecord {
      id:               id.clone(),
      source_entity:    input.source_entity,
      mentioned_entity: input.mentioned_entity,
      raw_text:         input.raw_text,
      confidence_score: input.confidence_score,
      status:           input.status,
      created_at:       now,
      post_id:          input.post_id,
      comment_id:       input.comment_id,
    };

    doc.grow(&record.source_entity, now);
    doc.grow(&record.mentioned_entity, now);
    doc
      .cell_mut(&record.source_entity, &record.mentioned_entity)
      .observe(
        record.confidence_score,
        record.status == ValidationStatus::Verified,
        now,
      );
    doc.records.insert(id.clone(), record.clone());
    doc.record_order.push(id);

    self.save(&doc).await?;
    debug!(
      source = %record.source_entity,
      mentioned = %record.mentioned_entity,
      confidence = record.confidence_score,
      "recorded validation"
    );
    Ok(record)
  }

  async fn set_status(
    &self,
    record_id: &str,
    status: ValidationStatus,
  ) -> Result<ValidationRecord> {
    let mut doc = self.state.lock().await;

    let Some(record) = doc.records.get_mut(record_id) else {
      return Err(Error::RecordNotFound(record_id.to_owned()));
    };
    if record.status.is_terminal() {
      return Err(Error::StatusFinal {
        id:     record_id.to_owned(),
        status: record.status,
      });
    }

    record.status = status;
    let updated = record.clone();

    if status == ValidationStatus::Verified {
      doc
        .cell_mut(&updated.source_entity, &updated.mentioned_entity)
        .mark_verified(Utc::now());
    }

    self.save(&doc).await?;
    Ok(updated)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_cell(
    &self,
    source: &str,
    mentioned: &str,
  ) -> Result<ValidationCell> {
    let doc = self.state.lock().await;
    Ok(
      doc
        .grid
        .get(source)
        .and_then(|row| row.get(mentioned))
        .cloned()
        .unwrap_or_else(ValidationCell::zero),
    )
  }

  async fn records_for_source(
    &self,
    entity: &str,
  ) -> Result<Vec<ValidationRecord>> {
    let doc = self.state.lock().await;
    Ok(
      doc
        .record_order
        .iter()
        .filter_map(|id| doc.records.get(id))
        .filter(|r| r.source_entity == entity)
        .cloned()
        .collect(),
    )
  }

  async fn top_pairs(&self, n: usize) -> Result<Vec<PairSummary>> {
    let doc = self.state.lock().await;

    // pair_order is first-observation order; the stable sort keeps it as
    // the tie-break between equal counts.
    let mut pairs: Vec<PairSummary> = doc
      .pair_order
      .iter()
      .filter_map(|(source, mentioned)| {
        let cell = doc.grid.get(source)?.get(mentioned)?;
        (cell.comment_count > 0).then(|| PairSummary {
          source:    source.clone(),
          mentioned: mentioned.clone(),
          cell:      cell.clone(),
        })
      })
      .collect();

    pairs.sort_by(|a, b| b.cell.comment_count.cmp(&a.cell.comment_count));
    pairs.truncate(n);
    Ok(pairs)
  }
}
