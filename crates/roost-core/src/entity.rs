//! Entity — a canonical named property tracked across the system.
//!
//! Entities are created once at data-load time and are immutable from the
//! core's perspective; everything the pipeline knows about an entity is
//! derived from its name (alias sets) or accumulated in the validation grid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A canonical property record. The name doubles as the unique key — the
/// grid, records, and alias sets are all keyed by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
  pub name:       String,
  pub created_at: DateTime<Utc>,
}
