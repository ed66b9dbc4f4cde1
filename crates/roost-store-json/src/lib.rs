//! Single-document JSON backend for the roost validation grid.
//!
//! The whole grid lives in one JSON file: the entity list, the two-level
//! `grid` mapping of cells, and the record map keyed by record id. The
//! document is held in memory behind an async mutex (one exclusive lock per
//! process, which serializes concurrent cell writers) and written back after
//! every mutation. Suited to small deployments and tests; the SQLite backend
//! is the production store.

pub mod error;

mod store;

pub use error::{Error, Result};
pub use store::JsonStore;
