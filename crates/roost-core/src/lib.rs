//! Core types and algorithms for the roost housing-mention pipeline.
//!
//! This crate is deliberately free of I/O: alias generation, fuzzy matching,
//! mention detection, and search-term prioritisation are pure functions over
//! their inputs. The only mutable shared resource — the validation grid — is
//! abstracted behind the [`grid::GridStore`] trait, implemented by storage
//! backends (`roost-store-sqlite`, `roost-store-json`).

pub mod alias;
pub mod entity;
pub mod error;
pub mod grid;
pub mod matcher;
pub mod mention;
pub mod scan;
pub mod terms;

pub use error::{Error, Result};
