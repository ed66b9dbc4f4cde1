//! Cross-reference extraction — the two-factor validation step.
//!
//! The external searcher hands over raw text gathered while searching for a
//! single source entity. Scanning gates the text on housing context, detects
//! every entity mentioned, and turns each mention of a *different* entity
//! into a pending [`NewValidation`] for the grid. Requiring that second,
//! distinct entity is what suppresses false positives from incidental name
//! collisions.

use std::collections::BTreeMap;

use crate::{
  alias::AliasIndex,
  grid::NewValidation,
  mention::{find_mentions, has_housing_context},
};

/// A raw text snippet supplied by the external searcher, labelled with the
/// entity the search was about.
#[derive(Debug, Clone)]
pub struct SourcedText {
  pub source_entity: String,
  pub text:          String,
  pub post_id:       Option<String>,
  pub comment_id:    Option<String>,
}

impl SourcedText {
  pub fn new(source_entity: impl Into<String>, text: impl Into<String>) -> Self {
    Self {
      source_entity: source_entity.into(),
      text:          text.into(),
      post_id:       None,
      comment_id:    None,
    }
  }
}

/// Outcome of scanning one snippet.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
  /// Every entity detected in the text (the source included, when found).
  pub mentions:    BTreeMap<String, f64>,
  /// One pending validation per mentioned entity other than the source.
  pub validations: Vec<NewValidation>,
}

impl ScanResult {
  /// True when the text named at least one entity besides the source.
  pub fn has_cross_references(&self) -> bool {
    !self.validations.is_empty()
  }
}

/// Scan one sourced snippet against the entity universe.
///
/// Text without housing context yields the empty result — the caller
/// persists nothing for it.
pub fn scan(snippet: &SourcedText, universe: &AliasIndex) -> ScanResult {
  if !has_housing_context(&snippet.text) {
    return ScanResult::default();
  }

  let mentions = find_mentions(&snippet.text, universe);

  let validations = mentions
    .iter()
    .filter(|(entity, _)| **entity != snippet.source_entity)
    .map(|(entity, confidence)| NewValidation {
      id:               None,
      source_entity:    snippet.source_entity.clone(),
      mentioned_entity: entity.clone(),
      raw_text:         snippet.text.clone(),
      confidence_score: *confidence,
      status:           Default::default(),
      post_id:          snippet.post_id.clone(),
      comment_id:       snippet.comment_id.clone(),
    })
    .collect();

  ScanResult { mentions, validations }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::alias::{AliasConfig, AliasGenerator};

  fn universe() -> AliasIndex {
    let generator = AliasGenerator::new(AliasConfig::default());
    AliasIndex::build(
      ["Catalyst Midtown", "Square On 5th", "The Connector"],
      &generator,
    )
  }

  #[test]
  fn cross_reference_produces_pending_validation() {
    let snippet = SourcedText::new(
      "Catalyst Midtown",
      "I lived at Catalyst but my friend was at SQ5, rent and parking were fine",
    );
    let result = scan(&snippet, &universe());

    assert!(result.mentions.contains_key("Catalyst Midtown"));
    assert!(result.has_cross_references());
    assert_eq!(result.validations.len(), 1);

    let v = &result.validations[0];
    assert_eq!(v.source_entity, "Catalyst Midtown");
    assert_eq!(v.mentioned_entity, "Square On 5th");
    assert!(v.confidence_score >= 0.6);
    assert!(!v.status.is_terminal());
  }

  #[test]
  fn source_only_mention_is_not_a_cross_reference() {
    let snippet = SourcedText::new(
      "Catalyst Midtown",
      "catalyst rent is high but the amenities are worth it",
    );
    let result = scan(&snippet, &universe());
    assert!(result.mentions.contains_key("Catalyst Midtown"));
    assert!(!result.has_cross_references());
  }

  #[test]
  fn non_housing_text_is_dropped_entirely() {
    // Both names present, but no housing context: the gate wins.
    let snippet =
      SourcedText::new("Catalyst Midtown", "catalyst vs sq5, discuss");
    let result = scan(&snippet, &universe());
    assert!(result.mentions.is_empty());
    assert!(result.validations.is_empty());
  }

  #[test]
  fn external_ids_flow_through() {
    let mut snippet = SourcedText::new(
      "The Connector",
      "connector is nice but catalyst is closer to campus, lower rent too",
    );
    snippet.post_id = Some("p1".into());
    snippet.comment_id = Some("c1".into());

    let result = scan(&snippet, &universe());
    assert!(result.has_cross_references());
    for v in &result.validations {
      assert_eq!(v.post_id.as_deref(), Some("p1"));
      assert_eq!(v.comment_id.as_deref(), Some("c1"));
    }
  }
}
