//! Mention detection — which entities does a block of free text refer to?
//!
//! Built on the alias sets: a literal alias occurrence scores the alias's
//! confidence weight; longer aliases also get a per-word fuzzy pass. The 0.6
//! floor deliberately trades recall for precision — a missed loose mention is
//! cheaper than a false cross-reference in the validation grid.

use std::collections::BTreeMap;

use crate::{alias::AliasIndex, matcher::similarity};

/// Minimum best-alias score for an entity to count as mentioned.
pub const MIN_MENTION_CONFIDENCE: f64 = 0.6;

/// Minimum per-word similarity ratio (0–100 scale) for a fuzzy alias hit.
pub const FUZZY_WORD_FLOOR: u8 = 85;

/// Keywords whose presence marks text as housing discussion.
const HOUSING_CONTEXT_KEYWORDS: &[&str] = &[
  "housing", "apartment", "living", "rent", "lease", "roommate", "move",
  "dorm", "residence", "amenities", "price", "cost", "utilities", "parking",
  "location", "campus", "walk", "shuttle", "noise", "quiet", "party",
  "management", "maintenance", "gym", "pool", "laundry", "kitchen",
  "bedroom", "bathroom", "balcony",
];

/// Find every entity referenced in `text`, with a confidence score each.
///
/// Per entity, the score is the maximum over its aliases of:
/// - the alias confidence, if the alias occurs as a substring of the
///   lowercased text;
/// - otherwise, for aliases longer than 4 characters, `confidence × ratio /
///   100` for the first whitespace token whose similarity ratio reaches
///   [`FUZZY_WORD_FLOOR`] (the ratio is on the matcher's 0–100 scale, hence
///   the division).
///
/// Entities below [`MIN_MENTION_CONFIDENCE`] are absent from the result.
/// Pure and deterministic: identical inputs yield identical mappings.
pub fn find_mentions(
  text: &str,
  universe: &AliasIndex,
) -> BTreeMap<String, f64> {
  let text_lower = text.to_lowercase();
  let tokens: Vec<&str> = text_lower.split_whitespace().collect();
  let mut mentioned = BTreeMap::new();

  for (entity, set) in universe.iter() {
    let mut best = 0.0_f64;

    for (alias, confidence) in set.iter() {
      if alias.is_empty() {
        continue;
      }
      let alias_lower = alias.to_lowercase();

      let score = if text_lower.contains(&alias_lower) {
        confidence
      } else if alias_lower.chars().count() > 4 {
        tokens
          .iter()
          .find_map(|token| {
            let ratio = similarity(&alias_lower, token);
            (ratio >= FUZZY_WORD_FLOOR)
              .then(|| confidence * f64::from(ratio) / 100.0)
          })
          .unwrap_or(0.0)
      } else {
        0.0
      };

      best = best.max(score);
    }

    if best >= MIN_MENTION_CONFIDENCE {
      mentioned.insert(entity.to_owned(), best);
    }
  }

  mentioned
}

/// Gate applied by the searcher before mention detection: the text must
/// contain at least two distinct housing keywords. Suppresses coincidental
/// one-word name collisions in unrelated threads.
pub fn has_housing_context(text: &str) -> bool {
  let text_lower = text.to_lowercase();
  let hits = HOUSING_CONTEXT_KEYWORDS
    .iter()
    .filter(|keyword| text_lower.contains(*keyword))
    .count();
  hits >= 2
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::alias::{AliasConfig, AliasGenerator};

  fn universe(names: &[&str]) -> AliasIndex {
    let generator = AliasGenerator::new(AliasConfig::default());
    AliasIndex::build(names.iter().copied(), &generator)
  }

  #[test]
  fn finds_both_entities_via_name_and_short_form() {
    let index = universe(&["Catalyst Midtown", "Square On 5th"]);
    let text = "I lived at Catalyst but my friend was at SQ5";
    let mentions = find_mentions(text, &index);

    assert!(mentions["Catalyst Midtown"] >= 0.6);
    assert!(mentions["Square On 5th"] >= 0.6);
  }

  #[test]
  fn unrelated_text_yields_no_mentions() {
    let index = universe(&["Catalyst Midtown", "Square On 5th"]);
    assert!(find_mentions("the weather is nice today", &index).is_empty());
  }

  #[test]
  fn is_idempotent() {
    let index = universe(&["Catalyst Midtown", "Square On 5th"]);
    let text = "Catalyst is fine but sq5 has better amenities";
    assert_eq!(find_mentions(text, &index), find_mentions(text, &index));
  }

  #[test]
  fn fuzzy_word_match_scales_confidence() {
    let index = universe(&["Catalyst Midtown"]);
    // "catalist" is a one-letter-off token; no alias occurs literally.
    let mentions = find_mentions("my year at catalist was loud", &index);
    let score = mentions["Catalyst Midtown"];
    assert!(score >= 0.6 && score < 1.0);
  }

  #[test]
  fn scores_never_exceed_one() {
    let index = universe(&["Catalyst Midtown"]);
    let mentions = find_mentions("catalyst midtown catalyst", &index);
    for score in mentions.values() {
      assert!(*score <= 1.0);
    }
  }

  #[test]
  fn housing_context_needs_two_distinct_keywords() {
    assert!(!has_housing_context("Random comment about pizza"));
    assert!(!has_housing_context("the rent is too high"));
    assert!(has_housing_context("The rent and parking here are great"));
    assert!(has_housing_context(
      "signed a lease, my roommate handles utilities"
    ));
  }
}
