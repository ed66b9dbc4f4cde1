//! Search-term prioritisation — which aliases to feed the external searcher.
//!
//! External comment sources charge per query (rate limits), so only the ten
//! most credible terms per entity are emitted, canonical name first.

use std::collections::HashSet;

use crate::alias::AliasSet;

/// Maximum number of terms emitted per entity.
pub const MAX_SEARCH_TERMS: usize = 10;

/// Ordered `(term, confidence)` list for one entity.
///
/// The canonical lowercased name comes first at confidence 1.0, then aliases
/// with confidence ≥ 0.8, then aliases in `[0.6, 0.8)`, each bucket sorted by
/// confidence descending. Duplicate terms (case-insensitive) collapse before
/// the list is capped at [`MAX_SEARCH_TERMS`].
pub fn search_terms(
  entity_name: &str,
  aliases: &AliasSet,
) -> Vec<(String, f64)> {
  let canonical = entity_name.to_lowercase();

  let mut high: Vec<(String, f64)> = Vec::new();
  let mut medium: Vec<(String, f64)> = Vec::new();

  for (alias, confidence) in aliases.iter() {
    let term = alias.to_lowercase();
    if term.is_empty() || term == canonical {
      continue;
    }
    if confidence >= 0.8 {
      high.push((term, confidence));
    } else if confidence >= 0.6 {
      medium.push((term, confidence));
    }
  }

  high.sort_by(|a, b| b.1.total_cmp(&a.1));
  medium.sort_by(|a, b| b.1.total_cmp(&a.1));

  let mut seen = HashSet::new();
  let mut terms = Vec::new();
  for (term, confidence) in
    std::iter::once((canonical, 1.0)).chain(high).chain(medium)
  {
    if seen.insert(term.clone()) {
      terms.push((term, confidence));
      if terms.len() == MAX_SEARCH_TERMS {
        break;
      }
    }
  }

  terms
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::alias::{AliasConfig, AliasGenerator};

  fn terms_for(name: &str) -> Vec<(String, f64)> {
    let generator = AliasGenerator::new(AliasConfig::default());
    search_terms(name, &generator.generate(name))
  }

  #[test]
  fn canonical_name_comes_first_at_full_confidence() {
    let terms = terms_for("Square On 5th");
    assert_eq!(terms[0], ("square on 5th".to_owned(), 1.0));
  }

  #[test]
  fn capped_at_ten_and_sorted_descending() {
    let terms = terms_for("Catalyst Midtown Student Apartments");
    assert!(terms.len() <= MAX_SEARCH_TERMS);
    for pair in terms.windows(2) {
      assert!(pair[0].1 >= pair[1].1);
    }
  }

  #[test]
  fn no_duplicate_terms() {
    let terms = terms_for("Square On 5th");
    let mut seen = std::collections::HashSet::new();
    for (term, _) in &terms {
      assert!(seen.insert(term.clone()), "duplicate term {term:?}");
    }
  }

  #[test]
  fn low_confidence_aliases_are_excluded() {
    let terms = terms_for("Catalyst Midtown");
    for (_, confidence) in &terms {
      assert!(*confidence >= 0.6);
    }
  }
}
