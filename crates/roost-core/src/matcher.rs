//! Fuzzy matching of a query term against the entity universe.
//!
//! Scores live on an integer 0–100 scale (an exact match is 100, everything
//! else is a normalized edit-distance ratio). This is a different scale from
//! the 0–1 alias confidence weights; the mention detector converts between
//! the two by dividing a ratio by 100 at the point of use.

use crate::alias::AliasIndex;

/// One ranked candidate from [`find_best_match`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
  pub entity:     String,
  /// Similarity on the 0–100 integer scale.
  pub score:      u8,
  /// The alias that produced the best score.
  pub alias:      String,
  /// Generator confidence of that alias (0–1 scale).
  pub confidence: f64,
}

/// Normalized Levenshtein similarity scaled to 0–100.
pub fn similarity(a: &str, b: &str) -> u8 {
  if a == b {
    return 100;
  }
  (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8
}

/// Rank every entity whose best-scoring alias clears `threshold`.
///
/// The single best alias per entity is kept. Results are sorted by score
/// descending; ties keep universe order (stable sort). An empty result is
/// the expected no-match outcome, not an error.
pub fn find_best_match(
  query: &str,
  universe: &AliasIndex,
  threshold: u8,
) -> Vec<MatchCandidate> {
  let query = query.to_lowercase();
  let mut matches = Vec::new();

  for (entity, set) in universe.iter() {
    let mut best: Option<MatchCandidate> = None;

    for (alias, confidence) in set.iter() {
      if alias.is_empty() {
        continue;
      }
      // Initialism aliases are stored upper-case; compare case-insensitively.
      let alias_lower = alias.to_lowercase();
      let score = similarity(&query, &alias_lower);

      if best.as_ref().is_none_or(|b| score > b.score) {
        best = Some(MatchCandidate {
          entity: entity.to_owned(),
          score,
          alias: alias.to_owned(),
          confidence,
        });
      }
    }

    if let Some(candidate) = best {
      if candidate.score >= threshold {
        matches.push(candidate);
      }
    }
  }

  matches.sort_by(|a, b| b.score.cmp(&a.score));
  matches
}
