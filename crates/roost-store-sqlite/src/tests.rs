//! Integration tests for `SqliteStore` against an in-memory database.

use roost_core::grid::{
  GridStore, NewValidation, ValidationStatus, validation_id,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn validation(source: &str, mentioned: &str, text: &str) -> NewValidation {
  NewValidation::new(source, mentioned, text, 0.8)
}

// ─── Entities ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_list_entities_preserves_order() {
  let s = store().await;
  s.register_entities(vec![
    "Catalyst Midtown".into(),
    "Square On 5th".into(),
    "The Connector".into(),
  ])
  .await
  .unwrap();

  let names: Vec<String> = s
    .list_entities()
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.name)
    .collect();
  assert_eq!(names, ["Catalyst Midtown", "Square On 5th", "The Connector"]);
}

#[tokio::test]
async fn registering_twice_does_not_duplicate() {
  let s = store().await;
  s.register_entities(vec!["A".into(), "B".into()]).await.unwrap();
  s.register_entities(vec!["B".into(), "C".into()]).await.unwrap();

  let names: Vec<String> = s
    .list_entities()
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.name)
    .collect();
  assert_eq!(names, ["A", "B", "C"]);
}

// ─── Recording ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_updates_cell_statistics() {
  let s = store().await;

  let mut input = validation("A", "B", "first comment");
  input.confidence_score = 0.9;
  s.record_validation(input).await.unwrap();

  let mut input = validation("A", "B", "second comment");
  input.confidence_score = 0.7;
  s.record_validation(input).await.unwrap();

  let cell = s.get_cell("A", "B").await.unwrap();
  assert_eq!(cell.comment_count, 2);
  assert_eq!(cell.verified_count, 0);
  assert!((cell.confidence_sum - 1.6).abs() < 1e-9);
  assert!((cell.average_confidence - 0.8).abs() < 1e-9);
  assert!(cell.last_updated.is_some());
}

#[tokio::test]
async fn same_id_twice_is_idempotent() {
  let s = store().await;

  let first = s
    .record_validation(validation("A", "B", "the same comment"))
    .await
    .unwrap();
  let second = s
    .record_validation(validation("A", "B", "the same comment"))
    .await
    .unwrap();

  assert_eq!(first.id, second.id);
  assert_eq!(first.raw_text, second.raw_text);

  let cell = s.get_cell("A", "B").await.unwrap();
  assert_eq!(cell.comment_count, 1);
}

#[tokio::test]
async fn distinct_ids_for_same_pair_both_count() {
  let s = store().await;
  s.record_validation(validation("A", "B", "one comment"))
    .await
    .unwrap();
  s.record_validation(validation("A", "B", "another comment"))
    .await
    .unwrap();

  let cell = s.get_cell("A", "B").await.unwrap();
  assert_eq!(cell.comment_count, 2);
}

#[tokio::test]
async fn derived_id_matches_core_derivation() {
  let s = store().await;
  let record = s
    .record_validation(validation("A", "B", "comment body"))
    .await
    .unwrap();
  assert_eq!(record.id, validation_id("A", "B", "comment body"));
}

#[tokio::test]
async fn verified_at_insert_increments_verified_count() {
  let s = store().await;
  let mut input = validation("A", "B", "already reviewed");
  input.status = ValidationStatus::Verified;
  s.record_validation(input).await.unwrap();

  let cell = s.get_cell("A", "B").await.unwrap();
  assert_eq!(cell.comment_count, 1);
  assert_eq!(cell.verified_count, 1);
}

#[tokio::test]
async fn unknown_entities_grow_the_grid_lazily() {
  let s = store().await;
  s.register_entities(vec!["A".into()]).await.unwrap();

  // Neither side registered up front; also legal as a self-pair.
  s.record_validation(validation("X", "X", "self reference"))
    .await
    .unwrap();

  let names: Vec<String> = s
    .list_entities()
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.name)
    .collect();
  assert_eq!(names, ["A", "X"]);

  let cell = s.get_cell("X", "X").await.unwrap();
  assert_eq!(cell.comment_count, 1);
}

#[tokio::test]
async fn external_ids_round_trip() {
  let s = store().await;
  let mut input = validation("A", "B", "from reddit");
  input.post_id = Some("t3_abc".into());
  input.comment_id = Some("t1_def".into());
  s.record_validation(input).await.unwrap();

  let records = s.records_for_source("A").await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].post_id.as_deref(), Some("t3_abc"));
  assert_eq!(records[0].comment_id.as_deref(), Some("t1_def"));
}

// ─── Status transitions ──────────────────────────────────────────────────────

#[tokio::test]
async fn verify_pending_record_bumps_cell() {
  let s = store().await;
  let record = s
    .record_validation(validation("A", "B", "pending comment"))
    .await
    .unwrap();

  let updated = s
    .set_status(&record.id, ValidationStatus::Verified)
    .await
    .unwrap();
  assert_eq!(updated.status, ValidationStatus::Verified);

  let cell = s.get_cell("A", "B").await.unwrap();
  assert_eq!(cell.comment_count, 1);
  assert_eq!(cell.verified_count, 1);
}

#[tokio::test]
async fn invalidate_pending_record_leaves_verified_count() {
  let s = store().await;
  let record = s
    .record_validation(validation("A", "B", "bad comment"))
    .await
    .unwrap();

  s.set_status(&record.id, ValidationStatus::Invalid)
    .await
    .unwrap();

  let cell = s.get_cell("A", "B").await.unwrap();
  assert_eq!(cell.verified_count, 0);

  let records = s.records_for_source("A").await.unwrap();
  assert_eq!(records[0].status, ValidationStatus::Invalid);
}

#[tokio::test]
async fn status_transition_is_terminal() {
  let s = store().await;
  let record = s
    .record_validation(validation("A", "B", "reviewed once"))
    .await
    .unwrap();
  s.set_status(&record.id, ValidationStatus::Verified)
    .await
    .unwrap();

  let err = s
    .set_status(&record.id, ValidationStatus::Invalid)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::StatusFinal { .. }));
}

#[tokio::test]
async fn set_status_unknown_record_errors() {
  let s = store().await;
  let err = s
    .set_status("no-such-id", ValidationStatus::Verified)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::RecordNotFound(_)));
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_cell_unknown_pair_is_zero() {
  let s = store().await;
  let cell = s.get_cell("A", "B").await.unwrap();
  assert_eq!(cell.comment_count, 0);
  assert_eq!(cell.average_confidence, 0.0);
  assert!(cell.last_updated.is_none());
}

#[tokio::test]
async fn records_for_source_in_insertion_order() {
  let s = store().await;
  s.record_validation(validation("A", "B", "first"))
    .await
    .unwrap();
  s.record_validation(validation("A", "C", "second"))
    .await
    .unwrap();
  s.record_validation(validation("B", "A", "unrelated source"))
    .await
    .unwrap();

  let records = s.records_for_source("A").await.unwrap();
  let texts: Vec<&str> =
    records.iter().map(|r| r.raw_text.as_str()).collect();
  assert_eq!(texts, ["first", "second"]);
}

#[tokio::test]
async fn top_pairs_ordered_by_count_then_first_seen() {
  let s = store().await;
  s.record_validation(validation("A", "B", "one")).await.unwrap();
  s.record_validation(validation("A", "B", "two")).await.unwrap();
  s.record_validation(validation("A", "C", "three")).await.unwrap();

  let top = s.top_pairs(1).await.unwrap();
  assert_eq!(top.len(), 1);
  assert_eq!((top[0].source.as_str(), top[0].mentioned.as_str()), ("A", "B"));
  assert_eq!(top[0].cell.comment_count, 2);

  let all = s.top_pairs(10).await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all[1].cell.comment_count, 1);

  // Equal counts fall back to first-observation order.
  s.record_validation(validation("A", "C", "four")).await.unwrap();
  let tied = s.top_pairs(10).await.unwrap();
  assert_eq!(
    (tied[0].source.as_str(), tied[0].mentioned.as_str()),
    ("A", "B")
  );
}
