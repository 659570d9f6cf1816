use serde_json::json;
use terndb::engine::memory::MemoryDocument;
use terndb::engine::DocumentCursor;
use terndb::{Document, TernError};

/// Tree fixture: root -> { live leaf, tombstone leaf }. Returns the wrapped
/// navigator plus the three revision ids.
fn conflicted_doc() -> (Document<MemoryDocument>, String, String, String) {
  let mut store = MemoryDocument::new("doc1");
  store.put(None, br#"{"v":1}"#, false).expect("root");
  let root = store.selected().expect("seated").rev_id;

  store
    .put(Some(&root), br#"{"v":2,"writer":"a"}"#, false)
    .expect("live leaf");
  let live = store.selected().expect("seated").rev_id;

  store.put(Some(&root), b"{}", true).expect("tombstone leaf");
  let tombstone = store.selected().expect("seated").rev_id;

  (Document::new(store), root, live, tombstone)
}

#[test]
fn current_revision_is_the_winning_leaf() {
  let (doc, _root, live, _tombstone) = conflicted_doc();

  let current = doc.current_revision().expect("has current");
  assert_eq!(current.rev_id(), live);
  assert!(!current.deleted());

  // A plain read moves nothing.
  let again = doc.current_revision().expect("still current");
  assert_eq!(again.rev_id(), live);
}

#[test]
fn revision_with_id_returns_the_named_revision() {
  let (mut doc, root, live, _tombstone) = conflicted_doc();

  let rev = doc
    .revision_with_id(&root, true)
    .expect("lookup")
    .expect("root exists");
  assert_eq!(rev.rev_id(), root);
  assert_eq!(
    rev.properties().get("v").and_then(|v| v.as_i64()),
    Some(1)
  );

  // The side-branch read left the cursor back on the current revision.
  assert_eq!(doc.current_revision().expect("current").rev_id(), live);
}

#[test]
fn revision_with_id_missing_is_none_not_an_error() {
  let (mut doc, _root, live, _tombstone) = conflicted_doc();

  let missing = doc
    .revision_with_id("9-doesnotexist0000", true)
    .expect("no hard failure");
  assert!(missing.is_none());
  assert_eq!(doc.current_revision().expect("current").rev_id(), live);
}

#[test]
fn revision_loaded_without_body_has_none_body() {
  let (mut doc, root, _live, _tombstone) = conflicted_doc();

  let rev = doc
    .revision_with_id(&root, false)
    .expect("lookup")
    .expect("root exists");
  assert!(rev.raw_body().is_none());
  assert!(rev.properties().is_empty());
}

#[test]
fn leaf_enumeration_filters_tombstones_unless_asked() {
  let (mut doc, _root, live, tombstone) = conflicted_doc();
  let before = doc.current_revision().expect("current before");

  let visible = doc.leaf_revisions(false, true).expect("live leaves");
  assert_eq!(
    visible.iter().map(|rev| rev.rev_id()).collect::<Vec<_>>(),
    vec![live.as_str()]
  );
  assert!(visible.iter().all(|rev| !rev.deleted()));

  let all = doc.leaf_revisions(true, true).expect("all leaves");
  assert_eq!(
    all.iter().map(|rev| rev.rev_id()).collect::<Vec<_>>(),
    vec![live.as_str(), tombstone.as_str()]
  );

  let after = doc.current_revision().expect("current after");
  assert_eq!(before.rev_id(), after.rev_id());
}

#[test]
fn failed_enumeration_still_restores_the_current_selection() {
  let mut store = MemoryDocument::new("doc1");
  store.put(None, br#"{"v":1}"#, false).expect("root");
  let root = store.selected().expect("seated").rev_id;
  store
    .put(Some(&root), br#"{"v":2}"#, false)
    .expect("leaf");
  let live = store.selected().expect("seated").rev_id;
  store.fail_next_advance(500, "cursor advance failed");

  let mut doc = Document::new(store);
  let error = doc.leaf_revisions(true, true).expect_err("advance fails");
  assert!(matches!(error, TernError::Engine(ref e) if e.code == 500));

  assert_eq!(doc.current_revision().expect("current").rev_id(), live);
}

#[test]
fn put_then_lookup_round_trips_the_body() {
  let mut doc = Document::new(MemoryDocument::new("doc2"));
  let body = json!({"title": "nest", "count": 3});

  let root = doc.put(&body, false).expect("root put");
  let created = doc.put(&json!({"title": "nest", "count": 4}), false).expect("child put");
  assert_ne!(root.rev_id(), created.rev_id());

  let read_back = doc
    .revision_with_id(created.rev_id(), true)
    .expect("lookup")
    .expect("created revision exists");
  assert_eq!(read_back.raw_body(), created.raw_body());
  assert_eq!(
    read_back.properties().get("count").and_then(|v| v.as_i64()),
    Some(4)
  );
}

#[test]
fn put_moves_the_current_designation() {
  let mut doc = Document::new(MemoryDocument::new("doc3"));
  doc.put(&json!({"v": 1}), false).expect("root");
  let child = doc.put(&json!({"v": 2}), false).expect("child");

  assert_eq!(
    doc.current_revision().expect("current").rev_id(),
    child.rev_id()
  );
}

#[test]
fn explicit_parent_put_starts_a_conflict_branch() {
  let mut doc = Document::new(MemoryDocument::new("doc4"));
  let root = doc.put(&json!({"v": 1}), false).expect("root");
  let first = doc.put(&json!({"writer": "a"}), false).expect("first child");

  let second = doc
    .put_child_of(Some(root.rev_id()), &json!({"writer": "b"}), false)
    .expect("branching put");
  assert_ne!(second.rev_id(), first.rev_id());
  assert!(second.rev_id().starts_with("2-"));

  let leaves = doc.leaf_revisions(true, true).expect("leaves");
  assert_eq!(leaves.len(), 2);
}

#[test]
fn delete_appends_a_tombstone_and_keeps_history() {
  let mut doc = Document::new(MemoryDocument::new("doc5"));
  let root = doc.put(&json!({"v": 1}), false).expect("root");

  let tombstone = doc.delete().expect("delete");
  assert!(tombstone.deleted());
  assert!(tombstone.properties().is_empty());
  assert!(tombstone.rev_id().starts_with("2-"));

  // History is intact and the tombstone is now the current revision.
  let old = doc
    .revision_with_id(root.rev_id(), true)
    .expect("lookup")
    .expect("root retained");
  assert_eq!(old.rev_id(), root.rev_id());
  assert_eq!(
    doc.current_revision().expect("current").rev_id(),
    tombstone.rev_id()
  );

  // All leaves are deleted, so the filtered enumeration is empty.
  assert!(doc.leaf_revisions(false, true).expect("leaves").is_empty());
}

#[test]
fn revisions_are_snapshots_not_live_views() {
  let mut doc = Document::new(MemoryDocument::new("doc6"));
  doc.put(&json!({"v": 1}), false).expect("root");
  let before = doc.current_revision().expect("current");

  doc.put(&json!({"v": 2}), false).expect("child");

  // The earlier value still reflects the instant it was captured.
  assert_eq!(
    before.properties().get("v").and_then(|v| v.as_i64()),
    Some(1)
  );
  assert_ne!(
    before.rev_id(),
    doc.current_revision().expect("current").rev_id()
  );
}

#[test]
fn empty_document_reads_as_empty() {
  let mut doc = Document::new(MemoryDocument::new("doc7"));

  assert!(doc.current_revision().is_none());
  assert!(doc.leaf_revisions(true, true).expect("leaves").is_empty());
  assert!(doc
    .revision_with_id("1-0000000000000000", true)
    .expect("lookup")
    .is_none());
  assert_eq!(doc.doc_id(), "doc7");
}
