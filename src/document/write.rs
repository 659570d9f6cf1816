//! Write-side navigation: creating child revisions and tombstones.

use super::{snapshot_selected, Document, RestoreCurrent, Revision};
use crate::engine::DocumentCursor;
use crate::error::{Result, TernError};
use serde_json::Value;

impl<C: DocumentCursor> Document<C> {
  /// Creates a new revision under the presently selected one (or roots an
  /// empty document) and returns it as read back from the cursor.
  ///
  /// The body is encoded to the engine's JSON wire form before submission.
  /// After a successful put the engine seats the new revision; restoring
  /// the current selection then lands on it whenever it wins the tree.
  pub fn put(&mut self, body: &Value, deleted: bool) -> Result<Revision> {
    let parent = self.cursor.selected().map(|selected| selected.rev_id);
    self.put_child_of(parent.as_deref(), body, deleted)
  }

  /// Creates a child of an explicit parent revision. Targeting a parent
  /// that already has children starts a new conflict branch, which the
  /// engine contract permits.
  pub fn put_child_of(
    &mut self,
    parent_id: Option<&str>,
    body: &Value,
    deleted: bool,
  ) -> Result<Revision> {
    let encoded = serde_json::to_vec(body)
      .map_err(|error| TernError::Serialization(format!("encode revision body: {error}")))?;

    let mut cursor = RestoreCurrent::new(&mut self.cursor);
    cursor.put(parent_id, &encoded, deleted)?;
    snapshot_selected(&*cursor)
      .ok_or_else(|| TernError::engine(500, "put left no revision seated"))
  }

  /// Appends a tombstone to the current branch. History is retained; the
  /// tree just gains a deleted leaf.
  pub fn delete(&mut self) -> Result<Revision> {
    self.put(&Value::Object(serde_json::Map::new()), true)
  }
}
