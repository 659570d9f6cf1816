//! Read-side navigation: current revision, lookup by id, leaf enumeration.

use super::{snapshot_selected, Document, RestoreCurrent, Revision};
use crate::engine::DocumentCursor;
use crate::error::{Result, TernError};

impl<C: DocumentCursor> Document<C> {
  /// The tip of the winning branch, or none for a document with no
  /// revisions.
  ///
  /// The cursor is always left seated on the current revision between
  /// operations, so this is a plain snapshot with no movement.
  pub fn current_revision(&self) -> Option<Revision> {
    snapshot_selected(&self.cursor)
  }

  /// Looks up one revision by id.
  ///
  /// A missing id is the documented no-match outcome, `Ok(None)`, not a
  /// fault. Any other engine failure propagates. Either way the current
  /// selection is restored before this returns.
  pub fn revision_with_id(&mut self, rev_id: &str, with_body: bool) -> Result<Option<Revision>> {
    let mut cursor = RestoreCurrent::new(&mut self.cursor);
    match cursor.select_revision(rev_id, with_body) {
      Ok(()) => {}
      Err(TernError::NotFound) => return Ok(None),
      Err(error) => return Err(error),
    }
    Ok(snapshot_selected(&*cursor))
  }

  /// Every branch tip of the revision tree, in the engine's enumeration
  /// order starting from the current revision.
  ///
  /// Each seated leaf is snapshotted before the next advance invalidates
  /// the seat. A failing advance restores the current selection before the
  /// error surfaces, so enumeration can never leave the tree parked on an
  /// arbitrary branch.
  pub fn leaf_revisions(
    &mut self,
    include_deleted: bool,
    with_bodies: bool,
  ) -> Result<Vec<Revision>> {
    let mut revs = Vec::new();
    let mut cursor = RestoreCurrent::new(&mut self.cursor);

    while let Some(rev) = snapshot_selected(&*cursor) {
      if include_deleted || !rev.deleted() {
        revs.push(rev);
      }
      if !cursor.select_next_leaf(include_deleted, with_bodies)? {
        break;
      }
    }
    Ok(revs)
  }
}
