//! Document navigator over a single-seat native cursor.
//!
//! The cursor behind a document is shared mutable state: every operation
//! that moves it runs inside a restore scope so the designated current
//! revision is seated again on every exit path, error or not. Leaving the
//! cursor parked on a side branch would corrupt later unrelated reads.
//!
//! Concurrent use of one document must be serialized around whole
//! select/read/restore sequences; the moving operations take `&mut self`,
//! which enforces that within safe code.

mod read;
mod revision;
mod write;

pub use revision::{Revision, RevisionFlags};

use crate::engine::DocumentCursor;

pub struct Document<C: DocumentCursor> {
  cursor: C,
}

impl<C: DocumentCursor> Document<C> {
  /// Wraps a native cursor, seating the document's current revision so the
  /// selection invariant holds from the start.
  pub fn new(mut cursor: C) -> Self {
    cursor.select_current();
    Self { cursor }
  }

  pub fn doc_id(&self) -> &str {
    self.cursor.doc_id()
  }

  /// Hands the cursor back, e.g. to reuse the underlying store.
  pub fn into_cursor(self) -> C {
    self.cursor
  }
}

/// Builds a [`Revision`] snapshot from whatever the cursor is seated on.
/// Revisions with an empty id are engine garbage and read as none.
fn snapshot_selected<C: DocumentCursor>(cursor: &C) -> Option<Revision> {
  let selected = cursor.selected()?;
  if selected.rev_id.is_empty() {
    return None;
  }
  Some(Revision::new(
    cursor.doc_id().to_string(),
    selected.rev_id,
    selected.flags,
    selected.body,
  ))
}

/// Re-seats the document's current revision when the scope ends, on every
/// exit path.
struct RestoreCurrent<'a, C: DocumentCursor> {
  cursor: &'a mut C,
}

impl<'a, C: DocumentCursor> RestoreCurrent<'a, C> {
  fn new(cursor: &'a mut C) -> Self {
    Self { cursor }
  }
}

impl<C: DocumentCursor> Drop for RestoreCurrent<'_, C> {
  fn drop(&mut self) {
    self.cursor.select_current();
  }
}

impl<C: DocumentCursor> std::ops::Deref for RestoreCurrent<'_, C> {
  type Target = C;

  fn deref(&self) -> &C {
    self.cursor
  }
}

impl<C: DocumentCursor> std::ops::DerefMut for RestoreCurrent<'_, C> {
  fn deref_mut(&mut self) -> &mut C {
    self.cursor
  }
}
