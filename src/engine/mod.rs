//! Seams onto the native storage/replication engine.
//!
//! The engine runs its own threads and can only hand plain data back across
//! the boundary, so everything here is expressed in terms of callback tokens
//! and value types. Real deployments back these traits with FFI; the
//! [`memory`] implementation backs them with a deterministic in-process
//! store.

pub mod memory;

use crate::callbacks::CallbackToken;
use crate::document::RevisionFlags;
use crate::error::Result;
use crate::replication::types::{RemoteEndpoint, ReplicatorMode};

/// Raw view of the revision a cursor is seated on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedRevision {
  pub rev_id: String,
  pub flags: RevisionFlags,
  /// `None` when the revision was seated without loading its body.
  pub body: Option<Vec<u8>>,
}

/// Single-seat cursor over one document's revision tree.
///
/// The cursor is shared mutable state: whoever moves it affects every later
/// read through the same handle. It is not thread-safe; callers serialize
/// access around whole select/read/restore sequences, which
/// [`crate::document::Document`] does by taking `&mut self` on every moving
/// operation.
pub trait DocumentCursor {
  fn doc_id(&self) -> &str;

  /// Snapshot of the currently seated revision, if any. Does not move the
  /// cursor.
  fn selected(&self) -> Option<SelectedRevision>;

  /// Seats the cursor on `rev_id`. Fails with [`crate::TernError::NotFound`]
  /// when the id is absent from the tree.
  fn select_revision(&mut self, rev_id: &str, with_body: bool) -> Result<()>;

  /// Advances to the next leaf in the engine's enumeration order.
  /// `Ok(false)` means the enumeration is exhausted; the seat is unchanged.
  fn select_next_leaf(&mut self, include_deleted: bool, with_body: bool) -> Result<bool>;

  /// Re-seats the designated current revision (the tip of the winning
  /// branch).
  fn select_current(&mut self);

  /// Stores a new revision under `parent_id` (`None` roots an empty tree)
  /// and seats the cursor on it.
  fn put(&mut self, parent_id: Option<&str>, body: &[u8], deleted: bool) -> Result<()>;
}

/// Owned native replication session. `close` releases the native resources;
/// implementations also close on drop.
pub trait ReplicationSession: Send {
  fn close(&mut self);
}

/// Factory for replication sessions.
pub trait ReplicationEngine: Send + Sync {
  /// Starts a session against `endpoint` that reports every state change by
  /// dispatching `notify_token` through the callback registry, on a thread
  /// the engine owns.
  fn create_session(
    &self,
    endpoint: &RemoteEndpoint,
    push: ReplicatorMode,
    pull: ReplicatorMode,
    notify_token: CallbackToken,
  ) -> Result<Box<dyn ReplicationSession>>;
}
