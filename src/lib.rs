//! TernDB client core: the caller-facing document and replication layer
//! over an opaque native sync engine.
//!
//! Two concerns live here. The callback registry hands the engine a plain
//! numeric token it can safely fire state notifications through, with a
//! stale token degrading to a checked no-op instead of a dangling call. The
//! document navigator exposes a document's revision tree (lookup by id,
//! leaf enumeration for conflict branches, new revisions and tombstones)
//! while keeping the single-seat native cursor parked on the current
//! revision between operations.
//!
//! The engine itself (persistence, the replication protocol, conflict
//! resolution) stays behind the seams in [`engine`]; a deterministic
//! in-memory implementation ships in [`engine::memory`].

pub mod callbacks;
pub mod document;
pub mod engine;
pub mod error;
pub mod replication;

pub use document::{Document, Revision, RevisionFlags};
pub use error::{EngineError, Result, TernError};
pub use replication::{
  ActivityLevel, RemoteEndpoint, Replicator, ReplicatorMode, ReplicatorStatus,
};
