//! Deterministic in-memory engine used by tests and embedders.
//!
//! Implements both seams with no persistence and no network. Documents are
//! revision trees held in insertion order, and replication sessions forward
//! pushed states through the process-wide callback registry exactly the way
//! a native network thread would: synchronously, on the calling thread.

use crate::callbacks::{self, CallbackToken};
use crate::document::RevisionFlags;
use crate::engine::{DocumentCursor, ReplicationEngine, ReplicationSession, SelectedRevision};
use crate::error::{EngineError, Result, TernError};
use crate::replication::types::{ActivityLevel, RemoteEndpoint, ReplicatorMode, ReplicatorStatus};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::Arc;
use xxhash_rust::xxh64::xxh64;

// ============================================================================
// Document store
// ============================================================================

#[derive(Debug, Clone)]
struct RevNode {
  parent: Option<String>,
  generation: u64,
  body: Vec<u8>,
  deleted: bool,
  has_attachments: bool,
}

#[derive(Debug, Clone)]
struct Seat {
  rev_id: String,
  with_body: bool,
}

/// One document's full revision tree plus its single cursor seat.
#[derive(Debug)]
pub struct MemoryDocument {
  doc_id: String,
  revs: IndexMap<String, RevNode>,
  current: Option<String>,
  seat: Option<Seat>,
  fail_next_advance: Option<EngineError>,
}

impl MemoryDocument {
  pub fn new(doc_id: impl Into<String>) -> Self {
    Self {
      doc_id: doc_id.into(),
      revs: IndexMap::new(),
      current: None,
      seat: None,
      fail_next_advance: None,
    }
  }

  pub fn revision_count(&self) -> usize {
    self.revs.len()
  }

  pub fn current_rev_id(&self) -> Option<&str> {
    self.current.as_deref()
  }

  /// Arms a one-shot failure for the next leaf advance. Lets tests exercise
  /// the error paths of enumeration without a real engine fault.
  pub fn fail_next_advance(&mut self, code: i32, message: impl Into<String>) {
    self.fail_next_advance = Some(EngineError::new(code, message));
  }

  fn leaf_ids(&self) -> Vec<String> {
    let mut leaves: Vec<String> = self
      .revs
      .keys()
      .filter(|id| !self.revs.values().any(|node| node.parent.as_deref() == Some(id.as_str())))
      .cloned()
      .collect();

    // Enumeration starts at the current revision, so it must come first.
    if let Some(current) = &self.current {
      if let Some(position) = leaves.iter().position(|id| id == current) {
        let current = leaves.remove(position);
        leaves.insert(0, current);
      }
    }
    leaves
  }

  /// Live leaves beat tombstones; within a class the higher
  /// `(generation, rev_id)` pair wins. This only designates "current";
  /// conflict resolution is the engine owner's business, not this store's.
  fn recompute_current(&mut self) {
    let winner = self
      .leaf_ids()
      .into_iter()
      .max_by_key(|id| {
        let node = &self.revs[id];
        (!node.deleted, node.generation, id.clone())
      });
    self.current = winner;
  }

  fn flags_of(&self, node: &RevNode) -> RevisionFlags {
    let mut flags = RevisionFlags::empty();
    if node.deleted {
      flags |= RevisionFlags::DELETED;
    }
    if node.has_attachments {
      flags |= RevisionFlags::HAS_ATTACHMENTS;
    }
    flags
  }
}

fn generated_rev_id(generation: u64, parent_id: Option<&str>, body: &[u8], deleted: bool) -> String {
  let mut input = Vec::with_capacity(body.len() + 32);
  input.extend_from_slice(parent_id.unwrap_or("").as_bytes());
  input.push(0xff);
  input.extend_from_slice(body);
  input.push(deleted as u8);
  format!("{generation}-{:016x}", xxh64(&input, generation))
}

fn body_has_attachments(body: &[u8]) -> bool {
  serde_json::from_slice::<serde_json::Value>(body)
    .map(|value| value.get("_attachments").is_some())
    .unwrap_or(false)
}

impl DocumentCursor for MemoryDocument {
  fn doc_id(&self) -> &str {
    &self.doc_id
  }

  fn selected(&self) -> Option<SelectedRevision> {
    let seat = self.seat.as_ref()?;
    let node = self.revs.get(&seat.rev_id)?;
    Some(SelectedRevision {
      rev_id: seat.rev_id.clone(),
      flags: self.flags_of(node),
      body: seat.with_body.then(|| node.body.clone()),
    })
  }

  fn select_revision(&mut self, rev_id: &str, with_body: bool) -> Result<()> {
    if !self.revs.contains_key(rev_id) {
      return Err(TernError::NotFound);
    }
    self.seat = Some(Seat {
      rev_id: rev_id.to_string(),
      with_body,
    });
    Ok(())
  }

  fn select_next_leaf(&mut self, include_deleted: bool, with_body: bool) -> Result<bool> {
    if let Some(error) = self.fail_next_advance.take() {
      return Err(TernError::Engine(error));
    }

    let leaves = self.leaf_ids();
    let start = match &self.seat {
      Some(seat) => leaves
        .iter()
        .position(|id| *id == seat.rev_id)
        .map(|index| index + 1)
        .unwrap_or(0),
      None => 0,
    };

    for id in leaves.into_iter().skip(start) {
      let node = &self.revs[&id];
      if node.deleted && !include_deleted {
        continue;
      }
      self.seat = Some(Seat {
        rev_id: id,
        with_body,
      });
      return Ok(true);
    }
    Ok(false)
  }

  fn select_current(&mut self) {
    self.seat = self.current.clone().map(|rev_id| Seat {
      rev_id,
      with_body: true,
    });
  }

  fn put(&mut self, parent_id: Option<&str>, body: &[u8], deleted: bool) -> Result<()> {
    let generation = match parent_id {
      Some(parent) => {
        let node = self.revs.get(parent).ok_or(TernError::NotFound)?;
        node.generation + 1
      }
      None => {
        if !self.revs.is_empty() {
          return Err(TernError::engine(409, "document already has a root revision"));
        }
        1
      }
    };

    let rev_id = generated_rev_id(generation, parent_id, body, deleted);
    self.revs.insert(
      rev_id.clone(),
      RevNode {
        parent: parent_id.map(str::to_string),
        generation,
        body: body.to_vec(),
        deleted,
        has_attachments: body_has_attachments(body),
      },
    );

    self.recompute_current();
    self.seat = Some(Seat {
      rev_id,
      with_body: true,
    });
    Ok(())
  }
}

// ============================================================================
// Replication engine
// ============================================================================

#[derive(Default)]
struct EngineState {
  session_tokens: Vec<CallbackToken>,
  last_notify_token: Option<CallbackToken>,
}

/// Replication engine whose "network thread" is whoever calls
/// [`MemoryReplicationEngine::push_state`].
#[derive(Default)]
pub struct MemoryReplicationEngine {
  state: Arc<Mutex<EngineState>>,
}

impl MemoryReplicationEngine {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn open_sessions(&self) -> usize {
    self.state.lock().session_tokens.len()
  }

  /// Token offered with the most recent `create_session` call, accepted or
  /// not. Diagnostics only.
  pub fn last_notify_token(&self) -> Option<CallbackToken> {
    self.state.lock().last_notify_token
  }

  /// Pushes a state notification to every open session, dispatching through
  /// the registry on the calling thread.
  pub fn push_state(&self, level: ActivityLevel, error: Option<EngineError>) {
    let tokens = self.state.lock().session_tokens.clone();
    for token in tokens {
      callbacks::dispatch(token, ReplicatorStatus::new(level, error.clone()));
    }
  }
}

impl ReplicationEngine for MemoryReplicationEngine {
  fn create_session(
    &self,
    endpoint: &RemoteEndpoint,
    _push: ReplicatorMode,
    _pull: ReplicatorMode,
    notify_token: CallbackToken,
  ) -> Result<Box<dyn ReplicationSession>> {
    self.state.lock().last_notify_token = Some(notify_token);

    if endpoint.url.is_empty() || endpoint.database.is_empty() {
      return Err(TernError::SessionCreation(format!(
        "unreachable endpoint: {endpoint}"
      )));
    }

    self.state.lock().session_tokens.push(notify_token);

    // A native session announces itself before any network progress.
    callbacks::dispatch(
      notify_token,
      ReplicatorStatus::new(ActivityLevel::Connecting, None),
    );

    Ok(Box::new(MemorySession {
      token: notify_token,
      state: Arc::clone(&self.state),
      closed: false,
    }))
  }
}

struct MemorySession {
  token: CallbackToken,
  state: Arc<Mutex<EngineState>>,
  closed: bool,
}

impl ReplicationSession for MemorySession {
  fn close(&mut self) {
    if self.closed {
      return;
    }
    self.closed = true;
    let mut state = self.state.lock();
    state.session_tokens.retain(|token| *token != self.token);
  }
}

impl Drop for MemorySession {
  fn drop(&mut self) {
    self.close();
  }
}
