//! Token-indexed registry bridging engine notifications to caller callbacks.
//!
//! The native engine can only carry plain data back across its boundary, so
//! a live callback+context pair is addressed by a monotonically assigned
//! integer token instead of a reference. A dispatch for a token that has
//! already been unregistered is a silent no-op: a notification racing with
//! teardown is expected, not exceptional.

use crate::replication::types::ReplicatorStatus;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Opaque handle the engine holds in place of a callback reference.
/// Token 0 is never issued.
pub type CallbackToken = u64;

/// Opaque caller payload handed back verbatim on every dispatch.
pub type CallbackContext = Arc<dyn Any + Send + Sync>;

/// State callback. Runs synchronously on whatever thread the engine
/// dispatches from, so it must not block for long.
pub type StateCallback = Arc<dyn Fn(ReplicatorStatus, &CallbackContext) + Send + Sync>;

#[derive(Clone)]
struct Entry {
  callback: StateCallback,
  context: CallbackContext,
}

pub struct CallbackRegistry {
  next_token: AtomicU64,
  entries: Mutex<HashMap<CallbackToken, Entry>>,
}

impl CallbackRegistry {
  pub fn new() -> Self {
    Self {
      next_token: AtomicU64::new(1),
      entries: Mutex::new(HashMap::new()),
    }
  }

  /// Process-wide registry. Tokens issued here are unique for the lifetime
  /// of the process, even after their entries are removed.
  pub fn global() -> &'static CallbackRegistry {
    static GLOBAL: OnceLock<CallbackRegistry> = OnceLock::new();
    GLOBAL.get_or_init(CallbackRegistry::new)
  }

  /// Arms a notification channel and returns its token.
  pub fn register(&self, callback: StateCallback, context: CallbackContext) -> CallbackToken {
    let token = self.next_token.fetch_add(1, Ordering::SeqCst);
    self.entries.lock().insert(token, Entry { callback, context });
    token
  }

  /// Invokes the callback registered under `token`, on the calling thread.
  ///
  /// Returns `false` when the token is no longer registered. The entry is
  /// cloned out under the lock and invoked outside it, so a dispatch racing
  /// an `unregister` either captured the entry first and runs exactly once,
  /// or observes the removal and does nothing.
  pub fn dispatch(&self, token: CallbackToken, status: ReplicatorStatus) -> bool {
    let entry = self.entries.lock().get(&token).cloned();
    match entry {
      Some(entry) => {
        (entry.callback)(status, &entry.context);
        true
      }
      None => {
        tracing::debug!(token, "dropping notification for unregistered token");
        false
      }
    }
  }

  /// Removes the entry for `token`. Idempotent; returns whether an entry
  /// was present.
  pub fn unregister(&self, token: CallbackToken) -> bool {
    self.entries.lock().remove(&token).is_some()
  }

  pub fn contains(&self, token: CallbackToken) -> bool {
    self.entries.lock().contains_key(&token)
  }

  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.lock().is_empty()
  }
}

impl Default for CallbackRegistry {
  fn default() -> Self {
    Self::new()
  }
}

/// Registers against the process-wide registry.
pub fn register(callback: StateCallback, context: CallbackContext) -> CallbackToken {
  CallbackRegistry::global().register(callback, context)
}

/// Dispatch entry point for engines holding only the numeric token.
pub fn dispatch(token: CallbackToken, status: ReplicatorStatus) -> bool {
  CallbackRegistry::global().dispatch(token, status)
}

pub fn unregister(token: CallbackToken) -> bool {
  CallbackRegistry::global().unregister(token)
}
