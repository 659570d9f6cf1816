//! Caller-facing replicator handle.

use crate::callbacks::{self, CallbackContext, CallbackToken, StateCallback};
use crate::engine::{ReplicationEngine, ReplicationSession};
use crate::error::Result;
use crate::replication::types::{RemoteEndpoint, ReplicatorMode, ReplicatorStatus};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;

type StatusCell = Arc<Mutex<ReplicatorStatus>>;
type SubscriberList = Arc<Mutex<Vec<Sender<ReplicatorStatus>>>>;

/// Owns one native replication session and the callback registration that
/// feeds it state. Both are released together at teardown, token first, so
/// no dispatch can ever race a freed session.
pub struct Replicator {
  token: CallbackToken,
  session: Option<Box<dyn ReplicationSession>>,
  status: StatusCell,
  subscribers: SubscriberList,
}

impl Replicator {
  /// Starts a replication session against `endpoint`.
  ///
  /// Until the first notification arrives the status reads as `Stopped`
  /// with no error. When session creation fails, the freshly registered
  /// callback entry is removed again before the error surfaces, so a failed
  /// construction leaves no registration behind.
  pub fn start(
    engine: &dyn ReplicationEngine,
    endpoint: &RemoteEndpoint,
    push: ReplicatorMode,
    pull: ReplicatorMode,
  ) -> Result<Replicator> {
    let status: StatusCell = Arc::new(Mutex::new(ReplicatorStatus::default()));
    let subscribers: SubscriberList = Arc::new(Mutex::new(Vec::new()));

    let context: CallbackContext = Arc::new(Arc::clone(&status));
    let fanout = Arc::clone(&subscribers);
    let callback: StateCallback = Arc::new(move |update: ReplicatorStatus, context: &CallbackContext| {
      // The registration context is the status cell itself; overwrite the
      // pair as one unit, then fan out to whoever subscribed.
      if let Some(cell) = context.downcast_ref::<StatusCell>() {
        *cell.lock() = update.clone();
      }
      tracing::trace!(level = %update.level, "replicator state notification");
      fanout
        .lock()
        .retain(|subscriber| subscriber.send(update.clone()).is_ok());
    });

    let token = callbacks::register(callback, context);
    let session = match engine.create_session(endpoint, push, pull, token) {
      Ok(session) => session,
      Err(error) => {
        callbacks::unregister(token);
        return Err(error);
      }
    };

    Ok(Replicator {
      token,
      session: Some(session),
      status,
      subscribers,
    })
  }

  /// Latest `(level, error)` snapshot pushed by the engine. Non-blocking;
  /// never calls into the native layer.
  pub fn status(&self) -> ReplicatorStatus {
    self.status.lock().clone()
  }

  /// The registry token this handle's session notifies through.
  pub fn token(&self) -> CallbackToken {
    self.token
  }

  /// Stream of status updates, one per notification from now on. Sends
  /// never block; a dropped receiver is pruned on the next dispatch.
  pub fn subscribe(&self) -> Receiver<ReplicatorStatus> {
    let (sender, receiver) = unbounded();
    self.subscribers.lock().push(sender);
    receiver
  }

  /// Releases the callback registration and then the native session, in
  /// that order. Idempotent; a stopped handle can still be observed.
  pub fn stop(&mut self) {
    callbacks::unregister(self.token);
    if let Some(mut session) = self.session.take() {
      session.close();
    }
  }
}

impl Drop for Replicator {
  fn drop(&mut self) {
    self.stop();
  }
}
