//! Replicator state and mode value types.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Activity reported by the engine for one replication session.
///
/// `Stopped` is both the initial and the terminal level; a stopped session
/// can still be observed. Transitions are driven exclusively by engine
/// notifications, never inferred locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ActivityLevel {
  #[default]
  Stopped,
  Offline,
  Connecting,
  Idle,
  Busy,
}

impl fmt::Display for ActivityLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let value = match self {
      ActivityLevel::Stopped => "stopped",
      ActivityLevel::Offline => "offline",
      ActivityLevel::Connecting => "connecting",
      ActivityLevel::Idle => "idle",
      ActivityLevel::Busy => "busy",
    };
    write!(f, "{value}")
  }
}

impl FromStr for ActivityLevel {
  type Err = StateParseError;

  fn from_str(raw: &str) -> Result<Self, Self::Err> {
    match raw {
      "stopped" => Ok(Self::Stopped),
      "offline" => Ok(Self::Offline),
      "connecting" => Ok(Self::Connecting),
      "idle" => Ok(Self::Idle),
      "busy" => Ok(Self::Busy),
      _ => Err(StateParseError::new(format!(
        "invalid activity level: {raw}"
      ))),
    }
  }
}

/// Direction mode for one side (push or pull) of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReplicatorMode {
  #[default]
  Disabled,
  Passive,
  OneShot,
  Continuous,
}

impl fmt::Display for ReplicatorMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let value = match self {
      ReplicatorMode::Disabled => "disabled",
      ReplicatorMode::Passive => "passive",
      ReplicatorMode::OneShot => "one-shot",
      ReplicatorMode::Continuous => "continuous",
    };
    write!(f, "{value}")
  }
}

impl FromStr for ReplicatorMode {
  type Err = StateParseError;

  fn from_str(raw: &str) -> Result<Self, Self::Err> {
    match raw {
      "disabled" => Ok(Self::Disabled),
      "passive" => Ok(Self::Passive),
      "one-shot" => Ok(Self::OneShot),
      "continuous" => Ok(Self::Continuous),
      _ => Err(StateParseError::new(format!(
        "invalid replicator mode: {raw}"
      ))),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateParseError {
  message: String,
}

impl StateParseError {
  fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

impl fmt::Display for StateParseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.message)
  }
}

impl std::error::Error for StateParseError {}

/// Latest `(level, error)` pair pushed by the engine. The two fields are
/// written and read as one unit so a reader never sees a level from one
/// notification paired with an error from another.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplicatorStatus {
  pub level: ActivityLevel,
  pub error: Option<EngineError>,
}

impl ReplicatorStatus {
  pub fn new(level: ActivityLevel, error: Option<EngineError>) -> Self {
    Self { level, error }
  }
}

impl fmt::Display for ReplicatorStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.error {
      Some(error) => write!(f, "{} ({error})", self.level),
      None => write!(f, "{}", self.level),
    }
  }
}

/// Remote database a session replicates against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteEndpoint {
  pub url: String,
  pub database: String,
}

impl RemoteEndpoint {
  pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
    Self {
      url: url.into(),
      database: database.into(),
    }
  }
}

impl fmt::Display for RemoteEndpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.url, self.database)
  }
}
