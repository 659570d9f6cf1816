//! Immutable revision snapshots.

use bitflags::bitflags;
use serde_json::{Map, Value};
use std::fmt;

bitflags! {
  /// Flag bits carried by a stored revision.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct RevisionFlags: u8 {
    const DELETED = 0x01;
    const HAS_ATTACHMENTS = 0x02;
  }
}

/// One version of a document, captured at the instant the cursor was seated
/// on it.
///
/// A `Revision` is a snapshot, never a live view: the navigator is free to
/// move the underlying cursor afterwards without affecting values already
/// constructed. Re-read through the document to observe newer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
  doc_id: String,
  rev_id: String,
  flags: RevisionFlags,
  body: Option<Vec<u8>>,
}

impl Revision {
  pub(crate) fn new(
    doc_id: String,
    rev_id: String,
    flags: RevisionFlags,
    body: Option<Vec<u8>>,
  ) -> Self {
    Self {
      doc_id,
      rev_id,
      flags,
      body,
    }
  }

  pub fn doc_id(&self) -> &str {
    &self.doc_id
  }

  pub fn rev_id(&self) -> &str {
    &self.rev_id
  }

  pub fn flags(&self) -> RevisionFlags {
    self.flags
  }

  /// Whether this revision is a tombstone.
  pub fn deleted(&self) -> bool {
    self.flags.contains(RevisionFlags::DELETED)
  }

  pub fn has_attachments(&self) -> bool {
    self.flags.contains(RevisionFlags::HAS_ATTACHMENTS)
  }

  /// Raw body bytes as loaded. `None` when the revision was selected
  /// without its body, which is distinct from an empty body.
  pub fn raw_body(&self) -> Option<&[u8]> {
    self.body.as_deref()
  }

  /// Body decoded as a JSON object. Empty when the body was not loaded or
  /// does not decode to an object.
  pub fn properties(&self) -> Map<String, Value> {
    let Some(bytes) = self.body.as_deref() else {
      return Map::new();
    };
    match serde_json::from_slice::<Value>(bytes) {
      Ok(Value::Object(map)) => map,
      _ => Map::new(),
    }
  }
}

impl fmt::Display for Revision {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{{\"{}\" {}}}", self.doc_id, self.rev_id)
  }
}

#[cfg(test)]
mod tests {
  use super::{Revision, RevisionFlags};

  fn revision(flags: RevisionFlags, body: Option<&[u8]>) -> Revision {
    Revision::new(
      "doc1".to_string(),
      "1-aaaa".to_string(),
      flags,
      body.map(|bytes| bytes.to_vec()),
    )
  }

  #[test]
  fn flag_accessors() {
    let rev = revision(RevisionFlags::DELETED, Some(b"{}"));
    assert!(rev.deleted());
    assert!(!rev.has_attachments());

    let rev = revision(RevisionFlags::HAS_ATTACHMENTS, Some(b"{}"));
    assert!(!rev.deleted());
    assert!(rev.has_attachments());
  }

  #[test]
  fn properties_of_loaded_body() {
    let rev = revision(RevisionFlags::empty(), Some(br#"{"title":"fern"}"#));
    assert_eq!(
      rev.properties().get("title").and_then(|v| v.as_str()),
      Some("fern")
    );
  }

  #[test]
  fn missing_body_is_not_an_empty_body() {
    let absent = revision(RevisionFlags::empty(), None);
    assert!(absent.raw_body().is_none());
    assert!(absent.properties().is_empty());

    let empty = revision(RevisionFlags::empty(), Some(b"{}"));
    assert_eq!(empty.raw_body(), Some(b"{}".as_slice()));
    assert!(empty.properties().is_empty());
  }

  #[test]
  fn undecodable_body_yields_empty_properties() {
    let rev = revision(RevisionFlags::empty(), Some(b"not json"));
    assert!(rev.properties().is_empty());
  }

  #[test]
  fn display_names_document_and_revision() {
    let rev = revision(RevisionFlags::empty(), None);
    assert_eq!(rev.to_string(), "{\"doc1\" 1-aaaa}");
  }
}
