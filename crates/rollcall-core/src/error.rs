//! Error types for `rollcall-core`.
//!
//! Variants are specific (which record, which field) but every one of them
//! classifies into one of the four categories callers surface to operators:
//! validation, conflict, not-found, network. `Error::kind` is the mapping.

use thiserror::Error;

use crate::record::{RecordId, Role};

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("username {0:?} is already taken")]
  DuplicateUsername(String),

  #[error("account {id} has role {role}, which cannot be linked to a teacher record")]
  IneligibleRole { id: RecordId, role: Role },

  #[error("teacher record {0} is already linked to account {1}")]
  AlreadyLinked(RecordId, RecordId),

  #[error("account {0} is already bound to a teacher record")]
  AccountAlreadyBound(RecordId),

  #[error("teacher record not found: {0}")]
  TeacherNotFound(RecordId),

  #[error("account not found: {0}")]
  AccountNotFound(RecordId),

  /// A failure the remote store already classified; the category and the
  /// store's message are preserved verbatim.
  #[error("{message}")]
  Remote { kind: ErrorKind, message: String },

  /// Backend-internal store failure; surfaced like a transport fault.
  #[error("store error: {0}")]
  Store(String),

  #[error("network error: {0}")]
  Network(String),
}

/// The four categories of the operator-facing error contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  Conflict,
  NotFound,
  Network,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::MissingField(_)
      | Error::DuplicateUsername(_)
      | Error::IneligibleRole { .. } => ErrorKind::Validation,
      Error::AlreadyLinked(_, _) | Error::AccountAlreadyBound(_) => {
        ErrorKind::Conflict
      }
      Error::TeacherNotFound(_) | Error::AccountNotFound(_) => {
        ErrorKind::NotFound
      }
      Error::Remote { kind, .. } => *kind,
      Error::Store(_) | Error::Network(_) => ErrorKind::Network,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
