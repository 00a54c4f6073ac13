//! The `DirectoryStore` and `AccountStore` traits.
//!
//! The traits are implemented by backends (`rollcall-store-http` against the
//! remote API, `rollcall-store-memory` in-process). Higher layers depend on
//! these abstractions, not on any concrete backend.
//!
//! Unlike a storage-engine seam, the error type here is not an implementation
//! detail: every backend's contract is to speak the shared taxonomy (a
//! double link is a conflict, a stale id is not-found), so the methods return
//! [`crate::Error`] directly.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use crate::{
  Result,
  provision::{NewAccount, Provisioned, TempPassword},
  record::{
    AccountRecord, DirectoryRecord, NewTeacher, RecordId, Role, TeacherPatch,
  },
};

// ─── Directory store ─────────────────────────────────────────────────────────

/// The store holding teacher professional records.
pub trait DirectoryStore: Send + Sync {
  /// Full snapshot of the directory.
  fn list_teachers(
    &self,
  ) -> impl Future<Output = Result<Vec<DirectoryRecord>>> + Send + '_;

  /// Create a new record; the store assigns the id. New records start
  /// explicitly unlinked.
  fn create_teacher(
    &self,
    input: NewTeacher,
  ) -> impl Future<Output = Result<DirectoryRecord>> + Send + '_;

  /// Apply a partial update. Fails with a not-found error for a stale id.
  fn update_teacher(
    &self,
    id: RecordId,
    patch: TeacherPatch,
  ) -> impl Future<Output = Result<DirectoryRecord>> + Send + '_;

  fn delete_teacher(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Set the link marker on `teacher_id` to `account_id`.
  ///
  /// The account-side marker is never written here; it is derived on read.
  /// Fails with a conflict error if the record already carries a marker at
  /// call time.
  fn link_account(
    &self,
    teacher_id: RecordId,
    account_id: RecordId,
  ) -> impl Future<Output = Result<DirectoryRecord>> + Send + '_;
}

// ─── Account store ───────────────────────────────────────────────────────────

/// The store holding authentication accounts.
pub trait AccountStore: Send + Sync {
  /// Full snapshot of the accounts, optionally restricted to one role.
  fn list_accounts(
    &self,
    role: Option<Role>,
  ) -> impl Future<Output = Result<Vec<AccountRecord>>> + Send + '_;

  /// Create an account. When the input carries no password the store
  /// generates a temporary credential and returns it exactly once in the
  /// [`Provisioned`] envelope; it is never retrievable again.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Provisioned>> + Send + '_;

  /// Reissue a one-time credential, overwriting the previous one. Succeeds
  /// for any existing id, every time it is called.
  fn reset_password(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<TempPassword>> + Send + '_;

  fn delete_account(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}
