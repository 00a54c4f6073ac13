//! `PersonnelService` — the stateless workflow facade over the two stores.
//!
//! Holds nothing but the store handles. Every read fetches fresh snapshots
//! (the two list calls run concurrently), and every mutation is followed by a
//! rebuild whose result is handed back to the caller, so no unified view or
//! eligibility list can outlive a mutation. Correctness relies on this
//! always-recompute discipline; there is no locking across the stores and no
//! distributed transaction.

use crate::{
  Result,
  error::Error,
  linkage::{self, LinkResult},
  provision::{NewAccount, Provisioned, TempPassword},
  record::{
    AccountRecord, DirectoryRecord, LinkMarker, NewTeacher, RecordId, Role,
    TeacherPatch,
  },
  search,
  store::{AccountStore, DirectoryStore},
  unified::{self, Provenance, RoleFilter, UnifiedPersonView},
};

// ─── Snapshot types ──────────────────────────────────────────────────────────

/// A point-in-time read of both stores. Discard after any mutation.
#[derive(Debug, Clone)]
pub struct Snapshot {
  pub teachers: Vec<DirectoryRecord>,
  pub accounts: Vec<AccountRecord>,
}

/// The two eligible pools, computed from one snapshot.
#[derive(Debug, Clone)]
pub struct EligiblePools {
  pub teachers: Vec<DirectoryRecord>,
  pub accounts: Vec<AccountRecord>,
}

/// Result of a successful link, bundled with the mandatory rebuild.
#[derive(Debug, Clone)]
pub struct LinkOutcome {
  pub result:   LinkResult,
  /// The directory record as returned by the store after the write.
  pub teacher:  DirectoryRecord,
  /// Eligible pools recomputed from fresh snapshots after the write.
  pub eligible: EligiblePools,
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Stateless orchestration over a [`DirectoryStore`] and an [`AccountStore`].
#[derive(Debug, Clone)]
pub struct PersonnelService<D, A> {
  directory: D,
  accounts:  A,
}

impl<D: DirectoryStore, A: AccountStore> PersonnelService<D, A> {
  pub fn new(directory: D, accounts: A) -> Self {
    Self { directory, accounts }
  }

  /// Direct access to the directory store, for passthrough CRUD.
  pub fn directory(&self) -> &D { &self.directory }

  /// Direct access to the account store, for passthrough CRUD.
  pub fn accounts(&self) -> &A { &self.accounts }

  /// Fetch both stores; the independent reads are issued concurrently.
  pub async fn snapshot(&self) -> Result<Snapshot> {
    let (teachers, accounts) = tokio::join!(
      self.directory.list_teachers(),
      self.accounts.list_accounts(None),
    );
    Ok(Snapshot {
      teachers: teachers?,
      accounts: accounts?,
    })
  }

  /// Recompute the unified personnel view from fresh snapshots.
  pub async fn unified_view(
    &self,
    filter: &RoleFilter,
  ) -> Result<Vec<UnifiedPersonView>> {
    let snap = self.snapshot().await?;
    Ok(unified::build_unified_view(&snap.teachers, &snap.accounts, filter))
  }

  /// Unified view narrowed by a substring query.
  pub async fn search_personnel(
    &self,
    filter: &RoleFilter,
    query: &str,
  ) -> Result<Vec<UnifiedPersonView>> {
    Ok(search::filter_views(self.unified_view(filter).await?, query))
  }

  /// Recompute both eligible pools from fresh snapshots.
  pub async fn eligible_pools(&self) -> Result<EligiblePools> {
    let snap = self.snapshot().await?;
    Ok(EligiblePools {
      teachers: linkage::eligible_teachers(&snap.teachers),
      accounts: linkage::eligible_accounts(&snap.accounts, &snap.teachers),
    })
  }

  /// Bind one directory record to one account record.
  ///
  /// Preconditions are checked against a snapshot taken at entry; the write
  /// itself can still lose a race against another operator, in which case
  /// the store reports the conflict. After the write, no verification read
  /// of the account store is performed — the rebuild's derived exclusion is
  /// trusted, accepting the documented eventual-consistency window.
  pub async fn link(
    &self,
    teacher_id: RecordId,
    account_id: RecordId,
  ) -> Result<LinkOutcome> {
    let snap = self.snapshot().await?;

    let teacher = snap
      .teachers
      .iter()
      .find(|t| t.id == teacher_id)
      .ok_or_else(|| Error::TeacherNotFound(teacher_id.clone()))?;
    if let LinkMarker::LinkedTo(existing) = &teacher.link_marker {
      return Err(Error::AlreadyLinked(teacher_id, existing.clone()));
    }

    let account = snap
      .accounts
      .iter()
      .find(|a| a.id == account_id)
      .ok_or_else(|| Error::AccountNotFound(account_id.clone()))?;
    if let Some(role) = account.role
      && role != Role::Teacher
    {
      return Err(Error::IneligibleRole { id: account_id, role });
    }
    if account.linked_directory_marker.linked_id().is_some()
      || snap
        .teachers
        .iter()
        .any(|t| t.link_marker.linked_id() == Some(&account_id))
    {
      return Err(Error::AccountAlreadyBound(account_id));
    }

    let updated = self
      .directory
      .link_account(teacher_id.clone(), account_id.clone())
      .await?;

    // Mandatory rebuild: the caller gets fresh pools, never stale ones.
    let eligible = self.eligible_pools().await?;
    Ok(LinkOutcome {
      result: LinkResult {
        teacher_id,
        account_id,
      },
      teacher: updated,
      eligible,
    })
  }

  /// Create an account, surfacing the one-time credential when generated.
  pub async fn provision(&self, input: NewAccount) -> Result<Provisioned> {
    input.validate()?;
    self.accounts.create_account(input).await
  }

  /// Reissue a one-time credential for an existing account.
  pub async fn reset_password(&self, id: RecordId) -> Result<TempPassword> {
    self.accounts.reset_password(id).await
  }

  pub async fn create_teacher(
    &self,
    input: NewTeacher,
  ) -> Result<DirectoryRecord> {
    if input.full_name.trim().is_empty() {
      return Err(Error::MissingField("full_name"));
    }
    self.directory.create_teacher(input).await
  }

  pub async fn update_teacher(
    &self,
    id: RecordId,
    patch: TeacherPatch,
  ) -> Result<DirectoryRecord> {
    self.directory.update_teacher(id, patch).await
  }

  /// Delete the record behind a unified entry, routed by provenance.
  pub async fn delete_entry(&self, view: &UnifiedPersonView) -> Result<()> {
    match view.provenance {
      Provenance::Directory => {
        let id = view
          .directory_id
          .clone()
          .ok_or(Error::MissingField("directory_id"))?;
        self.directory.delete_teacher(id).await
      }
      Provenance::Account => {
        let id = view
          .account_id
          .clone()
          .ok_or(Error::MissingField("account_id"))?;
        self.accounts.delete_account(id).await
      }
    }
  }
}
