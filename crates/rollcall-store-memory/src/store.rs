//! [`MemoryStore`] — in-process implementation of both store traits.

use std::sync::Arc;

use rollcall_core::{
  Error, Result,
  provision::{NewAccount, Provisioned, TempPassword},
  record::{
    AccountRecord, DirectoryRecord, LinkMarker, NewTeacher, RecordId, Role,
    TeacherPatch,
  },
  store::{AccountStore, DirectoryStore},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::password::{generate_temp_password, hash_password, verify_password};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Both stores in one process, behind a single async mutex.
///
/// Cloning is cheap — clones share the same underlying state, so a clone can
/// serve as the directory handle and another as the account handle.
#[derive(Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
  teachers: Vec<DirectoryRecord>,
  accounts: Vec<StoredAccount>,
}

/// An account row plus the credential hash that never leaves the store.
struct StoredAccount {
  record:        AccountRecord,
  password_hash: String,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Check a candidate credential against the stored hash.
  ///
  /// The plaintext itself is unrecoverable; this is the only way to confirm
  /// a previously-issued temporary credential still opens the account.
  pub async fn password_matches(
    &self,
    id: &RecordId,
    candidate: &str,
  ) -> Result<bool> {
    let inner = self.inner.lock().await;
    let stored = inner
      .accounts
      .iter()
      .find(|a| &a.record.id == id)
      .ok_or_else(|| Error::AccountNotFound(id.clone()))?;
    Ok(verify_password(candidate, &stored.password_hash))
  }

  fn mint_id() -> RecordId { RecordId::new(Uuid::new_v4().to_string()) }
}

// ─── Directory side ──────────────────────────────────────────────────────────

impl DirectoryStore for MemoryStore {
  async fn list_teachers(&self) -> Result<Vec<DirectoryRecord>> {
    Ok(self.inner.lock().await.teachers.clone())
  }

  async fn create_teacher(&self, input: NewTeacher) -> Result<DirectoryRecord> {
    if input.full_name.trim().is_empty() {
      return Err(Error::MissingField("full_name"));
    }
    let record = DirectoryRecord {
      id:            Self::mint_id(),
      full_name:     input.full_name,
      designation:   input.designation,
      subject:       input.subject,
      contact_email: input.contact_email,
      contact_phone: input.contact_phone,
      photo_ref:     input.photo_ref,
      intro_text:    input.intro_text,
      link_marker:   LinkMarker::Unlinked,
    };
    self.inner.lock().await.teachers.push(record.clone());
    Ok(record)
  }

  async fn update_teacher(
    &self,
    id: RecordId,
    patch: TeacherPatch,
  ) -> Result<DirectoryRecord> {
    let mut inner = self.inner.lock().await;
    let teacher = inner
      .teachers
      .iter_mut()
      .find(|t| t.id == id)
      .ok_or(Error::TeacherNotFound(id))?;

    if let Some(full_name) = patch.full_name {
      teacher.full_name = full_name;
    }
    if let Some(designation) = patch.designation {
      teacher.designation = Some(designation);
    }
    if let Some(subject) = patch.subject {
      teacher.subject = Some(subject);
    }
    if let Some(contact_email) = patch.contact_email {
      teacher.contact_email = Some(contact_email);
    }
    if let Some(contact_phone) = patch.contact_phone {
      teacher.contact_phone = Some(contact_phone);
    }
    if let Some(photo_ref) = patch.photo_ref {
      teacher.photo_ref = Some(photo_ref);
    }
    if let Some(intro_text) = patch.intro_text {
      teacher.intro_text = Some(intro_text);
    }
    Ok(teacher.clone())
  }

  async fn delete_teacher(&self, id: RecordId) -> Result<()> {
    let mut inner = self.inner.lock().await;
    let at = inner
      .teachers
      .iter()
      .position(|t| t.id == id)
      .ok_or(Error::TeacherNotFound(id))?;
    inner.teachers.remove(at);
    Ok(())
  }

  async fn link_account(
    &self,
    teacher_id: RecordId,
    account_id: RecordId,
  ) -> Result<DirectoryRecord> {
    let mut inner = self.inner.lock().await;

    if !inner.accounts.iter().any(|a| a.record.id == account_id) {
      return Err(Error::AccountNotFound(account_id));
    }
    if inner
      .teachers
      .iter()
      .any(|t| t.link_marker.linked_id() == Some(&account_id))
    {
      return Err(Error::AccountAlreadyBound(account_id));
    }

    let teacher = inner
      .teachers
      .iter_mut()
      .find(|t| t.id == teacher_id)
      .ok_or_else(|| Error::TeacherNotFound(teacher_id.clone()))?;
    if let LinkMarker::LinkedTo(existing) = &teacher.link_marker {
      return Err(Error::AlreadyLinked(teacher_id, existing.clone()));
    }

    teacher.link_marker = LinkMarker::LinkedTo(account_id);
    Ok(teacher.clone())
  }
}

// ─── Account side ────────────────────────────────────────────────────────────

impl AccountStore for MemoryStore {
  async fn list_accounts(&self, role: Option<Role>) -> Result<Vec<AccountRecord>> {
    let inner = self.inner.lock().await;
    Ok(
      inner
        .accounts
        .iter()
        .map(|a| &a.record)
        .filter(|r| role.is_none_or(|wanted| r.role == Some(wanted)))
        .cloned()
        .collect(),
    )
  }

  async fn create_account(&self, input: NewAccount) -> Result<Provisioned> {
    input.validate()?;
    let is_active = input.is_active();
    let must_change_password = input.must_change_password();
    let NewAccount {
      username,
      role,
      email,
      phone,
      password,
      ..
    } = input;
    let username = username.trim().to_owned();

    let mut inner = self.inner.lock().await;
    if inner
      .accounts
      .iter()
      .any(|a| a.record.username.eq_ignore_ascii_case(&username))
    {
      return Err(Error::DuplicateUsername(username));
    }

    let (credential, temp_password) = match password {
      Some(explicit) => (explicit, None),
      None => {
        let generated = generate_temp_password();
        (generated.clone(), Some(TempPassword::new(generated)))
      }
    };
    let password_hash =
      hash_password(&credential).map_err(|e| Error::Store(e.to_string()))?;

    let record = AccountRecord {
      id: Self::mint_id(),
      username,
      email,
      phone,
      role: Some(role),
      is_active,
      must_change_password,
      linked_directory_marker: LinkMarker::Unlinked,
    };
    inner.accounts.push(StoredAccount {
      record: record.clone(),
      password_hash,
    });

    Ok(Provisioned {
      account: record,
      temp_password,
    })
  }

  async fn reset_password(&self, id: RecordId) -> Result<TempPassword> {
    let credential = generate_temp_password();
    let password_hash =
      hash_password(&credential).map_err(|e| Error::Store(e.to_string()))?;

    let mut inner = self.inner.lock().await;
    let stored = inner
      .accounts
      .iter_mut()
      .find(|a| a.record.id == id)
      .ok_or(Error::AccountNotFound(id))?;
    stored.password_hash = password_hash;
    stored.record.must_change_password = true;

    Ok(TempPassword::new(credential))
  }

  async fn delete_account(&self, id: RecordId) -> Result<()> {
    let mut inner = self.inner.lock().await;
    let at = inner
      .accounts
      .iter()
      .position(|a| a.record.id == id)
      .ok_or(Error::AccountNotFound(id))?;
    inner.accounts.remove(at);
    Ok(())
  }
}
