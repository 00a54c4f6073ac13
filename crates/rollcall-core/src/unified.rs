//! The reconciliation engine — deduplicated unified view of personnel.
//!
//! A pure function over two freshly-fetched snapshots. Nothing here is ever
//! cached or stored; callers recompute after every mutation.

use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::record::{AccountRecord, DirectoryRecord, RecordId, Role};

// ─── Provenance ──────────────────────────────────────────────────────────────

/// Which store a unified entry's edits and deletes must be routed to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Provenance {
  Directory,
  Account,
}

// ─── Identity key ────────────────────────────────────────────────────────────

/// The deduplication key for a unified entry.
///
/// A non-empty email (trimmed, lowercased) merges records across stores.
/// Records without one get a synthetic `source:id` key and are never
/// auto-merged with anything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
  Email(String),
  Synthetic { source: Provenance, id: String },
}

impl fmt::Display for IdentityKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Email(email) => f.write_str(email),
      Self::Synthetic { source, id } => write!(f, "{source}:{id}"),
    }
  }
}

impl IdentityKey {
  fn parse_str(s: &str) -> Self {
    if let Some(id) = s.strip_prefix("directory:") {
      Self::Synthetic {
        source: Provenance::Directory,
        id:     id.to_owned(),
      }
    } else if let Some(id) = s.strip_prefix("account:") {
      Self::Synthetic {
        source: Provenance::Account,
        id:     id.to_owned(),
      }
    } else {
      Self::Email(s.to_owned())
    }
  }
}

impl FromStr for IdentityKey {
  type Err = std::convert::Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self::parse_str(s)) }
}

impl Serialize for IdentityKey {
  fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
    ser.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for IdentityKey {
  fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
    Ok(Self::parse_str(&String::deserialize(de)?))
  }
}

// ─── Role filter ─────────────────────────────────────────────────────────────

/// Restricts which accounts participate in a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RoleFilter {
  /// Role is `Teacher` or absent (the permissive default).
  #[default]
  TeacherLike,
  /// Every account participates.
  Any,
  /// Only accounts whose role is one of the named ones.
  Roles(Vec<Role>),
}

impl RoleFilter {
  pub fn admits(&self, role: Option<Role>) -> bool {
    match self {
      Self::TeacherLike => matches!(role, None | Some(Role::Teacher)),
      Self::Any => true,
      Self::Roles(roles) => role.is_some_and(|r| roles.contains(&r)),
    }
  }
}

// ─── Unified view ────────────────────────────────────────────────────────────

/// One entry per real-world person; materialised on every pass, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedPersonView {
  pub identity_key:  IdentityKey,
  pub display_name:  String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub designation:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contact_email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contact_phone: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub photo_ref:     Option<String>,
  pub provenance:    Provenance,
  /// Source ids, so edits and deletes can be routed to the provenance store.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub directory_id:  Option<RecordId>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub account_id:    Option<RecordId>,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Build the deduplicated unified view from a snapshot of both stores.
///
/// Accounts are inserted first so their fields win on merge; directory
/// records then merge into a colliding key or create standalone entries.
/// No input record is ever dropped; output order is insertion order
/// (accounts in input order, then unmatched directory records).
pub fn build_unified_view(
  directory: &[DirectoryRecord],
  accounts: &[AccountRecord],
  filter: &RoleFilter,
) -> Vec<UnifiedPersonView> {
  let mut views: Vec<UnifiedPersonView> = Vec::new();
  let mut by_key: HashMap<IdentityKey, usize> = HashMap::new();

  for (idx, account) in accounts.iter().enumerate() {
    if !filter.admits(account.role) {
      continue;
    }
    let key = account_key(account, idx);
    match by_key.get(&key) {
      Some(&at) => merge_account(&mut views[at], account),
      None => {
        by_key.insert(key.clone(), views.len());
        views.push(view_from_account(key, account));
      }
    }
  }

  for (idx, record) in directory.iter().enumerate() {
    let key = directory_key(record, idx);
    match by_key.get(&key) {
      Some(&at) => merge_directory(&mut views[at], record),
      None => {
        by_key.insert(key.clone(), views.len());
        views.push(view_from_directory(key, record));
      }
    }
  }

  views
}

/// A record with a missing id gets a positional fallback so two such records
/// still land on distinct synthetic keys.
fn synthetic_id(id: &RecordId, idx: usize) -> String {
  if id.is_empty() {
    format!("#{idx}")
  } else {
    id.as_str().to_owned()
  }
}

fn account_key(account: &AccountRecord, idx: usize) -> IdentityKey {
  match account.normalized_email() {
    Some(email) => IdentityKey::Email(email),
    None => IdentityKey::Synthetic {
      source: Provenance::Account,
      id:     synthetic_id(&account.id, idx),
    },
  }
}

fn directory_key(record: &DirectoryRecord, idx: usize) -> IdentityKey {
  match record.normalized_email() {
    Some(email) => IdentityKey::Email(email),
    None => IdentityKey::Synthetic {
      source: Provenance::Directory,
      id:     synthetic_id(&record.id, idx),
    },
  }
}

fn view_from_account(
  key: IdentityKey,
  account: &AccountRecord,
) -> UnifiedPersonView {
  UnifiedPersonView {
    identity_key:  key,
    display_name:  account.username.clone(),
    designation:   None,
    contact_email: non_empty(account.email.as_deref()),
    contact_phone: non_empty(account.phone.as_deref()),
    photo_ref:     None,
    provenance:    Provenance::Account,
    directory_id:  None,
    account_id:    Some(account.id.clone()),
  }
}

fn view_from_directory(
  key: IdentityKey,
  record: &DirectoryRecord,
) -> UnifiedPersonView {
  UnifiedPersonView {
    identity_key:  key,
    display_name:  record.full_name.clone(),
    designation:   record.designation.clone(),
    contact_email: non_empty(record.contact_email.as_deref()),
    contact_phone: non_empty(record.contact_phone.as_deref()),
    photo_ref:     record.photo_ref.clone(),
    provenance:    Provenance::Directory,
    directory_id:  Some(record.id.clone()),
    account_id:    None,
  }
}

/// Later same-key contributions only fill fields still empty; the first
/// writer of each field keeps precedence.
fn merge_account(view: &mut UnifiedPersonView, account: &AccountRecord) {
  if view.account_id.is_none() {
    view.account_id = Some(account.id.clone());
  }
  if view.display_name.is_empty() {
    view.display_name = account.username.clone();
  }
  fill(&mut view.contact_email, non_empty(account.email.as_deref()));
  fill(&mut view.contact_phone, non_empty(account.phone.as_deref()));
}

fn merge_directory(view: &mut UnifiedPersonView, record: &DirectoryRecord) {
  if view.directory_id.is_none() {
    view.directory_id = Some(record.id.clone());
  }
  if view.display_name.is_empty() {
    view.display_name = record.full_name.clone();
  }
  fill(&mut view.designation, record.designation.clone());
  fill(&mut view.contact_email, non_empty(record.contact_email.as_deref()));
  fill(&mut view.contact_phone, non_empty(record.contact_phone.as_deref()));
  fill(&mut view.photo_ref, record.photo_ref.clone());
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
  if slot.is_none() {
    *slot = value;
  }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
  raw.map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::LinkMarker;

  fn teacher(id: &str, name: &str, email: &str) -> DirectoryRecord {
    DirectoryRecord {
      id:            id.into(),
      full_name:     name.to_owned(),
      designation:   Some("Assistant Teacher".to_owned()),
      subject:       Some("Physics".to_owned()),
      contact_email: Some(email.to_owned()),
      contact_phone: None,
      photo_ref:     None,
      intro_text:    None,
      link_marker:   LinkMarker::Unknown,
    }
  }

  fn account(id: &str, username: &str, email: &str, role: Option<Role>) -> AccountRecord {
    AccountRecord {
      id:                      id.into(),
      username:                username.to_owned(),
      email:                   Some(email.to_owned()),
      phone:                   None,
      role,
      is_active:               true,
      must_change_password:    true,
      linked_directory_marker: LinkMarker::Unknown,
    }
  }

  #[test]
  fn matched_pair_merges_into_one_account_entry() {
    let directory = vec![teacher("1", "A", "a@x.com")];
    let accounts = vec![account("9", "a", "a@x.com", Some(Role::Teacher))];

    let views =
      build_unified_view(&directory, &accounts, &RoleFilter::default());

    assert_eq!(views.len(), 1);
    let view = &views[0];
    assert_eq!(view.provenance, Provenance::Account);
    assert_eq!(view.identity_key, IdentityKey::Email("a@x.com".to_owned()));
    // Account fields win; directory fills the gaps.
    assert_eq!(view.display_name, "a");
    assert_eq!(view.designation.as_deref(), Some("Assistant Teacher"));
    assert_eq!(view.directory_id, Some("1".into()));
    assert_eq!(view.account_id, Some("9".into()));
  }

  #[test]
  fn email_match_is_case_insensitive_and_trimmed() {
    let directory = vec![teacher("1", "A", "  A@X.com ")];
    let accounts = vec![account("9", "a", "a@x.COM", Some(Role::Teacher))];

    let views =
      build_unified_view(&directory, &accounts, &RoleFilter::default());
    assert_eq!(views.len(), 1);
  }

  #[test]
  fn empty_emails_never_group() {
    let mut t1 = teacher("2", "B", "");
    t1.contact_email = Some(String::new());
    let mut t2 = teacher("3", "C", "");
    t2.contact_email = None;
    let mut a1 = account("7", "d", "", None);
    a1.email = None;

    let views =
      build_unified_view(&[t1, t2], &[a1], &RoleFilter::default());

    assert_eq!(views.len(), 3);
    let keys: Vec<String> =
      views.iter().map(|v| v.identity_key.to_string()).collect();
    assert!(keys.contains(&"directory:2".to_owned()));
    assert!(keys.contains(&"directory:3".to_owned()));
    assert!(keys.contains(&"account:7".to_owned()));
  }

  #[test]
  fn no_record_is_dropped() {
    let directory = vec![
      teacher("1", "A", "a@x.com"),
      teacher("2", "B", ""),
      teacher("3", "C", "c@x.com"),
    ];
    let accounts = vec![
      account("9", "a", "a@x.com", Some(Role::Teacher)),
      account("10", "e", "e@x.com", None),
    ];

    let views =
      build_unified_view(&directory, &accounts, &RoleFilter::default());

    // 1 matched pair + 2 unmatched directory + 1 unmatched account.
    assert_eq!(views.len(), 4);
    assert_eq!(
      views.iter().filter(|v| v.directory_id.is_some()).count(),
      3
    );
    assert_eq!(views.iter().filter(|v| v.account_id.is_some()).count(), 2);
  }

  #[test]
  fn role_filter_excludes_students_from_the_view() {
    let accounts = vec![
      account("10", "s", "s@x.com", Some(Role::Student)),
      account("11", "t", "t@x.com", Some(Role::Teacher)),
    ];

    let views = build_unified_view(&[], &accounts, &RoleFilter::default());
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].account_id, Some("11".into()));

    let all = build_unified_view(&[], &accounts, &RoleFilter::Any);
    assert_eq!(all.len(), 2);
  }

  #[test]
  fn explicit_role_list_admits_only_named_roles() {
    let filter = RoleFilter::Roles(vec![Role::Admin]);
    assert!(filter.admits(Some(Role::Admin)));
    assert!(!filter.admits(Some(Role::Teacher)));
    // An absent role is only admitted by the permissive default.
    assert!(!filter.admits(None));
  }

  #[test]
  fn missing_ids_get_distinct_fallback_keys() {
    let mut t1 = teacher("", "B", "");
    t1.contact_email = None;
    let mut t2 = teacher("", "C", "");
    t2.contact_email = None;

    let views = build_unified_view(&[t1, t2], &[], &RoleFilter::default());
    assert_eq!(views.len(), 2);
    assert_ne!(views[0].identity_key, views[1].identity_key);
  }

  #[test]
  fn identity_key_round_trips_through_its_string_form() {
    for key in [
      IdentityKey::Email("a@x.com".to_owned()),
      IdentityKey::Synthetic {
        source: Provenance::Directory,
        id:     "2".to_owned(),
      },
      IdentityKey::Synthetic {
        source: Provenance::Account,
        id:     "7".to_owned(),
      },
    ] {
      let parsed: IdentityKey = key.to_string().parse().unwrap();
      assert_eq!(parsed, key);
    }
  }
}
