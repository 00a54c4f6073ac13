//! The two independently-maintained personnel records.
//!
//! A real-world teacher may exist as a [`DirectoryRecord`] (professional
//! profile), an [`AccountRecord`] (login identity), or both. Neither store
//! knows about the other; the only cross-reference is the link marker set on
//! the directory side by an explicit bind operation.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Record id ───────────────────────────────────────────────────────────────

/// An opaque, store-scoped record identifier.
///
/// Ids from the two stores live in different namespaces; a directory id and
/// an account id never compare meaningfully even when their strings collide.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(&self.0)
  }
}

impl From<&str> for RecordId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for RecordId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── Role ────────────────────────────────────────────────────────────────────

/// The role carried by an authentication account.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
  Teacher,
  Student,
  Admin,
  General,
}

// ─── Link marker ─────────────────────────────────────────────────────────────

/// The tri-state cross-store reference carried by both record types.
///
/// On the wire the marker field is a string id (linked), explicitly `null`
/// (unlinked), or absent altogether (`Unknown` — rows written before the
/// field existed). `Unknown` and `Unlinked` are treated identically as "not
/// linked" everywhere; keeping them distinct only preserves the wire shape on
/// round-trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LinkMarker {
  /// The backing row has no marker field at all.
  #[default]
  Unknown,
  /// The marker field is present and explicitly null.
  Unlinked,
  /// Bound to a record in the other store.
  LinkedTo(RecordId),
}

impl LinkMarker {
  /// True unless the marker names a counterpart record.
  pub fn is_unlinked(&self) -> bool { !matches!(self, Self::LinkedTo(_)) }

  pub fn is_unknown(&self) -> bool { matches!(self, Self::Unknown) }

  pub fn linked_id(&self) -> Option<&RecordId> {
    match self {
      Self::LinkedTo(id) => Some(id),
      _ => None,
    }
  }
}

/// Serde glue for [`LinkMarker`] fields.
///
/// Use together with `default` (absent → `Unknown`) and
/// `skip_serializing_if = "LinkMarker::is_unknown"` so `Unknown` stays absent
/// on the way back out.
pub(crate) mod marker_serde {
  use serde::{Deserialize, Deserializer, Serializer};

  use super::{LinkMarker, RecordId};

  pub fn serialize<S: Serializer>(
    marker: &LinkMarker,
    ser: S,
  ) -> Result<S::Ok, S::Error> {
    match marker {
      LinkMarker::LinkedTo(id) => ser.serialize_some(id),
      _ => ser.serialize_none(),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    de: D,
  ) -> Result<LinkMarker, D::Error> {
    Ok(match Option::<RecordId>::deserialize(de)? {
      Some(id) => LinkMarker::LinkedTo(id),
      None => LinkMarker::Unlinked,
    })
  }
}

// ─── Directory record ────────────────────────────────────────────────────────

/// A teacher's professional profile, independent of login capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryRecord {
  pub id:            RecordId,
  pub full_name:     String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub designation:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subject:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contact_email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contact_phone: Option<String>,
  /// Opaque URL once stored; upload handling is not this crate's concern.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub photo_ref:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub intro_text:    Option<String>,
  #[serde(
    rename = "linked_user_id",
    default,
    with = "marker_serde",
    skip_serializing_if = "LinkMarker::is_unknown"
  )]
  pub link_marker:   LinkMarker,
}

impl DirectoryRecord {
  /// The record's email, normalised for identity matching.
  pub fn normalized_email(&self) -> Option<String> {
    normalize_email(self.contact_email.as_deref())
  }
}

// ─── Account record ──────────────────────────────────────────────────────────

/// A login-capable identity with a role.
///
/// Credentials never appear here: the stores hold only hashes, and the
/// one-time temporary password travels in the create/reset response envelope,
/// not on the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
  pub id:                      RecordId,
  pub username:                String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:                   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone:                   Option<String>,
  /// Absent role is treated permissively as Teacher-eligible.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role:                    Option<Role>,
  #[serde(default = "default_true")]
  pub is_active:               bool,
  #[serde(default = "default_true")]
  pub must_change_password:    bool,
  #[serde(
    rename = "linked_teacher_id",
    default,
    with = "marker_serde",
    skip_serializing_if = "LinkMarker::is_unknown"
  )]
  pub linked_directory_marker: LinkMarker,
}

impl AccountRecord {
  /// Whether this account participates in teacher reconciliation and linking.
  pub fn is_teacher_like(&self) -> bool {
    matches!(self.role, None | Some(Role::Teacher))
  }

  pub fn normalized_email(&self) -> Option<String> {
    normalize_email(self.email.as_deref())
  }
}

fn default_true() -> bool { true }

/// Trim and lowercase an email; empty strings count as absent.
pub(crate) fn normalize_email(raw: Option<&str>) -> Option<String> {
  let trimmed = raw?.trim();
  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed.to_lowercase())
  }
}

// ─── Directory write payloads ────────────────────────────────────────────────

/// Input to [`crate::store::DirectoryStore::create_teacher`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeacher {
  pub full_name:     String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub designation:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subject:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contact_email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contact_phone: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub photo_ref:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub intro_text:    Option<String>,
}

impl NewTeacher {
  pub fn new(full_name: impl Into<String>) -> Self {
    Self {
      full_name:     full_name.into(),
      designation:   None,
      subject:       None,
      contact_email: None,
      contact_phone: None,
      photo_ref:     None,
      intro_text:    None,
    }
  }
}

/// Partial update for a directory record. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeacherPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub full_name:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub designation:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subject:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contact_email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contact_phone: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub photo_ref:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub intro_text:    Option<String>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
