//! Account provisioning inputs and the one-time credential envelope.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  error::Error,
  record::{AccountRecord, Role},
};

// ─── New account ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::AccountStore::create_account`].
///
/// When `password` is omitted the store generates a temporary credential and
/// returns it exactly once in the [`Provisioned`] envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
  pub username:             String,
  pub role:                 Role,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:                Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone:                Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub password:             Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_active:            Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub must_change_password: Option<bool>,
}

impl NewAccount {
  /// Convenience constructor with all optional fields left to their defaults.
  pub fn new(username: impl Into<String>, role: Role) -> Self {
    Self {
      username:             username.into(),
      role,
      email:                None,
      phone:                None,
      password:             None,
      is_active:            None,
      must_change_password: None,
    }
  }

  pub fn is_active(&self) -> bool { self.is_active.unwrap_or(true) }

  pub fn must_change_password(&self) -> bool {
    self.must_change_password.unwrap_or(true)
  }

  /// Required-field validation; duplicate usernames are the store's call.
  pub fn validate(&self) -> Result<()> {
    if self.username.trim().is_empty() {
      return Err(Error::MissingField("username"));
    }
    Ok(())
  }
}

// ─── Temporary credential ────────────────────────────────────────────────────

/// A one-time credential returned only at creation/reset time.
///
/// Write-once, display-once: the stores never re-expose it through a read,
/// and its `Debug` form is redacted so it cannot leak through logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TempPassword(String);

impl TempPassword {
  pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_inner(self) -> String { self.0 }
}

impl fmt::Debug for TempPassword {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("TempPassword(<redacted>)")
  }
}

impl fmt::Display for TempPassword {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Provisioned ─────────────────────────────────────────────────────────────

/// Response envelope for account creation.
///
/// `temp_password` is present iff the store generated the credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provisioned {
  pub account:       AccountRecord,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub temp_password: Option<TempPassword>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ErrorKind;

  #[test]
  fn defaults_are_active_and_must_change() {
    let input = NewAccount::new("t1", Role::Teacher);
    assert!(input.is_active());
    assert!(input.must_change_password());
  }

  #[test]
  fn blank_username_fails_validation() {
    let input = NewAccount::new("   ", Role::Teacher);
    let err = input.validate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
  }

  #[test]
  fn temp_password_debug_is_redacted() {
    let temp = TempPassword::new("s3cretvalue1");
    let debug = format!("{temp:?}");
    assert!(!debug.contains("s3cretvalue1"));
    assert_eq!(temp.as_str(), "s3cretvalue1");
  }
}
