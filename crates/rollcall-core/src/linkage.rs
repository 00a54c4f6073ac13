//! Eligible pools and the explicit bind between the two stores.
//!
//! Only the directory side of a link is ever written. The account side is
//! derived at read time: an account referenced by any directory record's
//! marker is excluded from the eligible pool. That derivation is what keeps a
//! bound pair out of both pools after a rebuild without a two-store write.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::record::{AccountRecord, DirectoryRecord, RecordId};

/// Directory records still open for binding: marker explicitly unlinked or
/// absent altogether (schema-tolerant).
pub fn eligible_teachers(directory: &[DirectoryRecord]) -> Vec<DirectoryRecord> {
  directory
    .iter()
    .filter(|t| t.link_marker.is_unlinked())
    .cloned()
    .collect()
}

/// Accounts still open for binding: Teacher-like role, own marker unlinked or
/// absent, and not referenced by any directory record's link marker.
pub fn eligible_accounts(
  accounts: &[AccountRecord],
  directory: &[DirectoryRecord],
) -> Vec<AccountRecord> {
  let referenced: HashSet<&RecordId> = directory
    .iter()
    .filter_map(|t| t.link_marker.linked_id())
    .collect();

  accounts
    .iter()
    .filter(|a| a.is_teacher_like())
    .filter(|a| a.linked_directory_marker.is_unlinked())
    .filter(|a| !referenced.contains(&a.id))
    .cloned()
    .collect()
}

/// The pair bound by a successful link operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkResult {
  pub teacher_id: RecordId,
  pub account_id: RecordId,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
