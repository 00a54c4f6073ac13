//! Client-side substring search over personnel listings.
//!
//! Pure filtering: matching is case-insensitive substring over the display
//! name and one secondary identifying field, and never touches eligibility
//! state. An empty query matches everything.

use crate::{
  record::{AccountRecord, DirectoryRecord},
  unified::UnifiedPersonView,
};

fn matches(query: &str, primary: &str, secondary: Option<&str>) -> bool {
  let needle = query.trim().to_lowercase();
  if needle.is_empty() {
    return true;
  }
  primary.to_lowercase().contains(&needle)
    || secondary.is_some_and(|s| s.to_lowercase().contains(&needle))
}

pub fn filter_views(
  views: Vec<UnifiedPersonView>,
  query: &str,
) -> Vec<UnifiedPersonView> {
  views
    .into_iter()
    .filter(|v| matches(query, &v.display_name, v.contact_email.as_deref()))
    .collect()
}

pub fn filter_teachers(
  records: Vec<DirectoryRecord>,
  query: &str,
) -> Vec<DirectoryRecord> {
  records
    .into_iter()
    .filter(|t| matches(query, &t.full_name, t.contact_email.as_deref()))
    .collect()
}

pub fn filter_accounts(
  accounts: Vec<AccountRecord>,
  query: &str,
) -> Vec<AccountRecord> {
  accounts
    .into_iter()
    .filter(|a| matches(query, &a.username, a.email.as_deref()))
    .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::LinkMarker;

  fn teacher(name: &str, email: Option<&str>) -> DirectoryRecord {
    DirectoryRecord {
      id:            "1".into(),
      full_name:     name.to_owned(),
      designation:   None,
      subject:       None,
      contact_email: email.map(str::to_owned),
      contact_phone: None,
      photo_ref:     None,
      intro_text:    None,
      link_marker:   LinkMarker::Unknown,
    }
  }

  #[test]
  fn matches_name_case_insensitively() {
    let out = filter_teachers(
      vec![teacher("Ayesha Rahman", None), teacher("Badal Roy", None)],
      "rahman",
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].full_name, "Ayesha Rahman");
  }

  #[test]
  fn matches_secondary_email_field() {
    let out = filter_teachers(
      vec![teacher("Ayesha Rahman", Some("ar@school.edu"))],
      "AR@SCHOOL",
    );
    assert_eq!(out.len(), 1);
  }

  #[test]
  fn empty_query_keeps_everything() {
    let out = filter_teachers(
      vec![teacher("A", None), teacher("B", None)],
      "   ",
    );
    assert_eq!(out.len(), 2);
  }

  #[test]
  fn no_match_yields_empty() {
    let out = filter_teachers(vec![teacher("A", None)], "zzz");
    assert!(out.is_empty());
  }
}
