//! Handler for `GET /personnel` — the unified read model.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use rollcall_core::{
  record::Role,
  service::PersonnelService,
  store::{AccountStore, DirectoryStore},
  unified::{RoleFilter, UnifiedPersonView},
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// `teacher|student|admin|general` for a single role, `any` for all;
  /// absent means the Teacher-like default.
  pub role: Option<String>,
  /// Substring filter over display name and email.
  pub q:    Option<String>,
}

fn parse_filter(raw: Option<&str>) -> Result<RoleFilter, ApiError> {
  match raw {
    None => Ok(RoleFilter::TeacherLike),
    Some("any") => Ok(RoleFilter::Any),
    Some(role) => role
      .parse::<Role>()
      .map(|r| RoleFilter::Roles(vec![r]))
      .map_err(|_| ApiError::BadRequest(format!("unknown role {role:?}"))),
  }
}

/// `GET /personnel[?role=<role>|any][&q=<text>]`
pub async fn list<D, A>(
  State(service): State<Arc<PersonnelService<D, A>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<UnifiedPersonView>>, ApiError>
where
  D: DirectoryStore + 'static,
  A: AccountStore + 'static,
{
  let filter = parse_filter(params.role.as_deref())?;
  let views = service
    .search_personnel(&filter, params.q.as_deref().unwrap_or(""))
    .await?;
  Ok(Json(views))
}
