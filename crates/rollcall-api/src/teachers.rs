//! Handlers for `/teachers` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/teachers` | Optional `?eligible=true`, `?q=` |
//! | `POST`   | `/teachers` | Body: [`NewTeacher`]; returns 201 |
//! | `PATCH`  | `/teachers/:id` | Body: [`TeacherPatch`] |
//! | `DELETE` | `/teachers/:id` | 404 if stale |
//! | `POST`   | `/teachers/:id/link-user` | Body: `{"user_id":"..."}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use rollcall_core::{
  linkage, search,
  record::{DirectoryRecord, NewTeacher, RecordId, TeacherPatch},
  service::PersonnelService,
  store::{AccountStore, DirectoryStore},
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Restrict to records still open for linking.
  #[serde(default)]
  pub eligible: bool,
  pub q:        Option<String>,
}

/// `GET /teachers[?eligible=true][&q=<text>]`
pub async fn list<D, A>(
  State(service): State<Arc<PersonnelService<D, A>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<DirectoryRecord>>, ApiError>
where
  D: DirectoryStore + 'static,
  A: AccountStore + 'static,
{
  let mut records = service.directory().list_teachers().await?;
  if params.eligible {
    records = linkage::eligible_teachers(&records);
  }
  if let Some(q) = &params.q {
    records = search::filter_teachers(records, q);
  }
  Ok(Json(records))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /teachers` — returns 201 + the stored record.
pub async fn create<D, A>(
  State(service): State<Arc<PersonnelService<D, A>>>,
  Json(body): Json<NewTeacher>,
) -> Result<impl IntoResponse, ApiError>
where
  D: DirectoryStore + 'static,
  A: AccountStore + 'static,
{
  let record = service.create_teacher(body).await?;
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /teachers/:id`
pub async fn update<D, A>(
  State(service): State<Arc<PersonnelService<D, A>>>,
  Path(id): Path<String>,
  Json(body): Json<TeacherPatch>,
) -> Result<Json<DirectoryRecord>, ApiError>
where
  D: DirectoryStore + 'static,
  A: AccountStore + 'static,
{
  let record = service.update_teacher(RecordId::new(id), body).await?;
  Ok(Json(record))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /teachers/:id`
pub async fn remove<D, A>(
  State(service): State<Arc<PersonnelService<D, A>>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  D: DirectoryStore + 'static,
  A: AccountStore + 'static,
{
  service.directory().delete_teacher(RecordId::new(id)).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Link ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LinkBody {
  pub user_id: RecordId,
}

/// `POST /teachers/:id/link-user` — body: `{"user_id":"..."}`.
///
/// Returns the updated directory record; the caller is expected to rebuild
/// its listings afterwards.
pub async fn link<D, A>(
  State(service): State<Arc<PersonnelService<D, A>>>,
  Path(id): Path<String>,
  Json(body): Json<LinkBody>,
) -> Result<Json<DirectoryRecord>, ApiError>
where
  D: DirectoryStore + 'static,
  A: AccountStore + 'static,
{
  let outcome = service.link(RecordId::new(id), body.user_id).await?;
  tracing::info!(
    teacher = %outcome.result.teacher_id,
    account = %outcome.result.account_id,
    "linked directory record to account"
  );
  Ok(Json(outcome.teacher))
}
