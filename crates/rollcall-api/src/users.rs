//! Handlers for `/users` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/users` | Optional `?role=`, `?eligible=true`, `?q=` |
//! | `POST`   | `/users` | Body: [`NewAccount`]; returns 201 + [`Provisioned`] |
//! | `PATCH`  | `/users/:id/reset-password` | Returns `{"temp_password":"..."}` |
//! | `DELETE` | `/users/:id` | 404 if stale |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use rollcall_core::{
  linkage,
  provision::{NewAccount, Provisioned, TempPassword},
  record::{AccountRecord, RecordId, Role},
  search,
  service::PersonnelService,
  store::{AccountStore, DirectoryStore},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub role:     Option<Role>,
  /// Restrict to accounts still open for linking.
  #[serde(default)]
  pub eligible: bool,
  pub q:        Option<String>,
}

/// `GET /users[?role=<role>][&eligible=true][&q=<text>]`
pub async fn list<D, A>(
  State(service): State<Arc<PersonnelService<D, A>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<AccountRecord>>, ApiError>
where
  D: DirectoryStore + 'static,
  A: AccountStore + 'static,
{
  let mut accounts = if params.eligible {
    // The eligible pool needs the directory snapshot for the derived
    // account-side exclusion.
    let snap = service.snapshot().await?;
    linkage::eligible_accounts(&snap.accounts, &snap.teachers)
  } else {
    service.accounts().list_accounts(params.role).await?
  };
  if let Some(role) = params.role {
    accounts.retain(|a| a.role == Some(role));
  }
  if let Some(q) = &params.q {
    accounts = search::filter_accounts(accounts, q);
  }
  Ok(Json(accounts))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /users` — returns 201 + the [`Provisioned`] envelope.
///
/// The `temp_password` in the response is the only time the generated
/// credential is ever exposed.
pub async fn create<D, A>(
  State(service): State<Arc<PersonnelService<D, A>>>,
  Json(body): Json<NewAccount>,
) -> Result<(StatusCode, Json<Provisioned>), ApiError>
where
  D: DirectoryStore + 'static,
  A: AccountStore + 'static,
{
  let provisioned = service.provision(body).await?;
  tracing::info!(
    account = %provisioned.account.id,
    username = %provisioned.account.username,
    generated = provisioned.temp_password.is_some(),
    "provisioned account"
  );
  Ok((StatusCode::CREATED, Json(provisioned)))
}

// ─── Reset password ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ResetResponse {
  pub temp_password: TempPassword,
}

/// `PATCH /users/:id/reset-password`
pub async fn reset_password<D, A>(
  State(service): State<Arc<PersonnelService<D, A>>>,
  Path(id): Path<String>,
) -> Result<Json<ResetResponse>, ApiError>
where
  D: DirectoryStore + 'static,
  A: AccountStore + 'static,
{
  let id = RecordId::new(id);
  let temp_password = service.reset_password(id.clone()).await?;
  tracing::info!(account = %id, "reissued temporary credential");
  Ok(Json(ResetResponse { temp_password }))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /users/:id`
pub async fn remove<D, A>(
  State(service): State<Arc<PersonnelService<D, A>>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  D: DirectoryStore + 'static,
  A: AccountStore + 'static,
{
  service.accounts().delete_account(RecordId::new(id)).await?;
  Ok(StatusCode::NO_CONTENT)
}
