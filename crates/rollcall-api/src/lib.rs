//! JSON REST API for the rollcall personnel registry.
//!
//! Exposes an axum [`Router`] backed by any store pair through a
//! [`PersonnelService`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(rollcall_api::api_router(service.clone()))
//! ```

pub mod error;
pub mod personnel;
pub mod teachers;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, patch, post},
};
use rollcall_core::{
  service::PersonnelService,
  store::{AccountStore, DirectoryStore},
};

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<D, A>(service: Arc<PersonnelService<D, A>>) -> Router<()>
where
  D: DirectoryStore + 'static,
  A: AccountStore + 'static,
{
  Router::new()
    // Unified read model
    .route("/personnel", get(personnel::list::<D, A>))
    // Directory store resources
    .route(
      "/teachers",
      get(teachers::list::<D, A>).post(teachers::create::<D, A>),
    )
    .route(
      "/teachers/{id}",
      patch(teachers::update::<D, A>).delete(teachers::remove::<D, A>),
    )
    .route("/teachers/{id}/link-user", post(teachers::link::<D, A>))
    // Account store resources
    .route("/users", get(users::list::<D, A>).post(users::create::<D, A>))
    .route(
      "/users/{id}/reset-password",
      patch(users::reset_password::<D, A>),
    )
    .route("/users/{id}", delete(users::remove::<D, A>))
    .with_state(service)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use rollcall_core::service::PersonnelService;
  use rollcall_store_memory::MemoryStore;
  use tower::ServiceExt as _;

  use super::api_router;

  fn router() -> axum::Router {
    let store = MemoryStore::new();
    api_router(Arc::new(PersonnelService::new(store.clone(), store)))
  }

  async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
  ) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let resp = app
      .clone()
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let json = if bytes.is_empty() {
      serde_json::Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  #[tokio::test]
  async fn provisioning_returns_one_time_credential() {
    let app = router();

    let (status, body) = send(
      &app,
      "POST",
      "/users",
      Some(serde_json::json!({"username": "t1", "role": "teacher"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(!body["temp_password"].as_str().unwrap().is_empty());
    assert_eq!(body["account"]["must_change_password"], true);
    assert_eq!(body["account"]["is_active"], true);
  }

  #[tokio::test]
  async fn duplicate_username_returns_400() {
    let app = router();
    let user = serde_json::json!({"username": "taken", "role": "teacher"});

    let (status, _) = send(&app, "POST", "/users", Some(user.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/users", Some(user)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("taken"));
  }

  #[tokio::test]
  async fn link_flow_and_double_link_conflict() {
    let app = router();

    let (_, teacher) = send(
      &app,
      "POST",
      "/teachers",
      Some(serde_json::json!({
        "full_name": "A. Rahman",
        "contact_email": "ar@school.edu"
      })),
    )
    .await;
    let (_, account) = send(
      &app,
      "POST",
      "/users",
      Some(serde_json::json!({"username": "arahman", "role": "teacher"})),
    )
    .await;

    let teacher_id = teacher["id"].as_str().unwrap();
    let user_id = account["account"]["id"].as_str().unwrap();

    let (status, linked) = send(
      &app,
      "POST",
      &format!("/teachers/{teacher_id}/link-user"),
      Some(serde_json::json!({"user_id": user_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(linked["linked_user_id"], user_id);

    // Rebuilt eligible pools exclude both sides of the pair.
    let (_, eligible) = send(&app, "GET", "/teachers?eligible=true", None).await;
    assert_eq!(eligible.as_array().unwrap().len(), 0);
    let (_, eligible) = send(&app, "GET", "/users?eligible=true", None).await;
    assert_eq!(eligible.as_array().unwrap().len(), 0);

    let (status, _) = send(
      &app,
      "POST",
      &format!("/teachers/{teacher_id}/link-user"),
      Some(serde_json::json!({"user_id": user_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn personnel_view_merges_matched_pair() {
    let app = router();

    send(
      &app,
      "POST",
      "/teachers",
      Some(serde_json::json!({
        "full_name": "A. Rahman",
        "designation": "Assistant Teacher",
        "contact_email": "ar@school.edu"
      })),
    )
    .await;
    send(
      &app,
      "POST",
      "/users",
      Some(serde_json::json!({
        "username": "arahman",
        "role": "teacher",
        "email": "AR@school.edu"
      })),
    )
    .await;

    let (status, views) = send(&app, "GET", "/personnel", None).await;
    assert_eq!(status, StatusCode::OK);
    let views = views.as_array().unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0]["provenance"], "account");
    assert_eq!(views[0]["display_name"], "arahman");
    assert_eq!(views[0]["designation"], "Assistant Teacher");
    assert_eq!(views[0]["identity_key"], "ar@school.edu");
  }

  #[tokio::test]
  async fn personnel_view_supports_role_and_query_params() {
    let app = router();

    send(
      &app,
      "POST",
      "/users",
      Some(serde_json::json!({"username": "student1", "role": "student"})),
    )
    .await;
    send(
      &app,
      "POST",
      "/users",
      Some(serde_json::json!({"username": "teacher1", "role": "teacher"})),
    )
    .await;

    // Teacher-like default excludes the student account.
    let (_, views) = send(&app, "GET", "/personnel", None).await;
    assert_eq!(views.as_array().unwrap().len(), 1);

    let (_, views) = send(&app, "GET", "/personnel?role=any", None).await;
    assert_eq!(views.as_array().unwrap().len(), 2);

    let (_, views) =
      send(&app, "GET", "/personnel?role=any&q=student", None).await;
    assert_eq!(views.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/personnel?role=principal", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn reset_password_returns_fresh_credential_each_time() {
    let app = router();

    let (_, account) = send(
      &app,
      "POST",
      "/users",
      Some(serde_json::json!({"username": "t1", "role": "teacher"})),
    )
    .await;
    let id = account["account"]["id"].as_str().unwrap();

    let (status, first) = send(
      &app,
      "PATCH",
      &format!("/users/{id}/reset-password"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = send(
      &app,
      "PATCH",
      &format!("/users/{id}/reset-password"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert!(!first["temp_password"].as_str().unwrap().is_empty());
    assert!(!second["temp_password"].as_str().unwrap().is_empty());
    assert_ne!(first["temp_password"], second["temp_password"]);
  }

  #[tokio::test]
  async fn reset_password_on_stale_id_returns_404() {
    let app = router();
    let (status, _) =
      send(&app, "PATCH", "/users/gone/reset-password", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn delete_routes_return_204_then_404() {
    let app = router();

    let (_, teacher) = send(
      &app,
      "POST",
      "/teachers",
      Some(serde_json::json!({"full_name": "To Delete"})),
    )
    .await;
    let id = teacher["id"].as_str().unwrap();

    let (status, _) =
      send(&app, "DELETE", &format!("/teachers/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) =
      send(&app, "DELETE", &format!("/teachers/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
