//! [`RemoteStore`] — async HTTP client for the two remote stores.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use rollcall_core::{
  Error, ErrorKind, Result,
  provision::{NewAccount, Provisioned, TempPassword},
  record::{
    AccountRecord, DirectoryRecord, NewTeacher, RecordId, Role, TeacherPatch,
  },
  store::{AccountStore, DirectoryStore},
};
use serde::{Deserialize, Serialize};

/// Connection settings for the remote admin API.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
  pub base_url: String,
  /// Basic-auth credentials; leave the username empty to send none.
  pub username: String,
  pub password: String,
}

/// Async HTTP client for both remote stores.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RemoteStore {
  client: Client,
  config: RemoteConfig,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
  error: String,
}

#[derive(Debug, Serialize)]
struct LinkBody<'a> {
  user_id: &'a RecordId,
}

#[derive(Debug, Deserialize)]
struct ResetBody {
  temp_password: TempPassword,
}

impl RemoteStore {
  pub fn new(config: RemoteConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.config.base_url.trim_end_matches('/'))
  }

  fn with_auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
    let resp = self
      .with_auth(req)
      .send()
      .await
      .map_err(|e| Error::Network(format!("{what} failed: {e}")))?;

    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }

    // Preserve the category the store assigned; fall back to the status
    // line when the body carries no message.
    let message = resp
      .json::<ErrorBody>()
      .await
      .map(|b| b.error)
      .unwrap_or_else(|_| format!("{what} → {status}"));
    Err(Error::Remote {
      kind: kind_for(status),
      message,
    })
  }

  async fn read_json<T: serde::de::DeserializeOwned>(
    resp: Response,
    what: &str,
  ) -> Result<T> {
    resp
      .json()
      .await
      .map_err(|e| Error::Network(format!("deserialising {what}: {e}")))
  }
}

fn kind_for(status: StatusCode) -> ErrorKind {
  match status {
    StatusCode::NOT_FOUND => ErrorKind::NotFound,
    StatusCode::CONFLICT => ErrorKind::Conflict,
    StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
      ErrorKind::Validation
    }
    _ => ErrorKind::Network,
  }
}

// ─── Directory side ──────────────────────────────────────────────────────────

impl DirectoryStore for RemoteStore {
  /// `GET /teachers`
  async fn list_teachers(&self) -> Result<Vec<DirectoryRecord>> {
    let resp = self
      .send(self.client.get(self.url("/teachers")), "GET /teachers")
      .await?;
    Self::read_json(resp, "teachers").await
  }

  /// `POST /teachers`
  async fn create_teacher(&self, input: NewTeacher) -> Result<DirectoryRecord> {
    let resp = self
      .send(
        self.client.post(self.url("/teachers")).json(&input),
        "POST /teachers",
      )
      .await?;
    Self::read_json(resp, "created teacher").await
  }

  /// `PATCH /teachers/{id}`
  async fn update_teacher(
    &self,
    id: RecordId,
    patch: TeacherPatch,
  ) -> Result<DirectoryRecord> {
    let resp = self
      .send(
        self
          .client
          .patch(self.url(&format!("/teachers/{id}")))
          .json(&patch),
        "PATCH /teachers/{id}",
      )
      .await?;
    Self::read_json(resp, "updated teacher").await
  }

  /// `DELETE /teachers/{id}`
  async fn delete_teacher(&self, id: RecordId) -> Result<()> {
    self
      .send(
        self.client.delete(self.url(&format!("/teachers/{id}"))),
        "DELETE /teachers/{id}",
      )
      .await?;
    Ok(())
  }

  /// `POST /teachers/{id}/link-user`
  async fn link_account(
    &self,
    teacher_id: RecordId,
    account_id: RecordId,
  ) -> Result<DirectoryRecord> {
    let resp = self
      .send(
        self
          .client
          .post(self.url(&format!("/teachers/{teacher_id}/link-user")))
          .json(&LinkBody {
            user_id: &account_id,
          }),
        "POST /teachers/{id}/link-user",
      )
      .await?;
    Self::read_json(resp, "linked teacher").await
  }
}

// ─── Account side ────────────────────────────────────────────────────────────

impl AccountStore for RemoteStore {
  /// `GET /users[?role=<role>]`
  async fn list_accounts(&self, role: Option<Role>) -> Result<Vec<AccountRecord>> {
    let mut req = self.client.get(self.url("/users"));
    if let Some(role) = role {
      req = req.query(&[("role", role.to_string())]);
    }
    let resp = self.send(req, "GET /users").await?;
    Self::read_json(resp, "accounts").await
  }

  /// `POST /users`
  async fn create_account(&self, input: NewAccount) -> Result<Provisioned> {
    let resp = self
      .send(
        self.client.post(self.url("/users")).json(&input),
        "POST /users",
      )
      .await?;
    Self::read_json(resp, "provisioned account").await
  }

  /// `PATCH /users/{id}/reset-password`
  async fn reset_password(&self, id: RecordId) -> Result<TempPassword> {
    let resp = self
      .send(
        self
          .client
          .patch(self.url(&format!("/users/{id}/reset-password"))),
        "PATCH /users/{id}/reset-password",
      )
      .await?;
    let body: ResetBody = Self::read_json(resp, "reset response").await?;
    Ok(body.temp_password)
  }

  /// `DELETE /users/{id}`
  async fn delete_account(&self, id: RecordId) -> Result<()> {
    self
      .send(
        self.client.delete(self.url(&format!("/users/{id}"))),
        "DELETE /users/{id}",
      )
      .await?;
    Ok(())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
