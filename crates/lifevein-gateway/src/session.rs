//! Anonymous sessions against the hosted identity endpoint.
//!
//! Public reads and owner-scoped writes both require *some* session; the
//! app never implements credentials of its own, it only gets-or-creates an
//! anonymous one. `ensure_session` is idempotent and safe to call before
//! every operation.

use std::future::Future;

use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::error::{Error, Result};

/// An authenticated (possibly anonymous) session with the remote store.
#[derive(Debug, Clone)]
pub struct Session {
  /// The account id, used as the owner key for profiles and requests.
  pub account_id: String,
  /// Bearer token attached to REST calls; absent for test sessions.
  pub token:      Option<String>,
}

/// Get-or-create a session. Implementations must be idempotent.
pub trait SessionProvider: Send + Sync {
  fn ensure_session(&self) -> impl Future<Output = Result<Session>> + Send + '_;
}

// ─── Anonymous sign-up ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SignUpResponse {
  #[serde(rename = "localId")]
  local_id: String,
  #[serde(rename = "idToken")]
  id_token: String,
}

/// Creates an anonymous session on first use and caches it for the life of
/// the process. Repeated calls return the cached session without touching
/// the network.
pub struct AnonymousAuth {
  client:     reqwest::Client,
  signup_url: String,
  api_key:    String,
  cached:     Mutex<Option<Session>>,
}

impl AnonymousAuth {
  /// `signup_url` is the identity endpoint's anonymous sign-up URL;
  /// `api_key` the project key passed as the `key` query parameter.
  pub fn new(signup_url: impl Into<String>, api_key: impl Into<String>) -> Self {
    Self {
      client:     reqwest::Client::new(),
      signup_url: signup_url.into(),
      api_key:    api_key.into(),
      cached:     Mutex::new(None),
    }
  }
}

impl SessionProvider for AnonymousAuth {
  async fn ensure_session(&self) -> Result<Session> {
    let mut cached = self.cached.lock().await;
    if let Some(session) = cached.as_ref() {
      return Ok(session.clone());
    }

    let response = self
      .client
      .post(&self.signup_url)
      .query(&[("key", self.api_key.as_str())])
      .json(&json!({ "returnSecureToken": true }))
      .send()
      .await
      .map_err(|e| Error::Unauthorized(format!("anonymous sign-up failed: {e}")))?;

    if !response.status().is_success() {
      return Err(Error::Unauthorized(format!(
        "anonymous sign-up rejected: {}",
        response.status()
      )));
    }

    let body: SignUpResponse = response
      .json()
      .await
      .map_err(|e| Error::Unauthorized(format!("malformed sign-up response: {e}")))?;

    let session = Session {
      account_id: body.local_id,
      token:      Some(body.id_token),
    };
    *cached = Some(session.clone());

    tracing::debug!(account_id = %session.account_id, "anonymous session created");
    Ok(session)
  }
}

// ─── Fixed session for tests ─────────────────────────────────────────────────

/// A session provider that always returns the same session. Used by tests
/// and by deployments where the caller manages identity out of band.
pub struct StaticSession {
  session: Session,
}

impl StaticSession {
  pub fn new(account_id: impl Into<String>) -> Self {
    Self {
      session: Session { account_id: account_id.into(), token: None },
    }
  }
}

impl SessionProvider for StaticSession {
  async fn ensure_session(&self) -> Result<Session> {
    Ok(self.session.clone())
  }
}
