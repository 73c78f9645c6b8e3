//! [`RestEndpoint`] — a real remote-store region spoken to over REST.
//!
//! The hosted store exposes every node as `{base_url}/{path}.json` with
//! `GET`/`PUT`/`PATCH`/`DELETE`, and filtered reads via the
//! `orderBy`/`equalTo` query parameters (both JSON-encoded). An `auth`
//! token from the anonymous session is attached when configured.

use std::{collections::BTreeMap, sync::Arc};

use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{Map, Value};

use crate::{
  endpoint::Endpoint,
  error::{Error, Result},
  session::{AnonymousAuth, SessionProvider as _},
};

/// One deployed copy of the remote store.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based. No
/// timeout is enforced here; callers wrap operations in their own budget.
#[derive(Clone)]
pub struct RestEndpoint {
  name:     String,
  base_url: String,
  client:   reqwest::Client,
  auth:     Option<Arc<AnonymousAuth>>,
}

impl RestEndpoint {
  /// `name` shows up in failover logs; `base_url` is the region URL
  /// without a trailing slash.
  pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
    Self {
      name:     name.into(),
      base_url: base_url.into(),
      client:   reqwest::Client::new(),
      auth:     None,
    }
  }

  /// Attach an anonymous-session provider; its token is ensured before
  /// every call.
  pub fn with_auth(mut self, auth: Arc<AnonymousAuth>) -> Self {
    self.auth = Some(auth);
    self
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/{}.json",
      self.base_url.trim_end_matches('/'),
      path.trim_matches('/')
    )
  }

  fn transport(&self, message: impl std::fmt::Display) -> Error {
    Error::Transport { endpoint: self.name.clone(), message: message.to_string() }
  }

  /// Build a request, ensuring a session first when auth is configured.
  async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
    let mut builder = self.client.request(method, self.url(path));

    if let Some(auth) = &self.auth {
      let session = auth.ensure_session().await?;
      if let Some(token) = session.token {
        builder = builder.query(&[("auth", token)]);
      }
    }

    Ok(builder)
  }

  async fn execute(&self, builder: RequestBuilder) -> Result<Value> {
    let response = builder.send().await.map_err(|e| self.transport(e))?;

    match response.status() {
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
        Err(Error::Unauthorized(format!("rejected by {}", self.name)))
      }
      status if !status.is_success() => Err(self.transport(status)),
      _ => response.json().await.map_err(|e| self.transport(e)),
    }
  }
}

impl Endpoint for RestEndpoint {
  fn name(&self) -> &str {
    &self.name
  }

  async fn read(&self, path: &str) -> Result<Option<Value>> {
    let body = self.execute(self.request(Method::GET, path).await?).await?;
    Ok((!body.is_null()).then_some(body))
  }

  async fn write(&self, path: &str, value: Value) -> Result<()> {
    let builder = self.request(Method::PUT, path).await?.json(&value);
    self.execute(builder).await?;
    Ok(())
  }

  async fn update(&self, path: &str, partial: Map<String, Value>) -> Result<()> {
    let builder = self
      .request(Method::PATCH, path)
      .await?
      .json(&Value::Object(partial));
    self.execute(builder).await?;
    Ok(())
  }

  async fn remove(&self, path: &str) -> Result<()> {
    self.execute(self.request(Method::DELETE, path).await?).await?;
    Ok(())
  }

  async fn query_eq(
    &self,
    path: &str,
    child: &str,
    equals: &Value,
  ) -> Result<BTreeMap<String, Value>> {
    let builder = self.request(Method::GET, path).await?.query(&[
      ("orderBy", format!("\"{child}\"")),
      ("equalTo", equals.to_string()),
    ]);

    match self.execute(builder).await? {
      Value::Object(map) => Ok(map.into_iter().collect()),
      Value::Null => Ok(BTreeMap::new()),
      other => Err(self.transport(format!("unexpected query result: {other}"))),
    }
  }
}
