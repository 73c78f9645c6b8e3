//! The ordered-failover combinator over a list of endpoints.

use std::{collections::BTreeMap, future::Future};

use serde_json::{Map, Value};

use crate::{
  endpoint::Endpoint,
  error::{Error, Result},
};

/// A gateway over one or more backing endpoints, primary first.
///
/// Every operation is attempted against each endpoint in order and the
/// first success is returned. Authorization failures are surfaced
/// immediately — a rejected credential will be rejected everywhere, so
/// there is nothing to fail over to. When every endpoint fails, the
/// **last** endpoint's error is propagated: the last entry is the default
/// fallback and its error message is the most actionable one.
///
/// Successful writes are endpoint-local; the gateway never replays a write
/// against the remaining endpoints.
pub struct Gateway<E> {
  endpoints: Vec<E>,
}

impl<E: Endpoint> Gateway<E> {
  /// Build a gateway over `endpoints`, ordered primary first. An empty
  /// list is accepted but every operation will fail with
  /// [`Error::NoEndpoints`].
  pub fn new(endpoints: Vec<E>) -> Self {
    Self { endpoints }
  }

  /// Attempt `op` against each endpoint in order; first success wins.
  async fn try_in_order<'a, T, F, Fut>(&'a self, op: F) -> Result<T>
  where
    F: Fn(&'a E) -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    let mut last_error = Error::NoEndpoints;

    for endpoint in &self.endpoints {
      match op(endpoint).await {
        Ok(value) => return Ok(value),
        Err(error) if error.is_unauthorized() => return Err(error),
        Err(error) => {
          tracing::warn!(endpoint = endpoint.name(), %error, "endpoint attempt failed");
          last_error = error;
        }
      }
    }

    Err(last_error)
  }

  pub async fn read(&self, path: &str) -> Result<Option<Value>> {
    self.try_in_order(|e| e.read(path)).await
  }

  pub async fn write(&self, path: &str, value: &Value) -> Result<()> {
    self.try_in_order(|e| e.write(path, value.clone())).await
  }

  pub async fn update(&self, path: &str, partial: &Map<String, Value>) -> Result<()> {
    self.try_in_order(|e| e.update(path, partial.clone())).await
  }

  pub async fn remove(&self, path: &str) -> Result<()> {
    self.try_in_order(|e| e.remove(path)).await
  }

  pub async fn query_eq(
    &self,
    path: &str,
    child: &str,
    equals: &Value,
  ) -> Result<BTreeMap<String, Value>> {
    self.try_in_order(|e| e.query_eq(path, child, equals)).await
  }
}
