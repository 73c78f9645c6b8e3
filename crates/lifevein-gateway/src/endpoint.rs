//! The `Endpoint` trait — one backing copy of the remote store.
//!
//! Implemented by [`crate::rest::RestEndpoint`] for real deployments and
//! [`crate::memory::MemoryEndpoint`] for tests. The
//! [`Gateway`](crate::failover::Gateway) composes an ordered list of these.

use std::{collections::BTreeMap, future::Future, sync::Arc};

use serde_json::{Map, Value};

use crate::error::Result;

/// One backing copy of the hierarchical remote store.
///
/// Paths are slash-separated (`"requests_public/abc123"`). Reads of an
/// absent path yield `None`, and removing an absent path is a no-op — both
/// required so the idempotent cleanup sweeps race safely.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait Endpoint: Send + Sync {
  /// Short human-readable identifier used in failover logs.
  fn name(&self) -> &str;

  /// Read the value stored at `path`, or `None` if nothing is there.
  fn read<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<Option<Value>>> + Send + 'a;

  /// Replace the value at `path` entirely.
  fn write<'a>(
    &'a self,
    path: &'a str,
    value: Value,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Merge `partial` into the object at `path`, leaving other children
  /// untouched.
  fn update<'a>(
    &'a self,
    path: &'a str,
    partial: Map<String, Value>,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Delete the value at `path`. Deleting an absent path succeeds.
  fn remove<'a>(&'a self, path: &'a str) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Return the children of `path` whose `child` field equals `equals`,
  /// keyed by child key.
  fn query_eq<'a>(
    &'a self,
    path: &'a str,
    child: &'a str,
    equals: &'a Value,
  ) -> impl Future<Output = Result<BTreeMap<String, Value>>> + Send + 'a;
}

// Shared endpoints: lets tests hold onto an endpoint the gateway also owns.
impl<E: Endpoint> Endpoint for Arc<E> {
  fn name(&self) -> &str {
    (**self).name()
  }

  async fn read(&self, path: &str) -> Result<Option<Value>> {
    (**self).read(path).await
  }

  async fn write(&self, path: &str, value: Value) -> Result<()> {
    (**self).write(path, value).await
  }

  async fn update(&self, path: &str, partial: Map<String, Value>) -> Result<()> {
    (**self).update(path, partial).await
  }

  async fn remove(&self, path: &str) -> Result<()> {
    (**self).remove(path).await
  }

  async fn query_eq(
    &self,
    path: &str,
    child: &str,
    equals: &Value,
  ) -> Result<BTreeMap<String, Value>> {
    (**self).query_eq(path, child, equals).await
  }
}
