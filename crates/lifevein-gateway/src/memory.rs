//! [`MemoryEndpoint`] — an in-process JSON tree used by tests.
//!
//! Plays the role a real region plays for the gateway, with failure
//! injection so failover order and error propagation can be exercised
//! without a network.

use std::{
  collections::BTreeMap,
  sync::Mutex,
};

use serde_json::{Map, Value, json};

use crate::{
  endpoint::Endpoint,
  error::{Error, Result},
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
  Healthy,
  /// Every operation fails with a transport error.
  Failing,
  /// Every operation fails with an authorization error.
  Unauthorized,
}

/// An in-memory remote-store region.
pub struct MemoryEndpoint {
  name: String,
  mode: Mode,
  tree: Mutex<Value>,
}

impl MemoryEndpoint {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      mode: Mode::Healthy,
      tree: Mutex::new(json!({})),
    }
  }

  /// An endpoint whose every operation fails with a transport error.
  pub fn failing(name: impl Into<String>) -> Self {
    Self { mode: Mode::Failing, ..Self::new(name) }
  }

  /// An endpoint whose every operation is rejected as unauthorized.
  pub fn unauthorized(name: impl Into<String>) -> Self {
    Self { mode: Mode::Unauthorized, ..Self::new(name) }
  }

  /// Seed a path directly, bypassing the `Endpoint` interface.
  pub fn seed(&self, path: &str, value: Value) {
    let mut tree = self.tree.lock().expect("endpoint tree poisoned");
    set_at(&mut tree, path, value);
  }

  /// Snapshot a path directly, bypassing the `Endpoint` interface.
  pub fn snapshot(&self, path: &str) -> Option<Value> {
    let tree = self.tree.lock().expect("endpoint tree poisoned");
    get_at(&tree, path).cloned()
  }

  fn check(&self) -> Result<()> {
    match self.mode {
      Mode::Healthy => Ok(()),
      Mode::Failing => Err(Error::Transport {
        endpoint: self.name.clone(),
        message:  "simulated outage".into(),
      }),
      Mode::Unauthorized => {
        Err(Error::Unauthorized(format!("rejected by {}", self.name)))
      }
    }
  }
}

// ─── Path navigation ─────────────────────────────────────────────────────────

fn segments(path: &str) -> impl Iterator<Item = &str> {
  path.split('/').filter(|s| !s.is_empty())
}

fn get_at<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
  let mut node = tree;
  for segment in segments(path) {
    node = node.as_object()?.get(segment)?;
  }
  Some(node)
}

fn set_at(tree: &mut Value, path: &str, value: Value) {
  let mut node = tree;
  let parts: Vec<&str> = segments(path).collect();

  for (i, segment) in parts.iter().enumerate() {
    if !node.is_object() {
      *node = json!({});
    }
    let map = node.as_object_mut().expect("just ensured object");

    if i == parts.len() - 1 {
      map.insert((*segment).to_string(), value);
      return;
    }
    node = map.entry((*segment).to_string()).or_insert_with(|| json!({}));
  }
}

fn remove_at(tree: &mut Value, path: &str) {
  let parts: Vec<&str> = segments(path).collect();
  let Some((last, parents)) = parts.split_last() else {
    return;
  };

  let mut node = &mut *tree;
  for segment in parents {
    match node.get_mut(*segment) {
      Some(child) => node = child,
      None => return,
    }
  }
  if let Some(map) = node.as_object_mut() {
    map.remove(*last);
  }
}

// ─── Endpoint impl ───────────────────────────────────────────────────────────

impl Endpoint for MemoryEndpoint {
  fn name(&self) -> &str {
    &self.name
  }

  async fn read(&self, path: &str) -> Result<Option<Value>> {
    self.check()?;
    let tree = self.tree.lock().expect("endpoint tree poisoned");
    Ok(get_at(&tree, path).filter(|v| !v.is_null()).cloned())
  }

  async fn write(&self, path: &str, value: Value) -> Result<()> {
    self.check()?;
    let mut tree = self.tree.lock().expect("endpoint tree poisoned");
    set_at(&mut tree, path, value);
    Ok(())
  }

  async fn update(&self, path: &str, partial: Map<String, Value>) -> Result<()> {
    self.check()?;
    let mut tree = self.tree.lock().expect("endpoint tree poisoned");

    let mut merged = match get_at(&tree, path) {
      Some(Value::Object(existing)) => existing.clone(),
      _ => Map::new(),
    };
    merged.extend(partial);
    set_at(&mut tree, path, Value::Object(merged));
    Ok(())
  }

  async fn remove(&self, path: &str) -> Result<()> {
    self.check()?;
    let mut tree = self.tree.lock().expect("endpoint tree poisoned");
    remove_at(&mut tree, path);
    Ok(())
  }

  async fn query_eq(
    &self,
    path: &str,
    child: &str,
    equals: &Value,
  ) -> Result<BTreeMap<String, Value>> {
    self.check()?;
    let tree = self.tree.lock().expect("endpoint tree poisoned");

    let mut results = BTreeMap::new();
    if let Some(Value::Object(children)) = get_at(&tree, path) {
      for (key, value) in children {
        if value.get(child) == Some(equals) {
          results.insert(key.clone(), value.clone());
        }
      }
    }
    Ok(results)
  }
}
