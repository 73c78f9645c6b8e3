//! The request lifecycle: post, edit, fulfill, delete, list, and the
//! expiry sweep.
//!
//! Every request exists as two copies: the canonical owner-scoped record
//! under `requests/{owner}/{id}` and a public projection under
//! `requests_public/{id}` used for cross-account discovery. Mutations fan
//! out to both; fulfillment stamps the private copy and retracts the
//! public one.

use std::collections::{BTreeMap, HashMap};

use lifevein_core::{
  BloodRequest, BloodType, RequestEdit, eligibility, normalize,
};
use lifevein_gateway::{Endpoint, Session};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::{Error, MatchEngine, Result, paths};

impl<E: Endpoint> MatchEngine<E> {
  /// Publish a new request owned by the session's account.
  ///
  /// The id, owner, and creation instant of `request` are overwritten
  /// here; callers only fill in the need itself.
  pub async fn post_request(
    &self,
    session: &Session,
    mut request: BloodRequest,
    now_millis: i64,
  ) -> Result<BloodRequest> {
    if request.id.is_empty() {
      request.id = Uuid::new_v4().to_string();
    }
    request.owner_id = session.account_id.clone();
    request.created_at_millis = now_millis;
    request.fulfilled_at_millis = None;

    let wire = normalize::request_to_value(&request);
    self
      .gateway
      .write(&paths::private_request(&request.owner_id, &request.id), &wire)
      .await?;
    self
      .gateway
      .write(&paths::public_request(&request.id), &wire)
      .await?;

    tracing::info!(request_id = %request.id, "request posted");
    Ok(request)
  }

  /// The public projection of a request, if it exists and is readable.
  pub async fn get_request(&self, request_id: &str) -> Result<Option<BloodRequest>> {
    let value = self.gateway.read(&paths::public_request(request_id)).await?;
    Ok(value.and_then(|v| normalize::request_from_value(request_id, &v)))
  }

  /// Apply an owner edit to both copies. Only the editable fields are
  /// touched; ownership and the creation instant are immutable.
  pub async fn update_request(
    &self,
    session: &Session,
    request_id: &str,
    edit: &RequestEdit,
  ) -> Result<()> {
    let request = self.load_owned(session, request_id).await?;

    let mut partial = Map::new();
    if let Some(name) = &edit.requester_name {
      partial.insert("requesterName".into(), json!(name));
    }
    if let Some(hospital) = &edit.hospital_name {
      partial.insert("hospitalName".into(), json!(hospital));
    }
    if let Some(location) = &edit.location_label {
      partial.insert("locationName".into(), json!(location));
    }
    if let Some(phone) = &edit.phone {
      partial.insert("phone".into(), json!(phone));
    }
    if partial.is_empty() {
      return Ok(());
    }

    self
      .gateway
      .update(&paths::private_request(&request.owner_id, request_id), &partial)
      .await?;
    self
      .gateway
      .update(&paths::public_request(request_id), &partial)
      .await?;
    Ok(())
  }

  /// Close a request: stamp the private copy and retract the public
  /// projection so it stops matching.
  pub async fn fulfill_request(
    &self,
    session: &Session,
    request_id: &str,
    now_millis: i64,
  ) -> Result<()> {
    let request = self.load_owned(session, request_id).await?;

    let mut stamp = Map::new();
    stamp.insert("fulfilledAt".into(), json!(now_millis));
    self
      .gateway
      .update(&paths::private_request(&request.owner_id, request_id), &stamp)
      .await?;
    self
      .gateway
      .remove(&paths::public_request(request_id))
      .await?;

    tracing::info!(%request_id, "request fulfilled");
    Ok(())
  }

  /// Remove both copies of a request the session owns.
  pub async fn delete_request(&self, session: &Session, request_id: &str) -> Result<()> {
    let request = self.load_owned(session, request_id).await?;

    self
      .gateway
      .remove(&paths::private_request(&request.owner_id, request_id))
      .await?;
    self
      .gateway
      .remove(&paths::public_request(request_id))
      .await?;
    Ok(())
  }

  /// All currently active public requests, most urgent first. Requests
  /// with no deadline sort ahead of dated ones.
  pub async fn list_active_requests(&self, now_millis: i64) -> Result<Vec<BloodRequest>> {
    let mut requests = self.read_public_requests().await?;
    requests.retain(|r| r.is_active(now_millis));
    sort_by_urgency(&mut requests);
    Ok(requests)
  }

  /// Public requests matching a donor's blood type, excluding the ones the
  /// session itself posted. Covers both historical blood-type spellings.
  ///
  /// No deadline check here: anything still published is a match, and the
  /// expiry sweep is what retracts stale requests.
  pub async fn list_matching_requests_for_donor(
    &self,
    session: &Session,
    blood_type: BloodType,
  ) -> Result<Vec<BloodRequest>> {
    let mut merged: BTreeMap<String, BloodRequest> = BTreeMap::new();

    for spelling in [blood_type.label(), blood_type.code()] {
      let hits = self
        .gateway
        .query_eq(paths::REQUESTS_PUBLIC, "bloodGroup", &Value::String(spelling.into()))
        .await?;

      for (id, value) in hits {
        if let Some(request) = normalize::request_from_value(&id, &value) {
          merged.insert(id, request);
        }
      }
    }

    let mut requests: Vec<_> = merged
      .into_values()
      .filter(|r| r.owner_id != session.account_id)
      .collect();
    sort_by_urgency(&mut requests);
    Ok(requests)
  }

  /// Delete every public request whose deadline has passed, together with
  /// its owner-scoped copy. Returns the ids removed.
  pub async fn cleanup_expired(&self, now_millis: i64) -> Result<Vec<String>> {
    let requests = self.read_public_requests().await?;
    let owners: HashMap<String, String> = requests
      .iter()
      .map(|r| (r.id.clone(), r.owner_id.clone()))
      .collect();

    let (_kept, removed_ids) = eligibility::partition_expired(requests, now_millis);

    for id in &removed_ids {
      if let Some(owner) = owners.get(id).filter(|o| !o.is_empty()) {
        self.gateway.remove(&paths::private_request(owner, id)).await?;
      }
      self.gateway.remove(&paths::public_request(id)).await?;
    }

    if !removed_ids.is_empty() {
      tracing::info!(count = removed_ids.len(), "expired requests removed");
    }
    Ok(removed_ids)
  }

  /// Load a request and verify the session owns it. Falls back to the
  /// session's own private copy when the public projection is already
  /// retracted (fulfilled requests).
  async fn load_owned(&self, session: &Session, request_id: &str) -> Result<BloodRequest> {
    let value = match self.gateway.read(&paths::public_request(request_id)).await? {
      Some(v) => v,
      None => self
        .gateway
        .read(&paths::private_request(&session.account_id, request_id))
        .await?
        .ok_or_else(|| Error::RequestNotFound { request_id: request_id.into() })?,
    };

    let request = normalize::request_from_value(request_id, &value)
      .ok_or_else(|| Error::RequestNotFound { request_id: request_id.into() })?;

    if request.owner_id != session.account_id {
      return Err(Error::NotOwner { request_id: request_id.into() });
    }
    Ok(request)
  }

  async fn read_public_requests(&self) -> Result<Vec<BloodRequest>> {
    let node = self.gateway.read(paths::REQUESTS_PUBLIC).await?;
    let Some(Value::Object(children)) = node else {
      return Ok(Vec::new());
    };

    Ok(
      children
        .iter()
        .filter_map(|(id, value)| normalize::request_from_value(id, value))
        .collect(),
    )
  }
}

/// No-deadline requests first, then by ascending deadline, ties broken by
/// id for a stable order.
fn sort_by_urgency(requests: &mut [BloodRequest]) {
  requests.sort_by(|a, b| {
    let key = |r: &BloodRequest| (r.needed_on_millis != 0, r.needed_on_millis);
    key(a).cmp(&key(b)).then_with(|| a.id.cmp(&b.id))
  });
}
