//! Blood requests — a standing need for blood.
//!
//! Exactly one canonical copy of each request is owner-scoped; a
//! denormalized public projection exists for cross-account discovery and is
//! kept in sync on every mutation. The lifecycle is one-way:
//! `Active -> Fulfilled` (projection removed, private copy stamped) or
//! `Active -> Deleted/Expired` (both copies removed). Nothing returns to
//! `Active`.

use serde::{Deserialize, Serialize};

use crate::blood_type::BloodType;

/// A standing need for blood, owned by exactly one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodRequest {
  /// Opaque unique key; also the key of the public projection.
  pub id:                  String,
  /// The creating account. Required for authorization and for excluding
  /// the caller's own requests from match results.
  pub owner_id:            String,
  pub requester_name:      String,
  pub hospital_name:       String,
  pub location_label:      String,
  pub phone:               String,
  pub blood_type:          BloodType,
  /// Epoch milliseconds of the deadline. `0` means "no deadline / ASAP".
  pub needed_on_millis:    i64,
  pub created_at_millis:   i64,
  /// Presence marks the request closed by its owner.
  pub fulfilled_at_millis: Option<i64>,
}

impl BloodRequest {
  /// A request is active iff it has not been fulfilled and its deadline is
  /// zero or still in the future at `as_of`.
  pub fn is_active(&self, as_of: i64) -> bool {
    self.fulfilled_at_millis.is_none()
      && (self.needed_on_millis == 0 || self.needed_on_millis >= as_of)
  }
}

/// The subset of request fields an owner may edit after creation.
/// `created_at` and `owner_id` are never writable.
#[derive(Debug, Clone, Default)]
pub struct RequestEdit {
  pub requester_name: Option<String>,
  pub hospital_name:  Option<String>,
  pub location_label: Option<String>,
  pub phone:          Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request(needed_on: i64) -> BloodRequest {
    BloodRequest {
      id: "r1".into(),
      owner_id: "u1".into(),
      requester_name: "Mina".into(),
      hospital_name: "Dhaka Medical".into(),
      location_label: "Dhaka".into(),
      phone: "01710000004".into(),
      blood_type: BloodType::AbNeg,
      needed_on_millis: needed_on,
      created_at_millis: 1_000,
      fulfilled_at_millis: None,
    }
  }

  #[test]
  fn zero_deadline_is_always_active() {
    let r = request(0);
    assert!(r.is_active(0));
    assert!(r.is_active(i64::MAX));
  }

  #[test]
  fn future_deadline_is_active_until_it_passes() {
    let r = request(5_000);
    assert!(r.is_active(4_999));
    assert!(r.is_active(5_000));
    assert!(!r.is_active(5_001));
  }

  #[test]
  fn fulfilled_requests_are_never_active() {
    let mut r = request(0);
    r.fulfilled_at_millis = Some(2_000);
    assert!(!r.is_active(1_000));
  }
}
