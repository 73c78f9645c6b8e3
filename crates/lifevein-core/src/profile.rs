//! User accounts and profiles.
//!
//! The current profile is an explicitly passed value loaded at session
//! start and threaded through calls — never process-global state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  blood_type::BloodType,
  eligibility::{self, MIN_INTERVAL_DAYS},
};

/// A registered account, as kept in the local cache's `users` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
  pub id:         String,
  pub name:       String,
  pub email:      String,
  pub blood_type: BloodType,
}

impl UserAccount {
  pub fn new(
    name: impl Into<String>,
    email: impl Into<String>,
    blood_type: BloodType,
  ) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      name: name.into(),
      email: email.into(),
      blood_type,
    }
  }
}

/// Profile extensions for an account. One per account, mutated only by its
/// owner; `is_eligible` and `days_remaining` are derived, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
  pub name:                 String,
  pub blood_type:           BloodType,
  pub last_donation_millis: Option<i64>,
  pub total_donations:      u32,
  pub contact_number:       String,
  pub location:             String,
}

impl UserProfile {
  /// Whether the owner may donate at `now_millis` (standard 90-day
  /// interval).
  pub fn is_eligible(&self, now_millis: i64) -> bool {
    eligibility::is_eligible(self.last_donation_millis, MIN_INTERVAL_DAYS, now_millis)
  }

  /// Whole days until the owner becomes eligible again; `0` when already
  /// eligible or no donation is recorded.
  pub fn days_remaining(&self, now_millis: i64) -> i64 {
    eligibility::days_remaining(self.last_donation_millis, MIN_INTERVAL_DAYS, now_millis)
  }
}
