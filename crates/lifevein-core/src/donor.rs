//! Donor records — one person available to donate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blood_type::BloodType;

/// A person available to donate, as surfaced by donor search and the
/// offline emergency list.
///
/// `district` is a strict filtering key: queries that filter by district
/// compare it case-insensitively and never fall back to `location_label`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorRecord {
  /// Opaque unique key. Assigned by the store on creation and stable for
  /// the record's lifetime; locally created records use a fresh UUID.
  pub id:                   String,
  pub name:                 String,
  pub blood_type:           BloodType,
  /// Absence means the donor cannot be contacted directly.
  pub phone:                Option<String>,
  /// Free-text city/area. Arrives under two legacy field names in storage;
  /// the normalizer resolves them to this one field.
  pub location_label:       Option<String>,
  pub district:             Option<String>,
  /// Epoch milliseconds of the last recorded donation. Absence means
  /// "never recorded", which counts as always eligible.
  pub last_donation_millis: Option<i64>,
  pub verified:             bool,
  pub hospital_preference:  Option<String>,
}

impl DonorRecord {
  /// A minimal record with a fresh id; everything optional left empty.
  pub fn new(name: impl Into<String>, blood_type: BloodType) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      name: name.into(),
      blood_type,
      phone: None,
      location_label: None,
      district: None,
      last_donation_millis: None,
      verified: false,
      hospital_preference: None,
    }
  }

  /// Case-insensitive equality on the `district` field only. A record with
  /// no district never matches, regardless of `location_label`.
  pub fn in_district(&self, district: &str) -> bool {
    self
      .district
      .as_deref()
      .is_some_and(|d| d.eq_ignore_ascii_case(district))
  }
}
