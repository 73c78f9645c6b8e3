//! Planned donation appointments.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A planned donation appointment. Lives in the local cache only, until
/// explicitly removed; there is no automatic expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
  pub id:         String,
  /// The donor this appointment is for. A foreign key, not an ownership
  /// relation.
  pub donor_id:   String,
  /// Calendar date as text, e.g. `"2026-03-14"`.
  pub date_label: String,
  pub notes:      Option<String>,
}

impl ScheduleEntry {
  pub fn new(donor_id: impl Into<String>, date_label: impl Into<String>) -> Self {
    Self {
      id:         Uuid::new_v4().to_string(),
      donor_id:   donor_id.into(),
      date_label: date_label.into(),
      notes:      None,
    }
  }
}
