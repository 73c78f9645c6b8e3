//! Pure eligibility-window and expiry calculations.
//!
//! Used both for UI display (days-until-eligible badges) and for pruning
//! stale requests. Everything here takes `now` explicitly so calls are
//! deterministic and testable.

use crate::request::BloodRequest;

/// Minimum days required between two donations.
pub const MIN_INTERVAL_DAYS: i64 = 90;

pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whether a donor with the given last-donation instant may donate again.
///
/// A missing timestamp means "never recorded" and counts as eligible.
/// Elapsed time is measured in whole days (fractional days do not count).
pub fn is_eligible(
  last_donation_millis: Option<i64>,
  min_interval_days: i64,
  now_millis: i64,
) -> bool {
  match last_donation_millis {
    None => true,
    Some(last) => (now_millis - last) / MILLIS_PER_DAY >= min_interval_days,
  }
}

/// Whole days until the donor becomes eligible again, floored at zero.
///
/// Zero whenever [`is_eligible`] is true.
pub fn days_remaining(
  last_donation_millis: Option<i64>,
  min_interval_days: i64,
  now_millis: i64,
) -> i64 {
  let Some(last) = last_donation_millis else {
    return 0;
  };
  let next_eligible = last + min_interval_days * MILLIS_PER_DAY;
  let diff = next_eligible - now_millis;
  if diff > 0 { diff / MILLIS_PER_DAY } else { 0 }
}

/// Whether a request deadline has passed.
///
/// True iff `needed_on_millis` lies in the open interval `(0, now)`. A
/// value of zero (or below) means "no deadline" and is never expired.
pub fn is_expired(needed_on_millis: i64, now_millis: i64) -> bool {
  needed_on_millis > 0 && needed_on_millis < now_millis
}

/// Partition `requests` into those still worth keeping and the ids of the
/// expired ones. The caller is responsible for issuing the corresponding
/// deletes for both the owner-scoped and public copies.
pub fn partition_expired(
  requests: Vec<BloodRequest>,
  now_millis: i64,
) -> (Vec<BloodRequest>, Vec<String>) {
  let mut kept = Vec::new();
  let mut removed_ids = Vec::new();

  for request in requests {
    if is_expired(request.needed_on_millis, now_millis) {
      removed_ids.push(request.id);
    } else {
      kept.push(request);
    }
  }

  (kept, removed_ids)
}
