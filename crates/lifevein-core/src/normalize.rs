//! The record normalizer: canonical in-memory shapes ↔ wire JSON.
//!
//! Stored records span several historical schemas (alternate field names,
//! label vs. code blood types, numbers stored as strings). Each accepted
//! input shape is listed in an explicit, ordered fallback table here —
//! nothing else in the codebase touches legacy field names.
//!
//! Reads are tolerant: a malformed field normalizes to a default rather
//! than failing, so one corrupt record can never break a list read. A
//! value is rejected (`None`) only when it is not a JSON object at all or
//! carries none of the record's identifying fields.

use serde_json::{Map, Value, json};

use crate::{
  blood_type::BloodType,
  donor::DonorRecord,
  profile::UserProfile,
  request::BloodRequest,
};

// ─── Field-fallback primitives ───────────────────────────────────────────────

/// First non-null string among `keys`, in order.
pub fn first_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
  for key in keys {
    if let Some(Value::String(s)) = obj.get(*key) {
      return Some(s.clone());
    }
  }
  None
}

/// First value among `keys` readable as epoch milliseconds. Accepts JSON
/// numbers and numeric strings (some historical writers stored longs as
/// text).
pub fn first_millis(obj: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
  for key in keys {
    match obj.get(*key) {
      Some(Value::Number(n)) => {
        if let Some(v) = n.as_i64() {
          return Some(v);
        }
      }
      Some(Value::String(s)) => {
        if let Ok(v) = s.trim().parse::<i64>() {
          return Some(v);
        }
      }
      _ => {}
    }
  }
  None
}

/// Resolve the free-text location of a donor card: prefer the new-schema
/// `location` field, fall back to the old-schema `city` only when the new
/// one is absent. The two are never merged.
pub fn resolve_location(obj: &Map<String, Value>) -> Option<String> {
  first_string(obj, &["location", "city"])
}

fn as_bool(obj: &Map<String, Value>, key: &str) -> bool {
  matches!(obj.get(key), Some(Value::Bool(true)))
}

fn non_empty(s: Option<String>) -> Option<String> {
  s.filter(|v| !v.trim().is_empty())
}

// ─── Donors ──────────────────────────────────────────────────────────────────

/// Decode one stored donor card. `id` is the storage key of the entry.
pub fn donor_from_value(id: &str, value: &Value) -> Option<DonorRecord> {
  let obj = value.as_object()?;
  if !obj.contains_key("name") && !obj.contains_key("bloodGroup") {
    return None;
  }

  let blood_type = first_string(obj, &["bloodGroup", "group"])
    .map(|raw| BloodType::parse(&raw))
    .unwrap_or(BloodType::OPos);

  Some(DonorRecord {
    id: id.to_string(),
    name: first_string(obj, &["name"]).unwrap_or_default(),
    blood_type,
    phone: non_empty(first_string(obj, &["phone", "contact", "contactNumber"])),
    location_label: non_empty(resolve_location(obj)),
    district: non_empty(first_string(obj, &["district"])),
    last_donation_millis: first_millis(obj, &["lastDonationMillis"]).filter(|&v| v > 0),
    verified: as_bool(obj, "verified"),
    hospital_preference: non_empty(first_string(obj, &["hospitalPreference", "hospital"])),
  })
}

/// Encode a donor card in the canonical storage schema. Optional fields
/// are written as JSON null so a later read sees an explicit absence.
pub fn donor_to_value(donor: &DonorRecord) -> Value {
  json!({
    "name": donor.name,
    "bloodGroup": donor.blood_type.label(),
    "phone": donor.phone,
    "location": donor.location_label,
    "district": donor.district,
    "lastDonationMillis": donor.last_donation_millis,
    "verified": donor.verified,
    "hospitalPreference": donor.hospital_preference,
  })
}

// ─── Requests ────────────────────────────────────────────────────────────────

/// Decode one stored blood request. `id` is the storage key of the entry.
pub fn request_from_value(id: &str, value: &Value) -> Option<BloodRequest> {
  let obj = value.as_object()?;
  if !obj.contains_key("requesterName")
    && !obj.contains_key("name")
    && !obj.contains_key("bloodGroup")
    && !obj.contains_key("group")
  {
    return None;
  }

  let blood_type = first_string(obj, &["bloodGroup", "group"])
    .map(|raw| BloodType::parse(&raw))
    .unwrap_or(BloodType::OPos);

  Some(BloodRequest {
    id: id.to_string(),
    owner_id: first_string(obj, &["ownerUid"]).unwrap_or_default(),
    requester_name: first_string(obj, &["requesterName", "name"]).unwrap_or_default(),
    hospital_name: first_string(obj, &["hospitalName", "hospital"]).unwrap_or_default(),
    location_label: first_string(obj, &["locationName", "location", "address"])
      .unwrap_or_default(),
    phone: first_string(obj, &["phone", "contact", "contactNumber"]).unwrap_or_default(),
    blood_type,
    needed_on_millis: first_millis(
      obj,
      &["neededOnMillis", "neededDateMillis", "needDate", "dateNeeded", "requiredOn"],
    )
    .unwrap_or(0),
    created_at_millis: first_millis(obj, &["createdAt"]).unwrap_or(0),
    fulfilled_at_millis: first_millis(obj, &["fulfilledAt"]).filter(|&v| v > 0),
  })
}

/// Encode a request in the canonical storage schema, as written to both
/// the owner-scoped path and the public projection.
pub fn request_to_value(request: &BloodRequest) -> Value {
  json!({
    "ownerUid": request.owner_id,
    "requesterName": request.requester_name,
    "hospitalName": request.hospital_name,
    "locationName": request.location_label,
    "bloodGroup": request.blood_type.label(),
    "phone": request.phone,
    "neededOnMillis": request.needed_on_millis,
    "createdAt": request.created_at_millis,
    "fulfilledAt": request.fulfilled_at_millis,
  })
}

// ─── Profiles ────────────────────────────────────────────────────────────────

/// Decode a private profile stored under `users/{uid}/profile`.
pub fn profile_from_value(value: &Value) -> Option<UserProfile> {
  let obj = value.as_object()?;
  let name = first_string(obj, &["name"])?;

  Some(UserProfile {
    name,
    blood_type: first_string(obj, &["bloodGroup"])
      .map(|raw| BloodType::parse(&raw))
      .unwrap_or(BloodType::OPos),
    last_donation_millis: first_millis(obj, &["lastDonationMillis"]).filter(|&v| v > 0),
    total_donations: first_millis(obj, &["totalDonations"]).unwrap_or(0).max(0) as u32,
    contact_number: first_string(obj, &["contactNumber", "contact", "phone"])
      .unwrap_or_default(),
    location: resolve_location(obj).unwrap_or_default(),
  })
}

/// Encode the private profile for `users/{uid}/profile`.
pub fn profile_to_value(profile: &UserProfile) -> Value {
  json!({
    "name": profile.name,
    "bloodGroup": profile.blood_type.label(),
    "lastDonationMillis": profile.last_donation_millis,
    "totalDonations": profile.total_donations,
    "contactNumber": profile.contact_number,
    "location": profile.location,
  })
}

/// The denormalized public donor card published alongside a profile save.
/// A projection of the profile, not an independent entity.
pub fn donor_card_from_profile(profile: &UserProfile) -> Value {
  json!({
    "name": profile.name,
    "bloodGroup": profile.blood_type.label(),
    "phone": profile.contact_number,
    "location": profile.location,
    "lastDonationMillis": profile.last_donation_millis,
  })
}
