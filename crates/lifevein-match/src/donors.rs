//! Donor search.
//!
//! Blood types were stored under two spellings over time (display label
//! and enum-style code), so every filtered search runs one query per
//! spelling and merges the results by record id. District filtering is
//! strict: it compares the `district` field only, never the free-text
//! location label.

use std::collections::BTreeMap;

use lifevein_core::{BloodType, DonorRecord, normalize};
use lifevein_gateway::Endpoint;
use serde_json::Value;

use crate::{MatchEngine, Result, paths};

impl<E: Endpoint> MatchEngine<E> {
  /// Donors of the given blood type, optionally narrowed to a district.
  ///
  /// Queries the legacy flat collection first and falls back to the
  /// published donor cards when it is empty. On id collisions between the
  /// label and code queries the later (code) result wins.
  pub async fn find_donors(
    &self,
    blood_type: BloodType,
    district: Option<&str>,
  ) -> Result<Vec<DonorRecord>> {
    let mut merged = self.query_donor_spellings(paths::DONORS, blood_type).await?;
    if merged.is_empty() {
      merged = self
        .query_donor_spellings(paths::DONOR_CARDS, blood_type)
        .await?;
    }

    let mut donors: Vec<_> = merged.into_values().collect();
    if let Some(district) = district {
      donors.retain(|d| d.in_district(district));
    }
    Ok(donors)
  }

  /// Every readable donor record, corrupt entries skipped.
  pub async fn find_all_donors(&self) -> Result<Vec<DonorRecord>> {
    let primary = self.gateway.read(paths::DONORS).await?;
    let node = match primary {
      Some(v) if v.as_object().is_some_and(|o| !o.is_empty()) => v,
      _ => self
        .gateway
        .read(paths::DONOR_CARDS)
        .await?
        .unwrap_or(Value::Null),
    };
    Ok(decode_donor_node(&node))
  }

  async fn query_donor_spellings(
    &self,
    path: &str,
    blood_type: BloodType,
  ) -> Result<BTreeMap<String, DonorRecord>> {
    let mut merged = BTreeMap::new();

    for spelling in [blood_type.label(), blood_type.code()] {
      let hits = self
        .gateway
        .query_eq(path, "bloodGroup", &Value::String(spelling.into()))
        .await?;

      for (id, value) in hits {
        match normalize::donor_from_value(&id, &value) {
          Some(donor) => {
            merged.insert(id, donor);
          }
          None => tracing::debug!(%id, "skipping unreadable donor record"),
        }
      }
    }

    Ok(merged)
  }
}

fn decode_donor_node(node: &Value) -> Vec<DonorRecord> {
  let Some(children) = node.as_object() else {
    return Vec::new();
  };

  children
    .iter()
    .filter_map(|(id, value)| normalize::donor_from_value(id, value))
    .collect()
}

/// Order donors for the offline emergency list: verified donors first,
/// then by blood type label, then by name.
pub fn emergency_order(donors: &mut [DonorRecord]) {
  donors.sort_by(|a, b| {
    b.verified
      .cmp(&a.verified)
      .then_with(|| a.blood_type.label().cmp(b.blood_type.label()))
      .then_with(|| a.name.cmp(&b.name))
  });
}
