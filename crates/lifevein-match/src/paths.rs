//! Remote-store path layout.
//!
//! The canonical copy of a request is owner-scoped; its public projection
//! shares the same id under a flat node. Donor cards are published per
//! account, keyed by the account id.

/// Legacy flat donor collection, still read as the primary donor source.
pub const DONORS: &str = "donors";

/// Per-account donor cards published alongside profile saves.
pub const DONOR_CARDS: &str = "donors_public";

/// Public projections of requests, keyed by request id.
pub const REQUESTS_PUBLIC: &str = "requests_public";

pub fn private_request(owner_id: &str, request_id: &str) -> String {
  format!("requests/{owner_id}/{request_id}")
}

pub fn public_request(request_id: &str) -> String {
  format!("{REQUESTS_PUBLIC}/{request_id}")
}

pub fn profile(account_id: &str) -> String {
  format!("users/{account_id}/profile")
}

pub fn donor_card(account_id: &str) -> String {
  format!("{DONOR_CARDS}/{account_id}")
}
