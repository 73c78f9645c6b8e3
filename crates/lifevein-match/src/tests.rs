//! Engine tests against an in-memory endpoint.

use std::sync::Arc;

use lifevein_core::{BloodRequest, BloodType, DonorRecord, RequestEdit, UserProfile};
use lifevein_gateway::{
  Gateway, MemoryEndpoint, Session, SessionProvider as _, StaticSession,
};
use serde_json::json;

use crate::{Error, MatchEngine, emergency_order};

const NOW: i64 = 1_700_000_000_000;

fn engine(endpoint: &Arc<MemoryEndpoint>) -> MatchEngine<Arc<MemoryEndpoint>> {
  MatchEngine::new(Gateway::new(vec![endpoint.clone()]))
}

async fn session(account_id: &str) -> Session {
  StaticSession::new(account_id).ensure_session().await.unwrap()
}

fn draft(blood_type: BloodType, needed_on: i64) -> BloodRequest {
  BloodRequest {
    id: String::new(),
    owner_id: String::new(),
    requester_name: "Mina Sultana".into(),
    hospital_name: "Dhaka Medical".into(),
    location_label: "Dhaka".into(),
    phone: "01710000004".into(),
    blood_type,
    needed_on_millis: needed_on,
    created_at_millis: 0,
    fulfilled_at_millis: None,
  }
}

// ─── Request lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn post_writes_both_copies() {
  let ep = Arc::new(MemoryEndpoint::new("primary"));
  let engine = engine(&ep);
  let session = session("u1").await;

  let posted = engine
    .post_request(&session, draft(BloodType::APos, NOW + 1), NOW)
    .await
    .unwrap();

  let private = ep
    .snapshot(&format!("requests/u1/{}", posted.id))
    .expect("private copy");
  let public = ep
    .snapshot(&format!("requests_public/{}", posted.id))
    .expect("public copy");

  assert_eq!(private["ownerUid"], "u1");
  assert_eq!(private["createdAt"], NOW);
  assert_eq!(public, private);
}

#[tokio::test]
async fn get_request_reads_the_public_projection() {
  let ep = Arc::new(MemoryEndpoint::new("primary"));
  let engine = engine(&ep);
  let session = session("u1").await;

  let posted = engine
    .post_request(&session, draft(BloodType::BNeg, 0), NOW)
    .await
    .unwrap();

  let loaded = engine.get_request(&posted.id).await.unwrap().unwrap();
  assert_eq!(loaded.blood_type, BloodType::BNeg);
  assert_eq!(loaded.owner_id, "u1");

  assert!(engine.get_request("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn update_touches_editable_fields_on_both_copies() {
  let ep = Arc::new(MemoryEndpoint::new("primary"));
  let engine = engine(&ep);
  let session = session("u1").await;

  let posted = engine
    .post_request(&session, draft(BloodType::APos, NOW + 1), NOW)
    .await
    .unwrap();

  let edit = RequestEdit {
    phone: Some("01800000000".into()),
    hospital_name: Some("Square".into()),
    ..RequestEdit::default()
  };
  engine.update_request(&session, &posted.id, &edit).await.unwrap();

  for path in [
    format!("requests/u1/{}", posted.id),
    format!("requests_public/{}", posted.id),
  ] {
    let copy = ep.snapshot(&path).unwrap();
    assert_eq!(copy["phone"], "01800000000");
    assert_eq!(copy["hospitalName"], "Square");
    // Immutable fields are untouched.
    assert_eq!(copy["ownerUid"], "u1");
    assert_eq!(copy["createdAt"], NOW);
  }
}

#[tokio::test]
async fn mutating_someone_elses_request_is_rejected() {
  let ep = Arc::new(MemoryEndpoint::new("primary"));
  let engine = engine(&ep);
  let owner = session("u1").await;
  let intruder = session("u2").await;

  let posted = engine
    .post_request(&owner, draft(BloodType::APos, 0), NOW)
    .await
    .unwrap();

  let error = engine
    .delete_request(&intruder, &posted.id)
    .await
    .unwrap_err();
  assert!(matches!(error, Error::NotOwner { .. }));

  let error = engine
    .update_request(&intruder, "nonexistent", &RequestEdit::default())
    .await
    .unwrap_err();
  assert!(matches!(error, Error::RequestNotFound { .. }));
}

#[tokio::test]
async fn fulfill_stamps_private_and_retracts_public() {
  let ep = Arc::new(MemoryEndpoint::new("primary"));
  let engine = engine(&ep);
  let session = session("u1").await;

  let posted = engine
    .post_request(&session, draft(BloodType::OPos, 0), NOW)
    .await
    .unwrap();
  engine
    .fulfill_request(&session, &posted.id, NOW + 500)
    .await
    .unwrap();

  let private = ep.snapshot(&format!("requests/u1/{}", posted.id)).unwrap();
  assert_eq!(private["fulfilledAt"], NOW + 500);
  assert!(ep.snapshot(&format!("requests_public/{}", posted.id)).is_none());

  assert!(engine.list_active_requests(NOW + 600).await.unwrap().is_empty());

  // The owner can still delete via the private copy.
  engine.delete_request(&session, &posted.id).await.unwrap();
  assert!(ep.snapshot(&format!("requests/u1/{}", posted.id)).is_none());
}

#[tokio::test]
async fn delete_removes_both_copies() {
  let ep = Arc::new(MemoryEndpoint::new("primary"));
  let engine = engine(&ep);
  let session = session("u1").await;

  let posted = engine
    .post_request(&session, draft(BloodType::ONeg, 0), NOW)
    .await
    .unwrap();
  engine.delete_request(&session, &posted.id).await.unwrap();

  assert!(ep.snapshot(&format!("requests/u1/{}", posted.id)).is_none());
  assert!(ep.snapshot(&format!("requests_public/{}", posted.id)).is_none());
}

// ─── Listing and matching ────────────────────────────────────────────────────

#[tokio::test]
async fn active_listing_sorts_open_needs_first() {
  let ep = Arc::new(MemoryEndpoint::new("primary"));
  let engine = engine(&ep);
  let session = session("u1").await;

  let later = engine
    .post_request(&session, draft(BloodType::APos, NOW + 2_000), NOW)
    .await
    .unwrap();
  let sooner = engine
    .post_request(&session, draft(BloodType::APos, NOW + 1_000), NOW)
    .await
    .unwrap();
  let open = engine
    .post_request(&session, draft(BloodType::APos, 0), NOW)
    .await
    .unwrap();
  let expired = engine
    .post_request(&session, draft(BloodType::APos, NOW - 1), NOW)
    .await
    .unwrap();

  let listed = engine.list_active_requests(NOW).await.unwrap();
  let ids: Vec<_> = listed.iter().map(|r| r.id.as_str()).collect();
  assert_eq!(ids, vec![open.id.as_str(), sooner.id.as_str(), later.id.as_str()]);
  assert!(!ids.contains(&expired.id.as_str()));
}

#[tokio::test]
async fn matching_merges_spellings_and_excludes_own_requests() {
  let ep = Arc::new(MemoryEndpoint::new("primary"));
  // Historical writers stored the code spelling; one record per spelling.
  ep.seed(
    "requests_public/legacy",
    json!({
      "ownerUid": "u9",
      "requesterName": "Jahangir",
      "bloodGroup": "A_POS",
      "neededOnMillis": 0,
    }),
  );
  let engine = engine(&ep);
  let donor = session("u1").await;
  let requester = session("u2").await;

  engine
    .post_request(&requester, draft(BloodType::APos, NOW + 1_000), NOW)
    .await
    .unwrap();
  // The donor's own request must not come back as a match.
  engine
    .post_request(&donor, draft(BloodType::APos, NOW + 1_000), NOW)
    .await
    .unwrap();
  // Wrong type, never a match.
  engine
    .post_request(&requester, draft(BloodType::ONeg, 0), NOW)
    .await
    .unwrap();

  let matches = engine
    .list_matching_requests_for_donor(&donor, BloodType::APos)
    .await
    .unwrap();

  assert_eq!(matches.len(), 2);
  assert_eq!(matches[0].id, "legacy");
  assert!(matches.iter().all(|r| r.owner_id != "u1"));
}

#[tokio::test]
async fn matching_keeps_published_requests_until_the_sweep_runs() {
  let ep = Arc::new(MemoryEndpoint::new("primary"));
  let engine = engine(&ep);
  let donor = session("u1").await;
  let requester = session("u2").await;

  let stale = engine
    .post_request(&requester, draft(BloodType::APos, NOW - 10), NOW - 20)
    .await
    .unwrap();

  // A passed deadline alone does not hide a still-published request.
  let matches = engine
    .list_matching_requests_for_donor(&donor, BloodType::APos)
    .await
    .unwrap();
  assert_eq!(matches.len(), 1);
  assert_eq!(matches[0].id, stale.id);

  engine.cleanup_expired(NOW).await.unwrap();
  let matches = engine
    .list_matching_requests_for_donor(&donor, BloodType::APos)
    .await
    .unwrap();
  assert!(matches.is_empty());
}

// ─── Expiry sweep ────────────────────────────────────────────────────────────

#[tokio::test]
async fn cleanup_removes_expired_requests_everywhere() {
  let ep = Arc::new(MemoryEndpoint::new("primary"));
  let engine = engine(&ep);
  let session = session("u1").await;

  let stale = engine
    .post_request(&session, draft(BloodType::APos, NOW - 10), NOW - 20)
    .await
    .unwrap();
  let open = engine
    .post_request(&session, draft(BloodType::APos, 0), NOW)
    .await
    .unwrap();
  let future = engine
    .post_request(&session, draft(BloodType::APos, NOW + 10), NOW)
    .await
    .unwrap();

  let removed = engine.cleanup_expired(NOW).await.unwrap();
  assert_eq!(removed, vec![stale.id.clone()]);

  assert!(ep.snapshot(&format!("requests/u1/{}", stale.id)).is_none());
  assert!(ep.snapshot(&format!("requests_public/{}", stale.id)).is_none());
  assert!(ep.snapshot(&format!("requests_public/{}", open.id)).is_some());
  assert!(ep.snapshot(&format!("requests_public/{}", future.id)).is_some());

  // A second pass finds nothing.
  assert!(engine.cleanup_expired(NOW).await.unwrap().is_empty());
}

// ─── Donor search ────────────────────────────────────────────────────────────

#[tokio::test]
async fn donor_search_merges_both_spellings() {
  let ep = Arc::new(MemoryEndpoint::new("primary"));
  ep.seed("donors/a", json!({ "name": "Ayesha Khan", "bloodGroup": "A+" }));
  ep.seed("donors/b", json!({ "name": "Rahim Uddin", "bloodGroup": "A_POS" }));
  ep.seed("donors/c", json!({ "name": "Sohan", "bloodGroup": "O-" }));
  let engine = engine(&ep);

  let donors = engine.find_donors(BloodType::APos, None).await.unwrap();
  let names: Vec<_> = donors.iter().map(|d| d.name.as_str()).collect();
  assert_eq!(names, vec!["Ayesha Khan", "Rahim Uddin"]);
}

#[tokio::test]
async fn district_filter_never_falls_back_to_location() {
  let ep = Arc::new(MemoryEndpoint::new("primary"));
  ep.seed(
    "donors/a",
    json!({ "name": "Ayesha Khan", "bloodGroup": "A+", "district": "DHAKA" }),
  );
  ep.seed(
    "donors/b",
    json!({ "name": "Rahim Uddin", "bloodGroup": "A+", "location": "Dhaka" }),
  );
  let engine = engine(&ep);

  let donors = engine
    .find_donors(BloodType::APos, Some("dhaka"))
    .await
    .unwrap();
  let names: Vec<_> = donors.iter().map(|d| d.name.as_str()).collect();
  assert_eq!(names, vec!["Ayesha Khan"]);
}

#[tokio::test]
async fn donor_search_falls_back_to_published_cards() {
  let ep = Arc::new(MemoryEndpoint::new("primary"));
  ep.seed("donors_public/u7", json!({ "name": "Mina Sultana", "bloodGroup": "AB-" }));
  let engine = engine(&ep);

  let donors = engine.find_donors(BloodType::AbNeg, None).await.unwrap();
  assert_eq!(donors.len(), 1);
  assert_eq!(donors[0].name, "Mina Sultana");

  let all = engine.find_all_donors().await.unwrap();
  assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn corrupt_donor_entries_are_skipped() {
  let ep = Arc::new(MemoryEndpoint::new("primary"));
  ep.seed("donors/good", json!({ "name": "Ayesha Khan", "bloodGroup": "A+" }));
  ep.seed("donors/bad", json!("not a record"));
  let engine = engine(&ep);

  let all = engine.find_all_donors().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].name, "Ayesha Khan");
}

#[test]
fn emergency_order_puts_verified_donors_first() {
  let mut donors = vec![
    DonorRecord::new("Sohan", BloodType::OPos),
    {
      let mut d = DonorRecord::new("Rahim Uddin", BloodType::ONeg);
      d.verified = true;
      d
    },
    {
      let mut d = DonorRecord::new("Ayesha Khan", BloodType::APos);
      d.verified = true;
      d
    },
  ];

  emergency_order(&mut donors);
  let names: Vec<_> = donors.iter().map(|d| d.name.as_str()).collect();
  assert_eq!(names, vec!["Ayesha Khan", "Rahim Uddin", "Sohan"]);
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn saving_a_profile_publishes_a_donor_card() {
  let ep = Arc::new(MemoryEndpoint::new("primary"));
  let engine = engine(&ep);
  let session = session("u1").await;

  let profile = UserProfile {
    name: "Ayesha Khan".into(),
    blood_type: BloodType::APos,
    last_donation_millis: Some(NOW - 1_000),
    total_donations: 3,
    contact_number: "01710000002".into(),
    location: "Sylhet".into(),
  };
  engine.save_profile(&session, &profile).await.unwrap();

  let card = ep.snapshot("donors_public/u1").unwrap();
  assert_eq!(card["name"], "Ayesha Khan");
  assert_eq!(card["bloodGroup"], "A+");
  assert_eq!(card["phone"], "01710000002");

  let loaded = engine.load_profile(&session).await.unwrap().unwrap();
  assert_eq!(loaded.total_donations, 3);
  assert_eq!(loaded.location, "Sylhet");

  let other = StaticSession::new("u2").ensure_session().await.unwrap();
  assert!(engine.load_profile(&other).await.unwrap().is_none());
}
