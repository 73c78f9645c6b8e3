//! [`LocalCache`] — the offline snapshot of donors, users, schedules, and
//! requests.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use serde::de::DeserializeOwned;
use serde_json::Value;

use lifevein_core::{
  BloodRequest, BloodType, DonorRecord, ScheduleEntry, UserAccount, UserProfile,
  normalize,
};

use crate::{Result, schema::SCHEMA};

const DONORS_KEY: &str = "donors";
const USERS_KEY: &str = "users";
const SCHEDULES_KEY: &str = "schedules";
const REQUESTS_KEY: &str = "requests";
const PROFILE_KEY: &str = "profile";

/// An offline cache backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct LocalCache {
  conn: tokio_rusqlite::Connection,
}

impl LocalCache {
  /// Open (or create) a cache at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let cache = Self { conn };
    cache.init_schema().await?;
    Ok(cache)
  }

  /// Open an in-memory cache — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let cache = Self { conn };
    cache.init_schema().await?;
    Ok(cache)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Donors ────────────────────────────────────────────────────────────────

  /// Cached donors; a fresh cache starts from the bundled emergency list
  /// so the offline view is never empty.
  pub async fn load_donors(&self) -> Result<Vec<DonorRecord>> {
    match self.read_entry(DONORS_KEY).await? {
      Some(raw) => Ok(decode_list(&raw)),
      None => Ok(seed_donors()),
    }
  }

  pub async fn save_donors(&self, donors: &[DonorRecord]) -> Result<()> {
    self
      .write_entry(DONORS_KEY, serde_json::to_string(donors)?)
      .await
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  pub async fn load_users(&self) -> Result<Vec<UserAccount>> {
    Ok(
      self
        .read_entry(USERS_KEY)
        .await?
        .map(|raw| decode_list(&raw))
        .unwrap_or_default(),
    )
  }

  pub async fn save_users(&self, users: &[UserAccount]) -> Result<()> {
    self
      .write_entry(USERS_KEY, serde_json::to_string(users)?)
      .await
  }

  // ── Schedules ─────────────────────────────────────────────────────────────

  pub async fn load_schedules(&self) -> Result<Vec<ScheduleEntry>> {
    Ok(
      self
        .read_entry(SCHEDULES_KEY)
        .await?
        .map(|raw| decode_list(&raw))
        .unwrap_or_default(),
    )
  }

  pub async fn save_schedules(&self, schedules: &[ScheduleEntry]) -> Result<()> {
    self
      .write_entry(SCHEDULES_KEY, serde_json::to_string(schedules)?)
      .await
  }

  // ── Requests ──────────────────────────────────────────────────────────────

  /// Cached requests, decoded through the normalizer so entries written
  /// by old versions (legacy field names, stringly-typed millis) still
  /// load. Corrupt elements are skipped.
  pub async fn load_requests(&self) -> Result<Vec<BloodRequest>> {
    let Some(raw) = self.read_entry(REQUESTS_KEY).await? else {
      return Ok(Vec::new());
    };
    let Ok(Value::Array(items)) = serde_json::from_str(&raw) else {
      return Ok(Vec::new());
    };

    Ok(
      items
        .iter()
        .filter_map(|item| {
          let id = item.get("id")?.as_str()?;
          normalize::request_from_value(id, item)
        })
        .collect(),
    )
  }

  /// Persist the request list in the canonical wire schema. Requests that
  /// arrived without a deadline are stamped with `now_millis` so the
  /// cached copy sorts and ages the way old cache files did.
  pub async fn save_requests(
    &self,
    requests: &[BloodRequest],
    now_millis: i64,
  ) -> Result<()> {
    let items: Vec<Value> = requests
      .iter()
      .map(|request| {
        let mut wire = normalize::request_to_value(request);
        if request.needed_on_millis == 0 {
          wire["neededOnMillis"] = now_millis.into();
        }
        wire["id"] = request.id.clone().into();
        wire
      })
      .collect();

    self
      .write_entry(REQUESTS_KEY, Value::Array(items).to_string())
      .await
  }

  // ── Current profile ───────────────────────────────────────────────────────

  /// The profile of the signed-in account, if one was cached.
  pub async fn load_current_profile(&self) -> Result<Option<UserProfile>> {
    Ok(
      self
        .read_entry(PROFILE_KEY)
        .await?
        .and_then(|raw| serde_json::from_str(&raw).ok()),
    )
  }

  pub async fn save_current_profile(&self, profile: &UserProfile) -> Result<()> {
    self
      .write_entry(PROFILE_KEY, serde_json::to_string(profile)?)
      .await
  }

  /// Forget the cached profile, e.g. on sign-out.
  pub async fn clear_current_profile(&self) -> Result<()> {
    self.delete_entry(PROFILE_KEY).await
  }

  // ── Key/value plumbing ────────────────────────────────────────────────────

  async fn read_entry(&self, key: &'static str) -> Result<Option<String>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value_json FROM cache_entries WHERE entry_key = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }

  // pub(crate) so tests can seed raw blobs past the typed API.
  pub(crate) async fn write_entry(&self, key: &'static str, value_json: String) -> Result<()> {
    let updated_at = Utc::now().to_rfc3339();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO cache_entries (entry_key, value_json, updated_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT(entry_key) DO UPDATE SET
             value_json = excluded.value_json,
             updated_at = excluded.updated_at",
          rusqlite::params![key, value_json, updated_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_entry(&self, key: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM cache_entries WHERE entry_key = ?1",
          rusqlite::params![key],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Decode a cached JSON array, skipping elements that no longer parse.
/// One corrupt record must never take the whole cached list down.
fn decode_list<T: DeserializeOwned>(raw: &str) -> Vec<T> {
  let Ok(Value::Array(items)) = serde_json::from_str(raw) else {
    return Vec::new();
  };

  items
    .into_iter()
    .filter_map(|item| serde_json::from_value(item).ok())
    .collect()
}

/// The bundled emergency donor list shown before any sync has happened.
fn seed_donors() -> Vec<DonorRecord> {
  let mut seeds = vec![
    DonorRecord::new("Rahim Uddin", BloodType::ONeg),
    DonorRecord::new("Ayesha Khan", BloodType::APos),
    DonorRecord::new("Jahangir Alam", BloodType::BNeg),
    DonorRecord::new("Mina Sultana", BloodType::AbNeg),
    DonorRecord::new("Sohan Chowdhury", BloodType::OPos),
  ];

  seeds[0].verified = true;
  seeds[0].district = Some("Dhaka".into());
  seeds[0].phone = Some("01710000001".into());
  seeds[1].verified = true;
  seeds[1].district = Some("Sylhet".into());
  seeds[1].phone = Some("01710000002".into());
  seeds[2].district = Some("Chattogram".into());
  seeds[3].district = Some("Rajshahi".into());
  seeds[4].verified = true;
  seeds[4].district = Some("Dhaka".into());

  seeds
}
