//! The eight canonical blood types and the lossy parser that resolves
//! historical spellings.
//!
//! Stored data has accumulated several representations over time: display
//! labels (`"A+"`), enum-style codes (`"A_POS"`), long codes
//! (`"A_POSITIVE"`), and space-separated variants (`"a pos"`). Every one of
//! them must resolve to exactly one canonical value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::EnumIter;

/// One of the eight ABO × Rh blood types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum BloodType {
  APos,
  ANeg,
  BPos,
  BNeg,
  AbPos,
  AbNeg,
  OPos,
  ONeg,
}

impl BloodType {
  /// Canonical display label, e.g. `"A+"`. This is also the canonical
  /// storage representation for new writes.
  pub fn label(self) -> &'static str {
    match self {
      Self::APos => "A+",
      Self::ANeg => "A-",
      Self::BPos => "B+",
      Self::BNeg => "B-",
      Self::AbPos => "AB+",
      Self::AbNeg => "AB-",
      Self::OPos => "O+",
      Self::ONeg => "O-",
    }
  }

  /// Legacy enum-style storage code, e.g. `"A_POS"`. Historical writes used
  /// this form; queries must still cover it.
  pub fn code(self) -> &'static str {
    match self {
      Self::APos => "A_POS",
      Self::ANeg => "A_NEG",
      Self::BPos => "B_POS",
      Self::BNeg => "B_NEG",
      Self::AbPos => "AB_POS",
      Self::AbNeg => "AB_NEG",
      Self::OPos => "O_POS",
      Self::ONeg => "O_NEG",
    }
  }

  /// Resolve any accepted spelling to a canonical value.
  ///
  /// Input is trimmed and uppercased, with spaces treated as underscores.
  /// Unresolvable input maps to [`BloodType::OPos`] rather than failing —
  /// a deliberately lossy fallback kept for compatibility with historical
  /// records. Callers that need to distinguish unknown input should use
  /// [`BloodType::try_parse`].
  pub fn parse(raw: &str) -> Self {
    Self::try_parse(raw).unwrap_or(Self::OPos)
  }

  /// Like [`BloodType::parse`], but reports unrecognized input as `None`.
  pub fn try_parse(raw: &str) -> Option<Self> {
    let norm = raw.trim().to_uppercase().replace(' ', "_");
    let t = match norm.as_str() {
      "A+" | "A_POS" | "A_POSITIVE" => Self::APos,
      "A-" | "A_NEG" | "A_NEGATIVE" => Self::ANeg,
      "B+" | "B_POS" | "B_POSITIVE" => Self::BPos,
      "B-" | "B_NEG" | "B_NEGATIVE" => Self::BNeg,
      "AB+" | "AB_POS" | "AB_POSITIVE" => Self::AbPos,
      "AB-" | "AB_NEG" | "AB_NEGATIVE" => Self::AbNeg,
      "O+" | "O_POS" | "O_POSITIVE" => Self::OPos,
      "O-" | "O_NEG" | "O_NEGATIVE" => Self::ONeg,
      _ => return None,
    };
    Some(t)
  }
}

impl std::fmt::Display for BloodType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.label())
  }
}

// Serialized as the display label; deserialization accepts every historical
// spelling and never fails.
impl Serialize for BloodType {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.label())
  }
}

impl<'de> Deserialize<'de> for BloodType {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(Self::parse(&raw))
  }
}
