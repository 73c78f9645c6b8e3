//! Core types and pure logic for the lifevein donor-matching system.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.
//!
//! Reads never fail on malformed stored data: the normalizer maps every
//! historical schema variant to the canonical shapes defined here, with
//! documented lossy defaults for unresolvable fields.

pub mod blood_type;
pub mod donor;
pub mod eligibility;
pub mod normalize;
pub mod profile;
pub mod request;
pub mod schedule;

pub use blood_type::BloodType;
pub use donor::DonorRecord;
pub use profile::{UserAccount, UserProfile};
pub use request::{BloodRequest, RequestEdit};
pub use schedule::ScheduleEntry;
