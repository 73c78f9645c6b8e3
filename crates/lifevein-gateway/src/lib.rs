//! Region-failover data gateway for the lifevein remote store.
//!
//! The remote store is a hosted hierarchical JSON database deployed in two
//! places: a primary region and a default fallback project. Every
//! operation is attempted against the configured endpoints in order; the
//! first success wins. This layer does endpoint selection only — no
//! intra-endpoint retry, and no replication of a successful write to the
//! other endpoints (reads may observe divergent regions after a one-region
//! write; reconciling that is out of scope).

// Native `async fn` in traits; the advisory lint about `Send` bounds on the
// returned futures does not apply to how these traits are consumed.
#![allow(async_fn_in_trait)]

pub mod endpoint;
pub mod error;
pub mod failover;
pub mod memory;
pub mod rest;
pub mod session;

pub use endpoint::Endpoint;
pub use error::{Error, Result};
pub use failover::Gateway;
pub use memory::MemoryEndpoint;
pub use rest::RestEndpoint;
pub use session::{AnonymousAuth, Session, SessionProvider, StaticSession};
