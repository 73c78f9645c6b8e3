//! Matching and request lifecycle on top of the failover gateway.
//!
//! [`MatchEngine`] is the one place that knows the remote store's layout:
//! which paths hold donor cards, private profiles, and the two copies of
//! every blood request. Everything it reads goes through the tolerant
//! decoders in `lifevein-core`, so a corrupt record degrades to a skipped
//! entry instead of a failed call.

mod donors;
mod error;
mod paths;
mod profiles;
mod requests;

#[cfg(test)]
mod tests;

pub use crate::{
  donors::emergency_order,
  error::{Error, Result},
};

use lifevein_gateway::{Endpoint, Gateway};

/// Donor search, request lifecycle, and profile publishing over a
/// [`Gateway`].
///
/// Holds no session of its own; operations that act on behalf of an
/// account take the [`Session`](lifevein_gateway::Session) explicitly.
pub struct MatchEngine<E> {
  gateway: Gateway<E>,
}

impl<E: Endpoint> MatchEngine<E> {
  pub fn new(gateway: Gateway<E>) -> Self {
    Self { gateway }
  }

  pub fn gateway(&self) -> &Gateway<E> {
    &self.gateway
  }
}
