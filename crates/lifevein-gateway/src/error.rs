//! Error types for `lifevein-gateway`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The gateway was constructed with an empty endpoint list.
  #[error("no endpoints configured")]
  NoEndpoints,

  /// The endpoint was unreachable or rejected the request at the
  /// transport level. Failover tries the next endpoint.
  #[error("[{endpoint}] transport failure: {message}")]
  Transport { endpoint: String, message: String },

  /// No usable session, or the write was rejected by the store's access
  /// policy. Never retried against another endpoint.
  #[error("not logged in: {0}")]
  Unauthorized(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl Error {
  /// Authorization failures short-circuit failover; everything else moves
  /// on to the next endpoint.
  pub fn is_unauthorized(&self) -> bool {
    matches!(self, Self::Unauthorized(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
