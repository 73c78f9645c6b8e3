use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Gateway(#[from] lifevein_gateway::Error),

  #[error("request {request_id} not found")]
  RequestNotFound { request_id: String },

  /// The caller tried to mutate a request owned by another account.
  #[error("request {request_id} is owned by another account")]
  NotOwner { request_id: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
