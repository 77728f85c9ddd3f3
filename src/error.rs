use actix_web::{http::StatusCode, ResponseError};
use thiserror::Error;

/// Everything that can go wrong while serving a node request.
///
/// Malformed input maps to a 400 response; the rest is internal. A failing
/// peer during consensus is not an error at all, it is skipped at the call
/// site.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Invalid JSON! Missing keys")]
    MissingFields,

    #[error("Error: Please supply a valid list of nodes")]
    MissingNodeList,

    #[error("invalid peer address: {0}")]
    BadPeerAddress(String),

    #[error("mining was cancelled before a proof was found")]
    MiningCancelled,

    #[error("proof-of-work worker failed: {0}")]
    PowWorker(String),

    #[error(transparent)]
    PeerFetch(#[from] reqwest::Error),
}

impl ResponseError for NodeError {
    fn status_code(&self) -> StatusCode {
        match self {
            NodeError::MissingFields
            | NodeError::MissingNodeList
            | NodeError::BadPeerAddress(_) => StatusCode::BAD_REQUEST,
            NodeError::MiningCancelled
            | NodeError::PowWorker(_)
            | NodeError::PeerFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
