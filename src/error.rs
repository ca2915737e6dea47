//! Error type shared by the chain reader, the backend client and the launcher

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HubError>;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("Please connect your wallet first")]
    WalletNotConnected,

    #[error("invalid Sui address '{0}'")]
    InvalidAddress(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("BCS encoding failed: {0}")]
    Bcs(#[from] bcs::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Move execution failed on the node (abort, missing object, ...)
    #[error("{0}")]
    Execution(String),

    #[error("get_all_streams emitted no event")]
    MissingEvent,

    #[error("unexpected response: {0}")]
    Payload(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Nothing to watch: stream has neither a name nor an index")]
    NothingToWatch,

    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },
}
