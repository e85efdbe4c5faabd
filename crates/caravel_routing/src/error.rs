use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{backend} error: {status} - {message}")]
    Api {
        backend: &'static str,
        status: u16,
        message: String,
    },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Incomplete {backend} response")]
    IncompleteResponse { backend: &'static str },

    #[error("Unreachable pair in {backend} response: ({from}, {to})")]
    UnreachablePair {
        backend: &'static str,
        from: usize,
        to: usize,
    },
}
