use thiserror::Error;

pub use caravel_routing::RoutingError;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid problem description.
    #[error("{0}")]
    Input(String),

    /// Routing backend failure.
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// Broken internal invariant, e.g. cost accumulation overflow.
    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn input(message: impl Into<String>) -> Self {
        Error::Input(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
