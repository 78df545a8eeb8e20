use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("store unreachable: {0}")]
    Connectivity(#[source] reqwest::Error),
    #[error("query rejected by store: {0}")]
    Query(String),
    #[error("upstream http: {0}")]
    Http(#[source] reqwest::Error),
    #[error("malformed store response: {0}")]
    Decode(String),
    #[error("insufficient data: {0}")]
    InsufficientData(&'static str),
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("render: {0}")]
    Render(&'static str),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            Error::Connectivity(err)
        } else if err.is_decode() {
            Error::Decode(err.to_string())
        } else {
            Error::Http(err)
        }
    }
}

impl Error {
    /// True for failures caused by the store being down rather than by the
    /// request itself.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Error::Connectivity(_))
    }
}
