use thiserror::Error;

/// Failure of a single network fetch.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request failed with status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("malformed response body: {0}")]
    Body(String),
}

/// The response arrived but did not have the expected shape.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("result key '{0}' missing from response")]
    MissingResultKey(String),

    #[error("expected an array under result key '{0}'")]
    NotAnArray(String),

    #[error("item decode error: {0}")]
    Item(String),
}

/// Uniform error surfaced through `on_page_load_failed`.
///
/// The set does not distinguish further and never retries on its own;
/// calling [`fetch_page`](crate::set::ItemSet::fetch_page) again is the
/// caller's retry policy.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Snapshot persistence failure. A cache *miss* is not an error.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(String),

    #[error("snapshot encode error: {0}")]
    Encode(String),

    #[error("snapshot decode error: {0}")]
    Decode(String),

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("no cache store configured")]
    NoStore,
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;
