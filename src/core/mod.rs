pub mod error;
pub mod types;

pub use error::{CacheError, CacheResult, DecodeError, FetchError, TransportError};
pub use types::PagedItem;
