//! Everything a typical consumer needs in one import.
//!
//! ```
//! use pageset::prelude::*;
//! ```

pub use crate::cache::{CacheStore, DiskCacheStore, MemoryCacheStore};
pub use crate::core::{CacheError, DecodeError, FetchError, PagedItem, TransportError};
pub use crate::model::{Event, EventSet, GeoPoint, Performer, PerformerSet, Venue, VenueSet};
pub use crate::query::{ApiConfig, Query, RequestSpec};
pub use crate::set::ItemSet;
pub use crate::transport::{HttpTransport, ResponseEnvelope, Transport};
