// ============================================================================
// Pageset Library
// ============================================================================

//! Client-side pagination engine for filterable REST collection endpoints.
//!
//! The central type is [`ItemSet`]: a stateful controller that grows a
//! deduplicated, insertion-ordered local collection one page at a time,
//! with disk caching, cancellation and a single-flight fetch guarantee.
//! Around it sit narrow collaborators: [`Query`] builds endpoint requests,
//! [`Transport`](transport::Transport) performs one network fetch,
//! [`CacheStore`](cache::CacheStore) persists snapshots.
//!
//! # Examples
//!
//! ```no_run
//! use pageset::prelude::*;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiConfig::new().client_id("my_api_key");
//!
//! let events = EventSet::events(&config)?;
//! events.update_query(|q| {
//!     q.set_parameter("q", "new york mets");
//!     q.per_page = 30;
//! });
//! events.on_page_loaded(|new_items| {
//!     for event in new_items {
//!         println!("event: {}", event.title);
//!     }
//! });
//! events.fetch_next_page();
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod core;
pub mod model;
pub mod prelude;
pub mod query;
pub mod set;
pub mod transport;

// Re-export main types for convenience
pub use crate::core::{CacheError, DecodeError, FetchError, PagedItem, TransportError};
pub use cache::{CacheStore, DiskCacheStore, MemoryCacheStore};
pub use model::{Event, EventSet, Performer, PerformerSet, Venue, VenueSet};
pub use query::{ApiConfig, Query};
pub use set::ItemSet;
pub use transport::{HttpTransport, ResponseEnvelope, Transport};
