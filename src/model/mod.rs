pub mod event;
pub mod performer;
pub mod venue;

pub use event::Event;
pub use performer::Performer;
pub use venue::{GeoPoint, Venue};

use crate::core::error::TransportError;
use crate::query::{ApiConfig, Query};
use crate::set::ItemSet;
use crate::transport::HttpTransport;
use std::sync::Arc;

/// Paginated set of [`Event`] records.
pub type EventSet = ItemSet<Event>;

/// Paginated set of [`Performer`] records.
pub type PerformerSet = ItemSet<Performer>;

/// Paginated set of [`Venue`] records.
pub type VenueSet = ItemSet<Venue>;

impl ItemSet<Event> {
    /// Set over the `/events` endpoint.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pageset::model::EventSet;
    /// use pageset::query::ApiConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let events = EventSet::events(&ApiConfig::new().client_id("my_api_key"))?;
    /// events.update_query(|q| q.set_parameter("q", "new york mets"));
    /// events.fetch_next_page();
    /// # Ok(())
    /// # }
    /// ```
    pub fn events(config: &ApiConfig) -> Result<Self, TransportError> {
        let transport = Arc::new(HttpTransport::new()?);
        Ok(Self::new(Query::events(config), transport).with_result_key("events"))
    }

    /// Set over the `/recommendations` endpoint. Requires an API key.
    pub fn recommendations(config: &ApiConfig) -> Result<Self, TransportError> {
        let transport = Arc::new(HttpTransport::new()?);
        Ok(Self::new(Query::recommendations(config), transport).with_result_key("recommendations"))
    }
}

impl ItemSet<Performer> {
    /// Set over the `/performers` endpoint.
    pub fn performers(config: &ApiConfig) -> Result<Self, TransportError> {
        let transport = Arc::new(HttpTransport::new()?);
        Ok(Self::new(Query::performers(config), transport).with_result_key("performers"))
    }
}

impl ItemSet<Venue> {
    /// Set over the `/venues` endpoint.
    pub fn venues(config: &ApiConfig) -> Result<Self, TransportError> {
        let transport = Arc::new(HttpTransport::new()?);
        Ok(Self::new(Query::venues(config), transport).with_result_key("venues"))
    }
}
