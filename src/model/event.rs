use super::{Performer, Venue};
use crate::core::types::PagedItem;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One event record from the `/events` endpoint.
///
/// Field coverage is deliberately tolerant: the API adds fields over time
/// and per-endpoint, so everything beyond the id is optional or defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub short_title: Option<String>,

    #[serde(rename = "type", default)]
    pub event_type: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    /// Event time in the venue's timezone.
    #[serde(default)]
    pub datetime_local: Option<NaiveDateTime>,

    #[serde(default)]
    pub datetime_utc: Option<NaiveDateTime>,

    #[serde(default)]
    pub score: Option<f64>,

    #[serde(default)]
    pub venue: Option<Venue>,

    #[serde(default)]
    pub performers: Vec<Performer>,
}

impl PagedItem for Event {
    type Id = u64;

    fn identity(&self) -> u64 {
        self.id
    }
}
