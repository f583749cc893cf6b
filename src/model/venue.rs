use crate::core::types::PagedItem;
use serde::{Deserialize, Serialize};

/// One venue record from the `/venues` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub id: u64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub postal_code: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub location: Option<GeoPoint>,

    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl PagedItem for Venue {
    type Id = u64;

    fn identity(&self) -> u64 {
        self.id
    }
}
