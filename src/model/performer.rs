use crate::core::types::PagedItem;
use serde::{Deserialize, Serialize};

/// One performer record from the `/performers` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Performer {
    pub id: u64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub score: Option<f64>,
}

impl PagedItem for Performer {
    type Id = u64;

    fn identity(&self) -> u64 {
        self.id
    }
}
