pub mod config;

pub use config::{ApiConfig, DEFAULT_BASE_URL};

use std::collections::BTreeMap;

/// Default number of results per page.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// A fetchable request: endpoint URL plus the ordered query parameters,
/// handed to the transport to encode and execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    /// Absolute endpoint URL without a query string.
    pub url: String,
    /// Query parameters in the order they should be encoded.
    pub params: Vec<(String, String)>,
}

/// Describes one collection query: endpoint, parameters, filters and
/// pagination. Building a query never touches shared state, and
/// [`derive_for_page`](Query::derive_for_page) is pure, so a set can
/// snapshot the descriptor per fetch attempt.
///
/// # Examples
///
/// ```
/// use pageset::query::{ApiConfig, Query};
///
/// let config = ApiConfig::new().client_id("my_api_key");
/// let query = Query::events(&config)
///     .search("new york mets")
///     .per_page(30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// API root this query targets.
    pub base_url: String,
    /// Endpoint path, e.g. `/events`.
    pub path: String,
    /// Single-valued parameters. Setting a parameter overrides its
    /// previous value.
    pub parameters: BTreeMap<String, String>,
    /// Stacked result filters. The same filter may be applied repeatedly
    /// with different values.
    pub filters: Vec<(String, String)>,
    /// The results page to fetch. Page numbers start from 1.
    pub page: u32,
    /// The number of results to return per page.
    pub per_page: u32,
}

impl Query {
    /// Query against an arbitrary endpoint path.
    pub fn endpoint(config: &ApiConfig, path: &str) -> Self {
        let mut parameters = BTreeMap::new();
        if let Some(client_id) = &config.client_id {
            parameters.insert("client_id".to_string(), client_id.clone());
        }
        if let Some(aid) = &config.aid {
            parameters.insert("aid".to_string(), aid.clone());
        }
        if let Some(rid) = &config.rid {
            parameters.insert("rid".to_string(), rid.clone());
        }
        Self {
            base_url: config.base_url.clone(),
            path: path.to_string(),
            parameters,
            filters: Vec::new(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Query for the `/events` endpoint.
    pub fn events(config: &ApiConfig) -> Self {
        Self::endpoint(config, "/events")
    }

    /// Query for the `/recommendations` endpoint. Requires an API key,
    /// see [`ApiConfig::client_id`].
    pub fn recommendations(config: &ApiConfig) -> Self {
        Self::endpoint(config, "/recommendations")
    }

    /// Query for a single event by id.
    pub fn event_by_id(config: &ApiConfig, event_id: u64) -> Self {
        Self::endpoint(config, &format!("/events/{event_id}"))
    }

    /// Query for the `/performers` endpoint.
    pub fn performers(config: &ApiConfig) -> Self {
        Self::endpoint(config, "/performers")
    }

    /// Query for a single performer by id.
    pub fn performer_by_id(config: &ApiConfig, performer_id: u64) -> Self {
        Self::endpoint(config, &format!("/performers/{performer_id}"))
    }

    /// Query for a single performer by slug.
    pub fn performer_by_slug(config: &ApiConfig, slug: &str) -> Self {
        Self::endpoint(config, "/performers").parameter("slug", slug)
    }

    /// Query for the `/venues` endpoint.
    pub fn venues(config: &ApiConfig) -> Self {
        Self::endpoint(config, "/venues")
    }

    /// Query for a single venue by id.
    pub fn venue_by_id(config: &ApiConfig, venue_id: u64) -> Self {
        Self::endpoint(config, &format!("/venues/{venue_id}"))
    }

    /// Apply a keyword search to the query.
    pub fn search(self, keywords: &str) -> Self {
        self.parameter("q", keywords)
    }

    /// Filter results by a location coordinate.
    pub fn location(self, lat: f64, lon: f64) -> Self {
        self.parameter("lat", &lat.to_string())
            .parameter("lon", &lon.to_string())
    }

    /// Range for location based filters, in miles ("30mi") or kilometres
    /// ("50km"). Only sent when a location is set; defaults to "30mi".
    pub fn range(self, range: &str) -> Self {
        self.parameter("range", range)
    }

    /// Set a query parameter, overriding any previous value.
    pub fn parameter(mut self, param: &str, value: &str) -> Self {
        self.set_parameter(param, value);
        self
    }

    /// Add a results filter. Filters stack: the same filter can be applied
    /// multiple times with different values.
    pub fn filter(mut self, filter: &str, value: &str) -> Self {
        self.add_filter(filter, value);
        self
    }

    /// The results page to fetch. Page numbers start from 1.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// The number of results to return per page.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// In-place form of [`parameter`](Self::parameter).
    pub fn set_parameter(&mut self, param: &str, value: &str) {
        self.parameters.insert(param.to_string(), value.to_string());
    }

    /// In-place form of [`filter`](Self::filter).
    pub fn add_filter(&mut self, filter: &str, value: &str) {
        self.filters.push((filter.to_string(), value.to_string()));
    }

    /// A copy of this query targeting `page`. Pure: shared filter state is
    /// never mutated.
    pub fn derive_for_page(&self, page: u32) -> Self {
        let mut derived = self.clone();
        derived.page = page.max(1);
        derived
    }

    /// The request this query describes, ready for a transport to encode.
    pub fn request(&self) -> RequestSpec {
        let mut params: Vec<(String, String)> = self
            .parameters
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if self.parameters.contains_key("lat") && !self.parameters.contains_key("range") {
            params.push(("range".to_string(), "30mi".to_string()));
        }
        params.extend(self.filters.iter().cloned());
        params.push(("page".to_string(), self.page.to_string()));
        params.push(("per_page".to_string(), self.per_page.to_string()));
        RequestSpec {
            url: format!("{}{}", self.base_url, self.path),
            params,
        }
    }

    /// The constructed query rendered as a percent-encoded URL, for
    /// display and logging.
    pub fn url(&self) -> String {
        let spec = self.request();
        match reqwest::Url::parse_with_params(&spec.url, &spec.params) {
            Ok(url) => url.to_string(),
            Err(_) => spec.url,
        }
    }
}
