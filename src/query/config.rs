/// Shared API configuration.
///
/// Carried explicitly by every [`Query`](super::Query) instead of living in
/// process-wide mutable state, so two sets can talk to two differently
/// configured deployments in the same process.
///
/// # Examples
///
/// ```
/// use pageset::query::ApiConfig;
///
/// let config = ApiConfig::new()
///     .client_id("my_api_key")
///     .aid("my_aid");
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Root URL of the API, without a trailing slash.
    pub base_url: String,

    /// API key appended to every query as `client_id`. Some endpoints
    /// (e.g. recommendations) reject requests without one.
    pub client_id: Option<String>,

    /// Optional `aid` value appended to every query.
    pub aid: Option<String>,

    /// Optional `rid` value appended to every query.
    pub rid: Option<String>,
}

pub const DEFAULT_BASE_URL: &str = "https://api.seatgeek.com/2";

impl ApiConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: None,
            aid: None,
            rid: None,
        }
    }

    /// Point queries at a different API root.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Set the API key.
    pub fn client_id(mut self, client_id: &str) -> Self {
        self.client_id = Some(client_id.to_string());
        self
    }

    /// Set the `aid` value.
    pub fn aid(mut self, aid: &str) -> Self {
        self.aid = Some(aid.to_string());
        self
    }

    /// Set the `rid` value.
    pub fn rid(mut self, rid: &str) -> Self {
        self.rid = Some(rid.to_string());
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new()
    }
}
