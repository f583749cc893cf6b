pub mod envelope;
pub mod http;

pub use envelope::ResponseEnvelope;
pub use http::HttpTransport;

use crate::core::error::TransportError;
use crate::query::RequestSpec;
use async_trait::async_trait;

/// One asynchronous network fetch.
///
/// Implementations must be cancellable by dropping: the set cancels an
/// in-flight call by aborting the task polling the future, so `execute`
/// must not detach work that outlives it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: RequestSpec) -> Result<ResponseEnvelope, TransportError>;
}
