use crate::core::error::DecodeError;
use serde_json::Value;

/// Deserialized response body: the requested records plus pagination
/// metadata.
///
/// Which field holds the records varies per endpoint (`"events"`,
/// `"performers"`, ...), so extraction takes the result key as an argument
/// rather than baking one in.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    body: Value,
}

impl ResponseEnvelope {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    /// The raw item records under `result_key`.
    pub fn items(&self, result_key: &str) -> Result<&Vec<Value>, DecodeError> {
        match self.body.get(result_key) {
            None => Err(DecodeError::MissingResultKey(result_key.to_string())),
            Some(Value::Array(records)) => Ok(records),
            Some(_) => Err(DecodeError::NotAnArray(result_key.to_string())),
        }
    }

    /// The total page count reported by the server, if the response
    /// carries one.
    ///
    /// Prefers an explicit `meta.total_pages`; otherwise derived from
    /// `meta.total` and `meta.per_page` by ceiling division.
    pub fn total_pages(&self) -> Option<u32> {
        let meta = self.body.get("meta")?;
        if let Some(total_pages) = meta.get("total_pages").and_then(Value::as_u64) {
            return u32::try_from(total_pages).ok();
        }
        let total = meta.get("total").and_then(Value::as_u64)?;
        let per_page = meta.get("per_page").and_then(Value::as_u64).filter(|p| *p > 0)?;
        u32::try_from(total.div_ceil(per_page)).ok()
    }
}
