use serde::Serialize;
use serde::de::DeserializeOwned;
use std::hash::Hash;

/// A record that can live in an item set.
///
/// Identity is what deduplication is keyed on: a refetched page whose
/// records are already present contributes nothing. Serde bounds cover the
/// wire format and the cache snapshot format.
pub trait PagedItem: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable identity distinguishing this record from every other record
    /// in the same collection, e.g. the remote record id.
    type Id: Eq + Hash + Clone + Send + Sync + 'static;

    fn identity(&self) -> Self::Id;
}
