//! The item-set pagination engine.
//!
//! An [`ItemSet`] turns a sequence of page requests against a remote
//! collection endpoint into an incrementally growing, deduplicated,
//! insertion-ordered local collection, with snapshot caching, cancellation
//! and a single-flight fetch guarantee.

use crate::cache::{CacheStore, SetSnapshot};
use crate::core::error::{CacheError, CacheResult, DecodeError, FetchError, TransportError};
use crate::core::types::PagedItem;
use crate::query::Query;
use crate::transport::{ResponseEnvelope, Transport};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Fetch lifecycle state. At most one fetch is outstanding per set;
/// cancellation collapses straight back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchState {
    Idle,
    Fetching,
}

/// Outcome of one completed fetch attempt. Exactly one is produced per
/// attempt; a cancelled or superseded attempt resolves to `Cancelled` and
/// fires no callback.
enum PageOutcome<T> {
    Loaded(Vec<T>),
    Failed(FetchError),
    Cancelled,
}

type LoadedCallback<T> = Arc<dyn Fn(&[T]) + Send + Sync>;
type FailedCallback = Arc<dyn Fn(&FetchError) + Send + Sync>;

struct Inner<T: PagedItem> {
    query: Query,
    result_key: String,
    items: Vec<T>,
    seen: HashSet<T::Id>,
    fetch_state: FetchState,
    last_fetched_page: u32,
    total_pages: u32,
    last_response: Option<Value>,
    from_cache: bool,
    /// Generation counter. Each fetch attempt captures the value at
    /// dispatch; a completion only applies while its token still matches,
    /// which is what resolves the cancel-vs-complete race.
    attempt: u64,
    in_flight: Option<JoinHandle<()>>,
    on_page_loaded: Option<LoadedCallback<T>>,
    on_page_load_failed: Option<FailedCallback>,
    show_activity_indicator: bool,
}

impl<T: PagedItem> Inner<T> {
    fn last_page_already_fetched(&self) -> bool {
        self.total_pages > 0 && self.last_fetched_page >= self.total_pages
    }
}

/// A paginated, deduplicated set of remote records.
///
/// Construct one per logical collection query, then drive it with
/// [`fetch_next_page`](Self::fetch_next_page):
///
/// ```no_run
/// use pageset::model::EventSet;
/// use pageset::query::ApiConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let events = EventSet::events(&ApiConfig::new().client_id("my_api_key"))?;
/// events.on_page_loaded(|new_items| {
///     for event in new_items {
///         println!("event: {}", event.title);
///     }
/// });
/// events.fetch_next_page();
/// # Ok(())
/// # }
/// ```
///
/// Fetch dispatch uses `tokio::spawn`, so [`fetch_page`](Self::fetch_page)
/// and [`fetch_next_page`](Self::fetch_next_page) must be called from
/// within a tokio runtime. Completion handling and callbacks run on the
/// spawned task; marshaling back to a UI thread is the caller's concern.
pub struct ItemSet<T: PagedItem> {
    inner: Arc<Mutex<Inner<T>>>,
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn CacheStore>>,
}

impl<T: PagedItem> ItemSet<T> {
    /// Create a set over `query`, fetching through `transport`.
    ///
    /// The result key defaults to `"items"`; endpoint-specific sets
    /// override it with [`with_result_key`](Self::with_result_key).
    pub fn new(query: Query, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                query,
                result_key: "items".to_string(),
                items: Vec::new(),
                seen: HashSet::new(),
                fetch_state: FetchState::Idle,
                last_fetched_page: 0,
                total_pages: 0,
                last_response: None,
                from_cache: false,
                attempt: 0,
                in_flight: None,
                on_page_loaded: None,
                on_page_load_failed: None,
                show_activity_indicator: true,
            })),
            transport,
            cache: None,
        }
    }

    /// Name of the response field holding the item array.
    pub fn with_result_key(self, result_key: &str) -> Self {
        self.lock().result_key = result_key.to_string();
        self
    }

    /// Attach a snapshot store for [`cache_items`](Self::cache_items) and
    /// friends.
    pub fn with_cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(store);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Query access
    // ------------------------------------------------------------------

    /// Snapshot of the current query descriptor.
    pub fn query(&self) -> Query {
        self.lock().query.clone()
    }

    /// Replace the query descriptor.
    ///
    /// Changing the descriptor does not retroactively affect items already
    /// fetched and does not reset pagination bookkeeping; call
    /// [`reset`](Self::reset) to start a fresh walk. An attempt already in
    /// flight keeps the request it was dispatched with.
    pub fn set_query(&self, query: Query) {
        self.lock().query = query;
    }

    /// Mutate the query descriptor in place. Same contract as
    /// [`set_query`](Self::set_query).
    pub fn update_query(&self, mutate: impl FnOnce(&mut Query)) {
        mutate(&mut self.lock().query);
    }

    // ------------------------------------------------------------------
    // Callbacks
    // ------------------------------------------------------------------

    /// Called after each successful page fetch with the items that page
    /// newly added, in arrival order. Refetched duplicates are not
    /// included.
    ///
    /// Runs on the fetch task, never while the set's lock is held, so the
    /// callback may immediately call back into the set (e.g.
    /// [`fetch_next_page`](Self::fetch_next_page)).
    pub fn on_page_loaded(&self, callback: impl Fn(&[T]) + Send + Sync + 'static) {
        self.lock().on_page_loaded = Some(Arc::new(callback));
    }

    /// Called after a page fetch fails. At most one of the two callbacks
    /// fires per attempt, and neither fires for a cancelled one.
    pub fn on_page_load_failed(&self, callback: impl Fn(&FetchError) + Send + Sync + 'static) {
        self.lock().on_page_load_failed = Some(Arc::new(callback));
    }

    // ------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------

    /// Fetch the next page of results. Does nothing if a fetch is already
    /// in progress, or if the last page has already been fetched. The
    /// first fetch targets page 1.
    pub fn fetch_next_page(&self) {
        let target = {
            let inner = self.lock();
            if inner.fetch_state == FetchState::Fetching {
                return;
            }
            if inner.last_page_already_fetched() {
                return;
            }
            inner.last_fetched_page + 1
        };
        self.fetch_page(target);
    }

    /// Fetch a specific page of results. Usually
    /// [`fetch_next_page`](Self::fetch_next_page) is what you want, but
    /// refetching a page is supported: the set only ever contains unique
    /// items, so a refetch adds whatever is new and silently drops the
    /// rest.
    ///
    /// Does nothing if a fetch is already in progress. Page numbers start
    /// from 1; 0 is treated as 1. Returns as soon as the request is
    /// dispatched.
    pub fn fetch_page(&self, page: u32) {
        let page = page.max(1);
        let (token, request, result_key) = {
            let mut inner = self.lock();
            if inner.fetch_state == FetchState::Fetching {
                debug!(page, "fetch already in progress, ignoring");
                return;
            }
            inner.fetch_state = FetchState::Fetching;
            inner.attempt += 1;
            let request = inner.query.derive_for_page(page).request();
            (inner.attempt, request, inner.result_key.clone())
        };
        debug!(page, url = %request.url, "dispatching page fetch");

        let transport = Arc::clone(&self.transport);
        // The task holds only a weak reference: completions targeting a
        // dropped set upgrade to nothing and are silently discarded.
        let state = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            let result = transport.execute(request).await;
            let Some(state) = state.upgrade() else {
                return;
            };
            Self::apply_completion(&state, token, page, &result_key, result);
        });

        let mut inner = self.lock();
        if inner.attempt == token && inner.fetch_state == FetchState::Fetching {
            inner.in_flight = Some(handle);
        } else {
            // Cancelled or reset between dispatch and here.
            handle.abort();
        }
    }

    /// Cancel an in-progress fetch. Does nothing when idle. Neither
    /// callback fires for the cancelled attempt, and the set's items and
    /// pagination state are left untouched.
    pub fn cancel_fetch(&self) {
        let handle = {
            let mut inner = self.lock();
            if inner.fetch_state != FetchState::Fetching {
                return;
            }
            inner.fetch_state = FetchState::Idle;
            // Invalidate the outstanding attempt token; aborting the task
            // below is only a fast path.
            inner.attempt += 1;
            inner.in_flight.take()
        };
        if let Some(handle) = handle {
            handle.abort();
        }
        debug!("fetch cancelled");
    }

    fn apply_completion(
        state: &Arc<Mutex<Inner<T>>>,
        token: u64,
        page: u32,
        result_key: &str,
        result: Result<ResponseEnvelope, TransportError>,
    ) {
        let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
        let outcome = if guard.attempt != token || guard.fetch_state != FetchState::Fetching {
            // Superseded by cancel_fetch or reset while the response was in
            // flight. The attempt resolves to exactly one outcome, and this
            // one is Cancelled.
            PageOutcome::Cancelled
        } else {
            guard.fetch_state = FetchState::Idle;
            guard.in_flight = None;
            let merged = result.map_err(FetchError::from).and_then(|envelope| {
                Self::merge_page(&mut guard, page, result_key, envelope).map_err(FetchError::from)
            });
            match merged {
                Ok(new_items) => PageOutcome::Loaded(new_items),
                Err(err) => PageOutcome::Failed(err),
            }
        };

        // At most one callback per attempt, invoked after the lock is
        // released so callbacks can re-enter the set.
        match outcome {
            PageOutcome::Loaded(new_items) => {
                let callback = guard.on_page_loaded.clone();
                drop(guard);
                if let Some(callback) = callback {
                    callback(&new_items);
                }
            }
            PageOutcome::Failed(err) => {
                let callback = guard.on_page_load_failed.clone();
                drop(guard);
                warn!(page, error = %err, "page fetch failed");
                if let Some(callback) = callback {
                    callback(&err);
                }
            }
            PageOutcome::Cancelled => {}
        }
    }

    /// Decode and merge one successful response. Decoding happens before
    /// any state is touched, so a malformed page leaves the set unchanged.
    fn merge_page(
        inner: &mut Inner<T>,
        page: u32,
        result_key: &str,
        envelope: ResponseEnvelope,
    ) -> Result<Vec<T>, DecodeError> {
        let decoded: Vec<T> = envelope
            .items(result_key)?
            .iter()
            .map(|record| {
                serde_json::from_value(record.clone()).map_err(|e| DecodeError::Item(e.to_string()))
            })
            .collect::<Result<_, _>>()?;

        let mut new_items = Vec::new();
        for item in decoded {
            if inner.seen.insert(item.identity()) {
                new_items.push(item);
            }
        }
        inner.items.extend(new_items.iter().cloned());
        inner.last_fetched_page = page;
        if let Some(total) = envelope.total_pages() {
            inner.total_pages = total;
        }
        inner.from_cache = false;
        inner.last_response = Some(envelope.into_body());
        debug!(
            page,
            added = new_items.len(),
            total = inner.items.len(),
            "page merged"
        );
        Ok(new_items)
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Whether a results fetch is in progress.
    pub fn fetching(&self) -> bool {
        self.lock().fetch_state == FetchState::Fetching
    }

    /// Page number of the last successfully fetched page, 0 before the
    /// first success.
    pub fn last_fetched_page(&self) -> u32 {
        self.lock().last_fetched_page
    }

    /// Total number of pages available for the query, 0 until the first
    /// successful response reports a total.
    pub fn total_pages(&self) -> u32 {
        self.lock().total_pages
    }

    /// Whether the last page of results has already been fetched.
    pub fn last_page_already_fetched(&self) -> bool {
        self.lock().last_page_already_fetched()
    }

    /// Number of items fetched so far. Not the total available for the
    /// query.
    pub fn count(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// The items fetched so far, in insertion order.
    pub fn to_vec(&self) -> Vec<T> {
        self.lock().items.clone()
    }

    /// Borrowed view of the items, without copying the collection. The
    /// set's lock is held for the duration of `f`; do not call back into
    /// the set from inside.
    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.lock().items)
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.lock().items.get(index).cloned()
    }

    /// The first item in the set, if any.
    pub fn first(&self) -> Option<T> {
        self.lock().items.first().cloned()
    }

    /// The last item in the set, if any.
    pub fn last(&self) -> Option<T> {
        self.lock().items.last().cloned()
    }

    /// Raw body of the most recent successful response, for introspection.
    pub fn last_response(&self) -> Option<Value> {
        self.lock().last_response.clone()
    }

    /// Name of the response field the set extracts items from.
    pub fn result_key(&self) -> String {
        self.lock().result_key.clone()
    }

    pub fn set_result_key(&self, result_key: &str) {
        self.lock().result_key = result_key.to_string();
    }

    /// Advisory hint for the calling layer: whether global loading UI
    /// (e.g. a status bar spinner) is appropriate while this set fetches.
    /// Defaults to true. The set itself never acts on it.
    pub fn show_activity_indicator(&self) -> bool {
        self.lock().show_activity_indicator
    }

    pub fn set_show_activity_indicator(&self, show: bool) {
        self.lock().show_activity_indicator = show;
    }

    // ------------------------------------------------------------------
    // Caching
    // ------------------------------------------------------------------

    /// Serialize the current items and pagination bookkeeping to the
    /// attached store under `cache_key`, replacing any prior snapshot for
    /// that key. Blocking I/O on the calling thread.
    pub fn cache_items(&self, cache_key: &str) -> CacheResult<()> {
        let store = self.cache.as_ref().ok_or(CacheError::NoStore)?;
        let snapshot = {
            let inner = self.lock();
            SetSnapshot::new(
                inner.items.clone(),
                inner.last_fetched_page,
                inner.total_pages,
            )
        };
        let blob = snapshot.encode()?;
        store.put(cache_key, &blob)?;
        debug!(cache_key, items = snapshot.items.len(), "items cached");
        Ok(())
    }

    /// Whether cached results are available for `cache_key`.
    pub fn has_cached_items(&self, cache_key: &str) -> bool {
        self.cache.as_ref().is_some_and(|store| store.exists(cache_key))
    }

    /// Restore the set to a previously cached state. Best-effort: a
    /// missing snapshot is a no-op returning `Ok(false)` and existing
    /// state is kept. On success the items, pagination counters and the
    /// from-cache flag are replaced; no callbacks fire.
    ///
    /// The snapshot does not carry the query descriptor, so loading a key
    /// written under a different query shape goes undetected; keep key and
    /// descriptor coherent at the call site. Loading concurrently with an
    /// in-flight fetch completion has unspecified ordering; typical usage
    /// is at startup, before any fetch.
    pub fn load_cached_items(&self, cache_key: &str) -> CacheResult<bool> {
        let store = self.cache.as_ref().ok_or(CacheError::NoStore)?;
        let Some(blob) = store.get(cache_key)? else {
            return Ok(false);
        };
        let snapshot: SetSnapshot<T> = SetSnapshot::decode(&blob)?;

        let mut inner = self.lock();
        inner.seen = snapshot.items.iter().map(PagedItem::identity).collect();
        inner.items = snapshot.items;
        inner.last_fetched_page = snapshot.last_fetched_page;
        inner.total_pages = snapshot.total_pages;
        inner.from_cache = true;
        debug!(cache_key, items = inner.items.len(), "items restored from cache");
        Ok(true)
    }

    /// Whether the current items were loaded from cache. Cleared by the
    /// next successful live fetch.
    pub fn items_are_from_cache(&self) -> bool {
        self.lock().from_cache
    }

    // ------------------------------------------------------------------
    // Resetting
    // ------------------------------------------------------------------

    /// Reset the internal state of the set: items, pagination counters and
    /// the from-cache flag are cleared and any in-flight fetch is
    /// cancelled. The query descriptor is kept as-is. A subsequent
    /// [`fetch_next_page`](Self::fetch_next_page) fetches page 1.
    pub fn reset(&self) {
        let handle = {
            let mut inner = self.lock();
            inner.attempt += 1;
            inner.fetch_state = FetchState::Idle;
            inner.items.clear();
            inner.seen.clear();
            inner.last_fetched_page = 0;
            inner.total_pages = 0;
            inner.from_cache = false;
            inner.last_response = None;
            inner.in_flight.take()
        };
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

impl<T: PagedItem> Drop for ItemSet<T> {
    fn drop(&mut self) {
        // Pending completions hold only a weak reference and drop
        // themselves; aborting just stops the network call sooner.
        if let Some(handle) = self.lock().in_flight.take() {
            handle.abort();
        }
    }
}
