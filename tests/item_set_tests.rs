/// Item set state machine tests
///
/// Drive an `ItemSet` against a scripted in-process transport and check the
/// pagination, dedup, single-flight and cancellation guarantees.
/// Run with: cargo test --test item_set_tests
use async_trait::async_trait;
use pageset::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Ticket {
    id: u64,
    label: String,
}

impl PagedItem for Ticket {
    type Id = u64;

    fn identity(&self) -> u64 {
        self.id
    }
}

type Responder = dyn Fn(u32) -> Result<Value, TransportError> + Send + Sync;

struct MockTransport {
    responder: Box<Responder>,
    calls: AtomicUsize,
    delay: Duration,
    last_page: Mutex<Option<u32>>,
}

impl MockTransport {
    fn new(
        responder: impl Fn(u32) -> Result<Value, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Self::with_delay(responder, Duration::ZERO)
    }

    fn with_delay(
        responder: impl Fn(u32) -> Result<Value, TransportError> + Send + Sync + 'static,
        delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            delay,
            last_page: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_page(&self) -> Option<u32> {
        *self.last_page.lock().unwrap()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: RequestSpec) -> Result<ResponseEnvelope, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let page = request
            .params
            .iter()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(1);
        *self.last_page.lock().unwrap() = Some(page);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.responder)(page).map(ResponseEnvelope::new)
    }
}

/// A page body in the API's envelope shape: 25 tickets total, 10 per page.
fn ticket_page(ids: std::ops::Range<u64>, total: u64) -> Value {
    let tickets: Vec<Value> = ids
        .map(|id| json!({"id": id, "label": format!("ticket-{id}")}))
        .collect();
    json!({
        "tickets": tickets,
        "meta": {"total": total, "per_page": 10, "page": 1}
    })
}

fn three_page_responder() -> impl Fn(u32) -> Result<Value, TransportError> + Send + Sync {
    |page| {
        let start = u64::from(page - 1) * 10;
        let end = (start + 10).min(25);
        Ok(ticket_page(start..end, 25))
    }
}

fn ticket_set(transport: Arc<MockTransport>) -> ItemSet<Ticket> {
    let config = ApiConfig::new().base_url("http://api.test.local");
    ItemSet::new(Query::endpoint(&config, "/tickets"), transport).with_result_key("tickets")
}

fn loaded_channel(set: &ItemSet<Ticket>) -> tokio::sync::mpsc::UnboundedReceiver<Vec<Ticket>> {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    set.on_page_loaded(move |items| {
        let _ = tx.send(items.to_vec());
    });
    rx
}

fn failed_channel(set: &ItemSet<Ticket>) -> tokio::sync::mpsc::UnboundedReceiver<String> {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    set.on_page_load_failed(move |err| {
        let _ = tx.send(err.to_string());
    });
    rx
}

async fn wait_for(mut cond: impl FnMut() -> bool) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within 2s");
}

#[tokio::test]
async fn test_walks_all_pages_then_stops() {
    let transport = MockTransport::new(three_page_responder());
    let set = ticket_set(transport.clone());
    let mut loaded = loaded_channel(&set);

    set.fetch_next_page();
    let page1 = loaded.recv().await.unwrap();
    assert_eq!(page1.len(), 10);
    assert_eq!(set.last_fetched_page(), 1);
    assert_eq!(set.total_pages(), 3);
    assert!(!set.last_page_already_fetched());

    set.fetch_next_page();
    let page2 = loaded.recv().await.unwrap();
    assert_eq!(page2.len(), 10);
    assert_eq!(set.count(), 20);

    set.fetch_next_page();
    let page3 = loaded.recv().await.unwrap();
    assert_eq!(page3.len(), 5);
    assert_eq!(set.count(), 25);
    assert_eq!(set.last_fetched_page(), 3);
    assert!(set.last_page_already_fetched());

    // Terminal: all pages fetched, a further call is a silent no-op.
    set.fetch_next_page();
    assert!(!set.fetching());
    assert_eq!(transport.calls(), 3);
    let extra = tokio::time::timeout(Duration::from_millis(100), loaded.recv()).await;
    assert!(extra.is_err(), "no callback may fire for a no-op fetch");
}

#[tokio::test]
async fn test_first_fetch_targets_page_one() {
    let transport = MockTransport::new(three_page_responder());
    let set = ticket_set(transport.clone());
    let mut loaded = loaded_channel(&set);

    set.fetch_next_page();
    loaded.recv().await.unwrap();

    assert_eq!(transport.last_page(), Some(1));
}

#[tokio::test]
async fn test_fetch_page_zero_is_clamped_to_one() {
    let transport = MockTransport::new(three_page_responder());
    let set = ticket_set(transport.clone());
    let mut loaded = loaded_channel(&set);

    set.fetch_page(0);
    loaded.recv().await.unwrap();

    assert_eq!(transport.last_page(), Some(1));
    assert_eq!(set.last_fetched_page(), 1);
}

#[tokio::test]
async fn test_refetch_adds_no_duplicates() {
    let transport = MockTransport::new(three_page_responder());
    let set = ticket_set(transport.clone());
    let mut loaded = loaded_channel(&set);

    set.fetch_page(1);
    let first = loaded.recv().await.unwrap();
    assert_eq!(first.len(), 10);

    set.fetch_page(1);
    let refetched = loaded.recv().await.unwrap();
    assert!(refetched.is_empty(), "a refetched page contributes no duplicates");
    assert_eq!(set.count(), 10);
    assert_eq!(set.last_fetched_page(), 1);
}

#[tokio::test]
async fn test_refetch_with_shifted_results_keeps_existing_order() {
    let window = AtomicUsize::new(0);
    let transport = MockTransport::new(move |_page| {
        // First call sees ids 0..10, later calls see the window shifted
        // by five: ids 5..15.
        if window.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(ticket_page(0..10, 25))
        } else {
            Ok(ticket_page(5..15, 25))
        }
    });
    let set = ticket_set(transport.clone());
    let mut loaded = loaded_channel(&set);

    set.fetch_page(1);
    loaded.recv().await.unwrap();
    set.fetch_page(1);
    let new_items = loaded.recv().await.unwrap();

    let new_ids: Vec<u64> = new_items.iter().map(|t| t.id).collect();
    assert_eq!(new_ids, vec![10, 11, 12, 13, 14]);

    // Existing identities stay put; genuinely new ones append in arrival
    // order.
    let all_ids: Vec<u64> = set.to_vec().iter().map(|t| t.id).collect();
    assert_eq!(all_ids, (0..15).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_single_flight() {
    let transport =
        MockTransport::with_delay(three_page_responder(), Duration::from_millis(100));
    let set = ticket_set(transport.clone());
    let mut loaded = loaded_channel(&set);

    set.fetch_page(1);
    assert!(set.fetching());

    // Both of these hit the Fetching guard and must not dispatch.
    set.fetch_page(1);
    set.fetch_page(2);
    set.fetch_next_page();

    loaded.recv().await.unwrap();
    assert_eq!(transport.calls(), 1);
    assert_eq!(set.last_fetched_page(), 1);
    assert!(!set.fetching());
}

#[tokio::test]
async fn test_failure_leaves_state_unchanged() {
    let transport = MockTransport::new(|page| {
        if page == 1 {
            Ok(ticket_page(0..10, 25))
        } else {
            Err(TransportError::Status(500))
        }
    });
    let set = ticket_set(transport.clone());
    let mut loaded = loaded_channel(&set);
    let mut failed = failed_channel(&set);

    set.fetch_next_page();
    loaded.recv().await.unwrap();

    set.fetch_next_page();
    let err = failed.recv().await.unwrap();
    assert!(err.contains("500"), "unexpected error: {err}");

    assert_eq!(set.count(), 10);
    assert_eq!(set.last_fetched_page(), 1);
    assert_eq!(set.total_pages(), 3);
    assert!(!set.fetching());
    assert!(loaded.try_recv().is_err(), "only one callback may fire per attempt");
}

#[tokio::test]
async fn test_decode_error_surfaces_through_failed_callback() {
    let transport = MockTransport::new(|_page| Ok(json!({"unexpected": {}})));
    let set = ticket_set(transport.clone());
    let mut failed = failed_channel(&set);

    set.fetch_next_page();
    let err = failed.recv().await.unwrap();

    assert!(err.contains("result key"), "unexpected error: {err}");
    assert_eq!(set.count(), 0);
    assert_eq!(set.last_fetched_page(), 0);
}

#[tokio::test]
async fn test_cancel_fetch_suppresses_callbacks_and_state() {
    let transport =
        MockTransport::with_delay(three_page_responder(), Duration::from_millis(200));
    let set = ticket_set(transport.clone());
    let mut loaded = loaded_channel(&set);
    let mut failed = failed_channel(&set);

    set.fetch_page(1);
    assert!(set.fetching());
    set.cancel_fetch();
    assert!(!set.fetching());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(loaded.try_recv().is_err());
    assert!(failed.try_recv().is_err());
    assert_eq!(set.count(), 0);
    assert_eq!(set.last_fetched_page(), 0);
    assert_eq!(set.total_pages(), 0);
}

#[tokio::test]
async fn test_cancel_when_idle_is_a_noop() {
    let transport = MockTransport::new(three_page_responder());
    let set = ticket_set(transport.clone());

    set.cancel_fetch();
    assert!(!set.fetching());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_fetch_after_cancel_recovers() {
    let transport =
        MockTransport::with_delay(three_page_responder(), Duration::from_millis(50));
    let set = ticket_set(transport.clone());
    let mut loaded = loaded_channel(&set);

    set.fetch_page(1);
    set.cancel_fetch();

    set.fetch_page(1);
    loaded.recv().await.unwrap();
    assert_eq!(set.count(), 10);
    assert_eq!(set.last_fetched_page(), 1);
}

#[tokio::test]
async fn test_drop_with_inflight_fetch_fires_nothing() {
    let transport =
        MockTransport::with_delay(three_page_responder(), Duration::from_millis(100));
    let set = ticket_set(transport.clone());
    let mut loaded = loaded_channel(&set);

    set.fetch_page(1);
    drop(set);

    // The callback (and its sender) died with the set, so the channel
    // closes without ever delivering a page.
    assert_eq!(loaded.recv().await, None);
}

#[tokio::test]
async fn test_reset_clears_state_but_not_query() {
    let transport = MockTransport::new(three_page_responder());
    let set = ticket_set(transport.clone());
    let mut loaded = loaded_channel(&set);

    set.update_query(|q| q.set_parameter("q", "mets"));
    set.fetch_next_page();
    loaded.recv().await.unwrap();
    set.fetch_next_page();
    loaded.recv().await.unwrap();
    assert_eq!(set.count(), 20);

    set.reset();
    assert_eq!(set.count(), 0);
    assert_eq!(set.last_fetched_page(), 0);
    assert_eq!(set.total_pages(), 0);
    assert!(!set.items_are_from_cache());
    assert_eq!(set.query().parameters.get("q").map(String::as_str), Some("mets"));

    set.fetch_next_page();
    loaded.recv().await.unwrap();
    assert_eq!(transport.last_page(), Some(1));
}

#[tokio::test]
async fn test_on_page_loaded_can_trigger_the_next_fetch() {
    let transport = MockTransport::new(three_page_responder());
    let set = Arc::new(ticket_set(transport.clone()));
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let weak = Arc::downgrade(&set);
    set.on_page_loaded(move |items| {
        let _ = tx.send(items.len());
        if let Some(set) = weak.upgrade() {
            set.fetch_next_page();
        }
    });

    set.fetch_next_page();
    let mut sizes = Vec::new();
    for _ in 0..3 {
        sizes.push(rx.recv().await.unwrap());
    }
    wait_for(|| !set.fetching()).await;

    assert_eq!(sizes, vec![10, 10, 5]);
    assert_eq!(set.count(), 25);
    assert!(set.last_page_already_fetched());
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn test_works_without_callbacks() {
    let transport = MockTransport::new(three_page_responder());
    let set = ticket_set(transport.clone());

    set.fetch_next_page();
    wait_for(|| set.count() == 10).await;

    assert_eq!(set.first().map(|t| t.id), Some(0));
    assert_eq!(set.last().map(|t| t.id), Some(9));
    assert_eq!(set.get(3).map(|t| t.id), Some(3));
    assert!(set.last_response().is_some());
}

#[tokio::test]
async fn test_missing_meta_keeps_previous_total() {
    let transport = MockTransport::new(|page| {
        if page == 1 {
            Ok(ticket_page(0..10, 25))
        } else {
            // Same shape minus the meta block.
            Ok(json!({"tickets": [{"id": 100, "label": "stray"}]}))
        }
    });
    let set = ticket_set(transport.clone());
    let mut loaded = loaded_channel(&set);

    set.fetch_next_page();
    loaded.recv().await.unwrap();
    assert_eq!(set.total_pages(), 3);

    set.fetch_next_page();
    loaded.recv().await.unwrap();
    assert_eq!(set.total_pages(), 3, "absent meta must not regress the total");
    assert_eq!(set.last_fetched_page(), 2);
}

#[tokio::test]
async fn test_advisory_activity_indicator_flag() {
    let transport = MockTransport::new(three_page_responder());
    let set = ticket_set(transport);

    assert!(set.show_activity_indicator());
    set.set_show_activity_indicator(false);
    assert!(!set.show_activity_indicator());
}
