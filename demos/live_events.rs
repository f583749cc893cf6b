//! Walk the first pages of a live events query and print the titles.
//!
//! Run with: SEATGEEK_CLIENT_ID=my_api_key cargo run --example live_events

use anyhow::Result;
use pageset::prelude::*;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = ApiConfig::new();
    if let Ok(client_id) = std::env::var("SEATGEEK_CLIENT_ID") {
        config = config.client_id(&client_id);
    }

    let events = EventSet::events(&config)?;
    events.update_query(|q| {
        q.set_parameter("q", "new york mets");
        q.per_page = 25;
    });
    println!("query: {}", events.query().url());

    let (page_tx, mut page_rx) = mpsc::unbounded_channel();
    events.on_page_loaded(move |new_items| {
        let _ = page_tx.send(new_items.to_vec());
    });
    let (err_tx, mut err_rx) = mpsc::unbounded_channel();
    events.on_page_load_failed(move |err| {
        let _ = err_tx.send(err.to_string());
    });

    for _ in 0..2 {
        events.fetch_next_page();
        tokio::select! {
            Some(page) = page_rx.recv() => {
                for event in &page {
                    println!("event: {}", event.title);
                }
            }
            Some(err) = err_rx.recv() => {
                anyhow::bail!("page load failed: {err}");
            }
        }
        if events.last_page_already_fetched() {
            break;
        }
    }

    println!(
        "{} events fetched, {} of {} pages",
        events.count(),
        events.last_fetched_page(),
        events.total_pages()
    );
    Ok(())
}
