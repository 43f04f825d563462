//! Watches the live order book and prints the top of book on every update.
//!
//! Run with: `cargo run --example watch`
//!
//! Set `RUST_LOG=bookfeed_client=debug` to see the session state machine.
//! The pair is toggled every `TOGGLE_EVERY` updates; press Ctrl-C to stop.

use bookfeed::prelude::*;

const TOGGLE_EVERY: usize = 25;

fn print_top(feed: &BookFeed) {
    let book = feed.book();
    let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) else {
        println!("[{}] one-sided book", feed.pair());
        return;
    };

    let spread = book.spread().unwrap_or_default();
    let ratio = book.spread_ratio().unwrap_or_default();
    println!(
        "[{}] bid {:>10.1} x {:<8} | ask {:>10.1} x {:<8} | spread {:.1} ({:.2}%) | depth {}/{}",
        feed.pair(),
        bid.price,
        bid.size,
        ask.price,
        ask.size,
        spread,
        ratio * 100.0,
        book.bid_total(),
        book.ask_total(),
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (controller, mut feed) = FeedBuilder::new()
        .initial_pair(TradingPair::XbtUsd)
        .build();
    let controller_task = tokio::spawn(controller.run());

    println!("Connecting to {}", FeedConfig::default().url);
    feed.open()?;

    let mut updates = 0usize;
    loop {
        tokio::select! {
            event = feed.next_event() => {
                let Some(event) = event else {
                    break;
                };
                match event {
                    FeedEvent::Update { .. } => {
                        print_top(&feed);
                        updates += 1;
                        if updates % TOGGLE_EVERY == 0 {
                            let next = feed.pair().toggled();
                            println!("Switching to {next}");
                            feed.switch_pair(next)?;
                        }
                    }
                    FeedEvent::Closed => {
                        println!("Feed closed");
                        break;
                    }
                    other => tracing::info!(event = ?other, "feed event"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Shutting down...");
                feed.close()?;
            }
        }
    }

    drop(feed);
    controller_task.await?;
    Ok(())
}
