//! Handler for the `run` command.
//!
//! Wires the pieces together: the feed task owns the websocket, the dispatch
//! thread applies events to the registry, and this task prints the top of
//! each changed book every `display.interval_secs`.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::adapter::coinbase::CoinbaseStream;
use crate::application::dispatch::Dispatcher;
use crate::application::registry::{BookUpdate, CoinbaseOrderBook};
use crate::cli::RunArgs;
use crate::domain::id::ProductId;
use crate::error::{Error, Result};
use crate::infrastructure::config::Config;
use crate::infrastructure::feed::{FeedRunner, ReconnectingFeedStream, SubscriptionHandle};

const NOTIFICATION_CAPACITY: usize = 1024;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the dispatch thread
/// cannot be started, or the feed fails during startup.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::read(&args.config)?;
    apply_overrides(&mut config, args);
    config.validate()?;
    config.init_logging();

    let products = config.product_ids();
    info!(products = ?products, feed = %config.feed.ws_url, "coinbook starting");

    let (handle, requests) = SubscriptionHandle::channel("Coinbase");
    let (registry, mut updates) =
        CoinbaseOrderBook::with_notifications(Arc::new(handle), NOTIFICATION_CAPACITY);
    let registry = Arc::new(registry);
    registry.add_order_books(products.iter().cloned(), false)?;

    let dispatcher = Dispatcher::spawn(Arc::clone(&registry))?;
    let stream = ReconnectingFeedStream::new(
        CoinbaseStream::new(config.feed.ws_url.clone(), config.feed.channel.clone()),
        config.reconnection.clone(),
    );
    let runner = FeedRunner::new(stream, requests, dispatcher.sender());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let initial = products.clone();
    let mut feed_task = tokio::spawn(async move { runner.run(&initial, shutdown_rx).await });

    let depth = config.display.depth;
    let mut ticker = tokio::time::interval(Duration::from_secs(config.display.interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut dirty: BTreeSet<ProductId> = BTreeSet::new();

    loop {
        tokio::select! {
            result = &mut feed_task => {
                let summary = result.map_err(|e| Error::Connection(e.to_string()))??;
                warn!(events = summary.events, "Feed task exited");
                break;
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received (Ctrl+C)");
                let _ = shutdown_tx.send(true);
                match (&mut feed_task).await {
                    Ok(Err(e)) => error!(error = %e, "Feed task failed"),
                    Err(e) => error!(error = %e, "Feed task panicked"),
                    Ok(Ok(_)) => {}
                }
                break;
            }
            update = updates.recv() => match update {
                Ok(BookUpdate { product_id }) => {
                    dirty.insert(product_id);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Display lagged behind book updates");
                    dirty.extend(registry.get_tracked_products());
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = ticker.tick() => {
                render(&registry, &mut dirty, depth);
            }
        }
    }

    // Queued deltas for a product whose snapshot never came would block a
    // join forever; the thread is detached instead.
    drop(dispatcher);
    info!("coinbook stopped");
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(ref products) = args.products {
        config.products = products
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(ProductId::from)
            .collect();
    }
    if let Some(depth) = args.depth {
        config.display.depth = depth;
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
}

/// Print every changed book that has received its snapshot.
fn render(registry: &CoinbaseOrderBook, dirty: &mut BTreeSet<ProductId>, depth: usize) {
    let pending = std::mem::take(dirty);
    for product_id in pending {
        let Ok(book) = registry.get_order_book(&product_id) else {
            continue;
        };
        if !book.is_initialized() {
            continue;
        }
        println!("{}", book.top_n_string(Some(depth)));
    }
}
