//! # Example: Tail an event stream
//!
//! Subscribes to an SSE endpoint, logs every callback through [`LogWriter`]
//! and prints the log once the stream closes (or on Ctrl-C).
//!
//! ```text
//! cargo run --example tail --features logging -- http://localhost:8080/stream/abc progress,log
//! RUST_LOG=streamvisor=debug cargo run --example tail --features logging -- <url>
//! ```

use std::{sync::Arc, time::Duration};

use streamvisor::{
    Backoff, Jitter, LogWriter, Observer, ReconnectPolicy, StreamClient, SubscriptionConfig,
};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("streamvisor=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .unwrap_or_else(|| "http://localhost:8080/stream/abc".to_string());
    let watched: Vec<String> = args
        .next()
        .map(|kinds| kinds.split(',').map(str::to_string).collect())
        .unwrap_or_else(|| vec!["progress".to_string()]);

    let observers: Vec<Arc<dyn Observer>> = vec![Arc::new(LogWriter::new())];
    let client = StreamClient::builder().with_observers(observers).build()?;

    let policy = ReconnectPolicy::default()
        .with_backoff(
            Backoff::exponential(Duration::from_secs(1), Duration::from_secs(30), 2.0)
                .with_jitter(Jitter::Equal),
        )
        .with_retry_hint(true);
    let config = SubscriptionConfig::parse(&url)?
        .with_watched_kinds(watched)
        .with_reconnect(policy);

    let sub = client.subscribe(config);
    tokio::select! {
        state = sub.closed() => println!("stream closed: {state}"),
        _ = tokio::signal::ctrl_c() => {
            sub.disconnect();
            println!("interrupted");
        }
    }

    for event in sub.events() {
        println!(
            "{:>8} {:<12} {}",
            event.cursor.as_deref().unwrap_or("-"),
            event.kind,
            event.payload
        );
    }
    if let Some(err) = sub.error() {
        println!("error: {err}");
    }
    Ok(())
}
