use std::sync::Arc;

use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use story_store::{config::Config, console, NullPersistence, Story, StoryStore, SystemClock};

fn init_tracing(config: &Config) {
    let filter = match config.log_filter() {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args(std::env::args().skip(1))?;
    init_tracing(&config);

    let store = StoryStore::with_config(
        config.store_config()?,
        Arc::new(NullPersistence),
        Arc::new(SystemClock),
    );
    let subscription = store.subscribe(|stories: &[Story]| {
        tracing::info!(active = stories.len(), "active stories changed");
    });

    let result = console::run(
        &store,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await;

    subscription.unsubscribe();
    store.shutdown();
    result
}
