mod cli;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use gifvault_cache::{InMemoryStore, KeyValueStore, RedisStore};
use gifvault_rehost::{GatewayConfig, HttpRehostGateway};
use gifvault_search::{GifSearchService, SearchSettings};
use gifvault_upstream::{TenorClient, UpstreamConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    init_tracing(config.json_logs);

    info!(
        storage_backend = %config.storage,
        content_filter = %config.content_filter,
        queries = config.queries.len(),
        count = config.count,
        "starting gifvault"
    );

    match config.storage {
        StorageBackendArg::InMemory => run(config, Arc::new(InMemoryStore::new())).await,
        StorageBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .clone()
                .context("redis url is required when storage backend is redis")?;
            let store = RedisStore::connect(&redis_url)
                .await
                .context("failed to connect to redis")?;
            run(config, Arc::new(store)).await
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run<S: KeyValueStore>(config: CLI, store: Arc<S>) -> anyhow::Result<()> {
    let upstream = TenorClient::new(
        UpstreamConfig::builder()
            .base_url(config.upstream_url)
            .api_key(config.api_key)
            .content_filter(config.content_filter.into())
            .build(),
    )
    .context("failed to build upstream client")?;
    let gateway = HttpRehostGateway::new(
        GatewayConfig::builder()
            .upload_base_url(config.cdn_upload_url)
            .build(),
    )
    .context("failed to build CDN gateway")?;
    let settings = SearchSettings::builder().cdn_prefix(config.cdn_prefix).build();

    let service = GifSearchService::new(Arc::new(upstream), Arc::new(gateway), store, settings);

    let output = match config.queries.as_slice() {
        [query] => {
            let result = service.search(query, config.count).await?;
            serde_json::to_string_pretty(&result)?
        }
        queries => {
            let results = service.search_many(queries, config.count).await;
            serde_json::to_string_pretty(&results)?
        }
    };
    println!("{output}");
    Ok(())
}
