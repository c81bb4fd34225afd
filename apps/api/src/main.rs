mod analyzer;
mod cache;
mod clock;
mod config;
mod db;
mod errors;
mod events;
mod models;
mod recommendation;
mod routes;
mod scoring;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analyzer::ProfileAnalyzer;
use crate::cache::{spawn_cache_sweeper, CacheStore, ShardedTtlCache};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::create_pool;
use crate::events::redis_bus::{spawn_event_subscriber, RedisEventPublisher};
use crate::recommendation::{
    InteractionLog, InteractionOverlapSimilarity, RecommendationDeps, RecommendationPage,
    RecommendationService,
};
use crate::routes::build_router;
use crate::scoring::{ScoringWeights, WeightedMatchScorer};
use crate::state::AppState;
use crate::store::postgres::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;
    let rec = config.recommendation.clone();

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobmatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, rec.request_timeout).await?;
    let store = Arc::new(PgStore::new(db));

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let scorer = Arc::new(WeightedMatchScorer::new(ScoringWeights::default(), clock.clone())?);

    // Recommendation cache + its sweeper
    let cache: Arc<dyn CacheStore<RecommendationPage>> = Arc::new(ShardedTtlCache::new(
        rec.cache_capacity,
        rec.cache_shards,
        clock.clone(),
    ));
    let _sweeper = spawn_cache_sweeper(cache.clone(), rec.cache_sweep_interval);
    info!(
        "Recommendation cache: {} entries over {} shards, ttl {:?}",
        rec.cache_capacity, rec.cache_shards, rec.cache_ttl
    );

    // Inbound events invalidate cached recommendations
    let interactions = Arc::new(InteractionLog::new(rec.cache_shards, rec.interaction_capacity));
    let _subscriber = spawn_event_subscriber(redis.clone(), cache.clone(), interactions.clone());

    let deps = RecommendationDeps {
        profiles: store.clone(),
        preferences: store,
        scorer,
        cache,
        publisher: Arc::new(RedisEventPublisher::new(redis)),
        similarity: Arc::new(InteractionOverlapSimilarity::new(interactions.clone())),
        interactions,
        clock: clock.clone(),
    };

    // Build app state
    let state = AppState {
        recommendations: RecommendationService::new(deps, rec),
        analyzer: ProfileAnalyzer::new(clock),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
