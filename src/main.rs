use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use storefront::{
    AppState,
    cache::{CacheStore, MemoryCache, RedisCache},
    config::{CacheBackend, Config},
    database::{MemoryStore, PgStore},
    payment::{PaymentGateway, StripeGateway},
    routes,
};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration (is JWT_SECRET set?)");

    let cache_store: Arc<dyn CacheStore> = match config.cache_backend {
        CacheBackend::Memory => {
            tracing::info!("Using in-process catalog cache");
            Arc::new(MemoryCache::new())
        }
        CacheBackend::Redis => {
            let redis_client = redis::Client::open(config.redis_url.clone())
                .expect("Failed to create Redis client");
            tracing::info!(url = %config.redis_url, "Using Redis catalog cache");
            Arc::new(RedisCache::new(Arc::new(redis_client)))
        }
    };

    let payments: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(&config));

    let state = if config.uses_memory_store() {
        tracing::warn!("DATABASE_URL=memory, data will not survive a restart");
        AppState::new(
            config.clone(),
            Arc::new(MemoryStore::new()),
            cache_store,
            payments,
        )
    } else {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("SET application_name = 'storefront';").await?;
                    Ok(())
                })
            })
            .connect(&config.database_url)
            .await
            .expect("Failed to connect to Postgres");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations");

        AppState::new(config.clone(), Arc::new(PgStore::new(pool)), cache_store, payments)
    };

    let router = routes::router(state);

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding permissive CORS layer for development mode");
        router.layer(CorsLayer::permissive())
    };

    #[cfg(not(debug_assertions))]
    let router = {
        use axum::http::{HeaderValue, Method, header};

        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        router.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
                .allow_credentials(true),
        )
    };

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
