use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{BadgeCatalog, CatalogError, PlacementRouter, RenderOptions};
use persistence::repositories::{BadgeGroupRepository, BadgeRepository};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::cache::ListCache;
use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, security_headers_middleware,
    trace_id, RateLimiterState,
};
use crate::routes::{badges, catalog, health, plugins, render, session, settings};

/// REST namespace every badge route is served under.
pub const API_PREFIX: &str = "/trust-badges/v1";

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub groups: BadgeGroupRepository,
    pub badges: BadgeRepository,
    pub catalog: Arc<BadgeCatalog>,
    pub render_options: Arc<RenderOptions>,
    pub placement_router: PlacementRouter,
    pub cache: ListCache,
    pub rate_limiter: Option<RateLimiterState>,
}

/// Failures while assembling the application.
#[derive(Debug, Error)]
pub enum AppSetupError {
    #[error("Invalid JWT configuration: {0}")]
    Jwt(#[from] JwtError),

    #[error("Failed to load badge catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Loads the catalog manifest named in config, or the built-in one.
pub fn load_catalog(config: &Config) -> Result<BadgeCatalog, CatalogError> {
    match config.render.catalog_path.as_deref() {
        Some(path) if !path.trim().is_empty() => {
            let catalog = BadgeCatalog::from_path(path)?;
            tracing::info!(path, entries = catalog.len(), "Loaded badge catalog");
            Ok(catalog)
        }
        _ => Ok(BadgeCatalog::builtin().clone()),
    }
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Result<Self, AppSetupError> {
        let jwt = JwtConfig::with_leeway(
            &config.jwt.secret,
            config.jwt.session_expiry_secs,
            config.jwt.leeway_secs,
        )?;
        let catalog = load_catalog(&config)?;

        Ok(Self {
            groups: BadgeGroupRepository::new(pool.clone()),
            badges: BadgeRepository::new(pool.clone()),
            pool,
            jwt: Arc::new(jwt),
            catalog: Arc::new(catalog),
            render_options: Arc::new(config.render.render_options()),
            placement_router: PlacementRouter::new(config.integrations.active()),
            cache: ListCache::new(
                config.cache.max_capacity,
                Duration::from_secs(config.cache.ttl_secs),
            ),
            rate_limiter: RateLimiterState::per_hour(
                config.security.badges_rate_limit_per_hour,
                &config.security.trusted_proxies,
            ),
            config: Arc::new(config),
        })
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, AppSetupError> {
    let state = AppState::new(config, pool)?;
    Ok(build_router(state))
}

pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    // Admin routes authenticate through the AdminSession/AdminWrite extractors.
    let admin_routes = Router::new()
        .route(
            "/settings",
            get(settings::list_groups).post(settings::bulk_update),
        )
        .route("/settings/group", post(settings::upsert_group))
        .route(
            "/settings/group/:id",
            get(settings::get_group).delete(settings::delete_group),
        )
        .route("/installed-plugins", get(plugins::installed_plugins))
        .route("/session/nonce", get(session::nonce))
        .route("/catalog", get(catalog::list_catalog));

    let rate_limited_routes = Router::new()
        .route("/badges", get(badges::list_badges))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Storefront routes never fail with an error page.
    let render_routes = Router::new()
        .route("/render/:signal", get(render::render_signal))
        .route("/embed", get(render::render_embed));

    let api_routes = Router::new()
        .merge(admin_routes)
        .merge(rate_limited_routes)
        .merge(render_routes);

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::ready))
        .route("/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .nest(API_PREFIX, api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
