use crate::config::DistributionConfig;
use crate::handlers;
use crate::services::Database;
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: DistributionConfig,
    pub db: Arc<Database>,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: DistributionConfig) -> Result<Self, AppError> {
        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;
        db.run_migrations().await?;
        Self::with_database(config, db).await
    }

    /// Build against a database whose schema is managed by the caller.
    pub async fn build_without_migrations(config: DistributionConfig) -> Result<Self, AppError> {
        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;
        Self::with_database(config, db).await
    }

    async fn with_database(config: DistributionConfig, db: Database) -> Result<Self, AppError> {
        let state = AppState {
            config: config.clone(),
            db: Arc::new(db),
        };

        let app = build_router(state.clone());

        let addr = format!("{}:{}", config.common.host, config.common.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.state.db
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Daily operation lifecycle and recorders
        .route("/operations", post(handlers::operations::start_operation))
        .route("/operations/:id", get(handlers::operations::get_operation))
        .route(
            "/operations/by-date/:date",
            get(handlers::operations::get_operation_by_date),
        )
        .route(
            "/operations/:id/close",
            post(handlers::operations::close_operation),
        )
        .route(
            "/operations/:id/purchases",
            post(handlers::operations::record_farm_purchase),
        )
        .route(
            "/operations/:id/sales",
            post(handlers::operations::record_sale),
        )
        .route(
            "/operations/:id/losses",
            post(handlers::operations::record_transport_loss),
        )
        .route(
            "/operations/:id/costs",
            post(handlers::operations::record_daily_cost),
        )
        // Farms and the farm-side debt ledger
        .route(
            "/farms",
            post(handlers::farms::create_farm).get(handlers::farms::list_farms),
        )
        .route(
            "/farms/:id",
            get(handlers::farms::get_farm)
                .put(handlers::farms::update_farm)
                .delete(handlers::farms::delete_farm),
        )
        .route(
            "/farms/:id/payments",
            post(handlers::farms::record_farm_debt_payment),
        )
        .route("/farms/:id/debt", get(handlers::farms::get_farm_debt_history))
        // Buyers and the buyer-side debt ledger
        .route(
            "/buyers",
            post(handlers::buyers::create_buyer).get(handlers::buyers::list_buyers),
        )
        .route(
            "/buyers/:id",
            get(handlers::buyers::get_buyer)
                .put(handlers::buyers::update_buyer)
                .delete(handlers::buyers::delete_buyer),
        )
        .route(
            "/buyers/:id/payments",
            post(handlers::buyers::record_buyer_debt_payment),
        )
        .route(
            "/buyers/:id/debt",
            get(handlers::buyers::get_buyer_debt_history),
        )
        // Partners and vehicles
        .route(
            "/partners",
            post(handlers::partners::create_partner).get(handlers::partners::list_partners),
        )
        .route(
            "/partners/:id",
            get(handlers::partners::get_partner)
                .put(handlers::partners::update_partner)
                .delete(handlers::partners::delete_partner),
        )
        .route(
            "/vehicles",
            post(handlers::vehicles::create_vehicle).get(handlers::vehicles::list_vehicles),
        )
        .route(
            "/vehicles/:id",
            get(handlers::vehicles::get_vehicle)
                .put(handlers::vehicles::update_vehicle)
                .delete(handlers::vehicles::delete_vehicle),
        )
        // Catalogs
        .route(
            "/chicken-types",
            post(handlers::catalog::create_chicken_type).get(handlers::catalog::list_chicken_types),
        )
        .route(
            "/cost-categories",
            post(handlers::catalog::create_cost_category)
                .get(handlers::catalog::list_cost_categories),
        )
        // Reports
        .route("/reports/daily/:date", get(handlers::reports::daily_report))
        .route(
            "/reports/profit",
            get(handlers::reports::period_profit_report),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api)
        .layer(CorsLayer::permissive())
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
