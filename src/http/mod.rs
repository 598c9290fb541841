mod error;

use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer, Responder};

use crate::domain::order::{CreateOrder, OrderCommandHandler, OrderError, OrderQueryHandler};
use crate::metrics::Metrics;

pub use error::ApiError;

// ============================================================================
// HTTP Surface
// ============================================================================
//
// POST /orders                        → create an order (201)
// GET  /accounts/{account_id}/orders  → enriched orders of one account
// GET  /metrics                       → Prometheus text format
// GET  /health
//
// ============================================================================

pub struct AppState {
    pub commands: Arc<OrderCommandHandler>,
    pub queries: Arc<OrderQueryHandler>,
    pub metrics: Arc<Metrics>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError(OrderError::InvalidArgument(err.to_string())).into()
    }))
    .route("/orders", web::post().to(create_order))
    .route("/accounts/{account_id}/orders", web::get().to(orders_for_account))
    .route("/metrics", web::get().to(metrics_handler))
    .route("/health", web::get().to(health_handler));
}

pub async fn serve(state: AppState, port: u16) -> std::io::Result<()> {
    let state = web::Data::new(state);

    tracing::info!("Starting order service on http://0.0.0.0:{}", port);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind(("0.0.0.0", port))?
        .run()
        .await
}

async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrder>,
) -> Result<HttpResponse, ApiError> {
    let order = state.commands.create_order(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

async fn orders_for_account(
    state: web::Data<AppState>,
    account_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let orders = state.queries.get_orders_for_account(&account_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

async fn metrics_handler(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| OrderError::Internal(format!("failed to encode metrics: {e}")))?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}

async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "order-service"
    }))
}
