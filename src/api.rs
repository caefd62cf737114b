// HTTP API exposing the orchestration façade as JSON

use crate::orchestrator::{Orchestrator, ServiceAction};
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

/// Shared application state for the HTTP handlers
pub struct AppState {
    orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }
}

#[derive(Debug, Deserialize)]
pub struct ControlRequest {
    pub action: ServiceAction,
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub lines: Option<usize>,
}

// Get live status for every inventory service, in inventory order
async fn list_services(data: web::Data<AppState>) -> impl Responder {
    let statuses = data.orchestrator.statuses().await;
    HttpResponse::Ok().json(statuses)
}

// Apply start/stop/restart to one service
async fn control_service(
    data: web::Data<AppState>,
    name: web::Path<String>,
    body: web::Json<ControlRequest>,
) -> impl Responder {
    let result = data.orchestrator.control(&name, body.action).await;
    HttpResponse::Ok().json(result)
}

// Run the fixed remediation recipe for one service
async fn remediate_service(data: web::Data<AppState>, name: web::Path<String>) -> impl Responder {
    let result = data.orchestrator.remediate(&name).await;
    HttpResponse::Ok().json(result)
}

// Fetch the last N log lines for one service
async fn service_logs(
    data: web::Data<AppState>,
    name: web::Path<String>,
    query: web::Query<LogsQuery>,
) -> impl Responder {
    let result = data.orchestrator.service_logs(&name, query.lines).await;
    HttpResponse::Ok().json(result)
}

// Host-level metrics for the managed Pi
async fn system_info(data: web::Data<AppState>) -> impl Responder {
    let snapshot = data.orchestrator.host_snapshot().await;
    HttpResponse::Ok().json(snapshot)
}

// Liveness probe for the admin frontend
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Register all API routes. Failures never surface as HTTP errors here:
/// every operation returns a well-formed result object and callers branch
/// on its `success`/`state`/`error` fields.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/api/services", web::get().to(list_services))
        .route(
            "/api/services/{name}/control",
            web::post().to(control_service),
        )
        .route(
            "/api/services/{name}/remediate",
            web::post().to(remediate_service),
        )
        .route("/api/services/{name}/logs", web::get().to(service_logs))
        .route("/api/system", web::get().to(system_info));
}
