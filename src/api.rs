//! REST API Server for the Company Profile Orchestrator
//!
//! Exposes the profile agent via HTTP endpoints

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use uuid::Uuid;

use crate::agent::ProfileAgent;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub company: Option<String>,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<ProfileAgent>,
}

/// Reject blank company names before any external call is attempted.
fn validate_company(company: Option<&str>) -> Option<String> {
    company
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Profile Endpoint
/// =============================

async fn query_profile(
    State(state): State<ApiState>,
    Json(req): Json<ProfileRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let Some(company) = validate_company(req.company.as_deref()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Field 'company' is required".into())),
        );
    };

    let request_id = Uuid::new_v4();
    info!(%request_id, company = %company, "Received profile request");

    // Section failures are handled inside the agent; assembly never errors.
    let answer = state.agent.company_profile(&company).await;

    info!(%request_id, "Profile assembled ({} chars)", answer.len());

    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "answer": answer,
        }))),
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(agent: Arc<ProfileAgent>) -> Router {
    let state = ApiState { agent };

    Router::new()
        .route("/health", axum::routing::get(health))
        .route("/query", post(query_profile))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    agent: Arc<ProfileAgent>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(agent);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_company() {
        assert_eq!(validate_company(Some("Acme")), Some("Acme".to_string()));
        assert_eq!(
            validate_company(Some("  Acme Corp  ")),
            Some("Acme Corp".to_string())
        );
        assert_eq!(validate_company(Some("   ")), None);
        assert_eq!(validate_company(Some("")), None);
        assert_eq!(validate_company(None), None);
    }
}
