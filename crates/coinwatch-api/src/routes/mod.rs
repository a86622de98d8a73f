//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/latest` - 가장 최근 레코드 + 요약 + 이상 징후

pub mod health;
pub mod latest;

use crate::state::AppState;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use health::{health_check, health_ready, HealthResponse};
pub use latest::{latest, LatestResponse};

/// 전체 API 라우터를 구성합니다.
///
/// 원래 대시보드가 브라우저에서 직접 호출하므로 CORS는 전체 허용입니다.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(health_ready))
        .route("/api/v1/latest", get(latest))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
