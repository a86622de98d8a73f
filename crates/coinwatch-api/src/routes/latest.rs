//! 최신 산출물 조회 endpoint.
//!
//! 가장 최근 완료된 파이프라인 실행의 레코드, 요약, 이상 징후를 하나의
//! 응답으로 합쳐 반환합니다. 저장소가 비어 있으면 404를 반환합니다
//! (크래시 아님).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use coinwatch_core::Anomaly;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::ApiErrorResponse;
use crate::state::AppState;

/// 요약이 아직 생성되지 않은 날짜의 대체 문구.
const SUMMARY_PENDING: &str = "Summary not generated yet.";

/// 최신 산출물 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct LatestResponse {
    /// 기준 날짜
    pub date: NaiveDate,
    /// 코인 식별자
    pub coin: String,
    /// 현재가 (USD)
    pub price_usd: Option<Decimal>,
    /// 시가총액 (USD)
    pub market_cap_usd: Option<Decimal>,
    /// 24시간 거래량 (USD)
    pub volume_24h_usd: Option<Decimal>,
    /// 24시간 가격 변동률 (%)
    pub price_change_pct_24h: Option<Decimal>,
    /// 내러티브 요약
    pub summary: String,
    /// 당일 이상 징후 집합
    pub anomalies: Vec<Anomaly>,
}

/// 최신 레코드 + 요약 + 이상 징후 조회.
///
/// GET /api/v1/latest
pub async fn latest(State(state): State<AppState>) -> Response {
    let records = match state.store.list_all() {
        Ok(records) => records,
        Err(err) => {
            error!(error = %err, "레코드 목록 조회 실패");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiErrorResponse::store_error(err.to_string())),
            )
                .into_response();
        }
    };

    let Some(record) = records.into_iter().next_back() else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiErrorResponse::not_found("No market data available")),
        )
            .into_response();
    };

    // 요약/이상 징후가 아직 없으면 기본값으로 응답 (파이프라인 실행 중일 수 있음)
    let summary = state
        .artifacts
        .get_summary(record.date)
        .unwrap_or_default()
        .unwrap_or_else(|| SUMMARY_PENDING.to_string());

    let anomalies = state
        .artifacts
        .get_anomalies(record.date)
        .unwrap_or_default()
        .unwrap_or_default();

    let response = LatestResponse {
        date: record.date,
        coin: record.coin,
        price_usd: record.price_usd,
        market_cap_usd: record.market_cap_usd,
        volume_24h_usd: record.volume_24h_usd,
        price_change_pct_24h: record.price_change_pct_24h,
        summary,
        anomalies,
    };

    (StatusCode::OK, Json(response)).into_response()
}
