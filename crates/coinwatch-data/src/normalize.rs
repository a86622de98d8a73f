//! 원본 스냅샷 정규화.
//!
//! CoinGecko `/coins/{id}` 응답에서 고정된 필드 집합만 추출하여
//! `DailyRecord`로 변환합니다. 선택 필드가 없으면 `None`으로 두며,
//! 입력이 JSON 객체가 아닌 경우에만 실패합니다 (계약 위반).

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use coinwatch_core::DailyRecord;
use rust_decimal::Decimal;
use serde_json::Value;

/// 원본 스냅샷을 주어진 기준 날짜의 레코드로 정규화합니다.
///
/// 부수 효과가 없으며, 같은 입력에 대해 항상 같은 레코드를 생성합니다.
pub fn normalize(raw: &Value, as_of: NaiveDate) -> Result<DailyRecord> {
    let obj = raw
        .as_object()
        .ok_or_else(|| DataError::InvalidData("snapshot is not a JSON object".to_string()))?;

    let market_data = obj.get("market_data");

    let coin = obj
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("bitcoin")
        .to_string();

    Ok(DailyRecord {
        date: as_of,
        coin,
        price_usd: decimal_at(market_data, &["current_price", "usd"]),
        market_cap_usd: decimal_at(market_data, &["market_cap", "usd"]),
        volume_24h_usd: decimal_at(market_data, &["total_volume", "usd"]),
        price_change_pct_24h: decimal_at(market_data, &["price_change_percentage_24h"]),
    })
}

/// 중첩 경로를 따라가 Decimal 값을 읽습니다. 경로가 없거나 숫자가 아니면 `None`.
fn decimal_at(value: Option<&Value>, path: &[&str]) -> Option<Decimal> {
    let mut current = value?;
    for key in path {
        current = current.get(key)?;
    }
    serde_json::from_value(current.clone()).ok()
}
