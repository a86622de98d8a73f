//! 일일 시장 레코드 타입.
//!
//! 하루에 하나씩 생성되는 정규화된 시장 스냅샷을 정의합니다.
//! 날짜(`YYYY-MM-DD`)가 고유 키이며, 한 번 저장된 레코드는 수정하지 않습니다.

use crate::domain::anomaly::AnomalyMetric;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 하루 단위 정규화된 시장 스냅샷.
///
/// 원본 스냅샷에 없는 필드는 `None`으로 표현됩니다 (JSON 직렬화 시 `null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// 기준 날짜 (고유 키)
    pub date: NaiveDate,
    /// 코인 식별자 (예: "bitcoin")
    pub coin: String,
    /// 현재가 (USD)
    pub price_usd: Option<Decimal>,
    /// 시가총액 (USD)
    pub market_cap_usd: Option<Decimal>,
    /// 24시간 거래량 (USD)
    pub volume_24h_usd: Option<Decimal>,
    /// 24시간 가격 변동률 (%, 부호 있음)
    pub price_change_pct_24h: Option<Decimal>,
}

impl DailyRecord {
    /// 지표 값이 모두 비어 있는 새 레코드를 생성합니다.
    pub fn new(date: NaiveDate, coin: impl Into<String>) -> Self {
        Self {
            date,
            coin: coin.into(),
            price_usd: None,
            market_cap_usd: None,
            volume_24h_usd: None,
            price_change_pct_24h: None,
        }
    }

    /// 지표에 해당하는 값을 반환합니다.
    pub fn metric(&self, metric: AnomalyMetric) -> Option<Decimal> {
        match metric {
            AnomalyMetric::Price => self.price_usd,
            AnomalyMetric::Volume => self.volume_24h_usd,
            AnomalyMetric::MarketCap => self.market_cap_usd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_metric_accessor() {
        let mut record = DailyRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            "bitcoin",
        );
        record.price_usd = Some(dec!(60000));
        record.volume_24h_usd = Some(dec!(35000000000));

        assert_eq!(record.metric(AnomalyMetric::Price), Some(dec!(60000)));
        assert_eq!(
            record.metric(AnomalyMetric::Volume),
            Some(dec!(35000000000))
        );
        assert_eq!(record.metric(AnomalyMetric::MarketCap), None);
    }

    #[test]
    fn test_serde_round_trip_with_null_fields() {
        let mut record = DailyRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            "bitcoin",
        );
        record.price_usd = Some(dec!(60000.5));

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"2024-01-02\""));
        assert!(json.contains("\"volume_24h_usd\":null"));

        let parsed: DailyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
