//! 이상 징후 탐지.
//!
//! 가장 최근 두 개의 일일 레코드를 지표별로 비교하여, 전일 대비 변동률이
//! 임계값을 초과한 지표를 `Anomaly`로 보고합니다.
//!
//! # 동작 방식
//!
//! 1. 히스토리가 2건 미만이면 빈 결과를 반환 (운영 첫날/둘째 날의 정상 상태)
//! 2. 마지막 두 레코드를 `today` / `prev`로 선정
//! 3. 지표별로 `abs(today - prev) / prev`를 계산
//! 4. 변동률이 임계값을 **초과**하면 (`>`, 같으면 미발생) Anomaly 생성
//!
//! 전일 값이 없거나 0이면 해당 지표는 건너뜁니다. 탐지는 상태가 없는
//! 순수 함수이며 같은 입력에 대해 항상 같은 결과를 냅니다.

use crate::domain::record::DailyRecord;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// 탐지 대상 지표.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyMetric {
    /// 가격 (USD)
    Price,
    /// 24시간 거래량
    Volume,
    /// 시가총액
    MarketCap,
}

impl AnomalyMetric {
    /// 탐지 순서. 결과 Anomaly는 항상 이 순서로 정렬됩니다.
    pub const ALL: [AnomalyMetric; 3] = [
        AnomalyMetric::Price,
        AnomalyMetric::Volume,
        AnomalyMetric::MarketCap,
    ];

    /// 지표별 고정 설명 문구.
    pub fn note(&self) -> &'static str {
        match self {
            AnomalyMetric::Price => "Unusual price movement (>10%)",
            AnomalyMetric::Volume => "Abnormal volume change (>20%)",
            AnomalyMetric::MarketCap => "Unusual market cap change (>10%)",
        }
    }
}

impl std::fmt::Display for AnomalyMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Price => write!(f, "price"),
            Self::Volume => write!(f, "volume"),
            Self::MarketCap => write!(f, "market_cap"),
        }
    }
}

/// 탐지된 이상 징후.
///
/// 매 실행마다 새로 계산되어 당일 키로 저장되는 파생 데이터입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// 대상 지표
    pub metric: AnomalyMetric,
    /// 오늘 값
    pub today_value: Decimal,
    /// 전일 값
    pub yesterday_value: Decimal,
    /// 변동률 (%, 소수점 2자리 반올림)
    pub change_pct: Decimal,
    /// 설명 문구
    pub note: String,
}

/// 지표별 탐지 임계값 (비율).
///
/// 기본값: 가격 0.10, 거래량 0.20, 시가총액 0.10.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyThresholds {
    /// 가격 임계값
    pub price: Decimal,
    /// 거래량 임계값
    pub volume: Decimal,
    /// 시가총액 임계값
    pub market_cap: Decimal,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            price: dec!(0.10),
            volume: dec!(0.20),
            market_cap: dec!(0.10),
        }
    }
}

impl AnomalyThresholds {
    /// 지표에 해당하는 임계값을 반환합니다.
    pub fn threshold(&self, metric: AnomalyMetric) -> Decimal {
        match metric {
            AnomalyMetric::Price => self.price,
            AnomalyMetric::Volume => self.volume,
            AnomalyMetric::MarketCap => self.market_cap,
        }
    }
}

/// 기본 임계값으로 이상 징후를 탐지합니다.
pub fn detect(history: &[DailyRecord]) -> Vec<Anomaly> {
    detect_with(&AnomalyThresholds::default(), history)
}

/// 주어진 임계값으로 이상 징후를 탐지합니다.
///
/// 히스토리는 날짜 오름차순이어야 하며, 마지막 두 건만 비교합니다.
/// 2건 미만이면 빈 결과를 반환합니다 (에러 아님).
pub fn detect_with(thresholds: &AnomalyThresholds, history: &[DailyRecord]) -> Vec<Anomaly> {
    let [.., prev, today] = history else {
        return Vec::new();
    };

    let mut anomalies = Vec::new();

    for metric in AnomalyMetric::ALL {
        let Some(yesterday_value) = prev.metric(metric) else {
            continue;
        };
        if yesterday_value.is_zero() {
            // 0 대비 변동률은 의미가 없으므로 건너뜀
            continue;
        }
        let Some(today_value) = today.metric(metric) else {
            continue;
        };

        let change = (today_value - yesterday_value).abs() / yesterday_value;
        if change > thresholds.threshold(metric) {
            anomalies.push(Anomaly {
                metric,
                today_value,
                yesterday_value,
                change_pct: (change * Decimal::ONE_HUNDRED).round_dp(2),
                note: metric.note().to_string(),
            });
        }
    }

    anomalies
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn record(
        d: u32,
        price: Option<Decimal>,
        volume: Option<Decimal>,
        market_cap: Option<Decimal>,
    ) -> DailyRecord {
        DailyRecord {
            date: day(d),
            coin: "bitcoin".to_string(),
            price_usd: price,
            market_cap_usd: market_cap,
            volume_24h_usd: volume,
            price_change_pct_24h: None,
        }
    }

    #[test]
    fn test_empty_history_yields_nothing() {
        assert!(detect(&[]).is_empty());
    }

    #[test]
    fn test_single_record_yields_nothing() {
        let history = vec![record(1, Some(dec!(60000)), None, None)];
        assert!(detect(&history).is_empty());
    }

    #[test]
    fn test_price_anomaly_fires_above_threshold() {
        let history = vec![
            record(1, Some(dec!(100)), None, None),
            record(2, Some(dec!(115)), None, None),
        ];

        let anomalies = detect(&history);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].metric, AnomalyMetric::Price);
        assert_eq!(anomalies[0].today_value, dec!(115));
        assert_eq!(anomalies[0].yesterday_value, dec!(100));
        assert_eq!(anomalies[0].change_pct, dec!(15.00));
        assert_eq!(anomalies[0].note, "Unusual price movement (>10%)");
    }

    #[test]
    fn test_exact_threshold_does_not_fire() {
        // 변동률이 임계값과 정확히 같으면 (10%) 발생하지 않음 (규칙은 엄격한 초과)
        let history = vec![
            record(1, Some(dec!(100)), None, None),
            record(2, Some(dec!(110)), None, None),
        ];
        assert!(detect(&history).is_empty());

        let history = vec![
            record(1, Some(dec!(60000)), None, None),
            record(2, Some(dec!(54000)), None, None),
        ];
        assert!(detect(&history).is_empty());
    }

    #[test]
    fn test_below_threshold_does_not_fire() {
        let history = vec![
            record(1, Some(dec!(100)), None, None),
            record(2, Some(dec!(109)), None, None),
        ];
        assert!(detect(&history).is_empty());
    }

    #[test]
    fn test_price_drop_fires_with_rounded_change_pct() {
        let history = vec![
            record(1, Some(dec!(60000)), None, None),
            record(2, Some(dec!(53000)), None, None),
        ];

        let anomalies = detect(&history);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].today_value, dec!(53000));
        assert_eq!(anomalies[0].yesterday_value, dec!(60000));
        assert_eq!(anomalies[0].change_pct, dec!(11.67));
    }

    #[test]
    fn test_zero_yesterday_volume_never_fires() {
        let history = vec![
            record(1, None, Some(dec!(0)), None),
            record(2, None, Some(dec!(99999999)), None),
        ];
        assert!(detect(&history).is_empty());
    }

    #[test]
    fn test_missing_yesterday_value_skips_metric() {
        let history = vec![
            record(1, None, None, None),
            record(2, Some(dec!(100)), Some(dec!(100)), Some(dec!(100))),
        ];
        assert!(detect(&history).is_empty());
    }

    #[test]
    fn test_missing_today_value_skips_metric() {
        let history = vec![
            record(1, Some(dec!(100)), None, None),
            record(2, None, None, None),
        ];
        assert!(detect(&history).is_empty());
    }

    #[test]
    fn test_metric_ordering_when_multiple_fire() {
        let history = vec![
            record(1, Some(dec!(100)), Some(dec!(100)), Some(dec!(100))),
            record(2, Some(dec!(200)), Some(dec!(200)), Some(dec!(200))),
        ];

        let anomalies = detect(&history);
        let metrics: Vec<AnomalyMetric> = anomalies.iter().map(|a| a.metric).collect();
        assert_eq!(
            metrics,
            vec![
                AnomalyMetric::Price,
                AnomalyMetric::Volume,
                AnomalyMetric::MarketCap
            ]
        );
    }

    #[test]
    fn test_only_last_two_records_are_compared() {
        // 과거에 큰 변동이 있어도 마지막 두 건이 안정적이면 발생하지 않음
        let history = vec![
            record(1, Some(dec!(10)), None, None),
            record(2, Some(dec!(100)), None, None),
            record(3, Some(dec!(101)), None, None),
        ];
        assert!(detect(&history).is_empty());
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = AnomalyThresholds {
            price: dec!(0.01),
            ..Default::default()
        };
        let history = vec![
            record(1, Some(dec!(100)), None, None),
            record(2, Some(dec!(102)), None, None),
        ];

        let anomalies = detect_with(&thresholds, &history);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].change_pct, dec!(2.00));
    }

    proptest! {
        /// 길이가 2 미만인 모든 히스토리에 대해 탐지 결과는 항상 비어 있다.
        #[test]
        fn prop_short_history_yields_nothing(
            price in proptest::option::of(0u64..10_000_000),
            volume in proptest::option::of(0u64..u64::MAX / 2),
        ) {
            let single = vec![record(
                1,
                price.map(Decimal::from),
                volume.map(Decimal::from),
                None,
            )];
            prop_assert!(detect(&single).is_empty());
            prop_assert!(detect(&[]).is_empty());
        }
    }
}
