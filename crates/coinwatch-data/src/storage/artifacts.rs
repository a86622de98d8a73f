//! 일일 산출물 저장소.
//!
//! 파이프라인 각 단계의 산출물을 날짜 키로 영속화합니다:
//! - 원본 스냅샷: `<data_dir>/raw/<coin>_<date>.json`
//! - 이상 징후: `<data_dir>/anomalies/<coin>_<date>.json`
//! - 요약: `<data_dir>/summaries/<coin>_<date>.txt`
//! - 리포트: `<data_dir>/reports/<coin>_<date>.html`
//!
//! 이상 징후도 레코드처럼 날짜별로 분리 저장되어 전체 이력이 보존됩니다.
//! 같은 날짜에 대한 재생성은 덮어쓰기이며 에러가 아닙니다.

use crate::error::Result;
use crate::storage::{read_optional, write_atomic};
use chrono::NaiveDate;
use coinwatch_core::Anomaly;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 날짜별 산출물 저장소.
pub struct ArtifactStore {
    raw_dir: PathBuf,
    anomalies_dir: PathBuf,
    summaries_dir: PathBuf,
    reports_dir: PathBuf,
    coin: String,
}

impl ArtifactStore {
    /// 저장소를 생성하고 산출물 디렉터리를 준비합니다.
    pub fn new(data_dir: &Path, coin: impl Into<String>) -> Result<Self> {
        let store = Self {
            raw_dir: data_dir.join("raw"),
            anomalies_dir: data_dir.join("anomalies"),
            summaries_dir: data_dir.join("summaries"),
            reports_dir: data_dir.join("reports"),
            coin: coin.into(),
        };

        for dir in [
            &store.raw_dir,
            &store.anomalies_dir,
            &store.summaries_dir,
            &store.reports_dir,
        ] {
            fs::create_dir_all(dir)?;
        }

        Ok(store)
    }

    fn keyed(&self, dir: &Path, date: NaiveDate, ext: &str) -> PathBuf {
        dir.join(format!("{}_{}.{}", self.coin, date, ext))
    }

    /// 원본 스냅샷을 저장합니다.
    pub fn put_raw(&self, date: NaiveDate, raw: &Value) -> Result<()> {
        let path = self.keyed(&self.raw_dir, date, "json");
        write_atomic(&path, &serde_json::to_vec_pretty(raw)?)?;
        debug!(date = %date, path = %path.display(), "원본 스냅샷 저장 완료");
        Ok(())
    }

    /// 당일 이상 징후 집합을 저장합니다 (빈 집합 포함).
    pub fn put_anomalies(&self, date: NaiveDate, anomalies: &[Anomaly]) -> Result<()> {
        let path = self.keyed(&self.anomalies_dir, date, "json");
        write_atomic(&path, &serde_json::to_vec_pretty(anomalies)?)?;
        debug!(date = %date, count = anomalies.len(), "이상 징후 저장 완료");
        Ok(())
    }

    /// 날짜별 이상 징후 집합을 조회합니다. 없거나 파싱 불가면 `None`.
    pub fn get_anomalies(&self, date: NaiveDate) -> Result<Option<Vec<Anomaly>>> {
        let path = self.keyed(&self.anomalies_dir, date, "json");
        let Some(contents) = read_optional(&path)? else {
            return Ok(None);
        };

        match serde_json::from_str(&contents) {
            Ok(anomalies) => Ok(Some(anomalies)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "이상 징후 파싱 실패, 무시");
                Ok(None)
            }
        }
    }

    /// 요약 텍스트를 저장합니다.
    pub fn put_summary(&self, date: NaiveDate, summary: &str) -> Result<()> {
        let path = self.keyed(&self.summaries_dir, date, "txt");
        write_atomic(&path, summary.as_bytes())?;
        debug!(date = %date, chars = summary.len(), "요약 저장 완료");
        Ok(())
    }

    /// 날짜별 요약 텍스트를 조회합니다. 없으면 `None`.
    pub fn get_summary(&self, date: NaiveDate) -> Result<Option<String>> {
        read_optional(&self.keyed(&self.summaries_dir, date, "txt"))
    }

    /// 렌더링된 리포트를 저장하고 경로를 반환합니다.
    pub fn put_report(&self, date: NaiveDate, html: &str) -> Result<PathBuf> {
        let path = self.keyed(&self.reports_dir, date, "html");
        write_atomic(&path, html.as_bytes())?;
        debug!(date = %date, bytes = html.len(), "리포트 저장 완료");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinwatch_core::AnomalyMetric;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample_anomaly() -> Anomaly {
        Anomaly {
            metric: AnomalyMetric::Price,
            today_value: dec!(53000),
            yesterday_value: dec!(60000),
            change_pct: dec!(11.67),
            note: AnomalyMetric::Price.note().to_string(),
        }
    }

    #[test]
    fn test_anomalies_round_trip_keyed_by_date() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path(), "bitcoin").unwrap();

        store.put_anomalies(day(2), &[sample_anomaly()]).unwrap();
        store.put_anomalies(day(3), &[]).unwrap();

        let loaded = store.get_anomalies(day(2)).unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].metric, AnomalyMetric::Price);
        assert_eq!(loaded[0].change_pct, dec!(11.67));

        // 다른 날짜의 집합은 독립적으로 보존됨
        assert!(store.get_anomalies(day(3)).unwrap().unwrap().is_empty());
        assert!(store.get_anomalies(day(4)).unwrap().is_none());
    }

    #[test]
    fn test_summary_round_trip_and_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path(), "bitcoin").unwrap();

        store.put_summary(day(2), "first").unwrap();
        store.put_summary(day(2), "second").unwrap();

        assert_eq!(store.get_summary(day(2)).unwrap().unwrap(), "second");
        assert!(store.get_summary(day(3)).unwrap().is_none());
    }

    #[test]
    fn test_raw_and_report_files_are_date_keyed() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path(), "bitcoin").unwrap();

        store.put_raw(day(2), &json!({"id": "bitcoin"})).unwrap();
        let report_path = store.put_report(day(2), "<html></html>").unwrap();

        assert!(dir.path().join("raw/bitcoin_2024-01-02.json").exists());
        assert_eq!(
            report_path,
            dir.path().join("reports/bitcoin_2024-01-02.html")
        );
        assert!(report_path.exists());
    }
}
