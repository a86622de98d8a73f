//! 일일 레코드 저장소.
//!
//! 하루에 하나씩 생성되는 `DailyRecord`를 날짜 키로 영속화합니다.
//! 저장 매체는 trait 뒤에 숨겨져 있어 오케스트레이션 로직을 건드리지 않고
//! 교체할 수 있습니다. 기본 구현은 날짜별 JSON 파일입니다.

use crate::error::Result;
use crate::storage::{read_optional, write_atomic};
use chrono::NaiveDate;
use coinwatch_core::DailyRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 레코드 저장소 인터페이스.
///
/// `put`은 날짜당 멱등입니다 (같은 날짜 재수집 시 덮어쓰기).
pub trait RecordStore: Send + Sync {
    /// 레코드를 저장합니다.
    fn put(&self, record: &DailyRecord) -> Result<()>;

    /// 날짜로 레코드를 조회합니다. 없으면 `None`.
    fn get(&self, date: NaiveDate) -> Result<Option<DailyRecord>>;

    /// 저장된 모든 레코드를 날짜 오름차순으로 반환합니다.
    fn list_all(&self) -> Result<Vec<DailyRecord>>;
}

/// 날짜별 JSON 파일 기반 레코드 저장소.
///
/// 파일 레이아웃: `<data_dir>/records/<coin>_<YYYY-MM-DD>.json`.
/// 프로세스 재시작 후에도 유지되며, 덜 쓰인 파일은 읽기 시 없는 것으로
/// 취급합니다 (쓰기는 임시 파일 + rename).
pub struct JsonRecordStore {
    records_dir: PathBuf,
    coin: String,
}

impl JsonRecordStore {
    /// 저장소를 생성하고 레코드 디렉터리를 준비합니다.
    pub fn new(data_dir: &Path, coin: impl Into<String>) -> Result<Self> {
        let records_dir = data_dir.join("records");
        fs::create_dir_all(&records_dir)?;

        Ok(Self {
            records_dir,
            coin: coin.into(),
        })
    }

    fn record_path(&self, date: NaiveDate) -> PathBuf {
        self.records_dir
            .join(format!("{}_{}.json", self.coin, date))
    }
}

impl RecordStore for JsonRecordStore {
    fn put(&self, record: &DailyRecord) -> Result<()> {
        let path = self.record_path(record.date);
        let contents = serde_json::to_vec_pretty(record)?;
        write_atomic(&path, &contents)?;

        debug!(date = %record.date, path = %path.display(), "레코드 저장 완료");
        Ok(())
    }

    fn get(&self, date: NaiveDate) -> Result<Option<DailyRecord>> {
        let path = self.record_path(date);
        let Some(contents) = read_optional(&path)? else {
            return Ok(None);
        };

        match serde_json::from_str(&contents) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                // 파싱 불가 파일은 없는 것으로 취급 (쓰다 만 파일 등)
                warn!(path = %path.display(), error = %err, "레코드 파싱 실패, 무시");
                Ok(None)
            }
        }
    }

    fn list_all(&self) -> Result<Vec<DailyRecord>> {
        let mut records = Vec::new();

        for entry in fs::read_dir(&self.records_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(contents) = read_optional(&path)? else {
                continue;
            };
            match serde_json::from_str::<DailyRecord>(&contents) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "레코드 파싱 실패, 건너뜀");
                }
            }
        }

        records.sort_by_key(|r| r.date);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample_record(d: u32, price: i64) -> DailyRecord {
        let mut record = DailyRecord::new(day(d), "bitcoin");
        record.price_usd = Some(rust_decimal::Decimal::from(price));
        record
    }

    #[test]
    fn test_put_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = JsonRecordStore::new(dir.path(), "bitcoin").unwrap();

        let record = sample_record(2, 60000);
        store.put(&record).unwrap();

        let loaded = store.get(day(2)).unwrap().unwrap();
        assert_eq!(loaded, record);
        assert!(store.get(day(3)).unwrap().is_none());
    }

    #[test]
    fn test_put_is_idempotent_per_date() {
        let dir = TempDir::new().unwrap();
        let store = JsonRecordStore::new(dir.path(), "bitcoin").unwrap();

        store.put(&sample_record(2, 60000)).unwrap();
        store.put(&sample_record(2, 61000)).unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].price_usd, Some(dec!(61000)));
    }

    #[test]
    fn test_list_all_is_date_ordered() {
        let dir = TempDir::new().unwrap();
        let store = JsonRecordStore::new(dir.path(), "bitcoin").unwrap();

        store.put(&sample_record(3, 3)).unwrap();
        store.put(&sample_record(1, 1)).unwrap();
        store.put(&sample_record(2, 2)).unwrap();

        let dates: Vec<NaiveDate> = store.list_all().unwrap().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let dir = TempDir::new().unwrap();
        let store = JsonRecordStore::new(dir.path(), "bitcoin").unwrap();

        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_torn_file_is_treated_as_absent() {
        let dir = TempDir::new().unwrap();
        let store = JsonRecordStore::new(dir.path(), "bitcoin").unwrap();

        store.put(&sample_record(1, 1)).unwrap();
        let torn = dir.path().join("records").join("bitcoin_2024-01-02.json");
        fs::write(&torn, "{\"date\": \"2024-01-02\", \"coin\"").unwrap();

        assert!(store.get(day(2)).unwrap().is_none());
        assert_eq!(store.list_all().unwrap().len(), 1);
    }
}
