//! 히스토리 로더.
//!
//! 저장소에 영속화된 전체 레코드를 날짜 오름차순으로 재구성합니다.
//! 탐지 단계는 이 중 마지막 두 건만 사용합니다.

use crate::error::Result;
use crate::storage::records::RecordStore;
use coinwatch_core::DailyRecord;

/// 저장된 전체 히스토리를 날짜 오름차순으로 로드합니다.
///
/// 저장소가 비어 있으면 빈 시퀀스를 반환합니다 (에러 아님).
pub fn load_history(store: &dyn RecordStore) -> Result<Vec<DailyRecord>> {
    store.list_all()
}
