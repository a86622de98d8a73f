//! 모든 핸들러에서 공유되는 애플리케이션 상태.

use coinwatch_core::AppConfig;
use coinwatch_data::{ArtifactStore, JsonRecordStore, RecordStore, Result};
use std::sync::Arc;

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다. 저장소는 trait 뒤에
/// 있어 파이프라인과 같은 파일 레이아웃을 읽지만 구현 교체가 가능합니다.
#[derive(Clone)]
pub struct AppState {
    /// 일일 레코드 저장소 (읽기 전용 사용)
    pub store: Arc<dyn RecordStore>,
    /// 요약/이상 징후 산출물 저장소 (읽기 전용 사용)
    pub artifacts: Arc<ArtifactStore>,
}

impl AppState {
    /// 주입된 저장소로 상태를 구성합니다.
    pub fn new(store: Arc<dyn RecordStore>, artifacts: Arc<ArtifactStore>) -> Self {
        Self { store, artifacts }
    }

    /// 설정에서 파일 기반 저장소를 구성합니다.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let coin = config.coingecko.coin.clone();
        let store = JsonRecordStore::new(&config.storage.data_dir, coin.clone())?;
        let artifacts = ArtifactStore::new(&config.storage.data_dir, coin)?;

        Ok(Self::new(Arc::new(store), Arc::new(artifacts)))
    }
}
