//! 일일 파이프라인 오케스트레이터.
//!
//! 단계를 엄격한 순서로 1회 실행합니다:
//!
//! 1. 수집 (원본 스냅샷, 날짜별 저장)
//! 2. 정규화 + 레코드 저장
//! 3. 히스토리 로드 (방금 저장한 레코드 포함)
//! 4. 이상 징후 탐지 + 날짜별 저장 (빈 집합 포함)
//! 5. 요약 생성 + 저장
//! 6. 리포트 렌더링 + 저장
//! 7. 이메일 알림
//!
//! 실패 정책은 `Stage::policy`의 명시적 테이블입니다. 치명 단계의 실패는
//! 나머지 단계를 중단하지만 이미 저장된 산출물은 롤백하지 않습니다.
//! 같은 날짜 재실행은 결정적 단계의 산출물을 동일하게 다시 만듭니다.

use crate::error::Result;
use crate::narrative::{NarrativeGenerator, OpenAiNarrativeGenerator};
use crate::report::{HtmlReportRenderer, ReportRenderer};
use crate::stats::RunStats;
use chrono::NaiveDate;
use coinwatch_core::{detect_with, AnomalyThresholds, AppConfig};
use coinwatch_data::{
    load_history, normalize, ArtifactStore, CoinGeckoProvider, JsonRecordStore, RecordStore,
    SnapshotProvider,
};
use coinwatch_notification::{DailyReport, EmailSender, NotificationSender};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// 파이프라인 단계.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// 원본 스냅샷 수집
    Fetch,
    /// 정규화 + 레코드 저장
    Normalize,
    /// 이상 징후 탐지
    Detect,
    /// 요약 생성
    Summarize,
    /// 리포트 렌더링
    Render,
    /// 알림 전송
    Notify,
}

/// 단계 실패 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// 실패 시 나머지 단계 중단
    Fatal,
    /// 실패를 기록하고 계속 진행
    BestEffort,
}

impl Stage {
    /// 단계별 실패 정책 테이블.
    ///
    /// 산출물이 이미 영속화된 뒤의 배포(알림)만 best-effort입니다.
    pub fn policy(self) -> FailurePolicy {
        match self {
            Stage::Notify => FailurePolicy::BestEffort,
            _ => FailurePolicy::Fatal,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Normalize => "normalize",
            Stage::Detect => "detect",
            Stage::Summarize => "summarize",
            Stage::Render => "render",
            Stage::Notify => "notify",
        };
        write!(f, "{name}")
    }
}

/// 일일 파이프라인.
///
/// 협력자는 모두 trait 객체로 주입되므로 테스트에서 대체 구현을 사용할 수
/// 있습니다.
pub struct DailyPipeline {
    store: Arc<dyn RecordStore>,
    artifacts: Arc<ArtifactStore>,
    provider: Arc<dyn SnapshotProvider>,
    narrative: Arc<dyn NarrativeGenerator>,
    renderer: Arc<dyn ReportRenderer>,
    notifier: Arc<dyn NotificationSender>,
    thresholds: AnomalyThresholds,
}

impl DailyPipeline {
    /// 주입된 협력자로 파이프라인을 구성합니다.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn RecordStore>,
        artifacts: Arc<ArtifactStore>,
        provider: Arc<dyn SnapshotProvider>,
        narrative: Arc<dyn NarrativeGenerator>,
        renderer: Arc<dyn ReportRenderer>,
        notifier: Arc<dyn NotificationSender>,
        thresholds: AnomalyThresholds,
    ) -> Self {
        Self {
            store,
            artifacts,
            provider,
            narrative,
            renderer,
            notifier,
            thresholds,
        }
    }

    /// 설정으로부터 실제 협력자를 구성합니다.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let coin = config.coingecko.coin.clone();
        let store = JsonRecordStore::new(&config.storage.data_dir, coin.clone())?;
        let artifacts = ArtifactStore::new(&config.storage.data_dir, coin)?;
        let provider = CoinGeckoProvider::new(&config.coingecko, &config.storage.log_dir)?;
        let narrative = OpenAiNarrativeGenerator::new(&config.narrative)?;
        let renderer = HtmlReportRenderer::new()?;
        let notifier = EmailSender::new(config.email.clone())?;

        Ok(Self::new(
            Arc::new(store),
            Arc::new(artifacts),
            Arc::new(provider),
            Arc::new(narrative),
            Arc::new(renderer),
            Arc::new(notifier),
            config.anomaly.clone(),
        ))
    }

    /// 주어진 날짜에 대해 파이프라인을 1회 실행합니다.
    pub async fn run(&self, date: NaiveDate) -> Result<RunStats> {
        let start = Instant::now();
        let mut stats = RunStats::new();

        info!(date = %date, "=== 일일 파이프라인 시작 ===");

        // 1. 수집 - 실패 시 아무것도 기록하지 않고 중단
        info!("Step 1/7: 원본 스냅샷 수집");
        let raw = self.provider.fetch().await?;
        self.artifacts.put_raw(date, &raw)?;

        // 2. 정규화 + 레코드 저장 (날짜당 멱등 덮어쓰기)
        info!("Step 2/7: 정규화 및 레코드 저장");
        let record = normalize(&raw, date)?;
        self.store.put(&record)?;

        // 3. 히스토리 로드
        info!("Step 3/7: 히스토리 로드");
        let history = load_history(self.store.as_ref())?;
        stats.history_len = history.len();

        // 4. 탐지 - 히스토리 2건 미만이면 빈 집합 (정상 상태)
        info!("Step 4/7: 이상 징후 탐지");
        let anomalies = detect_with(&self.thresholds, &history);
        self.artifacts.put_anomalies(date, &anomalies)?;
        stats.anomalies = anomalies.len();
        if anomalies.is_empty() {
            info!(date = %date, "이상 징후 없음");
        } else {
            warn!(date = %date, count = anomalies.len(), "이상 징후 탐지됨");
        }

        // 5. 요약 생성
        info!("Step 5/7: 요약 생성");
        let summary = self.narrative.generate(&record, &anomalies).await?;
        self.artifacts.put_summary(date, &summary)?;
        stats.summary_chars = summary.len();

        // 6. 리포트 렌더링
        info!("Step 6/7: 리포트 렌더링");
        let report_html = self.renderer.render(date, &record, &anomalies, &summary)?;
        self.artifacts.put_report(date, &report_html)?;
        stats.report_bytes = report_html.len();

        // 7. 알림 - 정책 테이블에 따라 처리 (산출물은 이미 보존됨)
        info!("Step 7/7: 알림 전송");
        let report = DailyReport {
            date,
            record,
            anomalies,
            summary,
            report_html,
        };
        match self.notifier.send_daily_report(&report).await {
            Ok(()) => stats.notified = true,
            Err(err) => match Stage::Notify.policy() {
                FailurePolicy::Fatal => return Err(err.into()),
                FailurePolicy::BestEffort => {
                    warn!(stage = %Stage::Notify, error = %err, "알림 전송 실패, 계속 진행");
                }
            },
        }

        stats.elapsed = start.elapsed();
        stats.log_summary(date);

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_notify_is_best_effort() {
        for stage in [
            Stage::Fetch,
            Stage::Normalize,
            Stage::Detect,
            Stage::Summarize,
            Stage::Render,
        ] {
            assert_eq!(stage.policy(), FailurePolicy::Fatal, "{stage}");
        }
        assert_eq!(Stage::Notify.policy(), FailurePolicy::BestEffort);
    }
}
