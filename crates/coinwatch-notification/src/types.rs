//! 알림 타입 및 trait 정의.

use async_trait::async_trait;
use chrono::NaiveDate;
use coinwatch_core::{Anomaly, DailyRecord};
use thiserror::Error;

/// 알림 전송 오류.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// 메시지 구성 실패 (주소/본문)
    #[error("Message build error: {0}")]
    Message(String),

    /// SMTP 전송 실패
    #[error("Transport error: {0}")]
    Transport(String),

    /// 설정 누락
    #[error("Notification config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, NotificationError>;

/// 하루치 파이프라인 산출물 묶음.
///
/// 알림 채널은 이 구조체만 입력으로 받습니다.
#[derive(Debug, Clone)]
pub struct DailyReport {
    /// 기준 날짜
    pub date: NaiveDate,
    /// 정규화된 레코드
    pub record: DailyRecord,
    /// 당일 이상 징후 집합 (비어 있을 수 있음)
    pub anomalies: Vec<Anomaly>,
    /// 내러티브 요약 텍스트
    pub summary: String,
    /// 렌더링된 HTML 리포트
    pub report_html: String,
}

impl DailyReport {
    /// 이상 징후가 하나라도 있는지 여부.
    pub fn has_anomalies(&self) -> bool {
        !self.anomalies.is_empty()
    }
}

/// 알림 전송기 인터페이스.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 일일 리포트를 전송합니다.
    async fn send_daily_report(&self, report: &DailyReport) -> Result<()>;
}
