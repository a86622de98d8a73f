//! 파이프라인 에러 타입.

use thiserror::Error;

/// 파이프라인 실행 오류.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 데이터 수집/저장 오류
    #[error(transparent)]
    Data(#[from] coinwatch_data::DataError),

    /// 요약 생성 실패
    #[error("Narrative generation failed: {0}")]
    Narrative(String),

    /// 리포트 렌더링 실패
    #[error("Report rendering failed: {0}")]
    Render(String),

    /// 알림 전송 실패
    #[error(transparent)]
    Notification(#[from] coinwatch_notification::NotificationError),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
