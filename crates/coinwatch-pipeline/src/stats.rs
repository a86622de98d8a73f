//! 실행 통계 구조체.

use std::time::Duration;

/// 파이프라인 1회 실행 통계.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// 히스토리 레코드 수 (당일 포함)
    pub history_len: usize,
    /// 탐지된 이상 징후 수
    pub anomalies: usize,
    /// 요약 길이 (문자)
    pub summary_chars: usize,
    /// 리포트 크기 (바이트)
    pub report_bytes: usize,
    /// 알림 전송 성공 여부
    pub notified: bool,
    /// 소요 시간
    pub elapsed: Duration,
}

impl RunStats {
    /// 새 통계 객체 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 실행 요약 로그 출력.
    pub fn log_summary(&self, date: chrono::NaiveDate) {
        tracing::info!(
            date = %date,
            history = self.history_len,
            anomalies = self.anomalies,
            summary_chars = self.summary_chars,
            report_bytes = self.report_bytes,
            notified = self.notified,
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "파이프라인 실행 완료"
        );
    }
}
