//! HTML 리포트 렌더링.
//!
//! 당일 레코드, 이상 징후, 요약을 내장 템플릿으로 렌더링합니다.
//! 템플릿과 모델이 맞지 않으면 오케스트레이터에서 치명 오류로 처리됩니다.

use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use coinwatch_core::{Anomaly, DailyRecord};
use minijinja::{context, Environment};
use tracing::debug;

const REPORT_TEMPLATE: &str = include_str!("../templates/report.html");

/// 리포트 렌더러 인터페이스.
pub trait ReportRenderer: Send + Sync {
    /// 일일 리포트 문서를 렌더링합니다.
    fn render(
        &self,
        date: NaiveDate,
        record: &DailyRecord,
        anomalies: &[Anomaly],
        summary: &str,
    ) -> Result<String>;
}

/// 내장 템플릿 기반 HTML 렌더러.
pub struct HtmlReportRenderer {
    env: Environment<'static>,
}

impl HtmlReportRenderer {
    /// 템플릿을 로드하여 렌더러를 생성합니다.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("report.html", REPORT_TEMPLATE)
            .map_err(|e| PipelineError::Render(e.to_string()))?;

        Ok(Self { env })
    }
}

impl ReportRenderer for HtmlReportRenderer {
    fn render(
        &self,
        date: NaiveDate,
        record: &DailyRecord,
        anomalies: &[Anomaly],
        summary: &str,
    ) -> Result<String> {
        let template = self
            .env
            .get_template("report.html")
            .map_err(|e| PipelineError::Render(e.to_string()))?;

        let html = template
            .render(context! {
                date => date.to_string(),
                coin => record.coin,
                record => record,
                anomalies => anomalies,
                summary => summary,
            })
            .map_err(|e| PipelineError::Render(e.to_string()))?;

        debug!(date = %date, bytes = html.len(), "리포트 렌더링 완료");
        Ok(html)
    }
}
