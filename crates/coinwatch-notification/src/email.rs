//! 이메일 알림 전송.
//!
//! SMTP를 통해 일일 리포트를 전송합니다. 제목은 이상 징후 유무에 따라
//! 달라지며, 본문에는 요약, 이상 징후 목록(없으면 안정 문구), 레코드
//! 전문이 포함되고 HTML 리포트가 첨부됩니다.

use crate::types::{DailyReport, NotificationError, NotificationSender, Result};
use async_trait::async_trait;
use coinwatch_core::EmailConfig;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use tracing::{debug, info};

/// SMTP 기반 일일 리포트 전송기.
pub struct EmailSender {
    config: EmailConfig,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailSender {
    /// 설정에서 전송기를 생성합니다.
    ///
    /// 비활성화 상태에서는 SMTP 연결 정보 없이도 생성됩니다
    /// (`send_daily_report`가 전송을 건너뜀).
    pub fn new(config: EmailConfig) -> Result<Self> {
        if !config.enabled {
            let mailer =
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("localhost").build();
            return Ok(Self { config, mailer });
        }

        if config.smtp_host.is_empty() {
            return Err(NotificationError::Config(
                "smtp_host is not configured".to_string(),
            ));
        }

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| NotificationError::Config(e.to_string()))?
            .port(config.smtp_port);

        if let Some(password) = &config.password {
            builder = builder.credentials(Credentials::new(
                config.from.clone(),
                password.expose_secret().to_string(),
            ));
        }

        Ok(Self {
            mailer: builder.build(),
            config,
        })
    }

    /// 이상 징후 유무에 따라 제목을 만듭니다.
    fn format_subject(report: &DailyReport) -> String {
        let coin = capitalize(&report.record.coin);
        if report.has_anomalies() {
            format!(
                "🚨 {} Daily Report - Anomalies Detected ({})",
                coin, report.date
            )
        } else {
            format!("✅ {} Daily Report - No Anomalies ({})", coin, report.date)
        }
    }

    /// 본문 텍스트를 만듭니다.
    fn format_body(report: &DailyReport) -> String {
        let mut body = format!("DAILY {} REPORT - {}\n\n", report.record.coin.to_uppercase(), report.date);

        body.push_str("==============================\n");
        body.push_str("Summary\n");
        body.push_str("==============================\n");
        body.push_str(&report.summary);
        body.push_str("\n\n");

        body.push_str("==============================\n");
        body.push_str("Anomalies\n");
        body.push_str("==============================\n");

        if report.has_anomalies() {
            for anomaly in &report.anomalies {
                body.push_str(&format!(
                    "- Metric: {}\n  Today: {}\n  Yesterday: {}\n  Change: {}%\n  Note: {}\n\n",
                    anomaly.metric,
                    anomaly.today_value,
                    anomaly.yesterday_value,
                    anomaly.change_pct,
                    anomaly.note,
                ));
            }
        } else {
            body.push_str("No anomalies detected today. All metrics look stable.\n\n");
        }

        body.push_str("==============================\n");
        body.push_str("Record Snapshot\n");
        body.push_str("==============================\n");
        body.push_str(
            &serde_json::to_string_pretty(&report.record)
                .unwrap_or_else(|_| "(serialization failed)".to_string()),
        );

        body
    }

    fn build_message(&self, report: &DailyReport) -> Result<Message> {
        let attachment_name = format!("report_{}.html", report.date);

        Message::builder()
            .from(
                self.config
                    .from
                    .parse()
                    .map_err(|e| NotificationError::Message(format!("from address: {e}")))?,
            )
            .to(self
                .config
                .to
                .parse()
                .map_err(|e| NotificationError::Message(format!("to address: {e}")))?)
            .subject(Self::format_subject(report))
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(Self::format_body(report)))
                    .singlepart(
                        Attachment::new(attachment_name)
                            .body(report.report_html.clone(), ContentType::TEXT_HTML),
                    ),
            )
            .map_err(|e| NotificationError::Message(e.to_string()))
    }
}

#[async_trait]
impl NotificationSender for EmailSender {
    async fn send_daily_report(&self, report: &DailyReport) -> Result<()> {
        if !self.config.enabled {
            debug!("이메일 전송 비활성화 상태, 건너뜀");
            return Ok(());
        }

        let message = self.build_message(report)?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        info!(
            date = %report.date,
            to = %self.config.to,
            anomalies = report.anomalies.len(),
            "일일 리포트 이메일 전송 완료"
        );
        Ok(())
    }
}

/// 첫 글자만 대문자로 바꿉니다 ("bitcoin" → "Bitcoin").
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
