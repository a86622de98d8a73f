//! 일일 리포트 알림 전송.
//!
//! 파이프라인 산출물(레코드, 이상 징후, 요약, 리포트)을 이메일로
//! 배포합니다. 전송 실패는 파이프라인을 중단시키지 않습니다 (산출물은
//! 이미 영속화되어 조회 API로 제공됨).

pub mod email;
pub mod types;

pub use email::EmailSender;
pub use types::{DailyReport, NotificationError, NotificationSender, Result};
