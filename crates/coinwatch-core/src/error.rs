//! 코어 에러 타입.
//!
//! 이 모듈은 설정 및 도메인 계층에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 코어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 잘못된 날짜 형식
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
