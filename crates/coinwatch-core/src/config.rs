//! 설정 관리.
//!
//! 애플리케이션 설정을 정의하고 관리합니다. 설정 객체는 프로세스 시작 시
//! 한 번 구성되어 각 컴포넌트에 전달됩니다 (전역 조회 없음).
//!
//! 로드 순서: 기본값 → `config/default.toml` (있는 경우) → `COINWATCH__*`
//! 환경 변수 (구분자 `__`, 예: `COINWATCH__SERVER__PORT=8080`).

use crate::domain::AnomalyThresholds;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// 조회 API 서버 설정
    pub server: ServerConfig,
    /// 저장소 경로 설정
    pub storage: StorageConfig,
    /// CoinGecko 시장 데이터 설정
    pub coingecko: CoinGeckoConfig,
    /// 이상 징후 탐지 임계값
    pub anomaly: AnomalyThresholds,
    /// 내러티브(요약 생성) 설정
    pub narrative: NarrativeConfig,
    /// 이메일 알림 설정
    pub email: EmailConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 조회 API 서버 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// 저장소 경로 설정.
///
/// 레코드/원본/이상 징후/요약/리포트는 모두 `data_dir` 아래에
/// 날짜별 파일로 저장됩니다.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 데이터 루트 디렉터리
    pub data_dir: PathBuf,
    /// 로그 디렉터리 (fetch.log 등)
    pub log_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

/// CoinGecko 시장 데이터 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoinGeckoConfig {
    /// API 기본 URL
    pub base_url: String,
    /// 수집 대상 코인 ID
    pub coin: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            coin: "bitcoin".to_string(),
            timeout_secs: 30,
        }
    }
}

impl CoinGeckoConfig {
    /// 요청 타임아웃을 Duration으로 반환합니다.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 내러티브(요약 생성) 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// Chat Completions 호환 API 기본 URL
    pub base_url: String,
    /// 사용할 모델
    pub model: String,
    /// 응답 최대 토큰 수
    pub max_tokens: u32,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// API 키 (환경 변수 `COINWATCH__NARRATIVE__API_KEY`)
    pub api_key: Option<SecretString>,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 250,
            timeout_secs: 60,
            api_key: None,
        }
    }
}

impl NarrativeConfig {
    /// 요청 타임아웃을 Duration으로 반환합니다.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 이메일 알림 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// 전송 활성화 여부
    pub enabled: bool,
    /// 발신 주소
    pub from: String,
    /// 수신 주소
    pub to: String,
    /// SMTP 서버 호스트
    pub smtp_host: String,
    /// SMTP 포트
    pub smtp_port: u16,
    /// SMTP 비밀번호 (환경 변수 `COINWATCH__EMAIL__PASSWORD`)
    pub password: Option<SecretString>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            from: String::new(),
            to: String::new(),
            smtp_host: String::new(),
            smtp_port: 587,
            password: None,
        }
    }
}

/// 데몬 모드 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// 파이프라인 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 24 * 60,
        }
    }
}

impl DaemonConfig {
    /// 실행 주기를 Duration으로 반환합니다.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 출력 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값 + 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("COINWATCH")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> crate::error::Result<Self> {
        Self::load("config/default.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.coingecko.coin, "bitcoin");
        assert_eq!(config.coingecko.timeout(), Duration::from_secs(30));
        assert_eq!(config.anomaly.price, dec!(0.10));
        assert_eq!(config.anomaly.volume, dec!(0.20));
        assert_eq!(config.anomaly.market_cap, dec!(0.10));
        assert_eq!(config.daemon.interval_minutes, 1440);
        assert!(!config.email.enabled);
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [coingecko]
            coin = "ethereum"

            [anomaly]
            price = 0.05
            "#,
        )
        .unwrap();

        assert_eq!(parsed.coingecko.coin, "ethereum");
        assert_eq!(parsed.anomaly.price, dec!(0.05));
        // 지정하지 않은 섹션은 기본값 유지
        assert_eq!(parsed.anomaly.volume, dec!(0.20));
        assert_eq!(parsed.server.port, 5000);
    }
}
