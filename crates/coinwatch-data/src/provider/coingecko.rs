//! CoinGecko 시장 데이터 제공자.
//!
//! `GET {base_url}/coins/{coin}`으로 당일 시장 스냅샷을 가져옵니다.
//! 모든 시도는 타임스탬프와 함께 append 전용 fetch 로그에 기록됩니다.
//!
//! 외부 호출에는 설정된 타임아웃이 적용되어 무한 대기를 방지합니다.

use crate::error::{DataError, Result};
use async_trait::async_trait;
use chrono::Utc;
use coinwatch_core::CoinGeckoConfig;
use reqwest::Client;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 일일 스냅샷 제공자 인터페이스.
///
/// 오케스트레이터는 이 trait에만 의존하므로 테스트에서 대체 구현을
/// 주입할 수 있습니다.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// 당일 원본 시장 스냅샷을 가져옵니다.
    async fn fetch(&self) -> Result<Value>;
}

/// CoinGecko `/coins/{id}` 기반 제공자.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    coin: String,
    fetch_log: PathBuf,
}

impl CoinGeckoProvider {
    /// 설정에서 제공자를 생성합니다.
    pub fn new(config: &CoinGeckoConfig, log_dir: &Path) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DataError::Config(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            coin: config.coin.clone(),
            fetch_log: log_dir.join("fetch.log"),
        })
    }

    /// fetch 로그에 한 줄을 추가합니다. 로그 실패가 수집을 막지는 않습니다.
    fn log_attempt(&self, message: &str) {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{timestamp}] {message}\n");

        if let Some(parent) = self.fetch_log.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(path = %self.fetch_log.display(), error = %err, "fetch 로그 디렉터리 생성 실패");
                return;
            }
        }

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.fetch_log)
            .and_then(|mut f| f.write_all(line.as_bytes()));

        if let Err(err) = result {
            warn!(path = %self.fetch_log.display(), error = %err, "fetch 로그 기록 실패");
        }
    }
}

#[async_trait]
impl SnapshotProvider for CoinGeckoProvider {
    async fn fetch(&self) -> Result<Value> {
        let url = format!("{}/coins/{}", self.base_url, self.coin);
        info!(coin = %self.coin, url = %url, "시장 스냅샷 수집 시작");

        let response = match self
            .client
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                self.log_attempt(&format!("ERROR: Failed to fetch data. {err}"));
                error!(coin = %self.coin, error = %err, "전송 오류");
                return Err(err.into());
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            self.log_attempt(&format!(
                "ERROR: Failed to fetch data. Status code: {status}"
            ));
            error!(coin = %self.coin, status = %status, "수집 실패");
            return Err(DataError::Fetch(format!(
                "CoinGecko returned status {status}"
            )));
        }

        let snapshot: Value = response.json().await?;
        self.log_attempt(&format!("SUCCESS: Fetched data for {}", self.coin));
        info!(coin = %self.coin, "시장 스냅샷 수집 완료");

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn provider_for(server: &mockito::Server, log_dir: &Path) -> CoinGeckoProvider {
        let config = CoinGeckoConfig {
            base_url: server.url(),
            coin: "bitcoin".to_string(),
            timeout_secs: 5,
        };
        CoinGeckoProvider::new(&config, log_dir).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success_returns_body_and_logs() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({"id": "bitcoin", "market_data": {}});
        let mock = server
            .mock("GET", "/coins/bitcoin")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let logs = TempDir::new().unwrap();
        let provider = provider_for(&server, logs.path());

        let snapshot = provider.fetch().await.unwrap();
        assert_eq!(snapshot["id"], "bitcoin");
        mock.assert_async().await;

        let log = fs::read_to_string(logs.path().join("fetch.log")).unwrap();
        assert!(log.contains("SUCCESS: Fetched data for bitcoin"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/coins/bitcoin")
            .with_status(429)
            .create_async()
            .await;

        let logs = TempDir::new().unwrap();
        let provider = provider_for(&server, logs.path());

        let err = provider.fetch().await.unwrap_err();
        assert!(matches!(err, DataError::Fetch(_)));

        let log = fs::read_to_string(logs.path().join("fetch.log")).unwrap();
        assert!(log.contains("ERROR: Failed to fetch data. Status code: 429"));
    }

    #[tokio::test]
    async fn test_log_is_append_only_across_attempts() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/coins/bitcoin")
            .with_status(500)
            .expect(2)
            .create_async()
            .await;

        let logs = TempDir::new().unwrap();
        let provider = provider_for(&server, logs.path());

        let _ = provider.fetch().await;
        let _ = provider.fetch().await;

        let log = fs::read_to_string(logs.path().join("fetch.log")).unwrap();
        assert_eq!(log.lines().count(), 2);
    }
}
