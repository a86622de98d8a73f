//! Read-only query API server.

use coinwatch_api::{api_router, AppState};
use coinwatch_core::{init_logging, AppConfig, LogConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 설정 로드 (기본값 + config/default.toml + COINWATCH__* 환경 변수)
    let config = AppConfig::load_default()?;

    // 로깅 초기화
    init_logging(&LogConfig::from_app_config(&config.logging))
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    tracing::info!("Coinwatch Query API 시작");

    let state = AppState::from_config(&config)?;
    let app = api_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "서버 리스닝 시작");

    axum::serve(listener, app).await?;

    Ok(())
}
