//! Standalone daily pipeline CLI.

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use coinwatch_core::{detect_with, AppConfig};
use coinwatch_data::{load_history, ArtifactStore, JsonRecordStore};
use coinwatch_pipeline::DailyPipeline;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "coinwatch-pipeline")]
#[command(about = "Coinwatch Daily Market Pipeline", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 설정 파일 경로
    #[arg(long, default_value = "config/default.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 일일 파이프라인 1회 실행 (수집 → 탐지 → 요약 → 리포트 → 알림)
    Run {
        /// 기준 날짜 (YYYY-MM-DD, 기본: 오늘 UTC)
        #[arg(long)]
        date: Option<String>,
    },

    /// 저장된 히스토리에서 이상 징후만 재계산
    Detect,

    /// 데몬 모드: 주기적으로 전체 파이프라인 실행
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("coinwatch_pipeline={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Coinwatch Daily Pipeline 시작");

    // 설정 로드
    let config = AppConfig::load(&cli.config)?;
    tracing::debug!(coin = %config.coingecko.coin, data_dir = %config.storage.data_dir.display(), "설정 로드 완료");

    match cli.command {
        Commands::Run { date } => {
            let date = parse_date(date.as_deref())?;
            let pipeline = DailyPipeline::from_config(&config)?;
            let stats = pipeline.run(date).await?;
            tracing::info!(anomalies = stats.anomalies, "실행 종료");
        }
        Commands::Detect => {
            let coin = config.coingecko.coin.clone();
            let store = JsonRecordStore::new(&config.storage.data_dir, coin.clone())?;
            let artifacts = ArtifactStore::new(&config.storage.data_dir, coin)?;

            let history = load_history(&store)?;
            match history.last() {
                Some(latest) => {
                    let anomalies = detect_with(&config.anomaly, &history);
                    artifacts.put_anomalies(latest.date, &anomalies)?;
                    tracing::info!(
                        date = %latest.date,
                        count = anomalies.len(),
                        "이상 징후 재계산 완료"
                    );
                }
                None => {
                    tracing::info!("저장된 레코드가 없습니다");
                }
            }
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );

            let pipeline = DailyPipeline::from_config(&config)?;

            let mut interval = tokio::time::interval(config.daemon.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        let date = Utc::now().date_naive();
                        match pipeline.run(date).await {
                            Ok(stats) => {
                                tracing::info!(date = %date, anomalies = stats.anomalies, "주기 실행 완료");
                            }
                            Err(e) => {
                                tracing::error!(date = %date, error = %e, "주기 실행 실패");
                            }
                        }
                    }
                }
            }
        }
    }

    tracing::info!("Coinwatch Daily Pipeline 종료");

    Ok(())
}

/// `--date` 인자를 파싱합니다. 없으면 오늘(UTC).
fn parse_date(arg: Option<&str>) -> Result<NaiveDate, coinwatch_core::CoreError> {
    match arg {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| coinwatch_core::CoreError::InvalidDate(format!("'{s}': {e}"))),
        None => Ok(Utc::now().date_naive()),
    }
}
