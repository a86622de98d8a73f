//! 내러티브 요약 생성.
//!
//! Chat Completions 호환 API로 당일 레코드와 이상 징후를 설명하는
//! 자연어 요약을 생성합니다. 쿼터/네트워크 실패는 오케스트레이터에서
//! 파이프라인 치명 오류로 처리됩니다.

use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use coinwatch_core::{Anomaly, DailyRecord, NarrativeConfig};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// 요약 생성기 인터페이스.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// 레코드와 이상 징후로부터 요약 텍스트를 생성합니다.
    async fn generate(&self, record: &DailyRecord, anomalies: &[Anomaly]) -> Result<String>;
}

/// OpenAI Chat Completions 기반 요약 생성기.
pub struct OpenAiNarrativeGenerator {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    api_key: SecretString,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl OpenAiNarrativeGenerator {
    /// 설정에서 생성기를 만듭니다. API 키가 없으면 설정 오류입니다.
    pub fn new(config: &NarrativeConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| PipelineError::Config("narrative.api_key is not set".to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| PipelineError::Config(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_key,
        })
    }
}

/// 요약 프롬프트를 구성합니다.
fn build_prompt(record: &DailyRecord, anomalies: &[Anomaly]) -> String {
    let record_json =
        serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string());
    let anomalies_json =
        serde_json::to_string_pretty(anomalies).unwrap_or_else(|_| "[]".to_string());

    format!(
        "You are a data analyst. Analyze the following cryptocurrency daily metrics \
         and write a short, clear summary.\n\n\
         === Today's Data ===\n{record_json}\n\n\
         === Detected Anomalies ===\n{anomalies_json}\n\n\
         Write a concise 4-8 sentence summary explaining:\n\
         - The overall price trend today\n\
         - How today's metrics compare to normal days\n\
         - Any anomalies and potential reasons\n\
         - Whether the market appears bullish, bearish, or neutral"
    )
}

#[async_trait]
impl NarrativeGenerator for OpenAiNarrativeGenerator {
    async fn generate(&self, record: &DailyRecord, anomalies: &[Anomaly]) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_prompt(record, anomalies),
            }],
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, date = %record.date, "요약 생성 요청");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Narrative(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Narrative(format!(
                "API returned status {}",
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Narrative(e.to_string()))?;

        let summary = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PipelineError::Narrative("response has no choices".to_string()))?;

        info!(date = %record.date, chars = summary.len(), "요약 생성 완료");
        Ok(summary)
    }
}
