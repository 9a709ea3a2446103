//! OpenAI API プロバイダ（/chat/completions と /completions）
//!
//! base_url で OpenAI 互換の任意エンドポイントを指定可能。ブロッキング送信・リトライなし。

use crate::domain::ModelName;
use crate::error::Error;
use crate::llm::provider::{Completion, CompletionRequest, LlmProvider, Usage};
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAiProvider の生成オプション
#[derive(Debug, Clone)]
pub struct OpenAiOptions {
    pub base_url: String,
    pub api_key: String,
    /// Chat リクエストに使うモデル
    pub chat_model: ModelName,
    /// Text リクエストに使うモデル
    pub text_model: ModelName,
    /// None のときペイロードに含めない（バックエンドのデフォルト）
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

/// OpenAI API プロバイダ
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    chat_model: ModelName,
    text_model: ModelName,
    temperature: Option<f32>,
    client: reqwest::blocking::Client,
}

impl OpenAiProvider {
    /// 新しいプロバイダを作成
    ///
    /// HTTP クライアントの構築に失敗した場合は `Error::Http`。
    pub fn new(options: OpenAiOptions) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: options.base_url.trim_end_matches('/').to_string(),
            api_key: options.api_key,
            chat_model: options.chat_model,
            text_model: options.text_model,
            temperature: options.temperature,
            client,
        })
    }

    fn url(&self, request: &CompletionRequest) -> String {
        match request {
            CompletionRequest::Chat { .. } => format!("{}/chat/completions", self.base_url),
            CompletionRequest::Text { .. } => format!("{}/completions", self.base_url),
        }
    }
}

/// エラーレスポンス本文から error.message を取り出す（無ければ本文そのまま）
fn error_message_from_body(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body))
}

impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn make_request_payload(&self, request: &CompletionRequest) -> Result<Value, Error> {
        let mut payload = match request {
            CompletionRequest::Chat { messages } => {
                let messages: Vec<Value> = messages
                    .iter()
                    .map(|m| json!({ "role": m.role, "content": m.content }))
                    .collect();
                json!({
                    "model": self.chat_model.as_str(),
                    "messages": messages,
                })
            }
            CompletionRequest::Text { prompt, max_tokens } => json!({
                "model": self.text_model.as_str(),
                "prompt": prompt,
                "max_tokens": max_tokens,
            }),
        };
        if let Some(t) = self.temperature {
            payload["temperature"] = json!(t);
        }
        Ok(payload)
    }

    fn make_http_request(
        &self,
        request: &CompletionRequest,
        request_json: &str,
    ) -> Result<String, Error> {
        let response = self
            .client
            .post(self.url(request))
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .body(request_json.to_string())
            .send()
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let error_msg = error_message_from_body(status, &response_text);
            return Err(Error::http(format!(
                "OpenAI API error (status {}): {}",
                status.as_u16(),
                error_msg
            )));
        }

        Ok(response_text)
    }

    fn parse_response(
        &self,
        request: &CompletionRequest,
        response_json: &str,
    ) -> Result<Completion, Error> {
        let v: Value = serde_json::from_str(response_json)
            .map_err(|e| Error::json(format!("Failed to parse response JSON: {}", e)))?;

        if let Some(err) = v.get("error").filter(|e| !e.is_null()) {
            let msg = err["message"].as_str().unwrap_or("Unknown error");
            return Err(Error::http(format!("OpenAI API error: {}", msg)));
        }

        let choice = v["choices"]
            .get(0)
            .ok_or_else(|| Error::json("Response has no choices"))?;
        let text = match request {
            CompletionRequest::Chat { .. } => choice["message"]["content"].as_str(),
            CompletionRequest::Text { .. } => choice["text"].as_str(),
        }
        .ok_or_else(|| Error::json("Response choice has no text content"))?;

        let usage = v
            .get("usage")
            .and_then(|u| serde_json::from_value::<Usage>(u.clone()).ok());

        Ok(Completion {
            text: text.to_string(),
            usage,
        })
    }
}
