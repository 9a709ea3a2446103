//! LLMプロバイダのトレイト定義

use crate::error::Error;
use serde::Deserialize;
use serde_json::Value;

/// メッセージ構造体（chat 形式の 1 ロール分）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// 1 回の補完リクエスト
///
/// * `Chat` - ロール付きメッセージ列（/chat/completions）
/// * `Text` - 単一プロンプト文字列と最大出力長（/completions）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionRequest {
    Chat { messages: Vec<Message> },
    Text { prompt: String, max_tokens: u32 },
}

impl CompletionRequest {
    /// ログ用の短い種別名
    pub fn label(&self) -> &'static str {
        match self {
            Self::Chat { .. } => "chat",
            Self::Text { .. } => "text",
        }
    }
}

/// バックエンドが報告するトークン使用量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// 補完結果（生テキストと使用量）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<Usage>,
}

/// LLMプロバイダのトレイト
///
/// ペイロード生成・HTTP 送信・応答解析を分けて実装し、`complete` がそれらを順に呼ぶ。
pub trait LlmProvider: Send + Sync {
    /// プロバイダ名を返す
    fn name(&self) -> &str;

    /// リクエストペイロードを生成
    ///
    /// # Returns
    /// * `Ok(Value)` - リクエストJSON
    /// * `Err(Error)` - 生成できない場合
    fn make_request_payload(&self, request: &CompletionRequest) -> Result<Value, Error>;

    /// HTTPリクエストを実行してレスポンスを取得
    ///
    /// # Arguments
    /// * `request` - 送信先エンドポイントの判定に使う
    /// * `request_json` - リクエストJSON文字列
    ///
    /// # Returns
    /// * `Ok(String)` - レスポンスJSON文字列（2xx のみ）
    /// * `Err(Error)` - 通信失敗・非 2xx
    fn make_http_request(
        &self,
        request: &CompletionRequest,
        request_json: &str,
    ) -> Result<String, Error>;

    /// レスポンスから補完テキストと使用量を抽出
    fn parse_response(
        &self,
        request: &CompletionRequest,
        response_json: &str,
    ) -> Result<Completion, Error>;

    /// 1 回の補完を実行する（リトライしない）
    fn complete(&self, request: &CompletionRequest) -> Result<Completion, Error> {
        let payload = self.make_request_payload(request)?;
        let request_json = serde_json::to_string(&payload)
            .map_err(|e| Error::json(format!("Failed to serialize request: {}", e)))?;
        let response_json = self.make_http_request(request, &request_json)?;
        self.parse_response(request, &response_json)
    }
}
