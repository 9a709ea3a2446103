//! リクエストの検証・ルーティング・JSON エンベロープ
//!
//! 失敗時の本文は種別ごとの固定文言だけを返し、内部の詳細はログにのみ残す。

use common::ports::outbound::{Log, LogLevel, LogRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::{ConversionError, ConversionStrategy};
use crate::ports::inbound::ConvertText;

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// 受信する JSON（message が無い・null のときは空文字として扱う）
#[derive(Debug, Deserialize)]
struct ConvertRequest {
    #[serde(default)]
    message: Option<String>,
}

/// 返す JSON。成功時は error_message が空、失敗時は candidates が null
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub candidates: Option<Vec<String>>,
    pub error_message: String,
}

/// ハンドラの結果（tiny_http の Response に詰め替える前の形）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpReply {
    fn json(status: u16, response: &ConvertResponse) -> Self {
        let body = serde_json::to_string(response).unwrap_or_else(|_| "{}".to_string());
        Self {
            status,
            content_type: JSON_CONTENT_TYPE,
            body,
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: TEXT_CONTENT_TYPE,
            body: body.to_string(),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(
            status,
            &ConvertResponse {
                candidates: None,
                error_message: message.to_string(),
            },
        )
    }
}

/// URL のパス部分から行き先を決める（クエリ文字列は無視）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Convert(ConversionStrategy),
    Healthcheck,
    NotFound,
}

pub fn resolve_route(url: &str) -> Route {
    let path = url.split('?').next().unwrap_or(url);
    match path {
        "/chat" => Route::Convert(ConversionStrategy::Structured),
        "/text" => Route::Convert(ConversionStrategy::Freeform),
        "/healthcheck" => Route::Healthcheck,
        _ => Route::NotFound,
    }
}

/// メディアタイプが application/json か（charset 等のパラメータは許す）
pub fn is_json_content_type(value: Option<&str>) -> bool {
    value
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
        .unwrap_or(false)
}

/// 変換 API のハンドラ
pub struct RequestHandler {
    convert: Arc<dyn ConvertText>,
    log: Arc<dyn Log>,
}

impl RequestHandler {
    pub fn new(convert: Arc<dyn ConvertText>, log: Arc<dyn Log>) -> Self {
        Self { convert, log }
    }

    pub fn handle(
        &self,
        method: &str,
        url: &str,
        content_type: Option<&str>,
        body: &[u8],
    ) -> HttpReply {
        match resolve_route(url) {
            Route::Healthcheck => HttpReply::text(200, "ok"),
            Route::NotFound => self.reject(404, "not found", url),
            Route::Convert(strategy) => self.handle_convert(strategy, method, content_type, body),
        }
    }

    fn handle_convert(
        &self,
        strategy: ConversionStrategy,
        method: &str,
        content_type: Option<&str>,
        body: &[u8],
    ) -> HttpReply {
        if method != "POST" {
            return self.reject(405, "method not allowed", method);
        }
        if !is_json_content_type(content_type) {
            return self.reject(400, "unsupported Content-Type", content_type.unwrap_or(""));
        }
        let message = match serde_json::from_slice::<ConvertRequest>(body) {
            Ok(r) => r.message.unwrap_or_default(),
            Err(e) => return self.reject(400, "invalid request", &e.to_string()),
        };
        if message.is_empty() {
            return self.reject(400, "message should not be empty", "");
        }

        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, "Received message")
                .layer("http")
                .kind("request")
                .field("strategy", strategy.as_str())
                .field("message", message.as_str()),
        );

        match self.convert.convert(strategy, &message) {
            Ok(candidates) => {
                let candidates = candidates.into_vec();
                let _ = self.log.log(
                    &LogRecord::new(LogLevel::Info, "Converted message")
                        .layer("http")
                        .kind("response")
                        .field("strategy", strategy.as_str())
                        .field("candidates", candidates.clone()),
                );
                HttpReply::json(
                    200,
                    &ConvertResponse {
                        candidates: Some(candidates),
                        error_message: String::new(),
                    },
                )
            }
            Err(ConversionError::InputInvalid) => {
                self.reject(400, "message should not be empty", "")
            }
            Err(e) => {
                let _ = self.log.log(
                    &LogRecord::new(LogLevel::Error, format!("conversion failed: {}", e))
                        .layer("http")
                        .kind(e.kind())
                        .field("strategy", strategy.as_str()),
                );
                HttpReply::error(500, "internal server error")
            }
        }
    }

    fn reject(&self, status: u16, message: &str, detail: &str) -> HttpReply {
        let _ = self.log.log(
            &LogRecord::new(LogLevel::Warn, format!("request rejected: {}", message))
                .layer("http")
                .kind("request")
                .field("status", status)
                .field("detail", detail),
        );
        HttpReply::error(status, message)
    }
}
