//! かな漢字変換ユースケース
//!
//! 入力検証 → プロンプト生成 → バックエンド呼び出し（1 回、リトライなし）→ 応答解析。
//! 失敗の詳細はここでログに残し、呼び出し側には ConversionError の種別だけを返す。

use common::ports::outbound::{Log, LogLevel, LogRecord};
use std::sync::Arc;

use crate::domain::{
    extract_freeform, extract_structured, CandidateList, ConversionError, ConversionInput,
    ConversionStrategy, FreeformPrompt, StructuredPrompt,
};
use crate::ports::inbound::ConvertText;
use crate::ports::outbound::{LlmCompletion, TokenGenerator};

/// freeform 経路の既定の最大出力トークン数
pub const DEFAULT_MAX_TOKENS: u32 = 128;

pub struct ConvertDeps {
    pub token_generator: Arc<dyn TokenGenerator>,
    pub llm: Arc<dyn LlmCompletion>,
    pub log: Arc<dyn Log>,
    pub max_tokens: u32,
}

/// 変換ユースケース（リクエスト間で可変状態を持たない）
pub struct ConvertUseCase {
    deps: ConvertDeps,
}

impl ConvertUseCase {
    pub fn new(deps: ConvertDeps) -> Self {
        Self { deps }
    }

    fn convert_structured(
        &self,
        input: &ConversionInput,
    ) -> Result<CandidateList, ConversionError> {
        let prompt = StructuredPrompt::build(input, self.deps.token_generator.generate());
        let raw = self
            .deps
            .llm
            .complete_chat(prompt.instruction(), prompt.request())
            .map_err(|e| self.backend_failed(ConversionStrategy::Structured, e))?;
        extract_structured(&raw, prompt.token()).map_err(|e| {
            if let ConversionError::MalformedReply { reason, raw } = &e {
                let _ = self.deps.log.log(
                    &LogRecord::new(LogLevel::Error, format!("invalid response: {}", reason))
                        .layer("usecase")
                        .kind("error")
                        .field("strategy", ConversionStrategy::Structured.as_str())
                        .field("token", prompt.token().as_str())
                        .field("raw", raw.as_str()),
                );
            }
            e
        })
    }

    fn convert_freeform(&self, input: &ConversionInput) -> Result<CandidateList, ConversionError> {
        let prompt = FreeformPrompt::build(input);
        let raw = self
            .deps
            .llm
            .complete_text(prompt.as_str(), self.deps.max_tokens)
            .map_err(|e| self.backend_failed(ConversionStrategy::Freeform, e))?;
        Ok(extract_freeform(&raw))
    }

    fn backend_failed(
        &self,
        strategy: ConversionStrategy,
        err: common::error::Error,
    ) -> ConversionError {
        let _ = self.deps.log.log(
            &LogRecord::new(LogLevel::Error, format!("Failed in calling completion API: {}", err))
                .layer("usecase")
                .kind("error")
                .field("strategy", strategy.as_str()),
        );
        ConversionError::BackendUnavailable(err)
    }
}

impl ConvertText for ConvertUseCase {
    fn convert(
        &self,
        strategy: ConversionStrategy,
        message: &str,
    ) -> Result<CandidateList, ConversionError> {
        let input = ConversionInput::parse(message)?;
        match strategy {
            ConversionStrategy::Structured => self.convert_structured(&input),
            ConversionStrategy::Freeform => self.convert_freeform(&input),
        }
    }
}
