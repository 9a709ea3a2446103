//! 単発 LLM 完了の標準実装（LlmProvider に委譲し、使用量と生応答をログに残す）

use common::error::Error;
use common::llm::{CompletionRequest, LlmProvider, Message};
use common::ports::outbound::{Log, LogLevel, LogRecord};
use std::sync::Arc;

use crate::ports::outbound::LlmCompletion;

/// 標準の単発完了アダプタ
pub struct StdLlmCompletion {
    provider: Arc<dyn LlmProvider>,
    log: Arc<dyn Log>,
}

impl StdLlmCompletion {
    pub fn new(provider: Arc<dyn LlmProvider>, log: Arc<dyn Log>) -> Self {
        Self { provider, log }
    }

    fn run(&self, request: CompletionRequest) -> Result<String, Error> {
        let label = request.label();
        let completion = self.provider.complete(&request)?;
        if let Some(usage) = completion.usage {
            let _ = self.log.log(
                &LogRecord::new(
                    LogLevel::Info,
                    format!(
                        "[{}] Prompt tokens: {}, Completion tokens: {}",
                        label, usage.prompt_tokens, usage.completion_tokens
                    ),
                )
                .layer("adapter")
                .kind("usage")
                .field("provider", self.provider.name())
                .field("total_tokens", usage.total_tokens),
            );
        }
        let _ = self.log.log(
            &LogRecord::new(LogLevel::Debug, format!("[{}] backend reply", label))
                .layer("adapter")
                .kind("reply")
                .field("raw", completion.text.as_str()),
        );
        Ok(completion.text)
    }
}

impl LlmCompletion for StdLlmCompletion {
    fn complete_chat(&self, instruction: &str, request: &str) -> Result<String, Error> {
        self.run(CompletionRequest::Chat {
            messages: vec![Message::system(instruction), Message::user(request)],
        })
    }

    fn complete_text(&self, prompt: &str, max_tokens: u32) -> Result<String, Error> {
        self.run(CompletionRequest::Text {
            prompt: prompt.to_string(),
            max_tokens,
        })
    }
}
