//! LLMプロバイダの実装
//!
//! 補完リクエスト（chat / text）をバックエンドへ送り、応答テキストを取り出す。

pub mod openai;
pub mod provider;

pub use openai::{OpenAiOptions, OpenAiProvider};
pub use provider::{Completion, CompletionRequest, LlmProvider, Message, Usage};
