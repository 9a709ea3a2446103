//! Outbound ポート: ユースケースが外界を使うための trait

pub mod llm_completion;
pub mod token_generator;

pub use llm_completion::LlmCompletion;
pub use token_generator::TokenGenerator;
