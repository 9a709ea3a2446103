//! imed 固有のアダプター（outbound ポートの標準実装とテスト用スタブ）

pub mod llm_completion;
pub mod rand_token_generator;
pub mod stub_llm;

pub use llm_completion::StdLlmCompletion;
pub use rand_token_generator::RandTokenGenerator;

#[cfg(test)]
pub use stub_llm::{FixedTokenGenerator, MemoryLog, StubLlmCompletion};
