//! imed のドメイン型とプロンプト・応答の純粋ロジック（I/O なし）

pub mod candidates;
pub mod conversion_input;
pub mod delimiter_token;
pub mod error;
pub mod prompt;
pub mod reply;
pub mod strategy;

pub use candidates::CandidateList;
pub use conversion_input::ConversionInput;
pub use delimiter_token::DelimiterToken;
pub use error::ConversionError;
pub use prompt::{FreeformPrompt, StructuredPrompt};
pub use reply::{extract_freeform, extract_structured};
pub use strategy::ConversionStrategy;
