//! 変換対象のテキスト（空文字は受け付けない）

use crate::domain::ConversionError;

/// 1 回の変換要求の入力（非空の UTF-8 文字列）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionInput(String);

impl ConversionInput {
    /// 空文字なら `ConversionError::InputInvalid`。空白のみの入力はそのまま通す
    pub fn parse(s: impl Into<String>) -> Result<Self, ConversionError> {
        let s = s.into();
        if s.is_empty() {
            return Err(ConversionError::InputInvalid);
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for ConversionInput {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ConversionInput {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
