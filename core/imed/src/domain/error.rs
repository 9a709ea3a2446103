//! 変換処理の失敗（呼び出し側へは種別だけを見せ、詳細はログに残す）

use common::error::Error;

/// 変換エラー（ドメイン層）
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// 入力テキストが空。プロンプト生成前に弾く
    #[error("message should not be empty")]
    InputInvalid,
    /// 通信失敗・非 2xx・応答エンベロープ不正
    #[error("completion failed: {0}")]
    BackendUnavailable(#[source] Error),
    /// 応答が区切りトークン / JSON の約束を満たさない（structured 経路のみ）
    #[error("malformed reply: {reason}")]
    MalformedReply { reason: String, raw: String },
}

impl ConversionError {
    pub fn malformed(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::MalformedReply {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// ログ用の種別名
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputInvalid => "input_invalid",
            Self::BackendUnavailable(_) => "backend_unavailable",
            Self::MalformedReply { .. } => "malformed_reply",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_backend_error_keeps_source() {
        let err = ConversionError::BackendUnavailable(Error::http("HTTP 500"));
        assert_eq!(err.to_string(), "completion failed: HTTP 500");
        assert!(err.source().is_some());
        assert_eq!(err.kind(), "backend_unavailable");
    }

    #[test]
    fn test_malformed_display_hides_raw() {
        let err = ConversionError::malformed("missing trailing delimiter", "secret raw");
        assert_eq!(err.to_string(), "malformed reply: missing trailing delimiter");
    }
}
