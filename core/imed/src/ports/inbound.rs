//! Inbound ポート: HTTP ハンドラが変換ユースケースを呼び出すインターフェース

use crate::domain::{CandidateList, ConversionError, ConversionStrategy};

/// 1 件の入力テキストを候補列に変換する
///
/// 実装はリクエスト間で可変状態を共有しない（並行に呼んでよい）。
pub trait ConvertText: Send + Sync {
    fn convert(
        &self,
        strategy: ConversionStrategy,
        message: &str,
    ) -> Result<CandidateList, ConversionError>;
}
