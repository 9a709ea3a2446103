//! 区切りトークン生成 Outbound ポート
//!
//! usecase は TokenGenerator を注入し、テストでは固定トークンを返す実装を渡せる。

use crate::domain::DelimiterToken;

/// 呼ぶたびに新しい DelimiterToken を返す（失敗しない）
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> DelimiterToken;
}
