//! 単発 LLM 完了の Outbound ポート
//!
//! 1 回のプロンプトで応答の生テキストを取得する。リトライはしない。

use common::error::Error;

/// バックエンド呼び出し（structured 経路は 2 部構成、freeform 経路は 1 本の文字列）
pub trait LlmCompletion: Send + Sync {
    /// instruction を system、request を user として送り、応答テキストを返す
    fn complete_chat(&self, instruction: &str, request: &str) -> Result<String, Error>;

    /// prompt の続きを最大 max_tokens まで生成させ、生成テキストを返す
    fn complete_text(&self, prompt: &str, max_tokens: u32) -> Result<String, Error>;
}
