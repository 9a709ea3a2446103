//! 要求・応答の境界を示すランダムなトークン
//!
//! リクエストごとに生成し、使い回さない。生成は `ports::outbound::TokenGenerator` が担う。

/// トークン長（文字数）
pub const TOKEN_LEN: usize = 10;

/// 英大文字・英小文字・数字からなる固定長のトークン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterToken(String);

impl DelimiterToken {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// body をトークンで前後から挟む（`TOKEN\nbody\nTOKEN`）
    pub fn fence(&self, body: &str) -> String {
        format!("{token}\n{body}\n{token}", token = self.0)
    }

    /// テスト用: TOKEN_LEN 文字の ASCII 英数字か
    #[cfg(test)]
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == TOKEN_LEN && self.0.bytes().all(|b| b.is_ascii_alphanumeric())
    }
}

impl std::fmt::Display for DelimiterToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
