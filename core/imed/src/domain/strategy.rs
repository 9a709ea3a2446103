//! 候補の取得方法

/// 変換経路
///
/// * `Structured` - 区切りトークンで囲んだ JSON を要求し、複数候補を得る
/// * `Freeform` - few-shot の続きを生成させ、その生テキストを唯一の候補とする
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStrategy {
    Structured,
    Freeform,
}

impl ConversionStrategy {
    /// ログ用の名前（バックエンドの API 種別に合わせる）
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "chat",
            Self::Freeform => "text",
        }
    }
}
