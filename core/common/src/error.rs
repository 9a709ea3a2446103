//! エラーハンドリング
//!
//! インフラ層（I/O・環境変数・HTTP・JSON）の失敗を 1 つの enum に集約する。
//! 変換ドメインの失敗（入力不正・応答不正など）は imed 側の `ConversionError` で扱う。

/// 共通エラー型
///
/// 各バリアントは人間向けメッセージを持ち、`exit_code()` で sysexits 互換の終了コードに写す。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// 引数・設定値の不正（usage を表示する）
    #[error("{0}")]
    InvalidArgument(String),
    /// 必須の環境変数が無い・ホームディレクトリが解決できない
    #[error("{0}")]
    Env(String),
    #[error("{0}")]
    Io(String),
    /// バックエンドへの HTTP 通信失敗・非 2xx 応答
    #[error("{0}")]
    Http(String),
    #[error("{0}")]
    Json(String),
    #[error("{0}")]
    System(String),
}

impl Error {
    /// 引数不正エラー
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn env(msg: impl Into<String>) -> Self {
        Self::Env(msg.into())
    }

    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Self::Json(msg.into())
    }

    /// システムエラー
    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// プロセス終了コード（sysexits.h 準拠）
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => 64,
            Self::Json(_) => 65,
            Self::Http(_) => 69,
            Self::System(_) => 70,
            Self::Io(_) => 74,
            Self::Env(_) => 78,
        }
    }

    /// usage を表示すべきエラーか
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
