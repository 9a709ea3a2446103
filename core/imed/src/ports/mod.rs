//! Ports & Adapters のポート定義
//!
//! - inbound: ドライバ（HTTP ハンドラ）がアプリを呼び出すインターフェース
//! - outbound: アプリが外界（乱数・LLM）を使うための trait

pub mod inbound;
pub mod outbound;
