//! imed 共通ライブラリ
//!
//! `imed`（変換デーモン）と周辺ツールで共有される機能を提供します。

/// エラーハンドリング
pub mod error;

/// ドメイン型（Newtype）
pub mod domain;

/// Ports & Adapters のポート定義
pub mod ports;

/// ポートの標準実装
pub mod adapter;

/// LLMプロバイダ
pub mod llm;
