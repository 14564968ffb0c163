//! rollctx 共通ライブラリ
//!
//! エラー型・Outbound ポート・標準アダプター・LLM クライアントを提供します。

/// エラーハンドリング
pub mod error;

/// 共通ドメイン型
pub mod domain;

/// Ports & Adapters のポート
pub mod ports;

/// ポートの標準実装
pub mod adapter;

/// LLM プロバイダ
pub mod llm;
