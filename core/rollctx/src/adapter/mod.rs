//! rollctx 固有のアダプター（Outbound ポートの実装）
//!
//! ファイル・時刻・ロック・HTTP などの汎用実装は common::adapter / common::llm にある。

pub mod config_loader;
pub mod jsonl_transcript_store;
pub mod llm_summary_provider;

pub use config_loader::ConfigLoader;
pub use jsonl_transcript_store::JsonlTranscriptStore;
pub use llm_summary_provider::LlmSummaryProvider;
