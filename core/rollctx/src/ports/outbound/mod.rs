//! Outbound ポート: アプリが外界（transcript ファイル・要約 API）を使うための trait

pub mod summary_provider;
pub mod transcript_store;

pub use summary_provider::{Summary, SummaryProvider};
pub use transcript_store::{Transcript, TranscriptStore};
