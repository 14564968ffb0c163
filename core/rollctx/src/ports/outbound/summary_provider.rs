//! archive するメッセージの要約 Outbound ポート

use crate::domain::{Message, SummarySource};

/// 要約テキストとその出どころ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    pub source: SummarySource,
}

/// 要約を作る能力。失敗は内部で決定的な要約に置き換え、呼び出し側へは返さない。
pub trait SummaryProvider: Send + Sync {
    fn summarize(&self, messages: &[Message], project_name: &str) -> Summary;
}
