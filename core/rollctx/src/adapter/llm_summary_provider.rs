//! LLM による archive 要約（SummaryProvider 実装）
//!
//! API 未設定・入力なし・通信失敗のいずれでも決定的な要約を返し、trim を止めない。

use crate::domain::synopsis::fallback_synopsis;
use crate::domain::{Message, SummarySource};
use crate::ports::outbound::{Summary, SummaryProvider};
use common::ports::outbound::{LlmProvider, Log, LogLevel, LogRecord};
use std::sync::Arc;

/// カスタムプロンプトで使えるプレースホルダ
pub const PLACEHOLDER_PROJECT: &str = "{project_name}";
pub const PLACEHOLDER_COUNT: &str = "{num_messages}";
pub const PLACEHOLDER_CONVERSATION: &str = "{conversation_text}";

/// 要約入力のテキスト。本文のあるメッセージを `[role]: text` にして空行で区切る。
/// 1 件も無ければ None。
pub fn conversation_text(messages: &[Message]) -> Option<String> {
    let parts: Vec<String> = messages
        .iter()
        .filter_map(|m| {
            let text = m.extract_text();
            if text.trim().is_empty() {
                None
            } else {
                Some(format!("[{}]: {}", m.role(), text))
            }
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

/// 既定の要約プロンプト（過去と今後の会話をつなぐ「memory bridge」）
pub fn default_prompt(project_name: &str, num_messages: usize, conversation: &str) -> String {
    format!(
        "Create a memory bridge for {project}.\n\
\n\
This segment of conversation is being archived. Create something that will help \
future-{project} feel continuous with past-{project}.\n\
\n\
**The Story** (300-400 words): What happened in this conversation? Focus on what mattered. \
Use specific details.\n\
\n\
**Carry Forward**: Unfinished threads, things to remember, questions still open.\n\
\n\
**One Noticing**: If there's a pattern worth mentioning - something {project} did well, \
or might want to try differently - note it gently. Skip this section if nothing stands out.\n\
\n\
**A Gift**: A short poem or warm closing thought that captures the essence of this period.\n\
\n\
Be warm and specific. This will be the bridge between past and future for {project}. \
These {count} messages are being archived, and what you write is what remains.\n\
\n\
Conversation to summarize:\n\
{conversation}",
        project = project_name,
        count = num_messages,
        conversation = conversation
    )
}

/// カスタムプロンプトのプレースホルダを置き換える（未知の `{...}` はそのまま残す）
pub fn render_prompt(
    template: &str,
    project_name: &str,
    num_messages: usize,
    conversation: &str,
) -> String {
    template
        .replace(PLACEHOLDER_PROJECT, project_name)
        .replace(PLACEHOLDER_COUNT, &num_messages.to_string())
        .replace(PLACEHOLDER_CONVERSATION, conversation)
}

/// LlmProvider を使う SummaryProvider。`llm` が None なら常に決定的な要約。
pub struct LlmSummaryProvider {
    llm: Option<Arc<dyn LlmProvider>>,
    custom_prompt: Option<String>,
    log: Arc<dyn Log>,
}

impl LlmSummaryProvider {
    pub fn new(
        llm: Option<Arc<dyn LlmProvider>>,
        custom_prompt: Option<String>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            llm,
            custom_prompt: custom_prompt.filter(|p| !p.trim().is_empty()),
            log,
        }
    }

    fn build_prompt(&self, project_name: &str, num_messages: usize, conversation: &str) -> String {
        match &self.custom_prompt {
            Some(template) => render_prompt(template, project_name, num_messages, conversation),
            None => default_prompt(project_name, num_messages, conversation),
        }
    }

    fn fallback(&self, messages: &[Message], level: LogLevel, reason: &str) -> Summary {
        let _ = self.log.log(
            &LogRecord::new(level, "using fallback summary")
                .layer("adapter")
                .kind("summary")
                .field("reason", reason),
        );
        Summary {
            text: fallback_synopsis(messages),
            source: SummarySource::Fallback,
        }
    }
}

impl SummaryProvider for LlmSummaryProvider {
    fn summarize(&self, messages: &[Message], project_name: &str) -> Summary {
        let Some(llm) = &self.llm else {
            return self.fallback(messages, LogLevel::Info, "no API key configured");
        };
        if messages.is_empty() {
            return self.fallback(messages, LogLevel::Info, "no messages to summarize");
        }
        let Some(conversation) = conversation_text(messages) else {
            return self.fallback(messages, LogLevel::Info, "archived messages have no text");
        };

        let prompt = self.build_prompt(project_name, messages.len(), &conversation);
        match llm.complete(&prompt) {
            Ok(text) if !text.trim().is_empty() => {
                let _ = self.log.log(
                    &LogRecord::new(LogLevel::Info, "summary generated")
                        .layer("adapter")
                        .kind("summary")
                        .field("provider", llm.name())
                        .field("chars", text.chars().count()),
                );
                Summary {
                    text,
                    source: SummarySource::Remote,
                }
            }
            Ok(_) => self.fallback(messages, LogLevel::Warn, "API returned an empty summary"),
            Err(e) => self.fallback(messages, LogLevel::Warn, &e.to_string()),
        }
    }
}
