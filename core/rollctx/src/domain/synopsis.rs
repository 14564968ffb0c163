//! LLM を使わない決定的な要約（API 未設定・失敗時・要約無効時に使う）

use super::message::{date_part, Message};

const UNKNOWN_DATE: &str = "unknown";

/// archive 範囲の先頭・末尾の日付（空なら "unknown"）
pub fn date_range(messages: &[Message]) -> (String, String) {
    match (messages.first(), messages.last()) {
        (Some(first), Some(last)) => (date_part(first.timestamp()), date_part(last.timestamp())),
        _ => (UNKNOWN_DATE.to_string(), UNKNOWN_DATE.to_string()),
    }
}

/// タイムスタンプの日付部分。無い・空なら "unknown"
pub fn date_or_unknown(timestamp: Option<&str>) -> String {
    match timestamp {
        Some(ts) if !ts.is_empty() => date_part(ts),
        _ => UNKNOWN_DATE.to_string(),
    }
}

/// 件数・期間・user/assistant 件数だけを並べた要約
pub fn fallback_synopsis(messages: &[Message]) -> String {
    let (first, last) = date_range(messages);
    let user_count = messages.iter().filter(|m| m.kind() == "user").count();
    let assistant_count = messages.iter().filter(|m| m.kind() == "assistant").count();

    format!(
        "[Archived Context: {} messages from {} to {}]\n\
         \n\
         - User messages: {}\n\
         - Assistant messages: {}\n\
         \n\
         Earlier conversation context has been archived to maintain rolling window.\n\
         Full archive available in .backups folder if needed.",
        messages.len(),
        first,
        last,
        user_count,
        assistant_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn msg(kind: &str, ts: &str) -> Message {
        Message::parse(json!({"uuid": ts, "type": kind, "timestamp": ts})).unwrap()
    }

    #[test]
    fn test_fallback_synopsis_exact_text() {
        let msgs = vec![
            msg("user", "2026-01-02T10:00:00Z"),
            msg("assistant", "2026-01-02T10:00:05Z"),
            msg("file-history-snapshot", "2026-01-03T00:00:00Z"),
            msg("user", "2026-01-04T09:30:00Z"),
        ];
        assert_eq!(
            fallback_synopsis(&msgs),
            "[Archived Context: 4 messages from 2026-01-02 to 2026-01-04]\n\
             \n\
             - User messages: 2\n\
             - Assistant messages: 1\n\
             \n\
             Earlier conversation context has been archived to maintain rolling window.\n\
             Full archive available in .backups folder if needed."
        );
    }

    #[test]
    fn test_fallback_synopsis_empty() {
        let text = fallback_synopsis(&[]);
        assert!(text.starts_with("[Archived Context: 0 messages from unknown to unknown]"));
        assert!(text.contains("- User messages: 0"));
    }

    #[test]
    fn test_date_or_unknown() {
        assert_eq!(date_or_unknown(Some("2026-01-02T03:04:05Z")), "2026-01-02");
        assert_eq!(date_or_unknown(Some("")), "unknown");
        assert_eq!(date_or_unknown(None), "unknown");
    }
}
