//! archive 境界レコード（trim 後の列の先頭に挿入する合成メッセージ）

use super::message::{date_part, Message};
use serde_json::{json, Map, Value};

/// 境界レコードの version 欄
pub const BOUNDARY_VERSION: &str = "rolling-context-1.0";

/// 境界レコードに載せる本文
pub fn boundary_text(archived: &[Message], summary: &str) -> String {
    let first = archived
        .first()
        .map(|m| date_part(m.timestamp()))
        .unwrap_or_else(|| "unknown".to_string());
    let last = archived
        .last()
        .map(|m| date_part(m.timestamp()))
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "=== CONTEXT ARCHIVE BOUNDARY ===\n\
         {} messages archived ({} to {})\n\
         \n\
         {}\n\
         \n\
         === CONTINUING CONVERSATION ===",
        archived.len(),
        first,
        last,
        summary
    )
}

/// sessionId と cwd を、残す側の先頭から、無ければ archive 側の先頭から探す。
/// cwd は sessionId を持っていたのと同じメッセージから取る。
pub fn session_context(retained: &[Message], archived: &[Message]) -> (String, String) {
    retained
        .iter()
        .chain(archived.iter())
        .find_map(|m| {
            m.session_id()
                .map(|sid| (sid.to_string(), m.cwd().unwrap_or_default().to_string()))
        })
        .unwrap_or_default()
}

/// 境界レコードを組み立てる。parent は null（新しい根）。
pub fn build_boundary(
    id: &str,
    timestamp: &str,
    archived: &[Message],
    retained: &[Message],
    summary: &str,
) -> Message {
    let (session_id, cwd) = session_context(retained, archived);
    let mut record = Map::new();
    record.insert("parentUuid".to_string(), Value::Null);
    record.insert("isSidechain".to_string(), Value::Bool(false));
    record.insert("userType".to_string(), json!("system"));
    record.insert("cwd".to_string(), json!(cwd));
    record.insert("sessionId".to_string(), json!(session_id));
    record.insert("version".to_string(), json!(BOUNDARY_VERSION));
    record.insert("type".to_string(), json!("user"));
    record.insert(
        "message".to_string(),
        json!({
            "role": "user",
            "content": boundary_text(archived, summary)
        }),
    );
    record.insert("uuid".to_string(), json!(id));
    record.insert("timestamp".to_string(), json!(timestamp));
    Message::from_object(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(v: serde_json::Value) -> Message {
        Message::parse(v).unwrap()
    }

    #[test]
    fn test_boundary_shape() {
        let archived = vec![
            msg(json!({"uuid": "a", "type": "user", "timestamp": "2026-01-01T00:00:00Z", "sessionId": "s-old", "cwd": "/old"})),
            msg(json!({"uuid": "b", "type": "assistant", "timestamp": "2026-01-05T00:00:00Z"})),
        ];
        let retained = vec![
            msg(json!({"uuid": "c", "type": "summary"})),
            msg(json!({"uuid": "d", "type": "user", "sessionId": "s-new", "cwd": "/new"})),
        ];
        let b = build_boundary("bid", "2026-02-07T12:00:00.000Z", &archived, &retained, "SUM");
        assert_eq!(b.id(), "bid");
        assert_eq!(b.parent_id(), None);
        assert_eq!(b.kind(), "user");
        assert_eq!(b.session_id(), Some("s-new"));
        assert_eq!(b.cwd(), Some("/new"));
        assert_eq!(b.timestamp(), "2026-02-07T12:00:00.000Z");
        assert_eq!(
            b.extract_text(),
            "=== CONTEXT ARCHIVE BOUNDARY ===\n2 messages archived (2026-01-01 to 2026-01-05)\n\nSUM\n\n=== CONTINUING CONVERSATION ==="
        );
        let line = b.to_json_line().unwrap();
        assert!(line.starts_with(r#"{"parentUuid":null,"isSidechain":false,"userType":"system""#));
        assert!(line.contains(r#""version":"rolling-context-1.0""#));
    }

    #[test]
    fn test_session_context_falls_back_to_archived() {
        let archived = vec![
            msg(json!({"uuid": "a"})),
            msg(json!({"uuid": "b", "sessionId": "s1", "cwd": "/w"})),
        ];
        let retained = vec![msg(json!({"uuid": "c", "sessionId": ""}))];
        assert_eq!(
            session_context(&retained, &archived),
            ("s1".to_string(), "/w".to_string())
        );
        assert_eq!(session_context(&[], &[]), (String::new(), String::new()));
    }

    #[test]
    fn test_session_without_cwd() {
        let retained = vec![msg(json!({"uuid": "c", "sessionId": "s"}))];
        assert_eq!(
            session_context(&retained, &[]),
            ("s".to_string(), String::new())
        );
    }
}
