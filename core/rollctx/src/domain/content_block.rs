//! message.content のブロック型（type で判別するタグ付き列）

use serde_json::Value;

/// content 配列の 1 要素
///
/// 知らない type は Unknown として JSON のまま保持する。
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// `{"type": "text", "text": ...}`
    Text { text: String },
    /// `{"type": "tool_use" | "invocation", "id": ...}`
    Invocation { id: Option<String> },
    /// `{"type": "tool_result" | "response", "tool_use_id": ...}`
    Response { invocation_id: Option<String> },
    Unknown(Value),
}

fn non_empty_str(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl ContentBlock {
    pub fn from_value(v: &Value) -> Self {
        let Some(obj) = v.as_object() else {
            return Self::Unknown(v.clone());
        };
        match obj.get("type").and_then(Value::as_str) {
            Some("text") => Self::Text {
                text: obj
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            Some("tool_use") | Some("invocation") => Self::Invocation {
                id: non_empty_str(obj.get("id")),
            },
            Some("tool_result") | Some("response") => Self::Response {
                invocation_id: non_empty_str(obj.get("tool_use_id")),
            },
            _ => Self::Unknown(v.clone()),
        }
    }
}

/// message.content 全体
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// 文字列そのまま（ブロックなし）
    Text(String),
    Blocks(Vec<ContentBlock>),
    /// content が無い、または文字列でも配列でもない
    Absent,
}

impl Content {
    /// レコードの `message.content` を解釈する
    pub fn from_record(record: &serde_json::Map<String, Value>) -> Self {
        match record.get("message").and_then(|m| m.get("content")) {
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(Value::Array(items)) => {
                Self::Blocks(items.iter().map(ContentBlock::from_value).collect())
            }
            _ => Self::Absent,
        }
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        match self {
            Self::Blocks(b) => b,
            _ => &[],
        }
    }
}
