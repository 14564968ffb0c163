//! transcript の 1 レコード（JSONL の 1 行）
//!
//! 元の JSON オブジェクトを payload として丸ごと保持し、書き戻しは payload から行う。
//! 型付きフィールドは payload から読み出した写しで、書き換えるのは parent_id だけ。

use super::content_block::{Content, ContentBlock};
use common::error::Error;
use serde_json::{Map, Value};

const ID_KEYS: [&str; 2] = ["uuid", "id"];
const PARENT_KEYS: [&str; 2] = ["parentUuid", "parent_id"];
const KIND_KEYS: [&str; 2] = ["type", "kind"];

fn first_str<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| record.get(*k))
        .and_then(Value::as_str)
}

/// タイムスタンプの日付部分（先頭 10 文字）
pub fn date_part(timestamp: &str) -> String {
    timestamp.chars().take(10).collect()
}

/// 会話レコード
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: String,
    parent_id: Option<String>,
    kind: String,
    timestamp: String,
    invocation_ids: Vec<String>,
    response_of: Option<String>,
    content: Content,
    /// parent を書き戻すキー（読み込んだレコードが使っていた方）
    parent_key: &'static str,
    payload: Map<String, Value>,
}

impl Message {
    /// JSON オブジェクト 1 件を解釈する
    pub fn parse(record: Value) -> Result<Self, String> {
        match record {
            Value::Object(payload) => Ok(Self::from_object(payload)),
            _ => Err("record is not a JSON object".to_string()),
        }
    }

    /// JSON オブジェクトから組み立てる（失敗しない）
    pub fn from_object(payload: Map<String, Value>) -> Self {
        let id = first_str(&payload, &ID_KEYS).unwrap_or_default().to_string();
        let parent_key = PARENT_KEYS
            .into_iter()
            .find(|k| payload.contains_key(*k))
            .unwrap_or(PARENT_KEYS[0]);
        let parent_id = payload
            .get(parent_key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let kind = first_str(&payload, &KIND_KEYS)
            .unwrap_or("unknown")
            .to_string();
        let timestamp = payload
            .get("timestamp")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let content = Content::from_record(&payload);
        let mut invocation_ids = Vec::new();
        let mut response_of = None;
        for block in content.blocks() {
            match block {
                ContentBlock::Invocation { id: Some(id) } => invocation_ids.push(id.clone()),
                // 複数あれば最後のものが残る
                ContentBlock::Response {
                    invocation_id: Some(id),
                } => response_of = Some(id.clone()),
                _ => {}
            }
        }

        Self {
            id,
            parent_id,
            kind,
            timestamp,
            invocation_ids,
            response_of,
            content,
            parent_key,
            payload,
        }
    }

    /// JSONL の 1 行を解釈する。`line_no` は 1 始まりでエラー表示に使う。
    pub fn from_json_line(line: &str, line_no: usize) -> Result<Self, Error> {
        let value: Value =
            serde_json::from_str(line).map_err(|e| Error::parse(line_no, e.to_string()))?;
        Self::parse(value).map_err(|e| Error::parse(line_no, e))
    }

    /// payload をそのまま 1 行の JSON にする（末尾改行なし）
    pub fn to_json_line(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.payload)?)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn invocation_ids(&self) -> &[String] {
        &self.invocation_ids
    }

    pub fn response_of(&self) -> Option<&str> {
        self.response_of.as_deref()
    }

    /// `message.role` があればそれ、なければ kind
    pub fn role(&self) -> &str {
        self.payload
            .get("message")
            .and_then(|m| m.get("role"))
            .and_then(Value::as_str)
            .unwrap_or(self.kind.as_str())
    }

    pub fn session_id(&self) -> Option<&str> {
        self.payload
            .get("sessionId")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn cwd(&self) -> Option<&str> {
        self.payload.get("cwd").and_then(Value::as_str)
    }

    /// 要約入力用のテキスト。text ブロックを改行で連結し、文字列 content はそのまま返す。
    pub fn extract_text(&self) -> String {
        match &self.content {
            Content::Text(s) => s.clone(),
            Content::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Content::Absent => String::new(),
        }
    }

    /// parent を付け替える。payload 側も同じキーで更新する。
    pub fn set_parent_id(&mut self, parent_id: &str) {
        self.parent_id = Some(parent_id.to_string());
        self.payload.insert(
            self.parent_key.to_string(),
            Value::String(parent_id.to_string()),
        );
    }
}
