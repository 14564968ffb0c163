//! LLM プロバイダ Outbound ポート
//!
//! 1 回のプロンプト → 1 回の応答テキスト（非ストリーミング）だけを扱う。

use crate::error::Error;
use serde_json::Value;

/// LLM プロバイダのトレイト
///
/// 実装は `common::llm::OpenAiCompatProvider` やテスト用のスタブなど。
pub trait LlmProvider: Send + Sync {
    /// プロバイダ名を返す
    fn name(&self) -> &str;

    /// 単一の user プロンプトからリクエスト JSON を組み立てる
    fn make_request_payload(&self, prompt: &str) -> Result<Value, Error>;

    /// HTTP リクエストを実行してレスポンス JSON 文字列を返す
    fn make_http_request(&self, request_json: &str) -> Result<String, Error>;

    /// レスポンスからテキストを抽出（存在しない場合は None）
    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error>;

    /// payload 生成 → 送信 → テキスト抽出を一度に行う
    fn complete(&self, prompt: &str) -> Result<String, Error> {
        let payload = self.make_request_payload(prompt)?;
        let body = serde_json::to_string(&payload)
            .map_err(|e| Error::json(format!("Failed to serialize request: {}", e)))?;
        let response = self.make_http_request(&body)?;
        self.parse_response_text(&response)?
            .ok_or_else(|| Error::http("Response contained no message content"))
    }
}
