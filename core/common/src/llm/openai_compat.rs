//! OpenAI Chat Completions 互換 (/chat/completions) プロバイダ
//!
//! エンドポイント URL をそのまま指定する（OpenRouter 等）。非ストリーミングで 1 往復のみ。

use crate::error::Error;
use crate::ports::outbound::LlmProvider;
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_MAX_TOKENS: u32 = 2500;

/// OpenAI Chat Completions 互換プロバイダ
pub struct OpenAiCompatProvider {
    model: String,
    url: String,
    api_key: Option<String>,
    max_tokens: u32,
    timeout: Duration,
    /// 追加ヘッダ（HTTP-Referer / X-Title 等）
    extra_headers: Vec<(String, String)>,
}

impl OpenAiCompatProvider {
    /// 新しいプロバイダを作成
    ///
    /// * `model` - モデル名
    /// * `url` - chat completions のフル URL
    /// * `api_key` - Bearer トークン（None のとき Authorization を付けない）
    pub fn new(model: impl Into<String>, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            model: model.into(),
            url: url.into(),
            api_key,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
            extra_headers: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    fn auth_header(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| format!("Bearer {}", key))
    }
}

fn map_send_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::timeout(format!("HTTP request timed out: {}", e))
    } else {
        Error::http(format!("HTTP request failed: {}", e))
    }
}

impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai_compat"
    }

    fn make_request_payload(&self, prompt: &str) -> Result<Value, Error> {
        Ok(json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": self.max_tokens
        }))
    }

    fn make_http_request(&self, request_json: &str) -> Result<String, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        let mut builder = client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .body(request_json.to_string());

        if let Some(auth) = self.auth_header() {
            builder = builder.header("Authorization", auth);
        }
        for (name, value) in &self.extra_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().map_err(map_send_error)?;

        let status = response.status();
        let response_text = response.text().map_err(map_send_error)?;

        if !status.is_success() {
            let error_msg = match serde_json::from_str::<Value>(&response_text) {
                Ok(v) => v["error"]["message"]
                    .as_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("HTTP {}: {}", status, response_text)),
                Err(_) => format!("HTTP {}: {}", status, response_text),
            };
            return Err(Error::http(format!("Chat completions error: {}", error_msg)));
        }

        Ok(response_text)
    }

    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error> {
        let v: Value = serde_json::from_str(response_json)
            .map_err(|e| Error::json(format!("Failed to parse response JSON: {}", e)))?;

        if let Some(err) = v.get("error") {
            let msg = err["message"].as_str().unwrap_or("Unknown error");
            return Err(Error::http(format!("API error: {}", msg)));
        }

        Ok(v["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string()))
    }
}
