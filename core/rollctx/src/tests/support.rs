//! テスト用のスタブとフィクスチャ

use crate::adapter::{JsonlTranscriptStore, LlmSummaryProvider};
use crate::domain::{Message, ProjectRef, TrimSettings};
use crate::ports::outbound::{Summary, SummaryProvider, Transcript, TranscriptStore};
use crate::usecase::{TrimDeps, TrimUseCase};
use common::adapter::{FixedClock, FixedIdGenerator, NoopLog, StdFileLock, StdFileSystem};
use common::error::Error;
use common::ports::outbound::{FileMetadata, FileSystem, LlmProvider, Log, LogRecord};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// 2026-02-07T12:00:00.000Z
pub const NOW_MS: u64 = 1_770_465_600_000;
pub const BOUNDARY_ID: &str = "boundary-1";

/// レコードを溜める Log
#[derive(Default)]
pub struct MemoryLog {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLog {
    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }
}

impl Log for MemoryLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// 決めた応答を返す LLM（Err なら通信失敗扱い）
pub struct ScriptedLlm {
    reply: Result<String, Error>,
    pub calls: Mutex<usize>,
}

impl ScriptedLlm {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(Error::http("HTTP request failed: connection refused")),
            calls: Mutex::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &str {
        "scripted"
    }

    fn make_request_payload(&self, prompt: &str) -> Result<Value, Error> {
        Ok(json!({ "prompt": prompt }))
    }

    fn make_http_request(&self, _request_json: &str) -> Result<String, Error> {
        *self.calls.lock().unwrap() += 1;
        self.reply.clone()
    }

    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error> {
        Ok(Some(response_json.to_string()))
    }
}

/// StdFileSystem に失敗を注入する FS
#[derive(Default)]
pub struct FaultyFs {
    inner: StdFileSystem,
    /// 一時ファイルへの書き込みを失敗させる（保存失敗）
    pub fail_save: bool,
    /// 複製を失敗させる（バックアップ失敗）
    pub fail_copy: bool,
}

impl FaultyFs {
    pub fn failing_save() -> Arc<Self> {
        Arc::new(Self {
            fail_save: true,
            ..Self::default()
        })
    }

    pub fn failing_copy() -> Arc<Self> {
        Arc::new(Self {
            fail_copy: true,
            ..Self::default()
        })
    }
}

impl FileSystem for FaultyFs {
    fn read_to_string(&self, path: &Path) -> Result<String, Error> {
        self.inner.read_to_string(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, Error> {
        self.inner.read(path)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), Error> {
        if self.fail_save {
            return Err(Error::io_msg(format!(
                "Failed to write '{}': No space left on device",
                path.display()
            )));
        }
        self.inner.write(path, contents)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), Error> {
        self.inner.rename(from, to)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), Error> {
        if self.fail_copy {
            return Err(Error::io_msg("Failed to copy: permission denied"));
        }
        self.inner.copy(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), Error> {
        self.inner.create_dir_all(path)
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata, Error> {
        self.inner.metadata(path)
    }

    fn remove_file(&self, path: &Path) -> Result<(), Error> {
        self.inner.remove_file(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, Error> {
        self.inner.read_dir(path)
    }

    fn open_append(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>, Error> {
        self.inner.open_append(path)
    }
}

/// メモリ上の TranscriptStore（バックアップ・保存の回数を数える）
#[derive(Default)]
pub struct MemoryStore {
    pub backups: Mutex<usize>,
    pub saved: Mutex<Option<Vec<Message>>>,
}

impl TranscriptStore for MemoryStore {
    fn find(&self, _project: &ProjectRef) -> Option<PathBuf> {
        None
    }

    fn is_locked(&self, _path: &Path) -> bool {
        false
    }

    fn load(&self, path: &Path) -> Result<Transcript, Error> {
        Err(Error::not_found(path.display().to_string()))
    }

    fn backup(&self, _path: &Path) -> Result<PathBuf, Error> {
        *self.backups.lock().unwrap() += 1;
        Ok(PathBuf::from("/mem/.backups/t_backup.jsonl"))
    }

    fn save(&self, _path: &Path, messages: &[Message]) -> Result<(), Error> {
        *self.saved.lock().unwrap() = Some(messages.to_vec());
        Ok(())
    }
}

/// 常に同じ要約を返す SummaryProvider
pub struct FixedSummary(pub Summary);

impl SummaryProvider for FixedSummary {
    fn summarize(&self, _messages: &[Message], _project_name: &str) -> Summary {
        self.0.clone()
    }
}

pub fn message(v: Value) -> Message {
    Message::parse(v).unwrap()
}

pub fn timestamp(i: usize) -> String {
    format!("2026-01-{:02}T10:00:00.000Z", i + 1)
}

/// 親子が一本につながった普通の会話レコード
pub fn plain_record(i: usize, kind: &str) -> Value {
    let parent = match i {
        0 => Value::Null,
        _ => json!(format!("m{}", i - 1)),
    };
    json!({
        "parentUuid": parent,
        "isSidechain": false,
        "cwd": "/work",
        "sessionId": "sess-1",
        "type": kind,
        "message": {"role": kind, "content": format!("message {}", i)},
        "uuid": format!("m{}", i),
        "timestamp": timestamp(i)
    })
}

pub fn invocation_record(i: usize, tool: &str) -> Value {
    let mut v = plain_record(i, "assistant");
    v["message"]["content"] = json!([
        {"type": "text", "text": format!("calling {}", tool)},
        {"type": "tool_use", "id": tool, "name": "Bash", "input": {"command": "ls"}}
    ]);
    v
}

pub fn response_record(i: usize, tool: &str) -> Value {
    let mut v = plain_record(i, "user");
    v["message"]["content"] = json!([
        {"type": "tool_result", "tool_use_id": tool, "content": "ok"}
    ]);
    v
}

/// 10 件。m3 の tool_use に m5 が答える。
pub fn scenario_records() -> Vec<Value> {
    (0..10)
        .map(|i| match i {
            3 => invocation_record(3, "toolu_3"),
            5 => response_record(5, "toolu_3"),
            _ => plain_record(i, if i % 2 == 0 { "user" } else { "assistant" }),
        })
        .collect()
}

/// `n` 件の一本鎖
pub fn chain_records(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| plain_record(i, if i % 2 == 0 { "user" } else { "assistant" }))
        .collect()
}

pub fn to_jsonl(records: &[Value]) -> String {
    records
        .iter()
        .map(|r| format!("{}\n", serde_json::to_string(r).unwrap()))
        .collect()
}

pub fn write_transcript(dir: &Path, name: &str, records: &[Value]) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, to_jsonl(records)).unwrap();
    path
}

pub fn read_records(path: &Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

pub fn backups_in(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir.join(".backups")) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

pub fn disk_store(fs: Arc<dyn FileSystem>, log: Arc<dyn Log>) -> Arc<JsonlTranscriptStore> {
    Arc::new(JsonlTranscriptStore::new(
        fs,
        Arc::new(StdFileLock),
        Arc::new(FixedClock(NOW_MS)),
        log,
        5,
    ))
}

pub fn summary_with(llm: Option<Arc<dyn LlmProvider>>) -> Arc<dyn SummaryProvider> {
    Arc::new(LlmSummaryProvider::new(llm, None, Arc::new(NoopLog)))
}

pub fn trim_use_case(
    settings: TrimSettings,
    store: Arc<dyn TranscriptStore>,
    summary: Arc<dyn SummaryProvider>,
    log: Arc<dyn Log>,
) -> TrimUseCase {
    TrimUseCase::new(
        settings,
        TrimDeps {
            store,
            summary,
            clock: Arc::new(FixedClock(NOW_MS)),
            id_gen: Arc::new(FixedIdGenerator(BOUNDARY_ID.to_string())),
            log,
        },
    )
}
