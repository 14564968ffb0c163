//! JSONL transcript の TranscriptStore 実装
//!
//! - 検出: プロジェクトディレクトリ直下の `*.jsonl`（`agent-` で始まるものを除く）のうち更新が最新のもの
//! - バックアップ: `<transcript のディレクトリ>/.backups/<stem>_<YYYYmmdd_HHMMSS>.jsonl`、新しい順に N 世代保持
//! - 保存: 同じディレクトリの一時ファイルへ書いてから rename で置き換える

use crate::domain::{Message, ProjectRef};
use crate::ports::outbound::{Transcript, TranscriptStore};
use common::error::Error;
use common::ports::outbound::{Clock, FileLock, FileSystem, LockState, Log, LogLevel, LogRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

pub const BACKUP_DIR_NAME: &str = ".backups";
const AGENT_PREFIX: &str = "agent-";
const JSONL_EXT: &str = "jsonl";
const BACKUP_TS_FORMAT: &str = "%Y%m%d_%H%M%S";

fn is_jsonl(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(JSONL_EXT)
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// 1 行分。空行は None、UTF-8 でない行や JSON として読めない行は ParseError。
fn parse_line(raw: &[u8], line_no: usize) -> Result<Option<Message>, Error> {
    let line = std::str::from_utf8(raw)
        .map_err(|e| Error::parse(line_no, format!("invalid UTF-8: {}", e)))?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Message::from_json_line(trimmed, line_no).map(Some)
}

/// `.backups` ディレクトリ（transcript と同じ階層）
pub fn backup_dir_for(transcript: &Path) -> PathBuf {
    transcript
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(BACKUP_DIR_NAME)
}

/// JSONL ファイルを読み書きする TranscriptStore
pub struct JsonlTranscriptStore {
    fs: Arc<dyn FileSystem>,
    lock: Arc<dyn FileLock>,
    clock: Arc<dyn Clock>,
    log: Arc<dyn Log>,
    backup_keep_count: usize,
}

impl JsonlTranscriptStore {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        lock: Arc<dyn FileLock>,
        clock: Arc<dyn Clock>,
        log: Arc<dyn Log>,
        backup_keep_count: usize,
    ) -> Self {
        Self {
            fs,
            lock,
            clock,
            log,
            backup_keep_count,
        }
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        self.fs.metadata(path).ok().and_then(|m| m.modified())
    }

    fn warn(&self, message: String, path: &Path) {
        let _ = self.log.log(
            &LogRecord::new(LogLevel::Warn, message)
                .layer("adapter")
                .kind("store")
                .field("path", path.display().to_string()),
        );
    }

    /// 同じ秒に 2 回取った場合は `_1`, `_2`, ... を付けて衝突を避ける
    fn next_backup_path(&self, backup_dir: &Path, stem: &str) -> PathBuf {
        let local = self.clock.now_utc().with_timezone(&chrono::Local);
        let base = format!("{}_{}", stem, local.format(BACKUP_TS_FORMAT));
        let mut candidate = backup_dir.join(format!("{}.{}", base, JSONL_EXT));
        let mut n = 1;
        while self.fs.exists(&candidate) {
            candidate = backup_dir.join(format!("{}_{}.{}", base, n, JSONL_EXT));
            n += 1;
        }
        candidate
    }

    /// 新しい順に `backup_keep_count` 件だけ残す。`keep` は必ず残す。
    fn prune_backups(&self, backup_dir: &Path, keep: &Path) -> Result<usize, Error> {
        let mut backups: Vec<(Option<SystemTime>, PathBuf)> = self
            .fs
            .read_dir(backup_dir)?
            .into_iter()
            .filter(|p| is_jsonl(p) && p.as_path() != keep)
            .map(|p| (self.modified(&p), p))
            .collect();
        // 新しい順（更新時刻が同じなら名前の降順）
        backups.sort_by(|a, b| b.cmp(a));

        let mut removed = 0;
        let others_to_keep = self.backup_keep_count.saturating_sub(1);
        for (_, old) in backups.into_iter().skip(others_to_keep) {
            self.fs.remove_file(&old)?;
            removed += 1;
        }
        Ok(removed)
    }
}

impl TranscriptStore for JsonlTranscriptStore {
    fn find(&self, project: &ProjectRef) -> Option<PathBuf> {
        if let Some(file) = &project.file_override {
            if self.fs.exists(file) {
                return Some(file.clone());
            }
            self.warn(format!("Specified file not found: {}", file.display()), file);
            return None;
        }

        let entries = self.fs.read_dir(&project.dir).ok()?;
        entries
            .into_iter()
            .filter(|p| is_jsonl(p) && !file_name(p).starts_with(AGENT_PREFIX))
            .filter(|p| self.fs.metadata(p).map(|m| m.is_file()).unwrap_or(false))
            .map(|p| (self.modified(&p), p))
            .max()
            .map(|(_, p)| p)
    }

    fn is_locked(&self, path: &Path) -> bool {
        match self.lock.try_exclusive_lock(path) {
            Ok(LockState::Held) => false,
            Ok(LockState::Busy) => true,
            Err(e) => {
                self.warn(format!("Lock check failed, treating as locked: {}", e), path);
                true
            }
        }
    }

    fn load(&self, path: &Path) -> Result<Transcript, Error> {
        let body = self.fs.read(path)?;
        let mut messages = Vec::new();
        let mut skipped_lines = 0;
        for (i, raw) in body.split(|b| *b == b'\n').enumerate() {
            match parse_line(raw, i + 1) {
                Ok(Some(msg)) => messages.push(msg),
                Ok(None) => {}
                Err(e) => {
                    eprintln!("Warning: {} skipped: {}", path.display(), e);
                    self.warn(format!("Skipped malformed line: {}", e), path);
                    skipped_lines += 1;
                }
            }
        }
        Ok(Transcript {
            path: path.to_path_buf(),
            messages,
            skipped_lines,
        })
    }

    fn backup(&self, path: &Path) -> Result<PathBuf, Error> {
        let backup_dir = backup_dir_for(path);
        self.fs.create_dir_all(&backup_dir)?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("transcript");
        let backup_path = self.next_backup_path(&backup_dir, stem);
        self.fs.copy(path, &backup_path)?;
        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, "backup created")
                .layer("adapter")
                .kind("store")
                .field("path", backup_path.display().to_string()),
        );

        // 間引きの失敗でバックアップ自体は失敗にしない
        match self.prune_backups(&backup_dir, &backup_path) {
            Ok(0) => {}
            Ok(removed) => {
                let _ = self.log.log(
                    &LogRecord::new(LogLevel::Info, "old backups pruned")
                        .layer("adapter")
                        .kind("store")
                        .field("removed", removed)
                        .field("keep", self.backup_keep_count),
                );
            }
            Err(e) => self.warn(format!("Failed to prune old backups: {}", e), &backup_dir),
        }
        Ok(backup_path)
    }

    fn save(&self, path: &Path, messages: &[Message]) -> Result<(), Error> {
        let mut body = String::new();
        for msg in messages {
            let line = msg
                .to_json_line()
                .map_err(|e| Error::persist(format!("Failed to serialize message: {}", e)))?;
            body.push_str(&line);
            body.push('\n');
        }

        let tmp = path.with_file_name(format!(".{}.rollctx.tmp", file_name(path)));
        self.fs
            .write(&tmp, &body)
            .map_err(|e| Error::persist(e.to_string()))?;
        if let Err(e) = self.fs.rename(&tmp, path) {
            let _ = self.fs.remove_file(&tmp);
            return Err(Error::persist(e.to_string()));
        }
        Ok(())
    }
}
