//! Log 実装（ファイルへ JSONL 追記 / stderr 一行表示 / 複数出力先 / 無出力）

use crate::error::Error;
use crate::ports::outbound::{FileSystem, Log, LogLevel, LogRecord};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// ファイルへ JSONL を追記する Log 実装
pub struct FileJsonLog {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl FileJsonLog {
    /// ログファイルパスへ追記する logger を生成する。
    /// 親ディレクトリが無ければ作成する（初回書き込み時）。
    pub fn new(fs: Arc<dyn FileSystem>, path: impl AsRef<Path>) -> Self {
        Self {
            fs,
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Log for FileJsonLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            self.fs.create_dir_all(parent)?;
        }
        let mut w = self.fs.open_append(&self.path)?;
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        w.write_all(line.as_bytes())
            .map_err(|e| Error::io_msg(e.to_string()))?;
        w.flush().map_err(|e| Error::io_msg(e.to_string()))?;
        Ok(())
    }
}

/// stderr へ人間向けの一行を出す Log 実装（--verbose 用）
#[derive(Debug, Clone)]
pub struct StderrLog {
    min_level: LogLevel,
}

impl StderrLog {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

fn severity(level: LogLevel) -> u8 {
    match level {
        LogLevel::Error => 0,
        LogLevel::Warn => 1,
        LogLevel::Info => 2,
        LogLevel::Debug => 3,
    }
}

/// `[level] layer/kind: message key=value ...` 形式に整形する
pub fn format_human(record: &LogRecord) -> String {
    let mut line = format!("[{}]", record.level.as_str());
    match (&record.layer, &record.kind) {
        (Some(l), Some(k)) => line.push_str(&format!(" {}/{}:", l, k)),
        (Some(l), None) => line.push_str(&format!(" {}:", l)),
        (None, Some(k)) => line.push_str(&format!(" {}:", k)),
        (None, None) => {}
    }
    line.push(' ');
    line.push_str(&record.message);
    if let Some(fields) = &record.fields {
        for (k, v) in fields {
            match v {
                serde_json::Value::String(s) => line.push_str(&format!(" {}={}", k, s)),
                other => line.push_str(&format!(" {}={}", k, other)),
            }
        }
    }
    line
}

impl Log for StderrLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if severity(record.level) <= severity(self.min_level) {
            eprintln!("{}", format_human(record));
        }
        Ok(())
    }
}

/// 複数の Log へ同じレコードを流す。個々の失敗は握りつぶさず最初のエラーを返す。
pub struct CompositeLog {
    logs: Vec<Arc<dyn Log>>,
}

impl CompositeLog {
    pub fn new(logs: Vec<Arc<dyn Log>>) -> Self {
        Self { logs }
    }
}

impl Log for CompositeLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        let mut first_err = None;
        for log in &self.logs {
            if let Err(e) = log.log(record) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// 何も出力しない Log 実装（テスト用）
#[derive(Debug, Clone, Default)]
pub struct NoopLog;

impl Log for NoopLog {
    fn log(&self, _record: &LogRecord) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::StdFileSystem;

    #[test]
    fn test_noop_log() {
        let log = NoopLog;
        assert!(log.log(&LogRecord::new(LogLevel::Info, "test")).is_ok());
    }

    #[test]
    fn test_file_json_log_appends_lines_and_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("rollctx.jsonl");
        let log = FileJsonLog::new(Arc::new(StdFileSystem), &path);
        log.log(&LogRecord::new(LogLevel::Info, "first").layer("cli"))
            .unwrap();
        log.log(&LogRecord::new(LogLevel::Warn, "second").field("line", 3))
            .unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["level"], "warn");
        assert_eq!(second["fields"]["line"], 3);
    }

    #[test]
    fn test_format_human() {
        let rec = LogRecord::new(LogLevel::Warn, "summary fallback")
            .layer("adapter")
            .kind("summary")
            .field("reason", "timeout");
        assert_eq!(
            format_human(&rec),
            "[warn] adapter/summary: summary fallback reason=timeout"
        );
    }

    #[test]
    fn test_composite_log_reaches_all_and_reports_error() {
        struct Failing;
        impl Log for Failing {
            fn log(&self, _record: &LogRecord) -> Result<(), Error> {
                Err(Error::io_msg("disk full"))
            }
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jsonl");
        let file: Arc<dyn Log> = Arc::new(FileJsonLog::new(Arc::new(StdFileSystem), &path));
        let log = CompositeLog::new(vec![Arc::new(Failing), file]);
        assert!(log.log(&LogRecord::new(LogLevel::Info, "x")).is_err());
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"x\""));
    }
}
