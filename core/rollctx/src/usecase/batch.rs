//! 設定済みプロジェクト群への status / trim の適用
//!
//! プロジェクトごとの結果をデータとして返す。表示は CLI の責務。
//! 1 件の失敗で残りのプロジェクトの処理は止めない。

use super::trim::TrimUseCase;
use crate::domain::synopsis::date_or_unknown;
use crate::domain::{ProjectRef, ProjectSelection, Settings, TrimOutcome, TrimResult};
use crate::ports::outbound::TranscriptStore;
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// trim 1 プロジェクト分の結末
#[derive(Debug)]
pub enum ProjectOutcome {
    /// 設定に無いプロジェクト名
    UnknownProject,
    NotFound,
    Locked(PathBuf),
    /// 読込またはバックアップに失敗（transcript は未変更）
    Failed { path: PathBuf, error: Error },
    Done {
        path: PathBuf,
        loaded: usize,
        skipped_lines: usize,
        result: TrimResult,
    },
}

#[derive(Debug)]
pub struct ProjectReport {
    pub name: String,
    pub outcome: ProjectOutcome,
}

impl ProjectReport {
    /// 終了コードを 1 にすべき失敗か
    pub fn is_failure(&self) -> bool {
        match &self.outcome {
            ProjectOutcome::Failed { .. } => true,
            ProjectOutcome::Done { result, .. } => {
                matches!(result.outcome, TrimOutcome::SaveFailed { .. })
            }
            _ => false,
        }
    }
}

/// status 1 プロジェクト分
#[derive(Debug)]
pub enum StatusState {
    UnknownProject,
    NotFound,
    Locked,
    Failed(Error),
    Loaded {
        count: usize,
        /// 先頭・末尾メッセージの日付（タイムスタンプが無ければ "unknown"）
        first: String,
        last: String,
        needs_trim: bool,
    },
}

#[derive(Debug)]
pub struct StatusReport {
    pub name: String,
    pub state: StatusState,
}

impl StatusReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.state, StatusState::Failed(_))
    }
}

/// rollctx のユースケース
pub struct RollingContextUseCase {
    settings: Settings,
    store: Arc<dyn TranscriptStore>,
    trim: TrimUseCase,
    log: Arc<dyn Log>,
}

impl RollingContextUseCase {
    pub fn new(
        settings: Settings,
        store: Arc<dyn TranscriptStore>,
        trim: TrimUseCase,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            settings,
            store,
            trim,
            log,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn log(&self, record: LogRecord) {
        let _ = self.log.log(&record.layer("usecase").kind("project"));
    }

    /// 選択に対応するプロジェクト名（All は設定順）
    pub fn project_names(&self, selection: &ProjectSelection) -> Vec<String> {
        match selection {
            ProjectSelection::All => self
                .settings
                .projects
                .iter()
                .map(|(name, _)| name.clone())
                .collect(),
            ProjectSelection::Named(name) => vec![name.clone()],
        }
    }

    /// `--file` の解決。相対パスは対象が 1 件のときだけそのプロジェクトのディレクトリ基準。
    fn resolve_file(&self, file: Option<&Path>, dir: &Path, single: bool) -> Option<PathBuf> {
        file.map(|f| {
            if f.is_relative() && single {
                dir.join(f)
            } else {
                f.to_path_buf()
            }
        })
    }

    fn project_ref(&self, name: &str, file: Option<&Path>, single: bool) -> Option<ProjectRef> {
        let dir = self.settings.project_dir(name)?;
        let file_override = self.resolve_file(file, &dir, single);
        Some(ProjectRef::new(name, dir).with_file(file_override))
    }

    /// ロック中でなければ transcript のパスを返す
    fn locate(&self, project: &ProjectRef) -> Result<PathBuf, LocateError> {
        let path = self.store.find(project).ok_or(LocateError::NotFound)?;
        if self.store.is_locked(&path) {
            return Err(LocateError::Locked(path));
        }
        Ok(path)
    }

    pub fn status(&self, selection: &ProjectSelection, file: Option<&Path>) -> Vec<StatusReport> {
        let names = self.project_names(selection);
        let single = names.len() == 1;
        names
            .into_iter()
            .map(|name| {
                let state = self.status_one(&name, file, single);
                StatusReport { name, state }
            })
            .collect()
    }

    fn status_one(&self, name: &str, file: Option<&Path>, single: bool) -> StatusState {
        let Some(project) = self.project_ref(name, file, single) else {
            return StatusState::UnknownProject;
        };
        let path = match self.locate(&project) {
            Ok(path) => path,
            Err(LocateError::NotFound) => return StatusState::NotFound,
            Err(LocateError::Locked(_)) => return StatusState::Locked,
        };
        match self.store.load(&path) {
            Ok(transcript) => {
                let messages = &transcript.messages;
                StatusState::Loaded {
                    count: messages.len(),
                    first: date_or_unknown(messages.first().map(|m| m.timestamp())),
                    last: date_or_unknown(messages.last().map(|m| m.timestamp())),
                    needs_trim: self.trim.needs_trim(messages),
                }
            }
            Err(e) => StatusState::Failed(e),
        }
    }

    pub fn run_trim(
        &self,
        selection: &ProjectSelection,
        file: Option<&Path>,
        dry_run: bool,
    ) -> Vec<ProjectReport> {
        let names = self.project_names(selection);
        let single = names.len() == 1;
        names
            .into_iter()
            .map(|name| {
                let outcome = self.trim_one(&name, file, single, dry_run);
                self.log_outcome(&name, &outcome);
                ProjectReport { name, outcome }
            })
            .collect()
    }

    fn trim_one(
        &self,
        name: &str,
        file: Option<&Path>,
        single: bool,
        dry_run: bool,
    ) -> ProjectOutcome {
        let Some(project) = self.project_ref(name, file, single) else {
            return ProjectOutcome::UnknownProject;
        };
        let path = match self.locate(&project) {
            Ok(path) => path,
            Err(LocateError::NotFound) => return ProjectOutcome::NotFound,
            Err(LocateError::Locked(path)) => return ProjectOutcome::Locked(path),
        };
        let mut transcript = match self.store.load(&path) {
            Ok(t) => t,
            Err(error) => return ProjectOutcome::Failed { path, error },
        };
        let loaded = transcript.messages.len();
        let skipped_lines = transcript.skipped_lines;
        match self.trim.trim(name, &mut transcript, dry_run) {
            Ok(result) => ProjectOutcome::Done {
                path,
                loaded,
                skipped_lines,
                result,
            },
            Err(error) => ProjectOutcome::Failed { path, error },
        }
    }

    fn log_outcome(&self, name: &str, outcome: &ProjectOutcome) {
        let record = match outcome {
            ProjectOutcome::UnknownProject => {
                LogRecord::new(LogLevel::Warn, "unknown project")
            }
            ProjectOutcome::NotFound => LogRecord::new(LogLevel::Info, "no transcript found"),
            ProjectOutcome::Locked(path) => LogRecord::new(LogLevel::Info, "transcript locked")
                .field("path", path.display().to_string()),
            ProjectOutcome::Failed { path, error } => {
                LogRecord::new(LogLevel::Error, format!("project failed: {}", error))
                    .field("path", path.display().to_string())
            }
            ProjectOutcome::Done { path, result, .. } => {
                let message = if result.trimmed() {
                    "project trimmed"
                } else {
                    "project processed"
                };
                let mut record = LogRecord::new(LogLevel::Info, message)
                    .field("path", path.display().to_string())
                    .field("reason", result.reason())
                    .field("original_count", result.original_count)
                    .field("final_count", result.final_count);
                if let Some(backup) = result.backup_path() {
                    record = record.field("backup", backup.display().to_string());
                }
                if let Some(source) = result.summary_source() {
                    record = record.field("summary", source.as_str());
                }
                record
            }
        };
        self.log(record.field("project", name));
    }
}

enum LocateError {
    NotFound,
    Locked(PathBuf),
}
