//! trim 1 回分の結果（CLI 表示・ログ用のデータ）

use std::path::{Path, PathBuf};

/// 境界レコードに載せた要約の出どころ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySource {
    /// LLM API の応答
    Remote,
    /// 決定的な要約
    Fallback,
}

impl SummarySource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Fallback => "fallback",
        }
    }
}

/// trim の結末
#[derive(Debug, Clone, PartialEq)]
pub enum TrimOutcome {
    /// 件数が閾値以下
    UnderThreshold,
    /// 安全な切断位置が 0 で archive するものが無い
    NothingToArchive,
    /// dry-run。archive 範囲の先頭・末尾タイムスタンプ
    DryRun {
        from: Option<String>,
        to: Option<String>,
    },
    Trimmed {
        backup_path: PathBuf,
        summary_source: SummarySource,
    },
    /// 書き戻し失敗（元ファイルは無傷、バックアップは作成済み）
    SaveFailed { backup_path: PathBuf, error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrimResult {
    pub project: String,
    pub original_count: usize,
    pub messages_removed: usize,
    /// trim 後（dry-run では trim した場合）の件数
    pub final_count: usize,
    pub outcome: TrimOutcome,
}

impl TrimResult {
    /// 何もしなかった結果
    pub fn unchanged(project: &str, count: usize, outcome: TrimOutcome) -> Self {
        Self {
            project: project.to_string(),
            original_count: count,
            messages_removed: 0,
            final_count: count,
            outcome,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self.outcome {
            TrimOutcome::UnderThreshold => "under threshold",
            TrimOutcome::NothingToArchive => "nothing to archive",
            TrimOutcome::DryRun { .. } => "dry run",
            TrimOutcome::Trimmed { .. } => "trimmed",
            TrimOutcome::SaveFailed { .. } => "save failed",
        }
    }

    /// transcript が実際に書き換わったか
    pub fn trimmed(&self) -> bool {
        matches!(self.outcome, TrimOutcome::Trimmed { .. })
    }

    pub fn backup_path(&self) -> Option<&Path> {
        match &self.outcome {
            TrimOutcome::Trimmed { backup_path, .. }
            | TrimOutcome::SaveFailed { backup_path, .. } => Some(backup_path.as_path()),
            _ => None,
        }
    }

    pub fn summary_source(&self) -> Option<SummarySource> {
        match self.outcome {
            TrimOutcome::Trimmed { summary_source, .. } => Some(summary_source),
            _ => None,
        }
    }
}
