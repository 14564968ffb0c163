//! rollctx コマンドの enum（Command Pattern）
//!
//! 状態表示 vs trim 実行（dry-run 含む）の分岐を enum で明示する。

use std::path::PathBuf;

/// 処理対象プロジェクトの選び方
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectSelection {
    /// 設定にある全プロジェクト
    All,
    /// 名前で 1 件
    Named(String),
}

/// rollctx の実行モード
#[derive(Debug, Clone, PartialEq)]
pub enum RollCommand {
    /// ヘルプ表示
    Help,
    /// transcript の件数・期間を表示
    Status {
        selection: ProjectSelection,
        file: Option<PathBuf>,
    },
    /// trim（dry_run なら報告のみ）
    Trim {
        selection: ProjectSelection,
        file: Option<PathBuf>,
        dry_run: bool,
    },
}
