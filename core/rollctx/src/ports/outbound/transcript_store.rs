//! transcript ファイルの読み書き Outbound ポート

use crate::domain::{Message, ProjectRef};
use common::error::Error;
use std::path::{Path, PathBuf};

/// 読み込んだ transcript
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub path: PathBuf,
    /// ファイル上の順序（追記順）のまま
    pub messages: Vec<Message>,
    /// 解釈できずに読み飛ばした行数
    pub skipped_lines: usize,
}

/// transcript の検出・ロック確認・読込・バックアップ・保存
pub trait TranscriptStore: Send + Sync {
    /// プロジェクトの transcript を探す（無ければ None）
    fn find(&self, project: &ProjectRef) -> Option<PathBuf>;

    /// 他プロセスが排他ロック中か（判定できない場合もロック中とみなす）
    fn is_locked(&self, path: &Path) -> bool;

    /// 全行を読み込む。解釈できない行は警告して読み飛ばす。
    fn load(&self, path: &Path) -> Result<Transcript, Error>;

    /// 現在のファイルを丸ごと複製し、古いバックアップを間引く。複製先を返す。
    fn backup(&self, path: &Path) -> Result<PathBuf, Error>;

    /// 列を書き戻す。失敗時は元のファイルが残る。
    fn save(&self, path: &Path, messages: &[Message]) -> Result<(), Error>;
}
