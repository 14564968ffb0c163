//! 処理対象プロジェクトの参照

use std::path::PathBuf;

/// 設定上のプロジェクト 1 件（名前・ディレクトリ・明示ファイル）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub name: String,
    /// transcript を探すディレクトリ
    pub dir: PathBuf,
    /// 指定されていれば自動検出せずこのファイルを使う
    pub file_override: Option<PathBuf>,
}

impl ProjectRef {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            file_override: None,
        }
    }

    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file_override = file;
        self
    }
}
