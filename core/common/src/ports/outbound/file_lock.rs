//! ファイルロック Outbound ポート
//!
//! 他プロセスが書き込み中のファイルを検知するための能力。
//! プラットフォームごとの実装は adapter 側に置き、usecase は結果だけを見る。

use crate::error::Error;
use std::path::Path;

/// 排他ロックの試行結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// ロックを取得できた（取得後すぐに解放済み）
    Held,
    /// 他プロセスが保持している
    Busy,
}

/// 非ブロッキングの排他ロック試行
pub trait FileLock: Send + Sync {
    /// 排他ロックを試み、取れたら即座に解放して `Held` を返す。
    /// ファイルを開けない場合は Err。
    fn try_exclusive_lock(&self, path: &Path) -> Result<LockState, Error>;
}
