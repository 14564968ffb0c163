//! 環境変数解決 Outbound ポート
//!
//! 設定ファイル・ログファイルのパスを環境変数から解決する。
//! usecase / adapter はこの trait 経由でのみ環境変数にアクセスする。

use crate::domain::Dirs;
use crate::error::Error;
use std::path::PathBuf;

/// 環境変数解決抽象（Outbound ポート）
///
/// 実装は `common::adapter::StdEnvResolver` やテスト用のモックなど。
pub trait EnvResolver: Send + Sync {
    /// 任意の環境変数（空文字は未設定扱い）
    fn var(&self, name: &str) -> Option<String>;

    /// $HOME
    fn home_dir(&self) -> Result<PathBuf, Error> {
        self.var("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| Error::env("HOME is not set"))
    }

    /// アプリ名 `app` の config / state ディレクトリを解決する
    ///
    /// 優先順位（config）:
    /// 1. `home_var`（例: ROLLCTX_HOME）が設定されていればそのディレクトリ
    /// 2. $XDG_CONFIG_HOME/<app>
    /// 3. $HOME/.config/<app>
    ///
    /// state は $XDG_STATE_HOME/<app>、なければ $HOME/.local/state/<app>。
    fn resolve_dirs(&self, app: &str, home_var: &str) -> Result<Dirs, Error> {
        let config_dir = match self.var(home_var) {
            Some(home) => PathBuf::from(home),
            None => match self.var("XDG_CONFIG_HOME") {
                Some(xdg) => PathBuf::from(xdg).join(app),
                None => self.home_dir()?.join(".config").join(app),
            },
        };
        let state_dir = match self.var("XDG_STATE_HOME") {
            Some(xdg) => PathBuf::from(xdg).join(app),
            None => self.home_dir()?.join(".local").join("state").join(app),
        };
        Ok(Dirs {
            config_dir,
            state_dir,
        })
    }
}
