//! Inbound ポート: ドライバ（CLI）がアプリを呼び出すインターフェース

use crate::domain::RollCommand;
use common::error::Error;

/// rollctx アプリケーションを実行する Inbound ポート
///
/// main はこの trait を実装した Runner の run を呼び出し、終了コードを受け取る。
pub trait UseCaseRunner {
    fn run(&self, command: RollCommand) -> Result<i32, Error>;
}
