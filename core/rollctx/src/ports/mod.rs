//! Ports & Adapters のポート定義
//!
//! - inbound: ドライバ（CLI）がアプリを呼び出すインターフェース
//! - outbound: アプリが外界（transcript ファイル・要約 API）を使うための trait

pub mod inbound;
pub mod outbound;
