//! アダプター（Outbound ポートの標準実装）
//!
//! usecase はポートの trait 経由でのみファイル・時刻・環境変数・ロック・ログに触れる。
//! 実装は標準実装（Std*）やテスト用の固定実装を注入する。

pub mod file_json_log;
pub mod std_clock;
pub mod std_env_resolver;
pub mod std_file_lock;
pub mod std_fs;
pub mod std_id_generator;

pub use crate::ports::outbound::{FileMetadata, FileSystem};
pub use file_json_log::{CompositeLog, FileJsonLog, NoopLog, StderrLog};
pub use std_clock::{FixedClock, StdClock};
pub use std_env_resolver::{MapEnvResolver, StdEnvResolver};
pub use std_file_lock::StdFileLock;
pub use std_fs::StdFileSystem;
pub use std_id_generator::{FixedIdGenerator, StdIdGenerator};
