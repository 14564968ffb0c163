//! Outbound ポート: アプリが外界（FS・時刻・環境変数・ログ・ロック・LLM）を使うための trait

pub mod clock;
pub mod env_resolver;
pub mod file_lock;
pub mod fs;
pub mod id_generator;
pub mod llm_provider;
pub mod log;

pub use clock::Clock;
pub use env_resolver::EnvResolver;
pub use file_lock::{FileLock, LockState};
pub use fs::{FileMetadata, FileSystem};
pub use id_generator::IdGenerator;
pub use llm_provider::LlmProvider;
pub use log::{now_iso8601, Log, LogLevel, LogRecord};
