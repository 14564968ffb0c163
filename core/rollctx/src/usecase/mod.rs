//! ユースケース層（ポート経由でのみ I/O を行う）

pub mod batch;
pub mod trim;

pub use batch::{ProjectOutcome, ProjectReport, RollingContextUseCase, StatusReport, StatusState};
pub use trim::{TrimDeps, TrimUseCase};
