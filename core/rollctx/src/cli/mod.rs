//! CLI（引数解析と結果の表示）

pub mod args;
pub mod report;

pub use args::{config_to_command, parse_args, print_completion, ParseOutcome};
