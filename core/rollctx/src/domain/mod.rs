//! rollctx 固有のドメイン型（型と不変条件）

pub mod boundary;
pub mod command;
pub mod content_block;
pub mod dependency;
pub mod message;
pub mod project;
pub mod settings;
pub mod synopsis;
pub mod trim_result;

pub use command::{ProjectSelection, RollCommand};
pub use dependency::DependencyIndex;
pub use message::Message;
pub use project::ProjectRef;
pub use settings::{ApiSettings, Overrides, Settings, TrimSettings};
pub use trim_result::{SummarySource, TrimOutcome, TrimResult};
