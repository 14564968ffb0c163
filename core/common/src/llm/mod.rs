//! LLM プロバイダの実装

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
