//! 標準環境変数解決実装（std::env を委譲）

use crate::ports::outbound::EnvResolver;
use std::collections::HashMap;
use std::env;

/// 標準環境変数解決実装
#[derive(Debug, Clone, Default)]
pub struct StdEnvResolver;

impl EnvResolver for StdEnvResolver {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok().filter(|s| !s.is_empty())
    }
}

/// 固定の変数表から引く実装（テスト用。プロセス環境を汚さない）
#[derive(Debug, Clone, Default)]
pub struct MapEnvResolver {
    vars: HashMap<String, String>,
}

impl MapEnvResolver {
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvResolver for MapEnvResolver {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).filter(|s| !s.is_empty()).cloned()
    }
}
