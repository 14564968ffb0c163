//! 設定ファイル（config.json）の読込と Settings への解決
//!
//! 探索順: `--config` 指定 → $ROLLCTX_HOME/config.json → $XDG_CONFIG_HOME/rollctx/config.json
//! → ~/.config/rollctx/config.json。どれも無ければ既定値。

use crate::domain::settings::{
    API_KEY_ENV, DEFAULT_API_MODEL, DEFAULT_API_URL, DEFAULT_BACKUP_KEEP_COUNT,
    DEFAULT_MAX_MESSAGES, DEFAULT_TRIM_FRACTION,
};
use crate::domain::{ApiSettings, Settings, TrimSettings};
use common::error::Error;
use common::ports::outbound::{EnvResolver, FileSystem};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const APP_NAME: &str = "rollctx";
/// 設定ディレクトリを直接指定する環境変数
pub const HOME_VAR: &str = "ROLLCTX_HOME";
const DEFAULT_PROJECTS_DIR: &str = "~/.claude/projects";

/// config.json の生の形。欠けたキーは既定値。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    claude_projects_dir: Option<String>,
    /// 書かれた順を保つため Map のまま受ける
    projects: Map<String, Value>,
    api_key: Option<String>,
    api_url: Option<String>,
    api_model: Option<String>,
    max_messages: Option<usize>,
    trim_fraction: Option<f64>,
    backup_keep_count: Option<usize>,
    generate_summaries: Option<bool>,
    summary_custom_prompt: Option<String>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

/// `projects` の値はフォルダ名の文字列のみ
fn project_list(raw: Map<String, Value>) -> Result<Vec<(String, String)>, Error> {
    raw.into_iter()
        .map(|(name, folder)| match folder {
            Value::String(folder) => Ok((name, folder)),
            other => Err(Error::json(format!(
                "Invalid config: projects.{} must be a string, got {}",
                name, other
            ))),
        })
        .collect()
}

/// 設定ファイルを探して読み、Settings を組み立てる
pub struct ConfigLoader {
    fs: Arc<dyn FileSystem>,
    env: Arc<dyn EnvResolver>,
}

impl ConfigLoader {
    pub fn new(fs: Arc<dyn FileSystem>, env: Arc<dyn EnvResolver>) -> Self {
        Self { fs, env }
    }

    /// 読むべき設定ファイル。明示指定はそのまま返し、探索で見つからなければ None。
    pub fn resolve_path(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        let dirs = self.env.resolve_dirs(APP_NAME, HOME_VAR).ok()?;
        let path = dirs.config_file();
        self.fs.exists(&path).then_some(path)
    }

    pub fn load(&self, explicit: Option<&Path>) -> Result<Settings, Error> {
        let raw = match self.resolve_path(explicit) {
            Some(path) => {
                let body = self.fs.read_to_string(&path)?;
                serde_json::from_str::<ConfigFile>(&body).map_err(|e| {
                    Error::json(format!("Invalid config '{}': {}", path.display(), e))
                })?
            }
            None => ConfigFile::default(),
        };
        self.resolve(raw)
    }

    /// `~` / `~/...` をホームディレクトリに展開する
    fn expand_home(&self, raw: &str) -> Result<PathBuf, Error> {
        if raw == "~" {
            return self.env.home_dir();
        }
        match raw.strip_prefix("~/") {
            Some(rest) => Ok(self.env.home_dir()?.join(rest)),
            None => Ok(PathBuf::from(raw)),
        }
    }

    fn resolve(&self, raw: ConfigFile) -> Result<Settings, Error> {
        let projects_dir = self.expand_home(
            raw.claude_projects_dir
                .as_deref()
                .unwrap_or(DEFAULT_PROJECTS_DIR),
        )?;

        let trim = TrimSettings::new(
            raw.max_messages.unwrap_or(DEFAULT_MAX_MESSAGES),
            raw.trim_fraction.unwrap_or(DEFAULT_TRIM_FRACTION),
            raw.generate_summaries.unwrap_or(true),
        )?;

        let backup_keep_count = raw.backup_keep_count.unwrap_or(DEFAULT_BACKUP_KEEP_COUNT);
        if backup_keep_count == 0 {
            return Err(Error::invalid_argument(
                "backup_keep_count must be at least 1",
            ));
        }

        let api = ApiSettings {
            key: non_empty(raw.api_key).or_else(|| self.env.var(API_KEY_ENV)),
            url: non_empty(raw.api_url).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model: non_empty(raw.api_model).unwrap_or_else(|| DEFAULT_API_MODEL.to_string()),
        };

        Ok(Settings {
            projects_dir,
            projects: project_list(raw.projects)?,
            api,
            trim,
            backup_keep_count,
            summary_custom_prompt: non_empty(raw.summary_custom_prompt),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::adapter::{MapEnvResolver, StdFileSystem};

    fn loader(vars: &[(&str, &str)]) -> ConfigLoader {
        ConfigLoader::new(
            Arc::new(StdFileSystem),
            Arc::new(MapEnvResolver::new(vars.iter().copied())),
        )
    }

    #[test]
    fn test_defaults_without_config_file() {
        let home = tempfile::tempdir().unwrap();
        let home_str = home.path().to_str().unwrap();
        let s = loader(&[("HOME", home_str)]).load(None).unwrap();
        assert_eq!(s.projects_dir, home.path().join(".claude/projects"));
        assert!(s.projects.is_empty());
        assert_eq!(s.trim, TrimSettings::default());
        assert_eq!(s.backup_keep_count, DEFAULT_BACKUP_KEEP_COUNT);
        assert_eq!(s.api, ApiSettings::default());
        assert_eq!(s.summary_custom_prompt, None);
    }

    #[test]
    fn test_lookup_prefers_rollctx_home() {
        let home = tempfile::tempdir().unwrap();
        let custom = tempfile::tempdir().unwrap();
        let xdg = home.path().join("xdg");
        std::fs::create_dir_all(xdg.join("rollctx")).unwrap();
        std::fs::write(xdg.join("rollctx/config.json"), r#"{"max_messages": 30}"#).unwrap();
        std::fs::write(custom.path().join("config.json"), r#"{"max_messages": 40}"#).unwrap();

        let vars = [
            ("HOME", home.path().to_str().unwrap()),
            ("XDG_CONFIG_HOME", xdg.to_str().unwrap()),
        ];
        assert_eq!(loader(&vars).load(None).unwrap().trim.max_messages(), 30);

        let vars = [
            ("HOME", home.path().to_str().unwrap()),
            ("XDG_CONFIG_HOME", xdg.to_str().unwrap()),
            ("ROLLCTX_HOME", custom.path().to_str().unwrap()),
        ];
        assert_eq!(loader(&vars).load(None).unwrap().trim.max_messages(), 40);
    }

    #[test]
    fn test_full_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(
            &path,
            r#"{
                "claude_projects_dir": "~/cp",
                "projects": {"Alpha": "-home-alpha"},
                "api_key": "sk-test",
                "api_model": "m",
                "max_messages": 120,
                "trim_fraction": 0.25,
                "backup_keep_count": 3,
                "generate_summaries": false,
                "summary_custom_prompt": "Summarize {project_name}",
                "unknown_key": 1
            }"#,
        )
        .unwrap();
        let s = loader(&[("HOME", "/home/u"), (API_KEY_ENV, "env-key")])
            .load(Some(&path))
            .unwrap();
        assert_eq!(s.projects_dir, PathBuf::from("/home/u/cp"));
        assert_eq!(s.project_dir("Alpha"), Some(PathBuf::from("/home/u/cp/-home-alpha")));
        assert_eq!(s.api.key.as_deref(), Some("sk-test"));
        assert_eq!(s.api.url, DEFAULT_API_URL);
        assert_eq!(s.api.model, "m");
        assert_eq!(s.trim.max_messages(), 120);
        assert_eq!(s.trim.trim_fraction(), 0.25);
        assert!(!s.trim.generate_summaries());
        assert_eq!(s.backup_keep_count, 3);
        assert_eq!(s.summary_custom_prompt.as_deref(), Some("Summarize {project_name}"));
    }

    #[test]
    fn test_projects_keep_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(
            &path,
            r#"{"projects": {"Zeta": "-z", "Alpha": "-a", "Mid": "-m"}}"#,
        )
        .unwrap();
        let s = loader(&[("HOME", "/h")]).load(Some(&path)).unwrap();
        let names: Vec<_> = s.projects.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["Zeta", "Alpha", "Mid"]);

        std::fs::write(&path, r#"{"projects": {"Alpha": 3}}"#).unwrap();
        assert!(matches!(
            loader(&[("HOME", "/h")]).load(Some(&path)).unwrap_err(),
            Error::Json(_)
        ));
    }

    #[test]
    fn test_api_key_from_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(&path, r#"{"api_key": "", "claude_projects_dir": "/abs"}"#).unwrap();
        let s = loader(&[(API_KEY_ENV, "env-key")]).load(Some(&path)).unwrap();
        assert_eq!(s.api.key.as_deref(), Some("env-key"));
        assert_eq!(s.projects_dir, PathBuf::from("/abs"));
    }

    #[test]
    fn test_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        let l = loader(&[("HOME", "/h")]);

        std::fs::write(&path, r#"{"trim_fraction": 1.0}"#).unwrap();
        assert!(l.load(Some(&path)).unwrap_err().is_usage());

        std::fs::write(&path, r#"{"backup_keep_count": 0}"#).unwrap();
        assert!(l.load(Some(&path)).unwrap_err().is_usage());

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(l.load(Some(&path)).unwrap_err(), Error::Json(_)));
    }

    #[test]
    fn test_missing_explicit_config_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = loader(&[("HOME", "/h")])
            .load(Some(&dir.path().join("none.json")))
            .unwrap_err();
        assert_eq!(err.exit_code(), 74);
    }
}
