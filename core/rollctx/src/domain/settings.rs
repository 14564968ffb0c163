//! 実行設定（設定ファイル + コマンドライン上書きの解決結果）
//!
//! プロセス全体の可変グローバルは持たず、この値を各コンポーネントへ渡す。

use common::error::Error;
use std::path::PathBuf;

pub const DEFAULT_MAX_MESSAGES: usize = 200;
pub const DEFAULT_TRIM_FRACTION: f64 = 0.40;
pub const DEFAULT_BACKUP_KEEP_COUNT: usize = 10;
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_API_MODEL: &str = "mistralai/mistral-large-2512";
/// API キーを読む環境変数
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// trim の閾値と割合
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimSettings {
    max_messages: usize,
    trim_fraction: f64,
    generate_summaries: bool,
}

impl TrimSettings {
    /// `max_messages >= 1`、`0 <= trim_fraction < 1` を検証して作る
    pub fn new(
        max_messages: usize,
        trim_fraction: f64,
        generate_summaries: bool,
    ) -> Result<Self, Error> {
        if max_messages == 0 {
            return Err(Error::invalid_argument("max_messages must be at least 1"));
        }
        if !(0.0..1.0).contains(&trim_fraction) {
            return Err(Error::invalid_argument(format!(
                "trim_fraction must be in [0, 1), got {}",
                trim_fraction
            )));
        }
        Ok(Self {
            max_messages,
            trim_fraction,
            generate_summaries,
        })
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    pub fn trim_fraction(&self) -> f64 {
        self.trim_fraction
    }

    pub fn generate_summaries(&self) -> bool {
        self.generate_summaries
    }
}

impl Default for TrimSettings {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            trim_fraction: DEFAULT_TRIM_FRACTION,
            generate_summaries: true,
        }
    }
}

/// 要約 API の接続先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub key: Option<String>,
    pub url: String,
    pub model: String,
}

impl ApiSettings {
    /// キーと URL が揃っていれば API を呼べる
    pub fn is_configured(&self) -> bool {
        self.key.as_deref().map(|k| !k.is_empty()).unwrap_or(false) && !self.url.is_empty()
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            key: None,
            url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_API_MODEL.to_string(),
        }
    }
}

/// コマンドラインからの上書き値
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub max_messages: Option<usize>,
    pub trim_fraction: Option<f64>,
    pub no_summary: bool,
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub api_model: Option<String>,
}

/// 解決済みの設定一式
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// transcript 群の親ディレクトリ（例: ~/.claude/projects）
    pub projects_dir: PathBuf,
    /// (プロジェクト名, projects_dir 配下のフォルダ名)。設定ファイルに書かれた順。
    pub projects: Vec<(String, String)>,
    pub api: ApiSettings,
    pub trim: TrimSettings,
    pub backup_keep_count: usize,
    pub summary_custom_prompt: Option<String>,
}

impl Settings {
    /// プロジェクトのディレクトリ（未登録なら None）
    pub fn project_dir(&self, name: &str) -> Option<PathBuf> {
        self.projects
            .iter()
            .find(|(project, _)| project == name)
            .map(|(_, folder)| self.projects_dir.join(folder))
    }

    /// コマンドライン上書きを適用する（trim 値は再検証する）
    pub fn apply(mut self, overrides: &Overrides) -> Result<Self, Error> {
        self.trim = TrimSettings::new(
            overrides.max_messages.unwrap_or(self.trim.max_messages),
            overrides.trim_fraction.unwrap_or(self.trim.trim_fraction),
            self.trim.generate_summaries && !overrides.no_summary,
        )?;
        if let Some(key) = &overrides.api_key {
            self.api.key = Some(key.clone());
        }
        if let Some(url) = &overrides.api_url {
            self.api.url = url.clone();
        }
        if let Some(model) = &overrides.api_model {
            self.api.model = model.clone();
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            projects_dir: PathBuf::from("/p"),
            projects: vec![("Alpha".to_string(), "-home-alpha".to_string())],
            api: ApiSettings::default(),
            trim: TrimSettings::default(),
            backup_keep_count: DEFAULT_BACKUP_KEEP_COUNT,
            summary_custom_prompt: None,
        }
    }

    #[test]
    fn test_trim_settings_validation() {
        assert!(TrimSettings::new(5, 0.5, true).is_ok());
        assert!(TrimSettings::new(5, 0.0, true).is_ok());
        assert!(TrimSettings::new(0, 0.5, true).unwrap_err().is_usage());
        assert!(TrimSettings::new(5, 1.0, true).is_err());
        assert!(TrimSettings::new(5, -0.1, true).is_err());
        assert!(TrimSettings::new(5, f64::NAN, true).is_err());
    }

    #[test]
    fn test_project_dir() {
        let s = settings();
        assert_eq!(s.project_dir("Alpha"), Some(PathBuf::from("/p/-home-alpha")));
        assert_eq!(s.project_dir("Beta"), None);
    }

    #[test]
    fn test_apply_overrides() {
        let s = settings()
            .apply(&Overrides {
                max_messages: Some(50),
                trim_fraction: Some(0.25),
                no_summary: true,
                api_key: Some("k".to_string()),
                api_url: None,
                api_model: Some("m".to_string()),
            })
            .unwrap();
        assert_eq!(s.trim.max_messages(), 50);
        assert_eq!(s.trim.trim_fraction(), 0.25);
        assert!(!s.trim.generate_summaries());
        assert_eq!(s.api.key.as_deref(), Some("k"));
        assert_eq!(s.api.url, DEFAULT_API_URL);
        assert_eq!(s.api.model, "m");
        assert!(s.api.is_configured());
    }

    #[test]
    fn test_apply_rejects_bad_fraction() {
        let err = settings()
            .apply(&Overrides {
                trim_fraction: Some(1.5),
                ..Overrides::default()
            })
            .unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_api_not_configured_without_key() {
        assert!(!ApiSettings::default().is_configured());
        let api = ApiSettings {
            key: Some(String::new()),
            ..ApiSettings::default()
        };
        assert!(!api.is_configured());
    }
}
