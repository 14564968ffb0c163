//! エラーハンドリング
//!
//! 全レイヤー共通のエラー型。CLI は `exit_code()` で終了コードへ変換する。

/// エラー型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// 引数・設定値の不正（usage を表示する）
    #[error("{0}")]
    InvalidArgument(String),
    /// ファイル I/O 失敗
    #[error("{0}")]
    Io(String),
    /// 対象が存在しない（transcript / project 等）
    #[error("Not found: {0}")]
    NotFound(String),
    /// 他プロセスが排他ロック中
    #[error("Locked: {0}")]
    Locked(String),
    /// JSONL の 1 行が解釈できない
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    /// 書き戻し失敗（元ファイルはそのまま）
    #[error("Persist failed: {0}")]
    Persist(String),
    /// HTTP 通信・プロトコルエラー
    #[error("{0}")]
    Http(String),
    /// HTTP タイムアウト
    #[error("Timed out: {0}")]
    Timeout(String),
    /// JSON のシリアライズ／デシリアライズ失敗
    #[error("{0}")]
    Json(String),
    /// 環境変数の不足
    #[error("{0}")]
    Env(String),
    /// その他の内部エラー
    #[error("{0}")]
    System(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn locked(msg: impl Into<String>) -> Self {
        Self::Locked(msg.into())
    }

    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: msg.into(),
        }
    }

    pub fn persist(msg: impl Into<String>) -> Self {
        Self::Persist(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Self::Json(msg.into())
    }

    pub fn env(msg: impl Into<String>) -> Self {
        Self::Env(msg.into())
    }

    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// usage を併せて表示すべきエラーか
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// sysexits.h に寄せた終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => 64,
            Self::Parse { .. } | Self::Json(_) => 65,
            Self::NotFound(_) => 66,
            Self::Http(_) | Self::Timeout(_) => 69,
            Self::Env(_) | Self::System(_) => 70,
            Self::Io(_) | Self::Persist(_) => 74,
            Self::Locked(_) => 75,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_helpers() {
        let err = Error::invalid_argument("test");
        assert_eq!(err.to_string(), "test");
        assert_eq!(err.exit_code(), 64);
        assert!(err.is_usage());

        let err = Error::system("test");
        assert_eq!(err.exit_code(), 70);
        assert!(!err.is_usage());
    }

    #[test]
    fn test_parse_error_message_has_line() {
        let err = Error::parse(3, "expected value");
        assert_eq!(err.to_string(), "Parse error at line 3: expected value");
        assert_eq!(err.exit_code(), 65);
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(ref m) if m == "boom"));
    }
}
