//! 時刻取得 Outbound ポート

use chrono::{DateTime, Utc};

/// 時刻取得の抽象
///
/// 実装は `common::adapter::StdClock` やテスト用の固定時刻など。
pub trait Clock: Send + Sync {
    /// 現在時刻をミリ秒（Unix epoch）で返す
    fn now_ms(&self) -> u64;

    /// 現在時刻を UTC の DateTime で返す
    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(self.now_ms() as i64).unwrap_or_default()
    }
}
