//! 結合テスト（ポートへスタブを注入してユースケースを通しで動かす）

mod support;
