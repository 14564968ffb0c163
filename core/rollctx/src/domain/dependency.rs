//! tool invocation / response の依存関係インデックスと安全な切断位置の計算
//!
//! 切断位置 `c` より前（archive 側）にある invocation へ、`c` 以降（残す側）の
//! response が参照を残さないことを保証する。

use super::message::Message;
use std::collections::HashMap;

/// メッセージ列 1 本分の依存関係インデックス
#[derive(Debug, Clone, Default)]
pub struct DependencyIndex {
    len: usize,
    id_to_index: HashMap<String, usize>,
    invocation_to_index: HashMap<String, usize>,
    /// index → その index のメッセージが答える invocation id
    response_index_to_invocation: HashMap<usize, String>,
}

impl DependencyIndex {
    /// 列を 1 回走査して 3 つの対応表を作る。同じ id が複数あれば後のものが勝つ。
    pub fn build(messages: &[Message]) -> Self {
        let mut index = Self {
            len: messages.len(),
            ..Self::default()
        };
        for (idx, msg) in messages.iter().enumerate() {
            index.id_to_index.insert(msg.id().to_string(), idx);
            for invocation_id in msg.invocation_ids() {
                index
                    .invocation_to_index
                    .insert(invocation_id.clone(), idx);
            }
            if let Some(invocation_id) = msg.response_of() {
                index
                    .response_index_to_invocation
                    .insert(idx, invocation_id.to_string());
            }
        }
        index
    }

    /// id のメッセージが `cut` で切った残す側にあるか。
    /// 同じ id が複数あっても最後の位置で判定すれば「残す側に 1 件でもあるか」と一致する。
    pub fn survives_cut(&self, id: &str, cut: usize) -> bool {
        self.id_to_index.get(id).map_or(false, |&idx| idx >= cut)
    }

    pub fn invocation_index(&self, invocation_id: &str) -> Option<usize> {
        self.invocation_to_index.get(invocation_id).copied()
    }

    /// `idx` のメッセージが response なら、その invocation を出したメッセージの index。
    /// invocation が列内に見つからない response は None（切り離しても孤児にならない）。
    pub fn invocation_index_for_response(&self, idx: usize) -> Option<usize> {
        self.response_index_to_invocation
            .get(&idx)
            .and_then(|invocation_id| self.invocation_index(invocation_id))
    }

    /// `target` 以上で、残す側の response が archive 側の invocation を参照しない最小の index。
    ///
    /// 安全な位置が無ければ `len()` を返す（全件 archive）。戻り値が `len()` 未満とは限らない。
    /// `target >= len()` のときは `target` をそのまま返す。
    ///
    /// 衝突を見つけるたびに `c = 衝突 index + 1` として再走査する定義と同じ結果を、
    /// 前方 1 パスで求める（再走査は常に衝突の直後から始まるため）。
    pub fn find_safe_cut(&self, target: usize) -> usize {
        let mut cut = target;
        for idx in target..self.len {
            if let Some(invocation_idx) = self.invocation_index_for_response(idx) {
                if invocation_idx < cut {
                    cut = idx + 1;
                }
            }
        }
        cut
    }
}
