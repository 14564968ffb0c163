//! IdGenerator の標準実装（UUID v4）

use crate::ports::outbound::IdGenerator;

/// ランダムな UUID v4 を返す標準実装
#[derive(Debug, Clone, Default)]
pub struct StdIdGenerator;

impl IdGenerator for StdIdGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// 常に同じ ID を返す実装（テスト用）
#[derive(Debug, Clone)]
pub struct FixedIdGenerator(pub String);

impl IdGenerator for FixedIdGenerator {
    fn next_id(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_shape_and_uniqueness() {
        let gen = StdIdGenerator;
        let a = gen.next_id();
        let b = gen.next_id();
        assert_eq!(a.len(), 36);
        assert_eq!(a.matches('-').count(), 4);
        assert_ne!(a, b);
    }
}
