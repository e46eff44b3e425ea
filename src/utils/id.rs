use rand::RngCore;
use rand::rngs::OsRng;
use uuid::{Builder, Uuid};

use crate::error::IdError;

/// 会话 ID 生成器
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Result<String, IdError>;
}

/// 基于系统熵源的 v4 UUID，熵源失败时返回错误而不是 panic
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> Result<String, IdError> {
        let mut bytes = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| IdError(e.to_string()))?;
        let id: Uuid = Builder::from_random_bytes(bytes).into_uuid();
        Ok(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generates_v4_uuids() {
        let id = UuidGenerator.generate().unwrap();
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn ids_do_not_repeat() {
        let ids: HashSet<String> = (0..1_000)
            .map(|_| UuidGenerator.generate().unwrap())
            .collect();
        assert_eq!(ids.len(), 1_000);
    }
}
