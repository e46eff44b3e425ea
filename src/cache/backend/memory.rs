use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::KvBackend;
use crate::cache::keys::session_key;
use crate::cache::models::SessionRecord;
use crate::error::BackendError;

/// 进程内存储，用于测试和单进程部署
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<HashMap<String, SessionRecord>>,
}

impl MemoryBackend {
    /// 创建空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有空间中的记录总数
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// 是否没有任何记录
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn insert(
        &self,
        space: &str,
        key: &str,
        record: &SessionRecord,
    ) -> Result<(), BackendError> {
        let full_key = session_key(space, key);
        let mut records = self.records.write().await;
        if records.contains_key(&full_key) {
            return Err(BackendError::Duplicate(full_key));
        }
        records.insert(full_key, record.clone());
        Ok(())
    }

    async fn replace(
        &self,
        space: &str,
        key: &str,
        record: &SessionRecord,
    ) -> Result<(), BackendError> {
        self.records
            .write()
            .await
            .insert(session_key(space, key), record.clone());
        Ok(())
    }

    async fn delete(&self, space: &str, key: &str) -> Result<(), BackendError> {
        self.records.write().await.remove(&session_key(space, key));
        Ok(())
    }

    async fn select(&self, space: &str, key: &str) -> Result<Vec<SessionRecord>, BackendError> {
        let records = self.records.read().await;
        Ok(records
            .get(&session_key(space, key))
            .cloned()
            .into_iter()
            .collect())
    }
}
