// 会话记录的键值存储后端
// 后端按 (space, key) 保存 SessionRecord，不处理过期，过期由读取方判断

use async_trait::async_trait;

use crate::cache::models::SessionRecord;
use crate::error::BackendError;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryBackend;
pub use self::redis::RedisBackend;

/// 会话存储所需的键值接口
#[async_trait]
pub trait KvBackend: Send + Sync + 'static {
    /// 插入新记录，键已存在时返回 [`BackendError::Duplicate`]
    async fn insert(
        &self,
        space: &str,
        key: &str,
        record: &SessionRecord,
    ) -> Result<(), BackendError>;

    /// 写入记录，已存在则替换
    async fn replace(
        &self,
        space: &str,
        key: &str,
        record: &SessionRecord,
    ) -> Result<(), BackendError>;

    /// 删除记录，键不存在也算成功
    async fn delete(&self, space: &str, key: &str) -> Result<(), BackendError>;

    /// 按主键精确查找，不存在时返回空列表
    async fn select(&self, space: &str, key: &str) -> Result<Vec<SessionRecord>, BackendError>;
}
