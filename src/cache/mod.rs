// 缓存模块
// 包含会话数据结构、存储后端和操作逻辑

pub mod backend;
pub mod keys;
pub mod models;
pub mod operations;

// 重新导出常用类型，方便其他模块使用
pub use backend::{KvBackend, MemoryBackend, RedisBackend};
pub use models::{Session, SessionData, SessionRecord};
pub use operations::SessionStore;
