// 基于远程键值存储的会话管理
// SessionStore 在配置的空间内创建、写入、读取和删除会话，
// 过期在读取时判断：过期记录会被删除并返回 SessionError::Expired

pub mod cache;
pub mod config;
pub mod error;
pub mod utils;

pub use cache::{
    KvBackend, MemoryBackend, RedisBackend, Session, SessionData, SessionRecord, SessionStore,
};
pub use config::{ConfigError, CreateMode, StoreConfig};
pub use error::{AccessError, BackendError, IdError, Result, SessionError};
pub use serde_json::Value;
pub use utils::{Clock, IdGenerator, ManualClock, SystemClock, UuidGenerator};
