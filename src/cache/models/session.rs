use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AccessError;
use crate::utils::{Clock, SystemClock};

/// 会话附带的应用数据
pub type SessionData = HashMap<String, Value>;

/// 存储中的会话记录：(id, expires_at, data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord(pub String, pub i64, pub SessionData);

/// 会话
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: String,
    expires_at: i64, // Unix timestamp
    data: SessionData,
}

impl Session {
    /// 创建数据为空的会话
    pub fn new(id: impl Into<String>, expires_at: i64) -> Self {
        Self {
            id: id.into(),
            expires_at,
            data: SessionData::new(),
        }
    }

    /// 会话 ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 过期时间（Unix 秒）
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// 全部应用数据
    pub fn data(&self) -> &SessionData {
        &self.data
    }

    /// 到达 expires_at 的那一秒即视为过期
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }

    /// 剩余有效时间，已过期时为零
    pub fn remaining_at(&self, now: i64) -> Duration {
        Duration::from_secs(self.expires_at.saturating_sub(now).max(0) as u64)
    }

    /// 从当前时间起重新计算过期时间，需要再 put 才会持久化
    pub fn reset_lifetime(&mut self, lifetime: Duration) {
        self.reset_lifetime_from(SystemClock.now(), lifetime);
    }

    /// 以给定时间为起点重新计算过期时间
    pub fn reset_lifetime_from(&mut self, now: i64, lifetime: Duration) {
        self.expires_at = expiry_from(now, lifetime);
    }

    /// 写入或覆盖一个键，需要再 put 才会持久化
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// 写入任意可序列化的值，无法表示为 JSON 时返回错误
    pub fn try_set<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), AccessError> {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => {
                self.data.insert(key, value);
                Ok(())
            }
            Err(source) => Err(AccessError::Encode { key, source }),
        }
    }

    /// 删除一个键，返回原来的值
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// 是否存在该键
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// 按类型读取，区分键不存在与类型不匹配
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<T, AccessError> {
        let value = self
            .data
            .get(key)
            .ok_or_else(|| AccessError::Missing(key.to_string()))?;
        T::deserialize(value).map_err(|source| AccessError::WrongType {
            key: key.to_string(),
            source,
        })
    }

    /// 按类型读取，不存在或类型不匹配时返回零值
    pub fn get<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.try_get(key).unwrap_or_default()
    }

    /// 读取字符串，不存在或不是字符串时返回空串
    pub fn get_string(&self, key: &str) -> String {
        self.get(key)
    }

    /// 转成存储记录
    pub fn into_record(self) -> SessionRecord {
        SessionRecord(self.id, self.expires_at, self.data)
    }

    /// 复制一份存储记录
    pub fn to_record(&self) -> SessionRecord {
        self.clone().into_record()
    }
}

impl From<SessionRecord> for Session {
    fn from(SessionRecord(id, expires_at, data): SessionRecord) -> Self {
        Self {
            id,
            expires_at,
            data,
        }
    }
}

pub(crate) fn expiry_from(now: i64, lifetime: Duration) -> i64 {
    let secs = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX);
    now.saturating_add(secs)
}
