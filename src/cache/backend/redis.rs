use async_trait::async_trait;
use ::redis::aio::{ConnectionManager, ConnectionManagerConfig};
use ::redis::{
    AsyncCommands, AsyncConnectionConfig, Client as RedisClient, ErrorKind, IntoConnectionInfo,
};

use super::KvBackend;
use crate::cache::keys::session_key;
use crate::cache::models::SessionRecord;
use crate::config::StoreConfig;
use crate::error::BackendError;

/// Redis 存储，记录以 JSON 数组形式保存在 "{space}:{id}" 键下
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    /// 建立连接；首次连接最多尝试 1 + max_reconnects 次，间隔 reconnect_interval
    pub async fn connect(config: &StoreConfig) -> Result<Self, BackendError> {
        let mut info = config.address.as_str().into_connection_info()?;
        if let Some(user) = &config.user {
            info.redis.username = Some(user.clone());
        }
        if let Some(password) = &config.password {
            info.redis.password = Some(password.clone());
        }
        let client = RedisClient::open(info)?;

        // 只在这一层重试首次连接：每轮一次带超时的直连 + PING，间隔固定
        let mut attempt = 0;
        loop {
            match Self::try_connect(&client, config).await {
                Ok(()) => break,
                Err(e) if is_transient(&e) && attempt < config.max_reconnects => {
                    attempt += 1;
                    tracing::warn!(
                        address = %config.address,
                        attempt,
                        error = %e,
                        "Session store connection failed, retrying"
                    );
                    tokio::time::sleep(config.reconnect_interval()).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        // 服务端已确认可达，再建立带运行期重连的连接管理器
        let conn = ConnectionManager::new_with_config(client, manager_config(config)).await?;
        tracing::info!(address = %config.address, "Connected to session store");

        Ok(Self { conn })
    }

    /// 单次连接尝试，认证失败在 PING 时暴露
    async fn try_connect(
        client: &RedisClient,
        config: &StoreConfig,
    ) -> Result<(), ::redis::RedisError> {
        let conn_config = AsyncConnectionConfig::new()
            .set_connection_timeout(config.timeout())
            .set_response_timeout(config.timeout());
        let mut conn = client
            .get_multiplexed_async_connection_with_config(&conn_config)
            .await?;

        let _: String = ::redis::cmd("PING").query_async(&mut conn).await?;

        Ok(())
    }
}

/// 运行期断线重连：次数与首次连接相同，退避上限为重连间隔
fn manager_config(config: &StoreConfig) -> ConnectionManagerConfig {
    ConnectionManagerConfig::new()
        .set_connection_timeout(config.timeout())
        .set_response_timeout(config.timeout())
        .set_number_of_retries(config.max_reconnects)
        .set_max_delay(config.reconnect_interval_ms)
}

/// 认证失败等错误重试也不会成功
fn is_transient(err: &::redis::RedisError) -> bool {
    !matches!(
        err.kind(),
        ErrorKind::AuthenticationFailed | ErrorKind::InvalidClientConfig
    )
}

fn encode(record: &SessionRecord) -> Result<String, BackendError> {
    serde_json::to_string(record).map_err(BackendError::Encode)
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn insert(
        &self,
        space: &str,
        key: &str,
        record: &SessionRecord,
    ) -> Result<(), BackendError> {
        let full_key = session_key(space, key);
        let json = encode(record)?;
        let mut conn = self.conn.clone();

        let inserted: bool = conn.set_nx(&full_key, json).await?;
        if !inserted {
            return Err(BackendError::Duplicate(full_key));
        }

        Ok(())
    }

    async fn replace(
        &self,
        space: &str,
        key: &str,
        record: &SessionRecord,
    ) -> Result<(), BackendError> {
        let json = encode(record)?;
        let mut conn = self.conn.clone();

        let _: () = conn.set(session_key(space, key), json).await?;

        Ok(())
    }

    async fn delete(&self, space: &str, key: &str) -> Result<(), BackendError> {
        let mut conn = self.conn.clone();

        let _: i64 = conn.del(session_key(space, key)).await?;

        Ok(())
    }

    async fn select(&self, space: &str, key: &str) -> Result<Vec<SessionRecord>, BackendError> {
        let mut conn = self.conn.clone();

        let result: Option<String> = conn.get(session_key(space, key)).await?;

        match result {
            Some(json) => {
                let record = serde_json::from_str(&json).map_err(BackendError::Decode)?;
                Ok(vec![record])
            }
            None => Ok(Vec::new()),
        }
    }
}

// 需要本地 Redis，不可用时跳过
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::models::SessionData;
    use std::time::Duration;

    fn test_config() -> StoreConfig {
        let address = std::env::var("SESSION_TEST_REDIS")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let mut config = StoreConfig::new(address).with_space("tnt_sessions_test");
        config.max_reconnects = 0;
        config.timeout_ms = 200;
        config
    }

    async fn redis_backend() -> Option<RedisBackend> {
        match RedisBackend::connect(&test_config()).await {
            Ok(backend) => Some(backend),
            Err(e) => {
                eprintln!("Skipping Redis test: {}", e);
                None
            }
        }
    }

    #[tokio::test]
    async fn insert_replace_select_delete() {
        let Some(backend) = redis_backend().await else {
            return;
        };
        let space = "tnt_sessions_test";
        let key = uuid::Uuid::new_v4().to_string();
        let mut data = SessionData::new();
        data.insert("role".into(), "admin".into());
        let record = SessionRecord(key.clone(), 42, data);

        backend.insert(space, &key, &record).await.unwrap();
        let err = backend.insert(space, &key, &record).await.unwrap_err();
        assert!(matches!(err, BackendError::Duplicate(_)));

        let mut newer = record.clone();
        newer.1 = 43;
        backend.replace(space, &key, &newer).await.unwrap();
        assert_eq!(backend.select(space, &key).await.unwrap(), vec![newer]);

        backend.delete(space, &key).await.unwrap();
        backend.delete(space, &key).await.unwrap();
        assert!(backend.select(space, &key).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn refused_address_fails_within_budget() {
        let config = StoreConfig::new("redis://127.0.0.1:1");
        let budget = (config.reconnect_interval() + config.timeout())
            * (1 + config.max_reconnects as u32);

        let started = std::time::Instant::now();
        let err = RedisBackend::connect(&config).await.err();
        let elapsed = started.elapsed();

        assert!(matches!(err, Some(BackendError::Redis(_))));
        assert!(
            elapsed < budget + Duration::from_millis(500),
            "connect took {:?}, budget {:?}",
            elapsed,
            budget
        );
    }

    #[test]
    fn auth_failures_are_not_retried() {
        let auth = ::redis::RedisError::from((ErrorKind::AuthenticationFailed, "WRONGPASS"));
        let io = ::redis::RedisError::from((ErrorKind::IoError, "connection refused"));
        assert!(!is_transient(&auth));
        assert!(is_transient(&io));
    }
}
