use std::sync::Arc;
use std::time::Duration;

use crate::cache::backend::{KvBackend, RedisBackend};
use crate::cache::models::session::expiry_from;
use crate::cache::models::Session;
use crate::config::{CreateMode, StoreConfig};
use crate::error::{Result, SessionError};
use crate::utils::{Clock, IdGenerator, SystemClock, UuidGenerator};

/// 会话存储
///
/// 过期由读取方判断：后端没有 TTL，`get` 读到过期记录时顺手删除并返回
/// [`SessionError::Expired`]。克隆后的句柄共享同一个后端连接。
pub struct SessionStore<B: KvBackend = RedisBackend> {
    backend: Arc<B>,
    space: Arc<str>,
    create_mode: CreateMode,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl<B: KvBackend> Clone for SessionStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            space: Arc::clone(&self.space),
            create_mode: self.create_mode,
            clock: Arc::clone(&self.clock),
            ids: Arc::clone(&self.ids),
        }
    }
}

impl SessionStore<RedisBackend> {
    /// 连接 Redis 并返回存储句柄
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let backend = RedisBackend::connect(config)
            .await
            .map_err(|source| SessionError::Connection {
                address: config.address.clone(),
                source,
            })?;

        Ok(Self::with_backend(backend, config.space.as_str())
            .with_create_mode(config.create_mode))
    }
}

impl<B: KvBackend> SessionStore<B> {
    /// 使用给定后端和空间创建存储，默认系统时钟和 UUID
    pub fn with_backend(backend: B, space: impl Into<Arc<str>>) -> Self {
        Self {
            backend: Arc::new(backend),
            space: space.into(),
            create_mode: CreateMode::default(),
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidGenerator),
        }
    }

    /// 设置 `create_default` 使用的创建方式
    pub fn with_create_mode(mut self, mode: CreateMode) -> Self {
        self.create_mode = mode;
        self
    }

    /// 替换时间来源
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 替换会话 ID 生成器
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// 会话所在的空间
    pub fn space(&self) -> &str {
        &self.space
    }

    /// 底层存储后端
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 当前配置的创建方式
    pub fn create_mode(&self) -> CreateMode {
        self.create_mode
    }

    /// 在内存中创建会话，需要调用 `put` 才会持久化
    pub fn create(&self, lifetime: Duration) -> Result<Session> {
        let id = self.ids.generate()?;
        let sess = Session::new(id, expiry_from(self.clock.now(), lifetime));

        tracing::debug!(
            session_id = %sess.id(),
            expires_at = sess.expires_at(),
            "Session created"
        );
        Ok(sess)
    }

    /// 创建会话并以 insert 语义写入，键已存在时失败而不是覆盖
    pub async fn create_persisted(&self, lifetime: Duration) -> Result<Session> {
        let sess = self.create(lifetime)?;

        self.backend
            .insert(&self.space, sess.id(), &sess.to_record())
            .await
            .map_err(|source| SessionError::Insert {
                id: sess.id().to_string(),
                source,
            })?;

        tracing::debug!(session_id = %sess.id(), space = %self.space, "Session inserted");
        Ok(sess)
    }

    /// 按指定方式新建会话
    pub async fn create_with(&self, lifetime: Duration, mode: CreateMode) -> Result<Session> {
        match mode {
            CreateMode::InMemory => self.create(lifetime),
            CreateMode::Persist => self.create_persisted(lifetime).await,
        }
    }

    /// 按配置的创建方式新建会话
    pub async fn create_default(&self, lifetime: Duration) -> Result<Session> {
        self.create_with(lifetime, self.create_mode).await
    }

    /// 写入会话，已存在则整体替换
    pub async fn put(&self, sess: &Session) -> Result<()> {
        self.backend
            .replace(&self.space, sess.id(), &sess.to_record())
            .await
            .map_err(|source| SessionError::Write {
                id: sess.id().to_string(),
                source,
            })?;

        tracing::debug!(session_id = %sess.id(), space = %self.space, "Session stored");
        Ok(())
    }

    /// 读取会话；不存在返回 NotFound，过期则删除后返回 Expired
    pub async fn get(&self, session_id: &str) -> Result<Session> {
        let records = self
            .backend
            .select(&self.space, session_id)
            .await
            .map_err(|source| SessionError::Read {
                id: session_id.to_string(),
                source,
            })?;

        let Some(record) = records.into_iter().next() else {
            tracing::debug!(session_id = %session_id, "Session not found");
            return Err(SessionError::NotFound(session_id.to_string()));
        };

        let sess = Session::from(record);
        if sess.is_expired_at(self.clock.now()) {
            tracing::debug!(
                session_id = %session_id,
                expires_at = sess.expires_at(),
                "Session expired, removing"
            );
            // 清理失败只记录日志，下次读取会再次触发
            if let Err(e) = self.backend.delete(&self.space, session_id).await {
                tracing::warn!(
                    session_id = %session_id,
                    error = %e,
                    "Failed to remove expired session"
                );
            }
            return Err(SessionError::Expired(session_id.to_string()));
        }

        Ok(sess)
    }

    /// 删除会话，不存在也视为成功
    pub async fn delete(&self, session_id: &str) -> Result<()> {
        self.backend
            .delete(&self.space, session_id)
            .await
            .map_err(|source| SessionError::Delete {
                id: session_id.to_string(),
                source,
            })?;

        tracing::debug!(session_id = %session_id, space = %self.space, "Session deleted");
        Ok(())
    }

    /// 刷新会话过期时间并写回
    pub async fn refresh(&self, session_id: &str, lifetime: Duration) -> Result<Session> {
        let mut sess = self.get(session_id).await?;
        sess.reset_lifetime_from(self.clock.now(), lifetime);
        self.put(&sess).await?;
        Ok(sess)
    }

    /// 用存储的时钟重置过期时间，仍需 `put`
    pub fn reset_lifetime(&self, sess: &mut Session, lifetime: Duration) {
        sess.reset_lifetime_from(self.clock.now(), lifetime);
    }
}

impl<B: KvBackend> std::fmt::Debug for SessionStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("space", &self.space)
            .field("create_mode", &self.create_mode)
            .finish_non_exhaustive()
    }
}
