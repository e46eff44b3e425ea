use thiserror::Error;

/// 底层键值存储错误
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// insert 遇到已存在的键
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode record: {0}")]
    Decode(#[source] serde_json::Error),
}

/// 会话数据读写错误
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("no value for key {0}")]
    Missing(String),

    #[error("value for key {key} has unexpected type: {source}")]
    WrongType {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("value for key {key} cannot be stored: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 会话 ID 生成错误
#[derive(Debug, Error)]
#[error("entropy source failure: {0}")]
pub struct IdError(pub String);

/// 会话存储操作错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to session store at {address}: {source}")]
    Connection {
        address: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to generate session id: {0}")]
    IdentityGeneration(#[from] IdError),

    #[error("session not found: {0}")]
    NotFound(String),

    #[error("session expired: {0}")]
    Expired(String),

    #[error("failed to insert session {id}: {source}")]
    Insert {
        id: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to write session {id}: {source}")]
    Write {
        id: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to read session {id}: {source}")]
    Read {
        id: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to delete session {id}: {source}")]
    Delete {
        id: String,
        #[source]
        source: BackendError,
    },
}

impl SessionError {
    /// 会话不存在或已过期，调用方应要求重新登录
    pub fn is_unusable(&self) -> bool {
        matches!(self, SessionError::NotFound(_) | SessionError::Expired(_))
    }
}

/// 会话存储操作结果
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn unusable_covers_missing_and_expired_only() {
        assert!(SessionError::NotFound("a".into()).is_unusable());
        assert!(SessionError::Expired("a".into()).is_unusable());
        let write = SessionError::Write {
            id: "a".into(),
            source: BackendError::Duplicate("s:a".into()),
        };
        assert!(!write.is_unusable());
    }

    #[test]
    fn wrapped_errors_keep_their_cause() {
        let err = SessionError::Insert {
            id: "abc".into(),
            source: BackendError::Duplicate("sessions:abc".into()),
        };
        assert_eq!(
            err.to_string(),
            "failed to insert session abc: duplicate key: sessions:abc"
        );
        let cause = err.source().map(ToString::to_string);
        assert_eq!(cause.as_deref(), Some("duplicate key: sessions:abc"));
    }
}
