use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SPACE: &str = "sessions";
pub const DEFAULT_TIMEOUT_MS: u64 = 50;
pub const DEFAULT_RECONNECT_INTERVAL_MS: u64 = 100;
pub const DEFAULT_MAX_RECONNECTS: usize = 3;
pub const DEFAULT_LIFETIME_SECS: u64 = 3600;

/// 配置读取错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// 新建会话时是否立即写入存储
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateMode {
    /// 只在内存中创建，之后需显式 put
    #[default]
    InMemory,
    /// 创建时以 insert 语义写入，键已存在则失败
    Persist,
}

/// 会话存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub address: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub space: String,
    pub timeout_ms: u64,
    pub reconnect_interval_ms: u64,
    pub max_reconnects: usize,
    pub default_lifetime_secs: u64,
    pub create_mode: CreateMode,
}

impl StoreConfig {
    /// 使用默认值创建配置
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            user: None,
            password: None,
            space: DEFAULT_SPACE.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            reconnect_interval_ms: DEFAULT_RECONNECT_INTERVAL_MS,
            max_reconnects: DEFAULT_MAX_RECONNECTS,
            default_lifetime_secs: DEFAULT_LIFETIME_SECS,
            create_mode: CreateMode::default(),
        }
    }

    /// 设置连接用户名和密码
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// 设置会话所在的空间
    pub fn with_space(mut self, space: impl Into<String>) -> Self {
        self.space = space.into();
        self
    }

    /// 设置新建会话的方式
    pub fn with_create_mode(mut self, mode: CreateMode) -> Self {
        self.create_mode = mode;
        self
    }

    /// 先加载 .env，再从环境变量读取配置
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 按变量名取值构建配置，缺省项使用默认值
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let address =
            lookup("SESSION_STORE_ADDR").ok_or(ConfigError::Missing("SESSION_STORE_ADDR"))?;

        // 生命周期支持 "2h" 这种小时写法，否则按秒处理
        let default_lifetime_secs = match lookup("SESSION_LIFETIME") {
            Some(raw) => match raw.trim().strip_suffix('h') {
                Some(hours) => parse_var::<u64>("SESSION_LIFETIME", hours)?
                    .checked_mul(3600)
                    .ok_or_else(|| ConfigError::Invalid {
                        name: "SESSION_LIFETIME",
                        value: raw.clone(),
                    })?,
                None => parse_var("SESSION_LIFETIME", &raw)?,
            },
            None => DEFAULT_LIFETIME_SECS,
        };

        let create_mode = if var_or(&lookup, "SESSION_PERSIST_ON_CREATE", false)? {
            CreateMode::Persist
        } else {
            CreateMode::InMemory
        };

        Ok(StoreConfig {
            address,
            user: lookup("SESSION_STORE_USER"),
            password: lookup("SESSION_STORE_PASSWORD"),
            space: lookup("SESSION_SPACE").unwrap_or_else(|| DEFAULT_SPACE.to_string()),
            timeout_ms: var_or(&lookup, "SESSION_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            reconnect_interval_ms: var_or(
                &lookup,
                "SESSION_RECONNECT_INTERVAL_MS",
                DEFAULT_RECONNECT_INTERVAL_MS,
            )?,
            max_reconnects: var_or(&lookup, "SESSION_MAX_RECONNECTS", DEFAULT_MAX_RECONNECTS)?,
            default_lifetime_secs,
            create_mode,
        })
    }

    /// 连接与响应超时
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// 重连间隔
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    /// 新会话的默认生命周期
    pub fn default_lifetime(&self) -> Duration {
        Duration::from_secs(self.default_lifetime_secs)
    }
}

fn parse_var<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}

fn var_or<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => parse_var(name, &raw),
        None => Ok(default),
    }
}
