use std::process::ExitCode;

use tnt_sessions::{SessionStore, StoreConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CHECK_KEY: &str = "health_check";

#[tokio::main]
async fn main() -> ExitCode {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Session store check failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// 走一遍创建、写入、读取、删除，检查存储是否可用
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // 加载配置
    let config = StoreConfig::from_env()?;

    let store = SessionStore::connect(&config).await?;
    tracing::info!(space = %store.space(), mode = ?store.create_mode(), "Checking session store");

    let mut sess = store.create_default(config.default_lifetime()).await?;
    sess.set(CHECK_KEY, chrono::Utc::now().to_rfc3339());
    store.put(&sess).await?;

    let fetched = store.get(sess.id()).await?;
    if fetched.get_string(CHECK_KEY) != sess.get_string(CHECK_KEY) {
        return Err(format!("session {} came back with different data", sess.id()).into());
    }
    tracing::info!(
        session_id = %fetched.id(),
        expires_at = fetched.expires_at(),
        "Session round-trip succeeded"
    );

    store.delete(sess.id()).await?;
    Ok(())
}
