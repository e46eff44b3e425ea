/// 缓存数据模型
/// 定义会话及其存储记录的结构体

// 会话模型
pub mod session;

pub use session::{Session, SessionData, SessionRecord};
