/// 缓存操作
/// 提供会话存取的功能实现

// 会话存储操作
pub mod session;

pub use session::SessionStore;
