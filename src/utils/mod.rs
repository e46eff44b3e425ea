/// 时间与会话 ID 生成工具
pub mod clock;
pub mod id;

pub use clock::{Clock, ManualClock, SystemClock};
pub use id::{IdGenerator, UuidGenerator};
