use std::sync::atomic::{AtomicI64, Ordering};

/// 当前 Unix 时间（秒）的来源
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// 手动推进的时钟，测试中用来越过过期时间
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// 从给定时间开始
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// 设置当前时间
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// 向前推进若干秒
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now(), 1_000);
        clock.advance(3_601);
        assert_eq!(clock.now(), 4_601);
        clock.set(10);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn system_clock_tracks_wall_time() {
        let before = chrono::Utc::now().timestamp();
        let now = SystemClock.now();
        assert!(now >= before && now - before <= 1);
    }
}
