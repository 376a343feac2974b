//! 上传进度模拟 - 业务能力层
//!
//! 纯装饰性的进度条：只表示"请求还在进行"，与实际传输进度无关

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// 每次增长的间隔
pub const TICK_INTERVAL: Duration = Duration::from_millis(300);
/// 每次增长的百分比
pub const TICK_STEP: u8 = 5;
/// 请求完成前的上限
pub const PROGRESS_CAP: u8 = 90;
/// 成功后展示 100% 的停留时间
pub const COMPLETION_GRACE: Duration = Duration::from_millis(600);

/// 上传进度
///
/// 持有进度值的唯一写端，界面通过 `subscribe()` 观察
pub struct UploadProgress {
    tx: Arc<watch::Sender<u8>>,
}

impl UploadProgress {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// 当前进度
    pub fn value(&self) -> u8 {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.tx.subscribe()
    }

    /// 归零并开始计时
    ///
    /// 返回的 `ProgressTicker` 被 drop 时计时器一定会停止
    pub fn start(&self) -> ProgressTicker {
        self.tx.send_replace(0);

        let stopped = Arc::new(AtomicBool::new(false));

        let tx = self.tx.clone();
        let flag = Arc::clone(&stopped);
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tick(&tx, &flag);
            }
        });

        ProgressTicker {
            handle: Some(handle),
            tx: self.tx.clone(),
            stopped,
        }
    }
}

impl Default for UploadProgress {
    fn default() -> Self {
        Self::new()
    }
}

// 停止标志在 watch 的锁内读取，与 `stop` 互斥
fn tick(tx: &watch::Sender<u8>, stopped: &AtomicBool) -> bool {
    tx.send_if_modified(|progress| !stopped.load(Ordering::SeqCst) && advance(progress))
}

// 已到上限（或已被置为 100）时不再变化
fn advance(progress: &mut u8) -> bool {
    if *progress >= PROGRESS_CAP {
        return false;
    }
    *progress = progress.saturating_add(TICK_STEP).min(PROGRESS_CAP);
    true
}

/// 运行中的进度计时器
pub struct ProgressTicker {
    handle: Option<JoinHandle<()>>,
    tx: Arc<watch::Sender<u8>>,
    stopped: Arc<AtomicBool>,
}

impl ProgressTicker {
    /// 停止计时，可重复调用
    ///
    /// 返回后进度值不会再被计时器修改，即使某次增长已在其他线程上开始
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.tx.send_if_modified(|_| {
                self.stopped.store(true, Ordering::SeqCst);
                false
            });
            handle.abort();
        }
    }

    /// 停止计时并置为 100
    pub fn complete(mut self) {
        self.stop();
        self.tx.send_replace(100);
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[test]
    fn test_advance_caps_and_never_lowers() {
        let mut p = 85;
        assert!(advance(&mut p));
        assert_eq!(p, 90);
        assert!(!advance(&mut p));
        assert_eq!(p, 90);

        let mut done = 100;
        assert!(!advance(&mut done));
        assert_eq!(done, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_interval() {
        let progress = UploadProgress::new();
        let _ticker = progress.start();

        sleep(Duration::from_millis(290)).await;
        assert_eq!(progress.value(), 0);

        sleep(Duration::from_millis(20)).await;
        assert_eq!(progress.value(), 5);

        sleep(Duration::from_millis(300)).await;
        assert_eq!(progress.value(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_exceeds_cap_before_completion() {
        let progress = UploadProgress::new();
        let mut rx = progress.subscribe();
        let ticker = progress.start();

        let watcher = tokio::spawn(async move {
            let mut max_seen = 0;
            while rx.changed().await.is_ok() {
                let v = *rx.borrow();
                if v == 100 {
                    break;
                }
                max_seen = max_seen.max(v);
            }
            max_seen
        });

        // 远超 18 次增长所需时间
        sleep(Duration::from_secs(30)).await;
        assert_eq!(progress.value(), PROGRESS_CAP);

        ticker.complete();
        assert_eq!(progress.value(), 100);
        assert_eq!(watcher.await.unwrap(), PROGRESS_CAP);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent_and_freezes_value() {
        let progress = UploadProgress::new();
        let mut ticker = progress.start();

        sleep(Duration::from_millis(650)).await;
        assert_eq!(progress.value(), 10);

        ticker.stop();
        ticker.stop();
        assert!(!ticker.is_running());

        sleep(Duration::from_secs(5)).await;
        assert_eq!(progress.value(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_tick_after_stop_is_ignored() {
        let progress = UploadProgress::new();
        let mut ticker = progress.start();

        sleep(Duration::from_millis(310)).await;
        assert_eq!(progress.value(), 5);

        let tx = Arc::clone(&ticker.tx);
        let stopped = Arc::clone(&ticker.stopped);
        ticker.stop();

        // 模拟 abort 之前已经在运行的一次增长
        assert!(!tick(&tx, &stopped));
        assert_eq!(progress.value(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_value_stays_at_100() {
        let progress = UploadProgress::new();
        let ticker = progress.start();

        sleep(Duration::from_millis(950)).await;
        ticker.complete();

        sleep(Duration::from_secs(5)).await;
        assert_eq!(progress.value(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_ticker() {
        let progress = UploadProgress::new();
        {
            let _ticker = progress.start();
            sleep(Duration::from_millis(310)).await;
        }
        assert_eq!(progress.value(), 5);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(progress.value(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_resets_to_zero() {
        let progress = UploadProgress::new();
        progress.start().complete();
        assert_eq!(progress.value(), 100);

        let _ticker = progress.start();
        assert_eq!(progress.value(), 0);
    }
}
