//! 后台定时任务
//!
//! 过期记录清理、限流表清理、旧日志清理都以固定间隔运行，
//! 共用一个取消令牌，关闭时统一停止。

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct Job {
    name: &'static str,
    every: Duration,
    handle: JoinHandle<()>,
}

/// Set of periodic jobs sharing one shutdown token
///
/// ```ignore
/// let mut tasks = BackgroundTasks::new();
/// tasks.spawn_periodic("expiry_sweep", Duration::from_secs(900), move || {
///     let state = state.clone();
///     async move { let _ = sweep::run_once(&state.pool, state.today()).await; }
/// });
/// tasks.shutdown().await;
/// ```
#[derive(Default)]
pub struct BackgroundTasks {
    jobs: Vec<Job>,
    shutdown: CancellationToken,
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `tick` immediately and then every `every` until shutdown
    ///
    /// A tick that panics is logged and the job keeps its schedule.
    pub fn spawn_periodic<F, Fut>(&mut self, name: &'static str, every: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = self.shutdown.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if let Err(payload) = AssertUnwindSafe(tick()).catch_unwind().await {
                            tracing::error!(
                                job = name,
                                panic = %panic_message(payload.as_ref()),
                                "Periodic job panicked"
                            );
                        }
                    }
                }
            }
        });
        tracing::debug!(job = name, every_secs = every.as_secs(), "Periodic job scheduled");
        self.jobs.push(Job { name, every, handle });
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn log_summary(&self) {
        for job in &self.jobs {
            tracing::info!(job = job.name, every_secs = job.every.as_secs(), "Background job active");
        }
    }

    /// 取消所有任务并等待退出
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for job in self.jobs {
            if let Err(e) = job.handle.await {
                tracing::error!(job = job.name, error = ?e, "Background job ended abnormally");
            }
        }
        tracing::info!("Background jobs stopped");
    }
}
