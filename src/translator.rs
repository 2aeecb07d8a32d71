//! 限速分发模块
//!
//! 每次翻译运行创建一个新的分发器，保证同一实例上连续调用的开始时间至少相隔配置的最小间隔。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::Result;

/// 速率限制器
///
/// 记录上一次调用的时间。并发调用会在内部互斥锁上排队，
/// 因此即使完成顺序交错，各调用的开始时间仍按最小间隔串行化。
#[derive(Clone)]
pub struct RateLimiter {
    /// 上一次放行的时间
    last_call: Arc<Mutex<Option<Instant>>>,
    /// 最小调用间隔
    min_interval: Duration,
}

impl RateLimiter {
    /// 创建新的速率限制器
    ///
    /// # 示例
    ///
    /// ```rust
    /// use design_localizer::RateLimiter;
    /// use std::time::Duration;
    ///
    /// let limiter = RateLimiter::new(Duration::from_millis(100)); // 每秒10次
    /// ```
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_call: Arc::new(Mutex::new(None)),
            min_interval,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// 获取调用许可
    ///
    /// 距上一次放行不足最小间隔时挂起当前任务直到间隔结束，不阻塞其他任务。
    pub async fn acquire(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("限速等待 {:?}", wait);
                sleep(wait).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}

/// 分发器
///
/// 包装服务调用：先经过限速器，再执行调用；调用失败时附加上下文标签后原样返回，不吞掉错误。
#[derive(Clone)]
pub struct Dispatcher {
    limiter: RateLimiter,
    label: &'static str,
}

impl Dispatcher {
    pub fn new(label: &'static str, min_interval: Duration) -> Self {
        Self {
            limiter: RateLimiter::new(min_interval),
            label,
        }
    }

    /// 翻译分发器，错误标签为 `Request failed in translator`
    pub fn for_translation(min_interval: Duration) -> Self {
        Self::new("Request failed in translator", min_interval)
    }

    /// 润色分发器
    pub fn for_polishing(min_interval: Duration) -> Self {
        Self::new("Request failed in polisher", min_interval)
    }

    /// 限速后执行调用
    pub async fn dispatch<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.limiter.acquire().await;
        operation().await.map_err(|e| e.with_context(self.label))
    }
}
