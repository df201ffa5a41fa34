//! 生成调用的有界重试：仅对限流与超时重试，指数退避加随机抖动

use rand::Rng;
use std::future::Future;
use std::time::Duration;

use crate::config::LLMConfig;
use crate::llm::GenerationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 首次调用之外的最大重试次数
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn from_config(config: &LLMConfig) -> Self {
        Self::new(
            config.retry_attempts,
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    /// 第n次重试前的等待时间
    fn delay_for(&self, retry: u32) -> Duration {
        let exponential = self.base_delay.saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)));
        let jitter_cap = (self.base_delay.as_millis() as u64 / 4).max(1);
        let jitter = rand::rng().random_range(0..jitter_cap);
        exponential + Duration::from_millis(jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(1000))
    }
}

/// 通用重试逻辑
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    step: &str,
    operation: F,
) -> Result<T, GenerationError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, GenerationError>>,
{
    let mut retries = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(err) if err.is_retryable() && retries < policy.max_retries => {
                retries += 1;
                let delay = policy.delay_for(retries);
                tracing::warn!(
                    step,
                    class = err.class_tag(),
                    retry = retries,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "调用模型服务出错，准备重试: {}",
                    err
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
