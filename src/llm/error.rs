//! 生成调用的错误分类

use regex::Regex;
use std::sync::LazyLock;

/// 生成能力的错误类型。组件本身不做重试，重试策略由编排器决定。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("invalid generation input: {0}")]
    InvalidInput(String),

    #[error("generation provider rejected credentials: {0}")]
    Authentication(String),

    #[error("generation provider is throttling requests: {0}")]
    RateLimit(String),

    #[error("generation provider failed: {0}")]
    Upstream(String),

    #[error("generation call timed out after {0}s")]
    Timeout(u64),
}

impl GenerationError {
    /// 面向用户与日志的稳定分类标签
    pub fn class_tag(&self) -> &'static str {
        match self {
            GenerationError::InvalidInput(_) => "invalid_input",
            GenerationError::Authentication(_) => "authentication_error",
            GenerationError::RateLimit(_) => "rate_limit_error",
            GenerationError::Upstream(_) => "upstream_error",
            GenerationError::Timeout(_) => "timeout_error",
        }
    }

    /// 只有限流与超时值得重试，凭据错误属于配置问题
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::RateLimit(_) | GenerationError::Timeout(_)
        )
    }

    /// 根据provider返回的错误信息进行分类。
    /// 能读到HTTP状态码时只按状态码判断，否则退回到关键词匹配。
    pub fn from_provider_message(raw: &str) -> Self {
        let message = sanitize_error_message(raw);

        if let Some(status) = http_status(raw) {
            return match status {
                401 | 403 => GenerationError::Authentication(message),
                429 => GenerationError::RateLimit(message),
                _ => GenerationError::Upstream(message),
            };
        }

        let lowered = raw.to_lowercase();
        let is_auth = [
            "unauthorized",
            "invalid_api_key",
            "invalid api key",
            "authentication",
            "permission_denied",
        ]
        .iter()
        .any(|needle| lowered.contains(needle));
        if is_auth {
            return GenerationError::Authentication(message);
        }

        let is_rate_limit = [
            "rate_limit",
            "rate limit",
            "too many requests",
            "quota",
            "overloaded",
        ]
        .iter()
        .any(|needle| lowered.contains(needle));
        if is_rate_limit {
            return GenerationError::RateLimit(message);
        }

        GenerationError::Upstream(message)
    }
}

/// rig 的HTTP错误形如 `Invalid status code 429 Too Many Requests with message: ...`
static STATUS_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)invalid status code:?\s*(\d{3})\b").ok());

fn http_status(raw: &str) -> Option<u16> {
    STATUS_PATTERN
        .as_ref()?
        .captures(raw)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

static SECRET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"gsk_[A-Za-z0-9]{20,}",
        r"sk-ant-[A-Za-z0-9_\-]{10,}",
        r"sk-[A-Za-z0-9_\-]{20,}",
        r"AIza[0-9A-Za-z_\-]{20,}",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

const MAX_ERROR_MESSAGE_CHARS: usize = 256;

/// 折叠空白、脱敏密钥并截断，避免把凭据或大段响应体带到页面上
pub fn sanitize_error_message(raw: &str) -> String {
    let mut sanitized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    for regex in SECRET_PATTERNS.iter() {
        sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
    }

    if sanitized.chars().count() > MAX_ERROR_MESSAGE_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_MESSAGE_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}
