pub mod client;
pub mod error;

use async_trait::async_trait;

pub use error::GenerationError;

/// 单次生成调用的参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl GenerationParams {
    pub fn new(max_tokens: u32, temperature: f64) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }

    /// 校验调用前置条件：prompt非空、max_tokens > 0、temperature ∈ [0, 2]
    pub fn validate(&self, prompt: &str) -> Result<(), GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::InvalidInput("prompt is empty".to_string()));
        }
        if self.max_tokens == 0 {
            return Err(GenerationError::InvalidInput(
                "max_tokens must be positive".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(GenerationError::InvalidInput(format!(
                "temperature {} is outside [0, 2]",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// 远程文本生成能力
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// 返回第一条生成结果的原文
    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, GenerationError>;

    /// 发送一次最小请求，确认凭据与服务可用
    async fn check_connection(&self) -> Result<(), GenerationError> {
        self.generate("Hello", GenerationParams::new(8, 0.0))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_validate_ok() {
        assert!(GenerationParams::new(500, 0.7).validate("hello").is_ok());
        assert!(GenerationParams::new(1, 0.0).validate("hello").is_ok());
        assert!(GenerationParams::new(1, 2.0).validate("hello").is_ok());
    }

    #[test]
    fn test_params_validate_rejects_bad_input() {
        assert!(matches!(
            GenerationParams::new(500, 0.7).validate("   "),
            Err(GenerationError::InvalidInput(_))
        ));
        assert!(matches!(
            GenerationParams::new(0, 0.7).validate("hello"),
            Err(GenerationError::InvalidInput(_))
        ));
        assert!(matches!(
            GenerationParams::new(500, 2.5).validate("hello"),
            Err(GenerationError::InvalidInput(_))
        ));
        assert!(matches!(
            GenerationParams::new(500, -0.1).validate("hello"),
            Err(GenerationError::InvalidInput(_))
        ));
    }
}
