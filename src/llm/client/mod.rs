//! LLM客户端 - 基于rig的生成能力实现

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::config::LLMConfig;
use crate::llm::{GenerationClient, GenerationError, GenerationParams};

mod providers;

use providers::ProviderClient;

/// LLM客户端 - 进程内只构建一次，随后以只读方式注入编排器
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(&config)?;
        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl GenerationClient for LLMClient {
    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, GenerationError> {
        params.validate(prompt)?;

        let agent = self.client.create_agent(&self.config.model, params);
        let timeout_seconds = self.config.timeout_seconds;

        tracing::debug!(
            model = %self.config.model,
            max_tokens = params.max_tokens,
            temperature = params.temperature,
            prompt_chars = prompt.chars().count(),
            "调用模型服务"
        );

        match tokio::time::timeout(Duration::from_secs(timeout_seconds), agent.prompt(prompt)).await
        {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(GenerationError::from_provider_message(&e.to_string())),
            Err(_) => Err(GenerationError::Timeout(timeout_seconds)),
        }
    }

    /// 检查模型连接和功能是否正常
    async fn check_connection(&self) -> Result<(), GenerationError> {
        tracing::info!(
            provider = %self.config.provider,
            model = %self.config.model,
            "正在检查模型连接..."
        );
        match self.generate("Hello", GenerationParams::new(8, 0.0)).await {
            Ok(_) => {
                tracing::info!("模型连接正常");
                Ok(())
            }
            Err(e) => {
                tracing::error!(class = e.class_tag(), "模型连接失败: {}", e);
                Err(e)
            }
        }
    }
}
