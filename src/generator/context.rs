use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::grounding::{self, ImageProvider, SearchProvider};
use crate::llm::GenerationClient;
use crate::llm::client::LLMClient;

/// 进程级生成上下文：启动时构建一次，之后只读，按请求克隆共享
#[derive(Clone)]
pub struct GeneratorContext {
    /// 配置
    pub config: Arc<Config>,
    /// 文本生成能力
    pub generation: Arc<dyn GenerationClient>,
    /// 网络搜索能力（可选）
    pub search: Option<Arc<dyn SearchProvider>>,
    /// 配图能力（可选）
    pub image: Option<Arc<dyn ImageProvider>>,
}

impl GeneratorContext {
    /// 根据配置创建基于rig的LLM客户端与检索能力
    pub fn new(config: Config) -> Result<Self> {
        let llm_client = LLMClient::new(config.llm.clone())?;
        Ok(Self::from_parts(config, Arc::new(llm_client)))
    }

    /// 使用给定的生成能力，检索能力仍按配置构建
    pub fn from_parts(config: Config, generation: Arc<dyn GenerationClient>) -> Self {
        let search = grounding::build_search_provider(&config);
        let image = grounding::build_image_provider(&config);
        Self::with_capabilities(config, generation, search, image)
    }

    pub fn with_capabilities(
        config: Config,
        generation: Arc<dyn GenerationClient>,
        search: Option<Arc<dyn SearchProvider>>,
        image: Option<Arc<dyn ImageProvider>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            generation,
            search,
            image,
        }
    }
}
