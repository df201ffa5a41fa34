//! 外部检索能力：网络搜索与配图。二者皆为可选能力，失败不会中断文档生成。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{Config, ImageProviderKind};

pub mod google;
pub mod placeholder;
pub mod unsplash;

pub use google::GoogleSearchProvider;
pub use placeholder::PlaceholderImageProvider;
pub use unsplash::UnsplashImageProvider;

/// 一条网络搜索结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// 章节配图
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    pub url: String,
    /// 署名文本，可能内嵌作者链接
    pub attribution: String,
}

/// 检索能力不可用或失败
#[derive(Debug, thiserror::Error)]
pub enum GroundingError {
    #[error("grounding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("grounding provider returned status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("grounding response could not be parsed: {0}")]
    Parse(String),
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// 返回按相关性排序的结果，空列表是合法结果
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, GroundingError>;
}

#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn find_image(&self, query: &str) -> Result<Option<ImageResult>, GroundingError>;
}

/// 检查HTTP状态码，非2xx时返回截断后的响应体
pub(crate) async fn check_http_response(
    response: reqwest::Response,
) -> Result<String, GroundingError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(GroundingError::HttpStatus {
            status: status.as_u16(),
            body: crate::llm::error::sanitize_error_message(&body),
        });
    }
    Ok(body)
}

/// 根据配置构建搜索能力，凭据缺失时返回None
pub fn build_search_provider(config: &Config) -> Option<Arc<dyn SearchProvider>> {
    if !config.search_available() {
        tracing::info!("未配置网络搜索，使用无检索模式生成");
        return None;
    }
    match GoogleSearchProvider::new(&config.search) {
        Ok(provider) => Some(Arc::new(provider)),
        Err(e) => {
            tracing::warn!("网络搜索客户端创建失败，降级为无检索模式: {}", e);
            None
        }
    }
}

/// 根据配置构建配图能力
pub fn build_image_provider(config: &Config) -> Option<Arc<dyn ImageProvider>> {
    match config.image.provider {
        ImageProviderKind::Unsplash if !config.image.access_key.is_empty() => {
            match UnsplashImageProvider::new(&config.image) {
                Ok(provider) => Some(Arc::new(provider)),
                Err(e) => {
                    tracing::warn!("Unsplash客户端创建失败，改用占位图: {}", e);
                    Some(Arc::new(PlaceholderImageProvider::default()))
                }
            }
        }
        ImageProviderKind::Unsplash => {
            tracing::warn!("未配置UNSPLASH_ACCESS_KEY，改用占位图");
            Some(Arc::new(PlaceholderImageProvider::default()))
        }
        ImageProviderKind::Placeholder => Some(Arc::new(PlaceholderImageProvider::default())),
        ImageProviderKind::Disabled => None,
    }
}
