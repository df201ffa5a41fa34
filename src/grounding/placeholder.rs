//! 无需外部服务的占位图：按关键词匹配固定图片，未命中时使用通用图片

use async_trait::async_trait;

use super::{GroundingError, ImageProvider, ImageResult};

const PLACEHOLDER_BASE_URL: &str = "https://via.placeholder.com/600x300";

pub struct PlaceholderImageProvider {
    /// (关键词, 图片文字)
    keywords: Vec<(String, String)>,
    fallback_text: String,
}

impl Default for PlaceholderImageProvider {
    fn default() -> Self {
        Self {
            keywords: vec![
                ("redes sociais".to_string(), "Redes+Sociais".to_string()),
                ("educação".to_string(), "Educação".to_string()),
                ("tecnologia".to_string(), "Tecnologia".to_string()),
                ("saúde".to_string(), "Saúde".to_string()),
            ],
            fallback_text: "Imagem+Genérica".to_string(),
        }
    }
}

impl PlaceholderImageProvider {
    pub fn image_for(&self, query: &str) -> ImageResult {
        let lowered = query.to_lowercase();
        let text = self
            .keywords
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword.as_str()))
            .map(|(_, text)| text.as_str())
            .unwrap_or(&self.fallback_text);

        ImageResult {
            url: format!("{}?text={}", PLACEHOLDER_BASE_URL, text),
            attribution: String::new(),
        }
    }
}

#[async_trait]
impl ImageProvider for PlaceholderImageProvider {
    async fn find_image(&self, query: &str) -> Result<Option<ImageResult>, GroundingError> {
        Ok(Some(self.image_for(query)))
    }
}
