//! Unsplash 图片检索

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{GroundingError, ImageProvider, ImageResult, check_http_response};
use crate::config::ImageConfig;
use crate::generator::outlet::escape_html;

const UTM_PARAMS: &str = "utm_source=seminario-rs&utm_medium=referral";

pub struct UnsplashImageProvider {
    http: reqwest::Client,
    endpoint: String,
    access_key: String,
    orientation: String,
}

#[derive(Debug, Deserialize)]
struct PhotoSearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
    user: Photographer,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
}

#[derive(Debug, Deserialize)]
struct Photographer {
    name: String,
    links: PhotographerLinks,
}

#[derive(Debug, Deserialize)]
struct PhotographerLinks {
    html: String,
}

impl UnsplashImageProvider {
    pub fn new(config: &ImageConfig) -> Result<Self, GroundingError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            access_key: config.access_key.clone(),
            orientation: config.orientation.clone(),
        })
    }
}

/// Unsplash 要求展示摄影师与平台署名，署名会原样进入生成的文档
fn attribution_for(photographer: &Photographer) -> String {
    format!(
        r#"Foto de <a href="{}?{}">{}</a> no <a href="https://unsplash.com/?{}">Unsplash</a>"#,
        escape_html(&photographer.links.html),
        UTM_PARAMS,
        escape_html(&photographer.name),
        UTM_PARAMS
    )
}

#[async_trait]
impl ImageProvider for UnsplashImageProvider {
    async fn find_image(&self, query: &str) -> Result<Option<ImageResult>, GroundingError> {
        let response = self
            .http
            .get(&self.endpoint)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1")
            .query(&[
                ("query", query),
                ("orientation", self.orientation.as_str()),
                ("per_page", "1"),
            ])
            .send()
            .await?;
        let body = check_http_response(response).await?;

        let parsed: PhotoSearchResponse =
            serde_json::from_str(&body).map_err(|e| GroundingError::Parse(e.to_string()))?;

        Ok(parsed.results.into_iter().next().map(|photo| ImageResult {
            attribution: attribution_for(&photo.user),
            url: photo.urls.regular,
        }))
    }
}
