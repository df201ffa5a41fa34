//! HTTP 服务：表单页、生成、PDF 下载与健康检查

mod handlers;

use anyhow::{Context, Result};
use axum::{
    Router,
    routing::get,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServerConfig};
use crate::generator::context::GeneratorContext;
use crate::generator::outlet::{DocumentRenderer, HtmlRenderer, PdfExporter, WkhtmltopdfExporter};

pub use handlers::*;

/// 各请求共享的只读状态
#[derive(Clone)]
pub struct AppState {
    pub context: GeneratorContext,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub exporter: Arc<dyn PdfExporter>,
}

impl AppState {
    pub fn new(
        context: GeneratorContext,
        renderer: Arc<dyn DocumentRenderer>,
        exporter: Arc<dyn PdfExporter>,
    ) -> Self {
        Self {
            context,
            renderer,
            exporter,
        }
    }

    /// 按配置构建默认的LLM、检索、渲染与PDF组件
    pub fn from_config(config: Config) -> Result<Self> {
        let exporter = Arc::new(WkhtmltopdfExporter::new(config.pdf.clone()));
        let context = GeneratorContext::new(config)?;
        Ok(Self::new(context, Arc::new(HtmlRenderer::new()), exporter))
    }
}

/// Build the router with all endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(generate_seminar))
        .route("/download_pdf", get(download_pdf_query).post(download_pdf_form))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(server: &ServerConfig, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", server.bind_address, server.port);
    tracing::info!("Starting HTTP server on {}", addr);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("无法监听地址 {}", addr))?;

    axum::serve(listener, app).await.context("HTTP服务异常退出")
}

#[cfg(test)]
mod tests;
