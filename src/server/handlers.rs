use axum::{
    Form, Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::Instrument;

use super::AppState;
use crate::generator::assembler::SeminarAssembler;
use crate::generator::error::SeminarError;
use crate::generator::outlet::{PdfError, escape_html};
use crate::config::PipelineConfig;
use crate::generator::types::SeminarRequest;
use crate::i18n::TargetLanguage;
use crate::llm::GenerationError;

/// 表单字段。缺失字段按空值处理，由请求校验统一报错
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeminarForm {
    pub title: String,
    pub theme: String,
    pub members: String,
    /// 每行一个成员姓名
    pub integrantes: String,
    /// 复选框，勾选时为 "on"
    pub detailed: Option<String>,
}

impl SeminarForm {
    /// 转换为生成请求；未勾选详细模式时使用配置中的默认值
    pub fn into_request(self, pipeline: &PipelineConfig) -> Result<SeminarRequest, SeminarError> {
        let members = self.members.trim().parse::<usize>().map_err(|_| {
            SeminarError::InvalidInput(format!(
                "número de integrantes inválido: {:?}",
                self.members.trim()
            ))
        })?;
        let request = SeminarRequest::new(
            &self.title,
            &self.theme,
            members,
            SeminarRequest::parse_member_names(&self.integrantes),
            self.detailed.is_some() || pipeline.detailed,
        );
        request.validate(pipeline.max_members)?;
        Ok(request)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PdfForm {
    pub html: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PdfQuery {
    pub html: Option<String>,
}

/// 生成失败时的HTTP状态码
pub fn status_for(error: &SeminarError) -> StatusCode {
    match error {
        SeminarError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        SeminarError::Generation { source, .. } => match source {
            GenerationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GenerationError::Authentication(_) => StatusCode::UNAUTHORIZED,
            GenerationError::RateLimit(_) => StatusCode::TOO_MANY_REQUESTS,
            GenerationError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GenerationError::Upstream(_) => StatusCode::BAD_GATEWAY,
        },
    }
}

fn error_page(status: StatusCode, class_tag: &str, message: &str) -> Response {
    let body = format!(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head><meta charset=\"UTF-8\"><title>Erro</title></head>\n<body>\n<h1>Não foi possível gerar o seminário</h1>\n<p><code>{}</code></p>\n<p>{}</p>\n<p><a href=\"/\">Voltar</a></p>\n</body>\n</html>",
        escape_html(class_tag),
        escape_html(message)
    );
    (status, Html(body)).into_response()
}

/// 在渲染结果末尾加入下载按钮，PDF中不包含该按钮
fn with_download_form(html: &str, language: TargetLanguage) -> String {
    let form = format!(
        "<form method=\"post\" action=\"/download_pdf\" style=\"text-align:center;margin:32px 0\">\n<input type=\"hidden\" name=\"html\" value=\"{}\">\n<button type=\"submit\">{}</button>\n</form>\n",
        escape_html(html),
        language.labels().download_pdf
    );
    match html.rfind("</body>") {
        Some(pos) => format!("{}{}{}", &html[..pos], form, &html[pos..]),
        None => format!("{}{}", html, form),
    }
}

pub async fn index() -> Html<&'static str> {
    Html(include_str!("templates/index.html"))
}

pub async fn generate_seminar(
    State(state): State<AppState>,
    Form(form): Form<SeminarForm>,
) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("seminar_request", %request_id);

    async move {
        let request = match form.into_request(&state.context.config.pipeline) {
            Ok(request) => request,
            Err(e) => {
                tracing::info!("表单校验失败: {}", e);
                return error_page(StatusCode::BAD_REQUEST, e.class_tag(), &e.to_string());
            }
        };

        match SeminarAssembler::new(state.context.clone())
            .assemble(&request)
            .await
        {
            Ok(document) => {
                let html = state.renderer.render(&document);
                Html(with_download_form(&html, document.language())).into_response()
            }
            Err(e) => {
                tracing::error!(class = e.class_tag(), "研讨会生成失败: {}", e);
                error_page(status_for(&e), e.class_tag(), &e.to_string())
            }
        }
    }
    .instrument(span)
    .await
}

async fn export_pdf(state: &AppState, html: &str) -> Response {
    if html.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "missing html".to_string()).into_response();
    }

    match state.exporter.export(html).await {
        Ok(pdf) => (
            [
                (header::CONTENT_TYPE, pdf.content_type.to_string()),
                (header::CONTENT_DISPOSITION, pdf.content_disposition()),
            ],
            pdf.bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("PDF导出失败: {}", e);
            let status = match &e {
                PdfError::EmptyHtml => StatusCode::BAD_REQUEST,
                PdfError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                PdfError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, e.to_string()).into_response()
        }
    }
}

/// GET /download_pdf?html=...
pub async fn download_pdf_query(
    State(state): State<AppState>,
    Query(query): Query<PdfQuery>,
) -> Response {
    export_pdf(&state, query.html.as_deref().unwrap_or_default()).await
}

/// POST /download_pdf，表单字段 html
pub async fn download_pdf_form(
    State(state): State<AppState>,
    Form(form): Form<PdfForm>,
) -> Response {
    export_pdf(&state, &form.html).await
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": state.context.config.llm.provider.to_string(),
        "model": state.context.config.llm.model,
        "search": state.context.search.is_some(),
        "image": state.context.image.is_some(),
        "pdf": state.exporter.is_available().await,
    }))
}
