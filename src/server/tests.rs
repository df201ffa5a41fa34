#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    use crate::config::{Config, PipelineConfig};
    use crate::generator::context::GeneratorContext;
    use crate::generator::error::SeminarError;
    use crate::generator::outlet::{HtmlRenderer, PdfDocument, PdfError, PdfExporter};
    use crate::llm::{GenerationClient, GenerationError, GenerationParams};
    use crate::server::{AppState, SeminarForm, build_router, status_for};

    struct StubGeneration {
        calls: AtomicUsize,
        error: Option<GenerationError>,
    }

    #[async_trait]
    impl GenerationClient for StubGeneration {
        async fn generate(
            &self,
            prompt: &str,
            _params: GenerationParams,
        ) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = &self.error {
                return Err(error.clone());
            }
            Ok(format!("Texto: {}\n\nReferências\n1. Fonte.", prompt.lines().next().unwrap_or_default()))
        }
    }

    struct StubExporter;

    #[async_trait]
    impl PdfExporter for StubExporter {
        async fn export(&self, html: &str) -> Result<PdfDocument, PdfError> {
            let mut bytes = b"%PDF-1.4\n".to_vec();
            bytes.extend_from_slice(html.as_bytes());
            Ok(PdfDocument::new(bytes))
        }
    }

    fn test_state(error: Option<GenerationError>) -> (AppState, Arc<StubGeneration>) {
        let generation = Arc::new(StubGeneration {
            calls: AtomicUsize::new(0),
            error,
        });
        let mut config = Config::default();
        config.llm.retry_attempts = 0;
        let context = GeneratorContext::with_capabilities(config, generation.clone(), None, None);
        let state = AppState::new(context, Arc::new(HtmlRenderer::new()), Arc::new(StubExporter));
        (state, generation)
    }

    fn form_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8_lossy(&bytes).to_string()
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let (state, _) = test_state(None);
        let response = build_router(state)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("name=\"integrantes\""));
        assert!(body.contains("name=\"members\""));
    }

    #[tokio::test]
    async fn test_generate_renders_document_with_download_form() {
        let (state, generation) = test_state(None);
        let response = build_router(state)
            .oneshot(form_request(
                "/",
                "title=Semin%C3%A1rio+de+Biologia&theme=Fotoss%C3%ADntese&members=3&integrantes=Ana%0ABeto%0ACarla",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("<h1>Seminário de Biologia</h1>"));
        assert!(body.contains("Fotossíntese - Parte 3 (Aluno 3)"));
        assert!(body.contains("<li>Carla</li>"));
        assert!(body.contains("action=\"/download_pdf\""));
        assert!(body.contains("Baixar PDF"));
        assert_eq!(generation.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_generate_rejects_invalid_members() {
        for members in ["0", "abc", "", "18446744073709551615", "1000000"] {
            let (state, generation) = test_state(None);
            let response = build_router(state)
                .oneshot(form_request("/", &format!("title=T&theme=Tema&members={}", members)))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert!(body_string(response).await.contains("invalid_input"));
            assert_eq!(generation.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_generate_reports_rate_limit_class() {
        let (state, _) = test_state(Some(GenerationError::RateLimit("429".to_string())));
        let response = build_router(state)
            .oneshot(form_request("/", "title=T&theme=Tema&members=2"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(body_string(response).await.contains("rate_limit_error"));
    }

    #[tokio::test]
    async fn test_download_pdf_via_form() {
        let (state, _) = test_state(None);
        let response = build_router(state)
            .oneshot(form_request("/download_pdf", "html=%3Chtml%3Eoi%3C%2Fhtml%3E"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"seminario.pdf\""
        );
        let body = body_string(response).await;
        assert!(body.starts_with("%PDF"));
        assert!(body.contains("<html>oi</html>"));
    }

    #[tokio::test]
    async fn test_download_pdf_via_query() {
        let (state, _) = test_state(None);
        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .uri("/download_pdf?html=%3Cp%3Eoi%3C%2Fp%3E")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
    }

    #[tokio::test]
    async fn test_download_pdf_without_html_is_bad_request() {
        let (state, _) = test_state(None);
        let response = build_router(state)
            .oneshot(Request::builder().uri("/download_pdf").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health_check() {
        let (state, _) = test_state(None);
        let response = build_router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["search"], false);
        assert_eq!(body["pdf"], true);
    }

    #[test]
    fn test_form_into_request() {
        let form = SeminarForm {
            title: "Seminário".to_string(),
            theme: "Fotossíntese".to_string(),
            members: " 2 ".to_string(),
            integrantes: "Ana\r\nBeto\n".to_string(),
            detailed: Some("on".to_string()),
        };

        let request = form.into_request(&PipelineConfig::default()).unwrap();
        assert_eq!(request.members, 2);
        assert_eq!(request.member_names, vec!["Ana", "Beto"]);
        assert!(request.detailed);
    }

    #[test]
    fn test_form_uses_configured_detail_default() {
        let form = || SeminarForm {
            title: "Seminário".to_string(),
            theme: "Fotossíntese".to_string(),
            members: "2".to_string(),
            ..SeminarForm::default()
        };

        let request = form().into_request(&PipelineConfig::default()).unwrap();
        assert!(!request.detailed);

        let pipeline = PipelineConfig {
            detailed: true,
            ..PipelineConfig::default()
        };
        assert!(form().into_request(&pipeline).unwrap().detailed);
    }

    #[test]
    fn test_form_rejects_members_above_limit() {
        for members in ["21", "18446744073709551615"] {
            let form = SeminarForm {
                title: "Seminário".to_string(),
                theme: "Fotossíntese".to_string(),
                members: members.to_string(),
                ..SeminarForm::default()
            };
            assert!(matches!(
                form.into_request(&PipelineConfig::default()),
                Err(SeminarError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (GenerationError::Authentication("x".into()), StatusCode::UNAUTHORIZED),
            (GenerationError::RateLimit("x".into()), StatusCode::TOO_MANY_REQUESTS),
            (GenerationError::Upstream("x".into()), StatusCode::BAD_GATEWAY),
            (GenerationError::Timeout(60), StatusCode::GATEWAY_TIMEOUT),
        ];
        for (error, status) in cases {
            assert_eq!(status_for(&SeminarError::generation("passo", error)), status);
        }
        assert_eq!(
            status_for(&SeminarError::InvalidInput("x".into())),
            StatusCode::BAD_REQUEST
        );
    }
}
