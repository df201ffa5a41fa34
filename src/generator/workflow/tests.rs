#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    use crate::config::Config;
    use crate::generator::context::GeneratorContext;
    use crate::generator::outlet::{HtmlRenderer, PdfDocument, PdfError, PdfExporter};
    use crate::generator::types::SeminarRequest;
    use crate::generator::workflow::{LaunchOptions, TimingKeys, TimingScope, run};
    use crate::llm::{GenerationClient, GenerationError, GenerationParams};

    struct EchoGeneration {
        calls: AtomicUsize,
        fail_connection: bool,
    }

    impl EchoGeneration {
        fn new(fail_connection: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_connection,
            }
        }
    }

    #[async_trait]
    impl GenerationClient for EchoGeneration {
        async fn generate(
            &self,
            prompt: &str,
            _params: GenerationParams,
        ) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("Conteúdo: {}\n\nReferências\n1. Fonte.", prompt.lines().next().unwrap_or_default()))
        }

        async fn check_connection(&self) -> Result<(), GenerationError> {
            if self.fail_connection {
                Err(GenerationError::Authentication("invalid_api_key".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct FakePdfExporter;

    #[async_trait]
    impl PdfExporter for FakePdfExporter {
        async fn export(&self, html: &str) -> Result<PdfDocument, PdfError> {
            if html.is_empty() {
                return Err(PdfError::EmptyHtml);
            }
            Ok(PdfDocument::new(b"%PDF-1.4 fake".to_vec()))
        }
    }

    /// 不覆盖 check_connection，连接检查也计入调用次数
    struct CountingGeneration {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GenerationClient for CountingGeneration {
        async fn generate(
            &self,
            _prompt: &str,
            _params: GenerationParams,
        ) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("Hello".to_string())
        }
    }

    fn create_test_context(generation: Arc<EchoGeneration>) -> GeneratorContext {
        GeneratorContext::with_capabilities(Config::default(), generation, None, None)
    }

    fn options(temp_dir: &TempDir, export_pdf: bool) -> LaunchOptions {
        LaunchOptions {
            output_dir: temp_dir.path().join("output"),
            export_pdf,
            skip_connection_check: false,
        }
    }

    fn request() -> SeminarRequest {
        SeminarRequest::new("Seminário de Biologia", "Fotossíntese", 2, vec![], false)
    }

    #[tokio::test]
    async fn test_run_writes_html_and_pdf() {
        let temp_dir = TempDir::new().unwrap();
        let generation = Arc::new(EchoGeneration::new(false));
        let context = create_test_context(generation.clone());

        let report = run(
            &context,
            &HtmlRenderer::new(),
            &FakePdfExporter,
            &request(),
            &options(&temp_dir, true),
        )
        .await
        .unwrap();

        assert_eq!(report.sections, 2);
        assert_eq!(report.html_path, temp_dir.path().join("output/seminario.html"));
        assert_eq!(
            report.pdf_path,
            Some(temp_dir.path().join("output/seminario.pdf"))
        );
        let html = std::fs::read_to_string(&report.html_path).unwrap();
        assert!(html.contains("Fotossíntese - Parte 2 (Aluno 2)"));
        assert!(report.timing_report.contains("generation"));
        // 2 个子主题 + 总结 + 参考文献
        assert_eq!(generation.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_run_without_pdf() {
        let temp_dir = TempDir::new().unwrap();
        let context = create_test_context(Arc::new(EchoGeneration::new(false)));

        let report = run(
            &context,
            &HtmlRenderer::new(),
            &FakePdfExporter,
            &request(),
            &options(&temp_dir, false),
        )
        .await
        .unwrap();

        assert!(report.pdf_path.is_none());
        assert!(!temp_dir.path().join("output/seminario.pdf").exists());
    }

    #[tokio::test]
    async fn test_failed_connection_check_stops_before_generation() {
        let temp_dir = TempDir::new().unwrap();
        let generation = Arc::new(EchoGeneration::new(true));
        let context = create_test_context(generation.clone());

        let result = run(
            &context,
            &HtmlRenderer::new(),
            &FakePdfExporter,
            &request(),
            &options(&temp_dir, false),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(generation.calls.load(Ordering::SeqCst), 0);
        assert!(!temp_dir.path().join("output").exists());
    }

    #[tokio::test]
    async fn test_skip_connection_check() {
        let temp_dir = TempDir::new().unwrap();
        let context = create_test_context(Arc::new(EchoGeneration::new(true)));
        let mut options = options(&temp_dir, false);
        options.skip_connection_check = true;

        let report = run(&context, &HtmlRenderer::new(), &FakePdfExporter, &request(), &options).await;
        assert!(report.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_request_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let context = create_test_context(Arc::new(EchoGeneration::new(false)));
        let mut request = request();
        request.members = 0;

        let result = run(
            &context,
            &HtmlRenderer::new(),
            &FakePdfExporter,
            &request,
            &options(&temp_dir, true),
        )
        .await;

        assert!(result.is_err());
        assert!(!temp_dir.path().join("output").exists());
    }

    #[test]
    fn test_timing_scope_phases() {
        let mut timing = TimingScope::new();
        timing.start_phase(TimingKeys::RENDER);
        std::thread::sleep(Duration::from_millis(2));
        let duration = timing.end_phase(TimingKeys::RENDER).unwrap();

        assert!(duration >= Duration::from_millis(2));
        assert!(timing.end_phase(TimingKeys::OUTPUT).is_none());
        assert_eq!(timing.get_phase_durations().len(), 1);

        let report = timing.generate_timing_report();
        assert!(report.contains("总执行时间"));
        assert!(report.contains("- render:"));
        assert!(!report.contains("- output:"));
    }

    #[tokio::test]
    async fn test_invalid_request_makes_no_calls_before_connection_check() {
        let temp_dir = TempDir::new().unwrap();
        let generation = Arc::new(CountingGeneration {
            calls: AtomicUsize::new(0),
        });
        let context =
            GeneratorContext::with_capabilities(Config::default(), generation.clone(), None, None);

        for members in [0, 21] {
            let mut invalid = request();
            invalid.members = members;
            let result = run(
                &context,
                &HtmlRenderer::new(),
                &FakePdfExporter,
                &invalid,
                &options(&temp_dir, false),
            )
            .await;

            assert!(result.is_err());
        }
        assert_eq!(generation.calls.load(Ordering::SeqCst), 0);
        assert!(!temp_dir.path().join("output").exists());
    }
}
