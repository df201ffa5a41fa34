//! 研讨会文档编排器

use tokio::time::Instant;

use crate::config::FailurePolicy;
use crate::generator::context::GeneratorContext;
use crate::generator::error::SeminarError;
use crate::generator::prompt::{PromptBuilder, PromptMode, format_context};
use crate::generator::retry::{RetryPolicy, retry_with_backoff};
use crate::generator::splitter::ResponseSplitter;
use crate::generator::types::{SectionContent, SeminarDocument, SeminarRequest, Subtopic};
use crate::grounding::{ImageResult, SearchResult};
use crate::llm::GenerationParams;
use crate::utils::threads::try_parallel_with_limit;

/// 编排 提示词构建 → 检索 → 生成 → 切分，产出一份不可变的 SeminarDocument
pub struct SeminarAssembler {
    context: GeneratorContext,
    prompt_builder: PromptBuilder,
    splitter: ResponseSplitter,
    retry_policy: RetryPolicy,
}

impl SeminarAssembler {
    pub fn new(context: GeneratorContext) -> Self {
        let language = context.config.target_language;
        let prompt_builder = PromptBuilder::new(language);
        let splitter = ResponseSplitter::new(prompt_builder.references_marker());
        let retry_policy = RetryPolicy::from_config(&context.config.llm);
        Self {
            context,
            prompt_builder,
            splitter,
            retry_policy,
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// 执行完整的生成流程
    pub async fn assemble(&self, request: &SeminarRequest) -> Result<SeminarDocument, SeminarError> {
        request.validate(self.context.config.pipeline.max_members)?;

        let start_time = Instant::now();
        let config = &self.context.config;
        let subtopics = Subtopic::derive_all(&request.theme, request.members);
        let max_parallels = config.llm.max_parallels.min(subtopics.len()).max(1);

        tracing::info!(
            theme = %request.theme,
            sections = subtopics.len(),
            detailed = request.detailed,
            max_parallels,
            "开始生成研讨会文档"
        );

        let section_futures: Vec<_> = subtopics
            .iter()
            .map(|subtopic| self.build_section(subtopic, request.detailed))
            .collect();
        let contents = try_parallel_with_limit(section_futures, max_parallels).await?;
        let sections: Vec<(Subtopic, SectionContent)> = subtopics.into_iter().zip(contents).collect();

        let conclusion = self.generate_conclusion(&request.theme, &sections).await?;

        let final_references = if config.pipeline.include_bibliography {
            self.generate_bibliography(&request.theme).await?
        } else {
            String::new()
        };

        tracing::info!(
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "研讨会文档生成完成"
        );

        Ok(SeminarDocument::new(
            request,
            sections,
            conclusion,
            final_references,
            config.target_language,
        ))
    }

    async fn build_section(
        &self,
        subtopic: &Subtopic,
        detailed: bool,
    ) -> Result<SectionContent, SeminarError> {
        let label = subtopic.label();
        let (search_results, image) =
            tokio::join!(self.gather_search(label), self.gather_image(label));

        let mode = match &search_results {
            Some(results) => PromptMode::Grounded {
                context: format_context(results),
                detailed,
            },
            None if detailed => PromptMode::Detailed,
            None => PromptMode::Plain,
        };
        let prompt = self.prompt_builder.build(label, &mode)?;

        tracing::debug!(subtopic = label, mode = mode.name(), "生成子主题内容");

        match self
            .generate(label, &prompt, mode.generation_params())
            .await
        {
            Ok(text) => {
                let (body, references) = self.splitter.split(&text);
                Ok(SectionContent {
                    body,
                    references,
                    search_results: search_results.unwrap_or_default(),
                    image,
                    placeholder: false,
                })
            }
            Err(err @ SeminarError::Generation { .. })
                if self.context.config.pipeline.failure_policy == FailurePolicy::Placeholder =>
            {
                tracing::warn!(
                    subtopic = label,
                    class = err.class_tag(),
                    "子主题生成失败，使用占位内容: {}",
                    err
                );
                Ok(SectionContent {
                    body: self.context.config.target_language.placeholder_notice().to_string(),
                    references: String::new(),
                    search_results: search_results.unwrap_or_default(),
                    image,
                    placeholder: true,
                })
            }
            Err(err) => {
                tracing::error!(subtopic = label, class = err.class_tag(), "子主题生成失败: {}", err);
                Err(err)
            }
        }
    }

    /// 检索失败不影响主流程，返回None表示使用无检索模式
    async fn gather_search(&self, query: &str) -> Option<Vec<SearchResult>> {
        if !self.context.config.pipeline.grounding {
            return None;
        }
        let provider = self.context.search.as_ref()?;
        let limit = self.context.config.search.results_per_query;

        match provider.search(query, limit).await {
            Ok(results) => Some(results),
            Err(e) => {
                tracing::warn!(query, "网络搜索不可用，降级为无检索生成: {}", e);
                None
            }
        }
    }

    async fn gather_image(&self, query: &str) -> Option<ImageResult> {
        let provider = self.context.image.as_ref()?;
        match provider.find_image(query).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(query, "配图检索不可用，跳过配图: {}", e);
                None
            }
        }
    }

    async fn generate(
        &self,
        step: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, SeminarError> {
        let generation = &self.context.generation;
        retry_with_backoff(&self.retry_policy, step, || generation.generate(prompt, params))
            .await
            .map_err(|e| SeminarError::generation(step, e))
    }

    async fn generate_conclusion(
        &self,
        theme: &str,
        sections: &[(Subtopic, SectionContent)],
    ) -> Result<String, SeminarError> {
        let mode = PromptMode::Conclusion {
            subtopics: sections
                .iter()
                .map(|(subtopic, _)| subtopic.label().to_string())
                .collect(),
        };
        let prompt = self.prompt_builder.build(theme, &mode)?;
        let text = self
            .generate("conclusão", &prompt, mode.generation_params())
            .await?;
        Ok(text.trim().to_string())
    }

    async fn generate_bibliography(&self, theme: &str) -> Result<String, SeminarError> {
        let mode = PromptMode::ReferencesSummary;
        let prompt = self.prompt_builder.build(theme, &mode)?;
        let text = self
            .generate("referências", &prompt, mode.generation_params())
            .await?;

        // 模型有时会自带标题行，去掉标题只保留列表
        let text = text.trim();
        let list = match text.split_once('\n') {
            Some((first_line, rest)) if first_line.contains(self.splitter.marker()) => rest.trim(),
            _ => text,
        };
        Ok(list.to_string())
    }
}
