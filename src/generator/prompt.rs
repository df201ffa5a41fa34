//! 提示词构建：纯字符串拼装，无副作用

use crate::generator::error::SeminarError;
use crate::grounding::SearchResult;
use crate::i18n::TargetLanguage;
use crate::llm::GenerationParams;

/// 检索增强模式下最多引用的搜索结果条数
pub const MAX_CONTEXT_RESULTS: usize = 3;

const TEMPERATURE: f64 = 0.7;

/// 提示词模式
#[derive(Debug, Clone, PartialEq)]
pub enum PromptMode {
    /// 简洁模式
    Plain,
    /// 详细模式
    Detailed,
    /// 检索增强模式，携带格式化后的上下文块（可以为空）；`detailed` 决定篇幅与深度
    Grounded { context: String, detailed: bool },
    /// 全文总结，携带各子主题标签
    Conclusion { subtopics: Vec<String> },
    /// 最终参考文献
    ReferencesSummary,
}

impl PromptMode {
    /// 各模式固定的生成预算
    pub fn generation_params(&self) -> GenerationParams {
        let max_tokens = match self {
            PromptMode::Plain => 500,
            PromptMode::Detailed => 1000,
            PromptMode::Grounded { .. } => 600,
            PromptMode::Conclusion { .. } => 500,
            PromptMode::ReferencesSummary => 500,
        };
        GenerationParams::new(max_tokens, TEMPERATURE)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PromptMode::Plain => "plain",
            PromptMode::Detailed => "detailed",
            PromptMode::Grounded { detailed: false, .. } => "grounded",
            PromptMode::Grounded { detailed: true, .. } => "grounded-detailed",
            PromptMode::Conclusion { .. } => "conclusion",
            PromptMode::ReferencesSummary => "references-summary",
        }
    }

    fn word_limit(&self) -> u32 {
        match self {
            PromptMode::Plain => 300,
            PromptMode::Detailed => 600,
            PromptMode::Grounded { detailed: false, .. } => 400,
            PromptMode::Grounded { detailed: true, .. } => 450,
            PromptMode::Conclusion { .. } => 250,
            PromptMode::ReferencesSummary => 0,
        }
    }
}

/// 把搜索结果格式化为上下文块，每行 "title: snippet (link)"
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .take(MAX_CONTEXT_RESULTS)
        .map(|result| format!("{}: {} ({})", result.title, result.snippet, result.link))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 一种语言的整套提示词模板
struct PromptTemplates {
    plain: &'static str,
    detailed: &'static str,
    grounded: &'static str,
    grounded_detailed: &'static str,
    conclusion: &'static str,
    references: &'static str,
}

const PORTUGUESE_TEMPLATES: PromptTemplates = PromptTemplates {
    plain: include_str!("prompts/pt/plain.tpl"),
    detailed: include_str!("prompts/pt/detailed.tpl"),
    grounded: include_str!("prompts/pt/grounded.tpl"),
    grounded_detailed: include_str!("prompts/pt/grounded_detailed.tpl"),
    conclusion: include_str!("prompts/pt/conclusion.tpl"),
    references: include_str!("prompts/pt/references.tpl"),
};

const ENGLISH_TEMPLATES: PromptTemplates = PromptTemplates {
    plain: include_str!("prompts/en/plain.tpl"),
    detailed: include_str!("prompts/en/detailed.tpl"),
    grounded: include_str!("prompts/en/grounded.tpl"),
    grounded_detailed: include_str!("prompts/en/grounded_detailed.tpl"),
    conclusion: include_str!("prompts/en/conclusion.tpl"),
    references: include_str!("prompts/en/references.tpl"),
};

const SPANISH_TEMPLATES: PromptTemplates = PromptTemplates {
    plain: include_str!("prompts/es/plain.tpl"),
    detailed: include_str!("prompts/es/detailed.tpl"),
    grounded: include_str!("prompts/es/grounded.tpl"),
    grounded_detailed: include_str!("prompts/es/grounded_detailed.tpl"),
    conclusion: include_str!("prompts/es/conclusion.tpl"),
    references: include_str!("prompts/es/references.tpl"),
};

fn templates_for(language: TargetLanguage) -> &'static PromptTemplates {
    match language {
        TargetLanguage::Portuguese => &PORTUGUESE_TEMPLATES,
        TargetLanguage::English => &ENGLISH_TEMPLATES,
        TargetLanguage::Spanish => &SPANISH_TEMPLATES,
    }
}

/// 单遍替换模板中的 `{name}` 占位符；填入的值不会被再次展开
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        output.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let value = tail.find('}').and_then(|end| {
            let key = &tail[..end];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (end, *value))
        });
        match value {
            Some((end, value)) => {
                output.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                output.push('{');
                rest = tail;
            }
        }
    }

    output.push_str(rest);
    output
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    language: TargetLanguage,
    marker: String,
}

impl PromptBuilder {
    pub fn new(language: TargetLanguage) -> Self {
        Self {
            language,
            marker: language.references_marker().to_string(),
        }
    }

    /// 与 ResponseSplitter 共用的参考文献标记
    pub fn references_marker(&self) -> &str {
        &self.marker
    }

    /// 构建提示词。`subject` 对正文模式是子主题标签，对总结与参考文献模式是主题本身。
    pub fn build(&self, subject: &str, mode: &PromptMode) -> Result<String, SeminarError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(SeminarError::InvalidInput(format!(
                "cannot build a {} prompt without a subject",
                mode.name()
            )));
        }

        let templates = templates_for(self.language);
        let language_instruction = self.language.prompt_instruction();
        let word_limit = mode.word_limit().to_string();

        let prompt = match mode {
            PromptMode::Plain | PromptMode::Detailed => {
                let template = if matches!(mode, PromptMode::Plain) {
                    templates.plain
                } else {
                    templates.detailed
                };
                fill(
                    template,
                    &[
                        ("subtopic", subject),
                        ("word_limit", word_limit.as_str()),
                        ("language_instruction", language_instruction),
                        ("marker", self.marker.as_str()),
                    ],
                )
            }
            PromptMode::Grounded { context, detailed } => {
                let template = if *detailed {
                    templates.grounded_detailed
                } else {
                    templates.grounded
                };
                fill(
                    template,
                    &[
                        ("subtopic", subject),
                        ("context", context.as_str()),
                        ("word_limit", word_limit.as_str()),
                        ("language_instruction", language_instruction),
                        ("marker", self.marker.as_str()),
                    ],
                )
            }
            PromptMode::Conclusion { subtopics } => {
                let subtopics = subtopics
                    .iter()
                    .map(|label| format!("- {}", label))
                    .collect::<Vec<_>>()
                    .join("\n");
                fill(
                    templates.conclusion,
                    &[
                        ("theme", subject),
                        ("subtopics", subtopics.as_str()),
                        ("word_limit", word_limit.as_str()),
                        ("language_instruction", language_instruction),
                    ],
                )
            }
            PromptMode::ReferencesSummary => fill(
                templates.references,
                &[
                    ("theme", subject),
                    ("language_instruction", language_instruction),
                ],
            ),
        };

        Ok(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_results(count: usize) -> Vec<SearchResult> {
        (1..=count)
            .map(|i| SearchResult {
                title: format!("Fonte {}", i),
                link: format!("https://exemplo.org/{}", i),
                snippet: format!("Resumo {}", i),
            })
            .collect()
    }

    #[test]
    fn test_generation_params_table() {
        assert_eq!(PromptMode::Plain.generation_params().max_tokens, 500);
        assert_eq!(PromptMode::Detailed.generation_params().max_tokens, 1000);
        assert_eq!(
            PromptMode::Grounded {
                context: String::new(),
                detailed: false,
            }
            .generation_params()
            .max_tokens,
            600
        );
        assert_eq!(
            PromptMode::Grounded {
                context: String::new(),
                detailed: true,
            }
            .generation_params()
            .max_tokens,
            600
        );
        assert_eq!(
            PromptMode::Conclusion { subtopics: vec![] }
                .generation_params()
                .max_tokens,
            500
        );
        assert_eq!(
            PromptMode::ReferencesSummary.generation_params().max_tokens,
            500
        );
        assert_eq!(PromptMode::Plain.generation_params().temperature, 0.7);
    }

    #[test]
    fn test_format_context_limits_to_three() {
        let context = format_context(&sample_results(5));
        let lines: Vec<_> = context.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Fonte 1: Resumo 1 (https://exemplo.org/1)");
        assert!(!context.contains("Fonte 4"));
    }

    #[test]
    fn test_format_context_empty() {
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn test_plain_prompt_contents() {
        let builder = PromptBuilder::new(TargetLanguage::Portuguese);
        let prompt = builder
            .build("Fotossíntese - Parte 1 (Aluno 1)", &PromptMode::Plain)
            .unwrap();

        assert!(prompt.starts_with(
            "Escreva um conteúdo claro e objetivo sobre: Fotossíntese - Parte 1 (Aluno 1)."
        ));
        assert!(prompt.contains("Máximo 300 palavras"));
        assert!(prompt.contains("\"Referências\""));
    }

    #[test]
    fn test_detailed_prompt_has_larger_limit() {
        let builder = PromptBuilder::new(TargetLanguage::Portuguese);
        let prompt = builder.build("Tema", &PromptMode::Detailed).unwrap();
        assert!(prompt.contains("Máximo 600 palavras"));
    }

    #[test]
    fn test_grounded_prompt_embeds_context() {
        let builder = PromptBuilder::new(TargetLanguage::Portuguese);
        let context = format_context(&sample_results(2));
        let prompt = builder
            .build("Tema - Parte 1 (Aluno 1)", &PromptMode::Grounded { context: context.clone(), detailed: false })
            .unwrap();

        assert!(prompt.contains(&context));
        assert!(prompt.contains("não copie trechos literalmente"));
        assert!(prompt.contains("Não comece com frases genéricas"));
    }

    #[test]
    fn test_grounded_prompt_with_empty_context() {
        let builder = PromptBuilder::new(TargetLanguage::Portuguese);
        let prompt = builder.build(
            "Tema - Parte 1 (Aluno 1)",
            &PromptMode::Grounded {
                context: format_context(&[]),
                detailed: false,
            },
        );
        assert!(prompt.is_ok());
    }

    #[test]
    fn test_grounded_detailed_prompt_is_deeper() {
        let builder = PromptBuilder::new(TargetLanguage::Portuguese);
        let context = format_context(&sample_results(2));
        let mode = PromptMode::Grounded {
            context: context.clone(),
            detailed: true,
        };
        let prompt = builder.build("Tema - Parte 1 (Aluno 1)", &mode).unwrap();

        assert!(prompt.contains(&context));
        assert!(prompt.contains("Máximo 450 palavras"));
        assert!(prompt.contains("em profundidade"));
        assert!(prompt.contains("não copie trechos literalmente"));
        assert_eq!(mode.name(), "grounded-detailed");
    }

    #[test]
    fn test_templates_follow_target_language() {
        let english = PromptBuilder::new(TargetLanguage::English)
            .build("Photosynthesis - Parte 1 (Aluno 1)", &PromptMode::Plain)
            .unwrap();
        assert!(english.starts_with("Write clear and objective content about: Photosynthesis"));
        assert!(english.contains("a line containing only \"References\""));
        assert!(!english.contains("Escreva"));

        let spanish = PromptBuilder::new(TargetLanguage::Spanish)
            .build("Fotosíntesis", &PromptMode::ReferencesSummary)
            .unwrap();
        assert!(spanish.contains("exactamente 5 referencias"));
        assert!(!spanish.contains("Liste"));
    }

    #[test]
    fn test_context_placeholders_are_not_expanded() {
        let builder = PromptBuilder::new(TargetLanguage::Portuguese);
        let mode = PromptMode::Grounded {
            context: "Fonte {marker}: {subtopic} {desconhecido}".to_string(),
            detailed: false,
        };
        let prompt = builder.build("Tema", &mode).unwrap();

        assert!(prompt.contains("Fonte {marker}: {subtopic} {desconhecido}"));
        assert!(prompt.contains("apenas \"Referências\""));
    }

    #[test]
    fn test_conclusion_lists_subtopics() {
        let builder = PromptBuilder::new(TargetLanguage::Portuguese);
        let prompt = builder
            .build(
                "Fotossíntese",
                &PromptMode::Conclusion {
                    subtopics: vec![
                        "Fotossíntese - Parte 1 (Aluno 1)".to_string(),
                        "Fotossíntese - Parte 2 (Aluno 2)".to_string(),
                    ],
                },
            )
            .unwrap();

        assert!(prompt.contains("sobre o tema: Fotossíntese."));
        assert!(prompt.contains("- Fotossíntese - Parte 2 (Aluno 2)"));
    }

    #[test]
    fn test_references_summary_asks_for_five() {
        let builder = PromptBuilder::new(TargetLanguage::Portuguese);
        let prompt = builder
            .build("Fotossíntese", &PromptMode::ReferencesSummary)
            .unwrap();
        assert!(prompt.contains("exatamente 5 referências"));
        assert!(prompt.contains("ABNT"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::new(TargetLanguage::English);
        let mode = PromptMode::Grounded {
            context: format_context(&sample_results(3)),
            detailed: false,
        };
        let first = builder.build("Theme - Parte 1 (Aluno 1)", &mode).unwrap();
        let second = builder.build("Theme - Parte 1 (Aluno 1)", &mode).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("\"References\""));
    }

    #[test]
    fn test_build_rejects_empty_subject() {
        let builder = PromptBuilder::new(TargetLanguage::Portuguese);
        assert!(matches!(
            builder.build("  ", &PromptMode::Plain),
            Err(SeminarError::InvalidInput(_))
        ));
        assert!(matches!(
            builder.build("", &PromptMode::ReferencesSummary),
            Err(SeminarError::InvalidInput(_))
        ));
    }
}
