use crate::llm::GenerationError;

/// 文档生成流程的错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeminarError {
    /// 表单数据不合法，提示用户重新填写
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 生成能力失败，整个请求终止
    #[error("generation failed during {step}: {source}")]
    Generation {
        step: String,
        #[source]
        source: GenerationError,
    },
}

impl SeminarError {
    pub fn generation(step: impl Into<String>, source: GenerationError) -> Self {
        match source {
            // 生成参数校验失败说明调用方输入有误
            GenerationError::InvalidInput(message) => SeminarError::InvalidInput(message),
            source => SeminarError::Generation {
                step: step.into(),
                source,
            },
        }
    }

    pub fn class_tag(&self) -> &'static str {
        match self {
            SeminarError::InvalidInput(_) => "invalid_input",
            SeminarError::Generation { source, .. } => source.class_tag(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_tag_follows_generation_error() {
        let err = SeminarError::generation(
            "Tema - Parte 1 (Aluno 1)",
            GenerationError::RateLimit("slow down".to_string()),
        );
        assert_eq!(err.class_tag(), "rate_limit_error");
        assert!(err.to_string().contains("Tema - Parte 1 (Aluno 1)"));
    }

    #[test]
    fn test_generation_invalid_input_maps_to_invalid_input() {
        let err = SeminarError::generation(
            "conclusão",
            GenerationError::InvalidInput("prompt is empty".to_string()),
        );
        assert_eq!(err, SeminarError::InvalidInput("prompt is empty".to_string()));
        assert_eq!(err.class_tag(), "invalid_input");
    }
}
