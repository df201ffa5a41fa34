use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::generator::error::SeminarError;
use crate::grounding::{ImageResult, SearchResult};
use crate::i18n::TargetLanguage;

/// 一次生成请求的输入
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeminarRequest {
    pub title: String,
    pub theme: String,
    /// 成员数量，决定子主题数量
    pub members: usize,
    /// 成员姓名，不要求与成员数量一致
    pub member_names: Vec<String>,
    /// 详细模式
    pub detailed: bool,
}

impl SeminarRequest {
    pub fn new(
        title: impl Into<String>,
        theme: impl Into<String>,
        members: usize,
        member_names: Vec<String>,
        detailed: bool,
    ) -> Self {
        Self {
            title: title.into(),
            theme: theme.into(),
            members,
            member_names,
            detailed,
        }
    }

    /// 从表单的多行文本解析成员姓名：每行一个，忽略空行
    pub fn parse_member_names(raw: &str) -> Vec<String> {
        raw.lines()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// 校验请求；成员数量必须在 1..=max_members 之间
    pub fn validate(&self, max_members: usize) -> Result<(), SeminarError> {
        if self.members == 0 {
            return Err(SeminarError::InvalidInput(
                "o número de integrantes deve ser maior que zero".to_string(),
            ));
        }
        if self.members > max_members {
            return Err(SeminarError::InvalidInput(format!(
                "o número de integrantes não pode passar de {} (recebido: {})",
                max_members, self.members
            )));
        }
        if self.title.trim().is_empty() {
            return Err(SeminarError::InvalidInput(
                "o título do seminário é obrigatório".to_string(),
            ));
        }
        if self.theme.trim().is_empty() {
            return Err(SeminarError::InvalidInput(
                "o tema do seminário é obrigatório".to_string(),
            ));
        }
        Ok(())
    }
}

/// 某位成员负责的子主题，只由位置决定
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subtopic {
    index: usize,
    label: String,
}

impl Subtopic {
    pub fn new(theme: &str, index: usize) -> Self {
        let ordinal = index + 1;
        Self {
            index,
            label: format!("{} - Parte {} (Aluno {})", theme.trim(), ordinal, ordinal),
        }
    }

    /// 为主题生成n个子主题
    pub fn derive_all(theme: &str, count: usize) -> Vec<Subtopic> {
        (0..count).map(|index| Subtopic::new(theme, index)).collect()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// 单个子主题的生成结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionContent {
    pub body: String,
    /// 未找到参考文献标记时为空
    pub references: String,
    pub search_results: Vec<SearchResult>,
    pub image: Option<ImageResult>,
    /// 生成失败后以占位内容代替
    pub placeholder: bool,
}

/// 组装完成的研讨会文档，构建后不可变
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeminarDocument {
    title: String,
    theme: String,
    member_names: Vec<String>,
    sections: Vec<(Subtopic, SectionContent)>,
    conclusion: String,
    final_references: String,
    language: TargetLanguage,
    generated_at: DateTime<Utc>,
}

impl SeminarDocument {
    pub(crate) fn new(
        request: &SeminarRequest,
        sections: Vec<(Subtopic, SectionContent)>,
        conclusion: String,
        final_references: String,
        language: TargetLanguage,
    ) -> Self {
        Self {
            title: request.title.trim().to_string(),
            theme: request.theme.trim().to_string(),
            member_names: request.member_names.clone(),
            sections,
            conclusion,
            final_references,
            language,
            generated_at: Utc::now(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn member_names(&self) -> &[String] {
        &self.member_names
    }

    pub fn sections(&self) -> &[(Subtopic, SectionContent)] {
        &self.sections
    }

    pub fn conclusion(&self) -> &str {
        &self.conclusion
    }

    pub fn final_references(&self) -> &str {
        &self.final_references
    }

    pub fn language(&self) -> TargetLanguage {
        self.language
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtopic_label_scheme() {
        let subtopics = Subtopic::derive_all("Fotossíntese", 3);

        assert_eq!(subtopics.len(), 3);
        assert_eq!(subtopics[0].label(), "Fotossíntese - Parte 1 (Aluno 1)");
        assert_eq!(subtopics[2].label(), "Fotossíntese - Parte 3 (Aluno 3)");
        assert_eq!(subtopics[2].index(), 2);
    }

    #[test]
    fn test_subtopic_labels_are_unique() {
        let subtopics = Subtopic::derive_all("Tema", 12);
        let mut labels: Vec<_> = subtopics.iter().map(|s| s.label().to_string()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), 12);
    }

    #[test]
    fn test_parse_member_names() {
        let names = SeminarRequest::parse_member_names("Ana\n\n  Beto \r\nCarla\n   \n");
        assert_eq!(names, vec!["Ana", "Beto", "Carla"]);
        assert!(SeminarRequest::parse_member_names("").is_empty());
    }

    #[test]
    fn test_validate_rejects_zero_members() {
        let request = SeminarRequest::new("Título", "Tema", 0, vec![], false);
        assert!(matches!(
            request.validate(20),
            Err(SeminarError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_blank_theme() {
        let request = SeminarRequest::new("Título", "   ", 2, vec![], false);
        assert!(matches!(
            request.validate(20),
            Err(SeminarError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_members_above_limit() {
        let request = SeminarRequest::new("Título", "Tema", usize::MAX, vec![], false);
        assert!(matches!(
            request.validate(20),
            Err(SeminarError::InvalidInput(_))
        ));

        let request = SeminarRequest::new("Título", "Tema", 21, vec![], false);
        assert!(request.validate(20).is_err());
        assert!(request.validate(21).is_ok());
    }

    #[test]
    fn test_member_names_need_not_match_count() {
        let request = SeminarRequest::new("Título", "Tema", 1, vec!["Ana".into(), "Beto".into()], false);
        assert!(request.validate(20).is_ok());
    }
}
