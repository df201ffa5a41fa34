use serde::{Deserialize, Serialize};

/// 目标语言类型
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetLanguage {
    #[serde(rename = "pt")]
    #[default]
    Portuguese,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
}

impl std::fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetLanguage::Portuguese => write!(f, "pt"),
            TargetLanguage::English => write!(f, "en"),
            TargetLanguage::Spanish => write!(f, "es"),
        }
    }
}

impl std::str::FromStr for TargetLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pt" | "pt-br" | "portuguese" | "português" => Ok(TargetLanguage::Portuguese),
            "en" | "english" | "inglês" => Ok(TargetLanguage::English),
            "es" | "spanish" | "español" | "espanhol" => Ok(TargetLanguage::Spanish),
            _ => Err(format!("Unknown target language: {}", s)),
        }
    }
}

/// 文档渲染时使用的固定文案
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentLabels {
    pub theme: &'static str,
    pub members: &'static str,
    pub conclusion: &'static str,
    pub references: &'static str,
    pub bibliography: &'static str,
    pub sources: &'static str,
    pub generated_at: &'static str,
    pub download_pdf: &'static str,
}

impl TargetLanguage {
    /// 获取语言的描述性名称
    pub fn display_name(&self) -> &'static str {
        match self {
            TargetLanguage::Portuguese => "Português",
            TargetLanguage::English => "English",
            TargetLanguage::Spanish => "Español",
        }
    }

    /// HTML `lang` 属性
    pub fn html_lang(&self) -> &'static str {
        match self {
            TargetLanguage::Portuguese => "pt-BR",
            TargetLanguage::English => "en",
            TargetLanguage::Spanish => "es",
        }
    }

    /// 获取语言的提示词指令
    pub fn prompt_instruction(&self) -> &'static str {
        match self {
            TargetLanguage::Portuguese => {
                "Escreva em português do Brasil, com linguagem acadêmica, clara e objetiva."
            }
            TargetLanguage::English => {
                "Write in English, using clear, objective and academic language."
            }
            TargetLanguage::Spanish => {
                "Escribe en español, con un lenguaje académico, claro y objetivo."
            }
        }
    }

    /// 参考文献段落的标记。提示词要求模型单独一行输出该标记，ResponseSplitter 据此切分。
    pub fn references_marker(&self) -> &'static str {
        match self {
            TargetLanguage::Portuguese => "Referências",
            TargetLanguage::English => "References",
            TargetLanguage::Spanish => "Referencias",
        }
    }

    /// 子主题生成失败且策略为 placeholder 时的占位正文
    pub fn placeholder_notice(&self) -> &'static str {
        match self {
            TargetLanguage::Portuguese => {
                "Não foi possível gerar o conteúdo desta seção. Tente novamente mais tarde."
            }
            TargetLanguage::English => {
                "The content for this section could not be generated. Please try again later."
            }
            TargetLanguage::Spanish => {
                "No fue posible generar el contenido de esta sección. Inténtelo de nuevo más tarde."
            }
        }
    }

    /// 获取文档标签
    pub fn labels(&self) -> DocumentLabels {
        match self {
            TargetLanguage::Portuguese => DocumentLabels {
                theme: "Tema",
                members: "Integrantes",
                conclusion: "Conclusão",
                references: "Referências",
                bibliography: "Referências Bibliográficas",
                sources: "Fontes consultadas",
                generated_at: "Gerado em",
                download_pdf: "Baixar PDF",
            },
            TargetLanguage::English => DocumentLabels {
                theme: "Theme",
                members: "Members",
                conclusion: "Conclusion",
                references: "References",
                bibliography: "Bibliography",
                sources: "Sources consulted",
                generated_at: "Generated at",
                download_pdf: "Download PDF",
            },
            TargetLanguage::Spanish => DocumentLabels {
                theme: "Tema",
                members: "Integrantes",
                conclusion: "Conclusión",
                references: "Referencias",
                bibliography: "Referencias Bibliográficas",
                sources: "Fuentes consultadas",
                generated_at: "Generado el",
                download_pdf: "Descargar PDF",
            },
        }
    }
}
