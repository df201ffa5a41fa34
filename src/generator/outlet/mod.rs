use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::generator::types::{SectionContent, SeminarDocument, Subtopic};
use crate::i18n::DocumentLabels;

pub mod pdf;

pub use pdf::{PdfDocument, PdfError, PdfExporter, WkhtmltopdfExporter};

/// HTML 输出文件名
pub const HTML_FILENAME: &str = "seminario.html";

/// 转义HTML特殊字符
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 文档渲染：SeminarDocument → 完整的HTML页面
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, document: &SeminarDocument) -> String;
}

/// 默认渲染器。模型产出的正文按Markdown转换，原始HTML会被转义；标题等用户输入统一转义。
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    fn render_members(&self, names: &[String], labels: &DocumentLabels) -> String {
        if names.is_empty() {
            return String::new();
        }
        let items = names
            .iter()
            .map(|name| format!("<li>{}</li>", escape_html(name)))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "<section class=\"members\">\n<h2>{}</h2>\n<ul>\n{}\n</ul>\n</section>",
            labels.members, items
        )
    }

    fn render_section(
        &self,
        subtopic: &Subtopic,
        content: &SectionContent,
        labels: &DocumentLabels,
    ) -> String {
        let mut html = format!(
            "<section class=\"part\" id=\"parte-{}\">\n<h2>{}</h2>\n",
            subtopic.index() + 1,
            escape_html(subtopic.label())
        );

        if let Some(image) = &content.image {
            html.push_str(&format!(
                "<figure>\n<img src=\"{}\" alt=\"{}\">\n",
                escape_html(&image.url),
                escape_html(subtopic.label())
            ));
            if !image.attribution.is_empty() {
                // 署名由图片服务生成，已转义过动态字段
                html.push_str(&format!("<figcaption>{}</figcaption>\n", image.attribution));
            }
            html.push_str("</figure>\n");
        }

        if content.placeholder {
            html.push_str(&format!(
                "<p class=\"placeholder\">{}</p>\n",
                escape_html(&content.body)
            ));
        } else {
            html.push_str(&markdown::to_html(&content.body));
            html.push('\n');
        }

        if !content.references.is_empty() {
            html.push_str(&format!(
                "<div class=\"references\">\n<h3>{}</h3>\n{}\n</div>\n",
                labels.references,
                markdown::to_html(&content.references)
            ));
        }

        html.push_str("</section>");
        html
    }

    fn render_bibliography(&self, references: &str, labels: &DocumentLabels) -> String {
        if references.trim().is_empty() {
            return String::new();
        }
        format!(
            "<section class=\"bibliography\">\n<h2>{}</h2>\n{}\n</section>",
            labels.bibliography,
            markdown::to_html(references)
        )
    }

    /// 汇总所有章节用到的搜索来源，按链接去重并保持首次出现的顺序
    fn render_sources(&self, document: &SeminarDocument, labels: &DocumentLabels) -> String {
        let mut seen = HashSet::new();
        let items = document
            .sections()
            .iter()
            .flat_map(|(_, content)| content.search_results.iter())
            .filter(|result| seen.insert(result.link.as_str()))
            .map(|result| {
                format!(
                    "<li><a href=\"{}\">{}</a></li>",
                    escape_html(&result.link),
                    escape_html(&result.title)
                )
            })
            .collect::<Vec<_>>();

        if items.is_empty() {
            return String::new();
        }
        format!(
            "<section class=\"sources\">\n<h2>{}</h2>\n<ul>\n{}\n</ul>\n</section>",
            labels.sources,
            items.join("\n")
        )
    }
}

impl DocumentRenderer for HtmlRenderer {
    fn render(&self, document: &SeminarDocument) -> String {
        let language = document.language();
        let labels = language.labels();

        let sections = document
            .sections()
            .iter()
            .map(|(subtopic, content)| self.render_section(subtopic, content, &labels))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            include_str!("templates/seminar.html"),
            lang = language.html_lang(),
            title = escape_html(document.title()),
            theme_label = labels.theme,
            theme = escape_html(document.theme()),
            members = self.render_members(document.member_names(), &labels),
            sections = sections,
            conclusion_label = labels.conclusion,
            conclusion = markdown::to_html(document.conclusion()),
            bibliography = self.render_bibliography(document.final_references(), &labels),
            sources = self.render_sources(document, &labels),
            generated_label = labels.generated_at,
            generated_at = document.generated_at().format("%d/%m/%Y %H:%M UTC"),
        )
    }
}

/// 将渲染结果写入输出目录
pub struct DiskOutlet {
    output_dir: PathBuf,
}

impl DiskOutlet {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    async fn ensure_output_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("无法创建输出目录: {}", self.output_dir.display()))
    }

    pub async fn save_html(&self, html: &str) -> Result<PathBuf> {
        self.ensure_output_dir().await?;
        let path = self.output_dir.join(HTML_FILENAME);
        tokio::fs::write(&path, html)
            .await
            .with_context(|| format!("写入HTML失败: {}", path.display()))?;
        tracing::info!(path = %path.display(), "已保存HTML文档");
        Ok(path)
    }

    pub async fn save_pdf(&self, pdf: &PdfDocument) -> Result<PathBuf> {
        self.ensure_output_dir().await?;
        let path = self.output_dir.join(&pdf.filename);
        tokio::fs::write(&path, &pdf.bytes)
            .await
            .with_context(|| format!("写入PDF失败: {}", path.display()))?;
        tracing::info!(path = %path.display(), bytes = pdf.bytes.len(), "已保存PDF文档");
        Ok(path)
    }
}
