//! 生成文本的正文/参考文献切分
//!
//! 这是启发式切分而非结构化解析：切分标记与生成内容的语言必须一致，
//! 由 PromptBuilder 在提示词中要求模型单独一行输出同一个标记。

/// 标记位于标题行时，两侧允许出现的Markdown修饰
const HEADING_DECORATION: &[char] = &['#', '*', '_'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSplitter {
    marker: String,
}

impl ResponseSplitter {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// 在标记第一次出现处切分，返回 (正文, 参考文献)。没有标记时参考文献为空。
    /// 只有标记独占标题行时才去掉其Markdown修饰，正文与参考文献中的强调保持不变。
    pub fn split(&self, text: &str) -> (String, String) {
        if self.marker.is_empty() {
            return (text.trim().to_string(), String::new());
        }

        let Some(position) = text.find(&self.marker) else {
            return (text.trim().to_string(), String::new());
        };

        let line_start = text[..position].rfind('\n').map_or(0, |i| i + 1);
        let after = &text[position + self.marker.len()..];
        let on_heading = text[line_start..position]
            .chars()
            .all(|c| c.is_whitespace() || HEADING_DECORATION.contains(&c));

        if !on_heading {
            return (
                text[..position].trim().to_string(),
                after.trim().to_string(),
            );
        }

        // 标题行：去掉标记前的修饰，以及紧跟标记、后接空白的闭合修饰
        let closing = after
            .find(|c: char| c != ':' && !HEADING_DECORATION.contains(&c))
            .unwrap_or(after.len());
        let rest = &after[closing..];
        let references = if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            rest
        } else {
            after
        };

        (
            text[..line_start].trim().to_string(),
            references.trim().to_string(),
        )
    }
}
