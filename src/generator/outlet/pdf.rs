//! HTML → PDF 导出

use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;

use crate::config::PdfConfig;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const PDF_FILENAME: &str = "seminario.pdf";

/// 导出的PDF及其下载元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfDocument {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: &'static str,
}

impl PdfDocument {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: PDF_CONTENT_TYPE,
            filename: PDF_FILENAME,
        }
    }

    /// 用于 Content-Disposition 响应头
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("cannot export an empty HTML document")]
    EmptyHtml,

    #[error("PDF converter `{0}` is not installed or not on PATH")]
    Unavailable(String),

    #[error("PDF converter exited with status {status}: {stderr}")]
    Failed { status: i32, stderr: String },

    #[error("PDF conversion timed out after {0} seconds")]
    Timeout(u64),

    #[error("PDF converter produced no output")]
    EmptyOutput,

    #[error("PDF converter I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait PdfExporter: Send + Sync {
    async fn export(&self, html: &str) -> Result<PdfDocument, PdfError>;

    /// 转换能力是否就绪，供健康检查使用
    async fn is_available(&self) -> bool {
        true
    }
}

/// 调用外部 wkhtmltopdf 程序完成转换，HTML 从 stdin 写入，PDF 从 stdout 读出
pub struct WkhtmltopdfExporter {
    config: PdfConfig,
}

impl WkhtmltopdfExporter {
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }

    fn args(&self) -> Vec<String> {
        let margin = format!("{}mm", self.config.margin_mm);
        let mut args = vec![
            "--quiet".to_string(),
            "--page-size".to_string(),
            self.config.page_size.clone(),
        ];
        for side in ["--margin-top", "--margin-right", "--margin-bottom", "--margin-left"] {
            args.push(side.to_string());
            args.push(margin.clone());
        }
        args.push("--encoding".to_string());
        args.push(self.config.encoding.clone());
        // 输入输出均走标准流
        args.push("-".to_string());
        args.push("-".to_string());
        args
    }

    async fn run(&self, html: &str) -> Result<PdfDocument, PdfError> {
        let mut child = TokioCommand::new(&self.config.program)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => PdfError::Unavailable(self.config.program.clone()),
                _ => PdfError::Io(e),
            })?;

        // 写入放在独立任务中，避免stdout管道写满时双方互相等待
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| PdfError::Io(std::io::Error::other("stdin not captured")))?;
        let input = html.as_bytes().to_vec();
        let writer = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        let output = child.wait_with_output().await?;
        match writer.await {
            Ok(Ok(())) => {}
            // 转换程序提前退出时写入会失败，以退出状态为准
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(PdfError::Io(e)),
            Err(e) => return Err(PdfError::Io(std::io::Error::other(e))),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PdfError::Failed {
                status: output.status.code().unwrap_or(-1),
                stderr: stderr.trim().chars().take(512).collect(),
            });
        }
        if output.stdout.is_empty() {
            return Err(PdfError::EmptyOutput);
        }

        Ok(PdfDocument::new(output.stdout))
    }
}

#[async_trait]
impl PdfExporter for WkhtmltopdfExporter {
    async fn export(&self, html: &str) -> Result<PdfDocument, PdfError> {
        if html.trim().is_empty() {
            return Err(PdfError::EmptyHtml);
        }

        let timeout = Duration::from_secs(self.config.timeout_seconds);
        let document = tokio::time::timeout(timeout, self.run(html))
            .await
            .map_err(|_| PdfError::Timeout(self.config.timeout_seconds))??;

        tracing::debug!(bytes = document.bytes.len(), "PDF导出完成");
        Ok(document)
    }

    /// 以 `--version` 探测转换程序是否存在且可执行
    async fn is_available(&self) -> bool {
        match TokioCommand::new(&self.config.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
        {
            Ok(status) => status.success(),
            Err(_) => false,
        }
    }
}
