use crate::config::Config;
use crate::generator::assembler::SeminarAssembler;
use crate::generator::context::GeneratorContext;
use crate::generator::outlet::{
    DiskOutlet, DocumentRenderer, HtmlRenderer, PdfExporter, WkhtmltopdfExporter,
};
use crate::generator::types::SeminarRequest;

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: Option<std::time::Instant>,
    phase_start_times: HashMap<String, std::time::Instant>,
    phase_durations: HashMap<String, Duration>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Some(std::time::Instant::now()),
            phase_start_times: HashMap::new(),
            phase_durations: HashMap::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &str) {
        self.phase_start_times
            .insert(phase_name.to_string(), std::time::Instant::now());
    }

    /// 结束一个阶段的计时
    pub fn end_phase(&mut self, phase_name: &str) -> Option<Duration> {
        let start_time = self.phase_start_times.remove(phase_name)?;
        let duration = start_time.elapsed();
        self.phase_durations
            .insert(phase_name.to_string(), duration);
        Some(duration)
    }

    /// 获取总执行时间
    pub fn get_total_duration(&self) -> Option<Duration> {
        self.start_time.map(|start| start.elapsed())
    }

    pub fn get_phase_durations(&self) -> &HashMap<String, Duration> {
        &self.phase_durations
    }

    /// 获取格式化的执行时间报告，阶段按固定顺序输出
    pub fn generate_timing_report(&self) -> String {
        let mut report = String::new();

        if let Some(total_duration) = self.get_total_duration() {
            report.push_str(&format!(
                "总执行时间: {:.2}秒\n",
                total_duration.as_secs_f64()
            ));
        }

        if !self.phase_durations.is_empty() {
            report.push_str("\n各阶段执行时间:\n");
            for phase in TimingKeys::get_all_phase_keys() {
                if let Some(duration) = self.phase_durations.get(phase) {
                    report.push_str(&format!("- {}: {:.3}秒\n", phase, duration.as_secs_f64()));
                }
            }
        }

        report
    }
}

/// 时间跟踪常量
pub struct TimingKeys;

impl TimingKeys {
    pub const CONNECTION_CHECK: &'static str = "connection_check";
    pub const GENERATION: &'static str = "generation";
    pub const RENDER: &'static str = "render";
    pub const PDF_EXPORT: &'static str = "pdf_export";
    pub const OUTPUT: &'static str = "output";

    /// 获取所有阶段的键列表
    pub fn get_all_phase_keys() -> Vec<&'static str> {
        vec![
            Self::CONNECTION_CHECK,
            Self::GENERATION,
            Self::RENDER,
            Self::PDF_EXPORT,
            Self::OUTPUT,
        ]
    }
}

/// 命令行生成任务的输出选项
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub output_dir: PathBuf,
    pub export_pdf: bool,
    pub skip_connection_check: bool,
}

/// 一次生成任务的产出
#[derive(Debug, Clone)]
pub struct LaunchReport {
    pub html_path: PathBuf,
    pub pdf_path: Option<PathBuf>,
    pub sections: usize,
    pub timing_report: String,
}

/// 启动文档生成工作流
pub async fn launch(
    config: &Config,
    request: &SeminarRequest,
    options: &LaunchOptions,
) -> Result<LaunchReport> {
    tracing::info!(
        provider = %config.llm.provider,
        model = %config.llm.model,
        language = config.target_language.display_name(),
        "初始化生成上下文"
    );
    let context = GeneratorContext::new(config.clone())?;
    let exporter = WkhtmltopdfExporter::new(config.pdf.clone());
    run(&context, &HtmlRenderer::new(), &exporter, request, options).await
}

/// 使用给定的上下文与输出组件执行：检查连接 → 生成 → 渲染 → (导出PDF) → 写盘
pub async fn run(
    context: &GeneratorContext,
    renderer: &dyn DocumentRenderer,
    exporter: &dyn PdfExporter,
    request: &SeminarRequest,
    options: &LaunchOptions,
) -> Result<LaunchReport> {
    let mut timing = TimingScope::new();

    // 无效请求不触发任何模型调用，包括连接检查
    request.validate(context.config.pipeline.max_members)?;

    if !options.skip_connection_check {
        timing.start_phase(TimingKeys::CONNECTION_CHECK);
        context
            .generation
            .check_connection()
            .await
            .context("模型服务连接失败，请检查API密钥与服务地址")?;
        timing.end_phase(TimingKeys::CONNECTION_CHECK);
    }

    timing.start_phase(TimingKeys::GENERATION);
    let document = SeminarAssembler::new(context.clone())
        .assemble(request)
        .await?;
    timing.end_phase(TimingKeys::GENERATION);

    timing.start_phase(TimingKeys::RENDER);
    let html = renderer.render(&document);
    timing.end_phase(TimingKeys::RENDER);

    let pdf = if options.export_pdf {
        timing.start_phase(TimingKeys::PDF_EXPORT);
        let pdf = exporter.export(&html).await.context("PDF导出失败")?;
        timing.end_phase(TimingKeys::PDF_EXPORT);
        Some(pdf)
    } else {
        None
    };

    timing.start_phase(TimingKeys::OUTPUT);
    let outlet = DiskOutlet::new(options.output_dir.clone());
    let html_path = outlet.save_html(&html).await?;
    let pdf_path = match &pdf {
        Some(pdf) => Some(outlet.save_pdf(pdf).await?),
        None => None,
    };
    timing.end_phase(TimingKeys::OUTPUT);

    let timing_report = timing.generate_timing_report();
    tracing::info!("文档生成完成\n{}", timing_report);

    Ok(LaunchReport {
        html_path,
        pdf_path,
        sections: document.sections().len(),
        timing_report,
    })
}

#[cfg(test)]
mod tests;
