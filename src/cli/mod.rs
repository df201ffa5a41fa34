use crate::config::{Config, FailurePolicy, ImageProviderKind, LLMProvider};
use crate::generator::types::SeminarRequest;
use crate::generator::workflow::LaunchOptions;
use crate::i18n::TargetLanguage;
use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// seminario-rs - 由AI驱动的学术研讨会文档生成器
#[derive(Parser, Debug)]
#[command(name = "seminario-rs")]
#[command(
    about = "Generates academic seminar documents: splits a theme among the group members, writes each part with an LLM, optionally grounded by web search, and exports HTML/PDF."
)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// 配置文件路径
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 是否启用详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 目标语言 (pt, en, es)
    #[arg(long, global = true)]
    pub target_language: Option<String>,

    /// LLM Provider (groq, openai, deepseek, mistral, openrouter, anthropic, ollama)
    #[arg(long, global = true)]
    pub llm_provider: Option<String>,

    /// LLM API基地址
    #[arg(long, global = true)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long, global = true)]
    pub llm_api_key: Option<String>,

    /// 模型名称
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// 子主题并发生成的最大数量
    #[arg(long, global = true)]
    pub max_parallels: Option<usize>,

    /// 禁用网络搜索
    #[arg(long, global = true)]
    pub no_search: bool,

    /// 配图来源 (unsplash, placeholder, none)
    #[arg(long, global = true)]
    pub image_provider: Option<String>,

    /// 子主题生成失败时的处理策略 (fail_fast, placeholder)
    #[arg(long, global = true)]
    pub failure_policy: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 生成一份研讨会文档并写入输出目录
    Generate(GenerateArgs),
    /// 启动HTTP服务
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// 研讨会标题
    #[arg(short, long)]
    pub title: String,

    /// 研讨会主题
    #[arg(long)]
    pub theme: String,

    /// 成员数量，每人负责一个子主题
    #[arg(short, long)]
    pub members: usize,

    /// 成员姓名，可重复
    #[arg(long = "member")]
    pub member_names: Vec<String>,

    /// 生成详细内容
    #[arg(short, long)]
    pub detailed: bool,

    /// 输出路径
    #[arg(short, long, default_value = "./seminario.out")]
    pub output_path: PathBuf,

    /// 同时导出PDF
    #[arg(long)]
    pub pdf: bool,

    /// 跳过启动时的模型连接检查
    #[arg(long)]
    pub skip_connection_check: bool,
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// 监听端口，默认读取 PORT 环境变量
    #[arg(short, long)]
    pub port: Option<u16>,

    /// 监听地址
    #[arg(long)]
    pub bind: Option<String>,
}

impl GenerateArgs {
    pub fn to_request(&self, config: &Config) -> SeminarRequest {
        SeminarRequest::new(
            &self.title,
            &self.theme,
            self.members,
            self.member_names
                .iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
            self.detailed || config.pipeline.detailed,
        )
    }

    pub fn to_options(&self) -> LaunchOptions {
        LaunchOptions {
            output_dir: self.output_path.clone(),
            export_pdf: self.pdf,
            skip_connection_check: self.skip_connection_check,
        }
    }
}

impl Args {
    /// 将CLI参数转换为配置：默认值 → 配置文件 → 命令行参数
    pub fn to_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        // 覆盖LLM配置
        if let Some(provider_str) = &self.llm_provider {
            config.llm.provider = provider_str.parse::<LLMProvider>().map_err(|e| anyhow!(e))?;
        }
        if let Some(llm_api_base_url) = &self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url.clone();
        }
        if let Some(llm_api_key) = &self.llm_api_key {
            config.llm.api_key = llm_api_key.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(max_parallels) = self.max_parallels {
            config.llm.max_parallels = max_parallels;
        }

        // 目标语言配置
        if let Some(target_language_str) = &self.target_language {
            config.target_language = target_language_str
                .parse::<TargetLanguage>()
                .map_err(|e| anyhow!(e))?;
        }

        // 检索配置
        if self.no_search {
            config.search.enabled = false;
        }
        if let Some(image_provider_str) = &self.image_provider {
            config.image.provider = image_provider_str
                .parse::<ImageProviderKind>()
                .map_err(|e| anyhow!(e))?;
        }
        if let Some(failure_policy_str) = &self.failure_policy {
            config.pipeline.failure_policy = failure_policy_str
                .parse::<FailurePolicy>()
                .map_err(|e| anyhow!(e))?;
        }

        if let Command::Serve(serve) = &self.command {
            if let Some(port) = serve.port {
                config.server.port = port;
            }
            if let Some(bind) = &serve.bind {
                config.server.bind_address = bind.clone();
            }
        }

        config.verbose = config.verbose || self.verbose;

        Ok(config)
    }
}
