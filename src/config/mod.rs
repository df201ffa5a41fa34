use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::i18n::TargetLanguage;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "seminario.toml";

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "groq")]
    #[default]
    Groq,
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "mistral")]
    Mistral,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::Groq => write!(f, "groq"),
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Mistral => write!(f, "mistral"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(LLMProvider::Groq),
            "openai" => Ok(LLMProvider::OpenAI),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "mistral" => Ok(LLMProvider::Mistral),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 图片来源类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum ImageProviderKind {
    #[serde(rename = "unsplash")]
    Unsplash,
    #[serde(rename = "placeholder")]
    #[default]
    Placeholder,
    #[serde(rename = "none")]
    Disabled,
}

impl std::fmt::Display for ImageProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageProviderKind::Unsplash => write!(f, "unsplash"),
            ImageProviderKind::Placeholder => write!(f, "placeholder"),
            ImageProviderKind::Disabled => write!(f, "none"),
        }
    }
}

impl std::str::FromStr for ImageProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unsplash" => Ok(ImageProviderKind::Unsplash),
            "placeholder" => Ok(ImageProviderKind::Placeholder),
            "none" | "disabled" | "off" => Ok(ImageProviderKind::Disabled),
            _ => Err(format!("Unknown image provider: {}", s)),
        }
    }
}

/// 子主题生成失败时的处理策略
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// 任一子主题失败即终止整个请求
    #[serde(rename = "fail_fast")]
    #[default]
    FailFast,
    /// 失败的子主题以占位章节替代
    #[serde(rename = "placeholder")]
    Placeholder,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(FailurePolicy::FailFast),
            "placeholder" => Ok(FailurePolicy::Placeholder),
            _ => Err(format!("Unknown failure policy: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 目标语言
    pub target_language: TargetLanguage,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 网络搜索配置
    pub search: SearchConfig,

    /// 图片检索配置
    pub image: ImageConfig,

    /// 生成流程配置
    pub pipeline: PipelineConfig,

    /// PDF导出配置
    pub pdf: PdfConfig,

    /// HTTP服务配置
    pub server: ServerConfig,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 模型ID
    pub model: String,

    /// 限流/超时时的最大重试次数
    pub retry_attempts: u32,

    /// 重试间隔基数（毫秒），按指数退避
    pub retry_delay_ms: u64,

    /// 单次调用超时时间（秒）
    pub timeout_seconds: u64,

    /// 子主题并发上限
    pub max_parallels: usize,
}

/// 网络搜索配置（Google Custom Search）
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub enabled: bool,
    pub api_key: String,
    pub engine_id: String,
    pub endpoint: String,
    pub results_per_query: usize,
    pub timeout_seconds: u64,
}

/// 图片检索配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ImageConfig {
    pub provider: ImageProviderKind,
    pub access_key: String,
    pub endpoint: String,
    pub orientation: String,
    pub timeout_seconds: u64,
}

/// 生成流程配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    /// 表单或命令行未要求详细模式时的默认值
    pub detailed: bool,

    /// 单个请求允许的最大成员数量
    pub max_members: usize,

    /// 是否在有搜索能力时使用检索增强的提示词
    pub grounding: bool,

    /// 是否生成最终的综合参考文献
    pub include_bibliography: bool,

    /// 子主题失败策略
    pub failure_policy: FailurePolicy,
}

/// PDF导出配置（wkhtmltopdf）
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PdfConfig {
    pub program: String,
    pub page_size: String,
    pub margin_mm: u32,
    pub encoding: String,
    pub timeout_seconds: u64,
}

/// HTTP服务配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 依次尝试显式路径、当前目录下的默认配置文件，都不存在时使用默认值
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let default_path = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::from_file(&default_path);
        }

        Ok(Config::default())
    }

    /// 搜索能力是否可用（开启且凭据齐全）
    pub fn search_available(&self) -> bool {
        self.search.enabled && !self.search.api_key.is_empty() && !self.search.engine_id.is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_language: TargetLanguage::default(),
            llm: LLMConfig::default(),
            search: SearchConfig::default(),
            image: ImageConfig::default(),
            pipeline: PipelineConfig::default(),
            pdf: PdfConfig::default(),
            server: ServerConfig::default(),
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("GROQ_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.groq.com/openai/v1"),
            model: String::from("llama3-8b-8192"),
            retry_attempts: 2,
            retry_delay_ms: 1000,
            timeout_seconds: 60,
            max_parallels: 3,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: std::env::var("GOOGLE_API_KEY").unwrap_or_default(),
            engine_id: std::env::var("GOOGLE_CSE_ID").unwrap_or_default(),
            endpoint: String::from("https://www.googleapis.com/customsearch/v1"),
            results_per_query: 3,
            timeout_seconds: 10,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        let access_key = std::env::var("UNSPLASH_ACCESS_KEY").unwrap_or_default();
        // 有 Unsplash 凭据时默认使用真实图片，否则退回占位图
        let provider = if access_key.is_empty() {
            ImageProviderKind::Placeholder
        } else {
            ImageProviderKind::Unsplash
        };
        Self {
            provider,
            access_key,
            endpoint: String::from("https://api.unsplash.com/search/photos"),
            orientation: String::from("landscape"),
            timeout_seconds: 10,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detailed: false,
            max_members: 20,
            grounding: true,
            include_bibliography: true,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            program: String::from("wkhtmltopdf"),
            page_size: String::from("A4"),
            margin_mm: 20,
            encoding: String::from("UTF-8"),
            timeout_seconds: 60,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(5000);
        Self {
            bind_address: String::from("0.0.0.0"),
            port,
        }
    }
}
