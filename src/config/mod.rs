use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "moonshot")]
    Moonshot,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "mistral")]
    Mistral,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "gemini")]
    #[default]
    Gemini,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Moonshot => write!(f, "moonshot"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Mistral => write!(f, "mistral"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Gemini => write!(f, "gemini"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "moonshot" => Ok(LLMProvider::Moonshot),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "mistral" => Ok(LLMProvider::Mistral),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "gemini" => Ok(LLMProvider::Gemini),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// 报告输出文件路径，未设置时只输出到标准输出
    pub output_path: Option<PathBuf>,

    /// 是否以JSON行的形式输出每个工作流步骤的事件
    pub stream_events: bool,

    /// 启动时是否先检查模型连接
    pub check_connection: bool,

    /// 是否启用详细日志
    pub verbose: bool,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 网络搜索配置
    pub search: SearchConfig,

    /// 维基百科检索配置
    pub wiki: WikiConfig,

    /// 报告生成配置
    pub report: ReportConfig,
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

    /// 查询生成与报告撰写使用的模型
    pub model: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 调用次数上限（含首次调用）
    pub retry_attempts: u32,

    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,

    /// 单次调用超时时间（秒）
    pub timeout_seconds: u64,
}

/// 网络搜索配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// 接受的搜索查询数量上限
    pub max_queries: usize,

    /// 单条搜索查询的最大单词数
    pub max_query_words: usize,

    /// 主搜索结果被视为有效的最小字符数（严格大于）
    pub min_primary_chars: usize,

    /// 主搜索提取的结果条数
    pub primary_max_results: usize,

    /// 备用搜索结果页地址
    pub fallback_base_url: String,

    /// 备用搜索的请求超时（秒）
    pub fallback_timeout_seconds: u64,

    /// 备用搜索提取的结果条数
    pub fallback_max_results: usize,

    /// 请求时使用的User-Agent
    pub user_agent: String,

    /// 两次查询之间的间隔（毫秒）
    pub pacing_ms: u64,
}

/// 维基百科检索配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct WikiConfig {
    /// 维基百科语言子域
    pub language: String,

    /// 接受的条目标题数量上限
    pub max_titles: usize,

    /// 条目标题的字符数上限（严格小于）
    pub max_title_chars: usize,

    /// 单个条目的等待上限（秒）
    pub timeout_seconds: u64,

    /// 两次条目获取之间的间隔（毫秒）
    pub pacing_ms: u64,

    /// 每个标题考虑的候选条目数
    pub top_k_results: usize,

    /// 单个标题返回内容的字符数上限
    pub doc_content_chars_max: usize,

    /// 错误标记块中保留的错误信息字符数
    pub error_message_chars: usize,
}

/// 报告生成配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ReportConfig {
    /// 汇编内容少于该字符数时不调用模型
    pub min_compilation_chars: usize,

    /// 发送给模型的汇编内容字符数上限
    pub max_compilation_chars: usize,

    /// 生成失败时附带的原始数据字符数
    pub fallback_excerpt_chars: usize,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl SearchConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_secs(self.fallback_timeout_seconds)
    }
}

impl WikiConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("DEEPREPORT_LLM_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://generativelanguage.googleapis.com/v1beta"),
            model: String::from("gemini-2.0-flash"),
            max_tokens: 8192,
            temperature: 0.0,
            retry_attempts: 3,
            retry_delay_ms: 2000,
            timeout_seconds: 300,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_queries: 20,
            max_query_words: 8,
            min_primary_chars: 20,
            primary_max_results: 5,
            fallback_base_url: String::from("https://www.bing.com/search"),
            fallback_timeout_seconds: 10,
            fallback_max_results: 3,
            user_agent: String::from(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            ),
            pacing_ms: 1000,
        }
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            language: String::from("en"),
            max_titles: 5,
            max_title_chars: 50,
            timeout_seconds: 20,
            pacing_ms: 500,
            top_k_results: 5,
            doc_content_chars_max: 3000,
            error_message_chars: 200,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            min_compilation_chars: 50,
            max_compilation_chars: 40_000,
            fallback_excerpt_chars: 4000,
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
