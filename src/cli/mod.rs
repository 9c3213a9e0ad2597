use crate::config::{Config, LLMProvider};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// DeepReport-RS - 由Rust与AI驱动的研究报告生成引擎
#[derive(Parser, Debug)]
#[command(name = "deepreport-rs")]
#[command(
    about = "AI-based research report generator. It plans web and Wikipedia queries for a topic, gathers the results and writes a structured professional report."
)]
#[command(version)]
pub struct Args {
    /// 研究主题
    #[arg(short, long)]
    pub topic: String,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 报告输出文件路径
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 以JSON行输出每个工作流步骤的事件
    #[arg(long)]
    pub events: bool,

    /// 运行前先检查模型连接
    #[arg(long)]
    pub check_connection: bool,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// LLM Provider (openai, moonshot, deepseek, mistral, openrouter, anthropic, gemini, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// 查询生成与报告撰写使用的模型
    #[arg(long)]
    pub model: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 两次网络搜索之间的间隔（毫秒）
    #[arg(long)]
    pub search_pacing_ms: Option<u64>,

    /// 单个维基百科条目的等待上限（秒）
    #[arg(long)]
    pub wiki_timeout_seconds: Option<u64>,
}

impl Args {
    /// 将CLI参数转换为配置
    ///
    /// 优先级：命令行参数 > 配置文件 > 默认值。
    pub fn into_config(self) -> Result<Config> {
        let mut config = if let Some(config_path) = &self.config {
            // 显式指定的配置文件必须能读取
            Config::from_file(config_path)?
        } else {
            // 否则尝试默认位置
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("deepreport.toml");

            if default_config_path.exists() {
                Config::from_file(&default_config_path)?
            } else {
                Config::default()
            }
        };

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的provider: {}，使用provider {}",
                    provider_str, config.llm.provider
                );
            }
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }

        // 检索节奏
        if let Some(pacing_ms) = self.search_pacing_ms {
            config.search.pacing_ms = pacing_ms;
        }
        if let Some(timeout_seconds) = self.wiki_timeout_seconds {
            config.wiki.timeout_seconds = timeout_seconds;
        }

        // 输出与其他配置，开关只能打开不能关闭文件中的设置
        if let Some(output) = self.output {
            config.output_path = Some(output);
        }
        config.stream_events |= self.events;
        config.check_connection |= self.check_connection;
        config.verbose |= self.verbose;

        Ok(config)
    }
}

// Include tests
#[cfg(test)]
mod tests;
