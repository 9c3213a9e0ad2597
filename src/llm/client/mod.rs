//! LLM客户端 - 提供统一的LLM服务接口

use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::LLMConfig;

mod providers;

use providers::ProviderClient;

/// 研究助手的系统提示词
const RESEARCH_PREAMBLE: &str =
    "You are a meticulous research assistant. Follow the requested output format exactly.";

/// 文本补全接口，工作流中所有的模型调用都经过这里
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// 发送已渲染的prompt并返回模型生成的文本
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// LLM客户端 - 提供统一的LLM服务接口
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// 检查模型连接和功能是否正常
    pub async fn check_connection(&self) -> Result<()> {
        info!("🔄 正在检查模型连接...");
        match self.complete("Hello").await {
            Ok(_) => {
                info!("✅ 模型连接正常");
                Ok(())
            }
            Err(e) => {
                warn!("❌ 模型连接失败: {}", e);
                Err(e)
            }
        }
    }

    /// 通用重试逻辑，失败后按固定间隔重试，直至达到调用次数上限
    async fn with_retry<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.config.retry_attempts.max(1);
        let retry_delay = Duration::from_millis(self.config.retry_delay_ms);
        let mut attempts = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    attempts += 1;
                    warn!(
                        "❌ 调用模型服务出错 (第 {} / {}次尝试): {}",
                        attempts, max_attempts, err
                    );
                    if attempts >= max_attempts {
                        return Err(err);
                    }
                    tokio::time::sleep(retry_delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl LanguageModel for LLMClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let agent = self
            .client
            .create_agent(&self.config.model, RESEARCH_PREAMBLE, &self.config)?;
        let timeout = Duration::from_secs(self.config.timeout_seconds);

        self.with_retry(|| async {
            tokio::time::timeout(timeout, agent.prompt(prompt))
                .await
                .map_err(|_| {
                    anyhow::anyhow!("模型调用超时 ({} 秒)", self.config.timeout_seconds)
                })?
        })
        .await
    }
}
