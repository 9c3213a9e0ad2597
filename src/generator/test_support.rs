//! 测试用的假协作者

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;
use crate::generator::context::ResearchContext;
use crate::llm::client::LanguageModel;
use crate::retrieval::{
    Encyclopedia, Outcome, RetrievalError, RetrievalResult, Snippet, Source, WebSearch,
};

/// 按prompt类型返回预设输出的模型，None表示调用失败
#[derive(Default)]
pub struct ScriptedModel {
    pub search_output: Option<String>,
    pub wiki_output: Option<String>,
    pub report_output: Option<String>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let output = if prompt.contains("search queries") {
            &self.search_output
        } else if prompt.contains("Wikipedia article titles") {
            &self.wiki_output
        } else {
            &self.report_output
        };
        output
            .clone()
            .ok_or_else(|| anyhow::anyhow!("model unavailable"))
    }
}

/// 每个查询返回一条成功片段；`failing` 中的查询返回错误
#[derive(Default)]
pub struct FakeWebSearch {
    pub failing: Vec<String>,
    pub placeholders_only: bool,
    pub queries: Mutex<Vec<String>>,
}

#[async_trait]
impl WebSearch for FakeWebSearch {
    async fn search(&self, query: &str) -> Result<RetrievalResult> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.failing.iter().any(|q| q == query) {
            anyhow::bail!("search backend exploded");
        }
        if self.placeholders_only {
            return Ok(vec![Snippet::placeholder(query)]);
        }
        Ok(vec![Snippet::new(
            Source::DuckDuckGo,
            query,
            Outcome::Success(format!("findings about {}", query)),
        )])
    }
}

/// 按标题返回预设内容的百科，可为单个标题设置延迟
#[derive(Default)]
pub struct FakeEncyclopedia {
    pub articles: HashMap<String, String>,
    pub delays: HashMap<String, Duration>,
}

impl FakeEncyclopedia {
    pub fn with_article(mut self, title: &str, content: &str) -> Self {
        self.articles.insert(title.to_string(), content.to_string());
        self
    }

    pub fn with_delay(mut self, title: &str, delay: Duration) -> Self {
        self.delays.insert(title.to_string(), delay);
        self
    }
}

#[async_trait]
impl Encyclopedia for FakeEncyclopedia {
    async fn lookup(&self, title: &str) -> Result<String, RetrievalError> {
        if let Some(delay) = self.delays.get(title) {
            tokio::time::sleep(*delay).await;
        }
        self.articles
            .get(title)
            .cloned()
            .ok_or_else(|| RetrievalError::Status(404))
    }
}

/// 关闭节流、缩短超时的测试配置
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.search.pacing_ms = 0;
    config.wiki.pacing_ms = 0;
    config.wiki.timeout_seconds = 1;
    config
}

pub fn context_with(
    model: Arc<ScriptedModel>,
    web_search: Arc<FakeWebSearch>,
    encyclopedia: Arc<FakeEncyclopedia>,
) -> ResearchContext {
    ResearchContext::with_collaborators(fast_config(), model, web_search, encyclopedia)
}
