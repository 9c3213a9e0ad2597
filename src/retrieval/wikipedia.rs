//! 维基百科适配器
//!
//! 单个条目的获取放在独立任务中执行，调用方最多等待给定时长；
//! 超时后不再等待，后台任务不会被强制取消。

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::WikiConfig;
use crate::retrieval::types::{Outcome, RetrievalError, Snippet, Source};
use crate::utils::text::truncate_chars;

/// 百科服务：标题进，条目文本出
#[async_trait]
pub trait Encyclopedia: Send + Sync {
    async fn lookup(&self, title: &str) -> Result<String, RetrievalError>;
}

/// 基于MediaWiki API的维基百科客户端
pub struct WikipediaClient {
    client: reqwest::Client,
    api_url: String,
    top_k_results: usize,
    doc_content_chars_max: usize,
}

impl WikipediaClient {
    pub fn new(config: &WikiConfig, user_agent: &str) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            api_url: format!("https://{}.wikipedia.org/w/api.php", config.language),
            top_k_results: config.top_k_results,
            doc_content_chars_max: config.doc_content_chars_max,
        })
    }

    async fn query_api(&self, params: &[(&str, &str)]) -> Result<String, RetrievalError> {
        let resp = self
            .client
            .get(&self.api_url)
            .query(params)
            .query(&[("format", "json")])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(RetrievalError::Status(resp.status().as_u16()));
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl Encyclopedia for WikipediaClient {
    async fn lookup(&self, title: &str) -> Result<String, RetrievalError> {
        let limit = self.top_k_results.to_string();
        let body = self
            .query_api(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", title),
                ("srlimit", limit.as_str()),
            ])
            .await?;
        let candidates = parse_search_titles(&body)?;

        let mut summaries = Vec::new();
        for page in candidates.iter().take(self.top_k_results) {
            let body = self
                .query_api(&[
                    ("action", "query"),
                    ("prop", "extracts"),
                    ("exintro", "1"),
                    ("explaintext", "1"),
                    ("redirects", "1"),
                    ("titles", page.as_str()),
                ])
                .await?;
            if let Some(extract) = parse_extract(&body)? {
                summaries.push(format!("Page: {}\nSummary: {}", page, extract));
            }
        }

        let joined = summaries.join("\n\n");
        Ok(truncate_chars(&joined, self.doc_content_chars_max).to_string())
    }
}

fn parse_json(body: &str) -> Result<Value, RetrievalError> {
    serde_json::from_str(body).map_err(|e| RetrievalError::Malformed(e.to_string()))
}

/// 从搜索接口的响应中取出候选条目标题
pub fn parse_search_titles(body: &str) -> Result<Vec<String>, RetrievalError> {
    let json = parse_json(body)?;
    let results = json["query"]["search"]
        .as_array()
        .ok_or_else(|| RetrievalError::Malformed("missing query.search".to_string()))?;
    Ok(results
        .iter()
        .filter_map(|item| item["title"].as_str())
        .map(str::to_string)
        .collect())
}

/// 从摘要接口的响应中取出第一个非空的条目摘要
pub fn parse_extract(body: &str) -> Result<Option<String>, RetrievalError> {
    let json = parse_json(body)?;
    let pages = json["query"]["pages"]
        .as_object()
        .ok_or_else(|| RetrievalError::Malformed("missing query.pages".to_string()))?;
    Ok(pages
        .values()
        .filter_map(|page| page["extract"].as_str())
        .map(str::trim)
        .find(|extract| !extract.is_empty())
        .map(str::to_string))
}

/// 在限定时长内获取一个条目，并归类为成功、空内容、超时或错误
pub async fn fetch_with_timeout(
    source: Arc<dyn Encyclopedia>,
    title: &str,
    bound: Duration,
) -> Snippet {
    let owned_title = title.to_string();
    let handle = tokio::spawn(async move { source.lookup(&owned_title).await });

    let outcome = match tokio::time::timeout(bound, handle).await {
        // 丢弃JoinHandle只是不再等待，任务本身继续运行
        Err(_) => {
            warn!("维基百科获取超时 '{}' ({} 秒)", title, bound.as_secs());
            Outcome::Timeout(bound)
        }
        Ok(Err(join_err)) => {
            warn!("维基百科后台任务失败 '{}': {}", title, join_err);
            Outcome::Error(RetrievalError::Task(join_err.to_string()).to_string())
        }
        Ok(Ok(Err(e))) => {
            warn!("维基百科获取失败 '{}': {}", title, e);
            Outcome::Error(e.to_string())
        }
        Ok(Ok(Ok(text))) if text.trim().is_empty() => {
            debug!("维基百科没有内容: {}", title);
            Outcome::Empty
        }
        Ok(Ok(Ok(text))) => {
            debug!("维基百科获取成功 '{}' ({} 字符)", title, text.chars().count());
            Outcome::Success(text)
        }
    };

    Snippet::new(Source::Wikipedia, title, outcome)
}
