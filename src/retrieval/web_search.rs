//! 网络搜索适配器
//!
//! 主搜索（DuckDuckGo）失败或内容过少时，回退到抓取Bing结果页；
//! 两者都没有结果时返回占位片段，调用方永远不会拿到错误。

use anyhow::Result;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::retrieval::types::{Outcome, RetrievalError, RetrievalResult, Snippet, Source};

const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";

static DDG_SNIPPET: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a.result__snippet, .result__snippet").expect("valid DuckDuckGo selector")
});
static BING_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li.b_algo, .b_algo").expect("valid Bing block selector"));
static BING_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2 a, h2").expect("valid Bing title selector"));
static BING_SNIPPET: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".b_caption p, p").expect("valid Bing snippet selector"));

/// 主搜索服务：查询进，文本出
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, RetrievalError>;
}

/// 带回退的网络搜索，返回一组片段
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<RetrievalResult>;
}

/// HTTP响应页面
#[derive(Debug, Clone)]
pub struct HttpPage {
    pub status: u16,
    pub body: String,
}

/// 发起GET请求的抽象，便于在测试中替换
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpPage, RetrievalError>;
}

/// 基于reqwest的GET实现，带浏览器User-Agent与超时
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpPage, RetrievalError> {
        let resp = self.client.get(url).query(query).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(HttpPage { status, body })
    }
}

/// DuckDuckGo HTML搜索
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    max_results: usize,
}

impl DuckDuckGoSearch {
    pub fn new(config: &SearchConfig) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.fallback_timeout())
            .build()?;
        Ok(Self {
            client,
            max_results: config.primary_max_results,
        })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> Result<String, RetrievalError> {
        let resp = self
            .client
            .post(DUCKDUCKGO_HTML_URL)
            .form(&[("q", query)])
            .header("Accept", "text/html")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(RetrievalError::Status(resp.status().as_u16()));
        }

        let body = resp.text().await?;
        Ok(parse_duckduckgo_snippets(&body, self.max_results).join(" "))
    }
}

/// 搜索结果页中的一条结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn render(&self) -> String {
        format!("Title: {}\nSnippet: {}", self.title, self.snippet)
    }
}

/// 抓取Bing结果页
pub struct BingScraper {
    fetcher: Arc<dyn HttpFetcher>,
    base_url: String,
    max_results: usize,
}

impl BingScraper {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, base_url: impl Into<String>, max_results: usize) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            max_results,
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, RetrievalError> {
        let page = self.fetcher.get(&self.base_url, &[("q", query)]).await?;
        if page.status != 200 {
            return Err(RetrievalError::Status(page.status));
        }
        Ok(parse_bing_results(&page.body, self.max_results))
    }
}

/// 两级回退的网络搜索
pub struct FallbackWebSearch {
    primary: Arc<dyn SearchProvider>,
    secondary: BingScraper,
    min_primary_chars: usize,
}

impl FallbackWebSearch {
    pub fn new(
        primary: Arc<dyn SearchProvider>,
        secondary: BingScraper,
        min_primary_chars: usize,
    ) -> Self {
        Self {
            primary,
            secondary,
            min_primary_chars,
        }
    }

    /// 按配置构建真实的DuckDuckGo + Bing组合
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let primary = Arc::new(DuckDuckGoSearch::new(config)?);
        let fetcher = Arc::new(ReqwestFetcher::new(
            &config.user_agent,
            config.fallback_timeout(),
        )?);
        let secondary = BingScraper::new(
            fetcher,
            config.fallback_base_url.clone(),
            config.fallback_max_results,
        );
        Ok(Self::new(primary, secondary, config.min_primary_chars))
    }
}

#[async_trait]
impl WebSearch for FallbackWebSearch {
    async fn search(&self, query: &str) -> Result<RetrievalResult> {
        debug!("🔍 搜索: {}", query);

        match self.primary.search(query).await {
            Ok(text) if text.trim().chars().count() > self.min_primary_chars => {
                debug!("DuckDuckGo 成功: {} 字符", text.chars().count());
                return Ok(vec![Snippet::new(
                    Source::DuckDuckGo,
                    query,
                    Outcome::Success(text),
                )]);
            }
            Ok(text) => debug!(
                "DuckDuckGo 内容不足 ({} 字符)，尝试备用搜索",
                text.trim().chars().count()
            ),
            Err(e) => warn!("DuckDuckGo 搜索失败 '{}': {}", query, e),
        }

        match self.secondary.search(query).await {
            Ok(hits) if !hits.is_empty() => {
                debug!("Bing 抓取成功: {} 条结果", hits.len());
                return Ok(hits
                    .iter()
                    .map(|hit| Snippet::new(Source::Bing, query, Outcome::Success(hit.render())))
                    .collect());
            }
            Ok(_) => info!("Bing 结果页中没有可用的结果块: {}", query),
            Err(e) => warn!("Bing 抓取失败 '{}': {}", query, e),
        }

        warn!("所有搜索途径均失败: {}", query);
        Ok(vec![Snippet::placeholder(query)])
    }
}

/// 元素内去除首尾空白后的文本，以空格连接
fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 解析DuckDuckGo HTML结果页中的摘要
pub fn parse_duckduckgo_snippets(html: &str, max_results: usize) -> Vec<String> {
    let doc = Html::parse_document(html);
    doc.select(&DDG_SNIPPET)
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
        .take(max_results)
        .collect()
}

/// 解析Bing结果页，最多取前 `max_results` 个结果块
///
/// 标题或摘要缺失的结果块会被跳过，但仍占用名额。
pub fn parse_bing_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let doc = Html::parse_document(html);
    doc.select(&BING_BLOCK)
        .take(max_results)
        .filter_map(|block| {
            let title = block.select(&BING_TITLE).next().map(|el| element_text(&el))?;
            let snippet = block
                .select(&BING_SNIPPET)
                .next()
                .map(|el| element_text(&el))?;
            (!title.is_empty() && !snippet.is_empty()).then_some(SearchHit { title, snippet })
        })
        .collect()
}
