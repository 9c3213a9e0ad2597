use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// 检索层错误
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("background fetch failed: {0}")]
    Task(String),
}

/// 片段来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    DuckDuckGo,
    Bing,
    /// 所有搜索途径都没有结果时的占位
    Placeholder,
    Wikipedia,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::DuckDuckGo => write!(f, "DuckDuckGo"),
            Source::Bing => write!(f, "Bing"),
            Source::Placeholder => write!(f, "placeholder"),
            Source::Wikipedia => write!(f, "Wikipedia"),
        }
    }
}

/// 单次检索的结果分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// 成功获取到内容
    Success(String),
    /// 调用成功但没有内容
    Empty,
    /// 超过等待上限
    Timeout(Duration),
    /// 调用失败
    Error(String),
}

/// 带出处的检索片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub source: Source,
    /// 原始查询或条目标题
    pub query: String,
    pub outcome: Outcome,
}

/// 一次检索返回的片段列表
pub type RetrievalResult = Vec<Snippet>;

impl Snippet {
    pub fn new(source: Source, query: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            source,
            query: query.into(),
            outcome,
        }
    }

    pub fn placeholder(query: impl Into<String>) -> Self {
        Self::new(Source::Placeholder, query, Outcome::Empty)
    }

    /// 是否携带真实内容
    pub fn has_content(&self) -> bool {
        matches!(self.outcome, Outcome::Success(ref text) if !text.trim().is_empty())
    }

    /// 展平为拼接用的文本块
    ///
    /// `error_chars` 限制错误标记块中保留的错误信息长度。
    pub fn render(&self, error_chars: usize) -> String {
        let query = &self.query;
        match (self.source, &self.outcome) {
            (Source::DuckDuckGo, Outcome::Success(text)) => {
                format!("DuckDuckGo Search Results for '{}':\n{}", query, text)
            }
            (Source::Bing, Outcome::Success(text)) => text.clone(),
            (Source::Wikipedia, Outcome::Success(text)) if !text.trim().is_empty() => {
                format!("=== WIKIPEDIA: {} ===\n{}", query, text)
            }
            (Source::Wikipedia, Outcome::Success(_) | Outcome::Empty) => {
                format!("=== WIKIPEDIA: {} ===\nNo content found", query)
            }
            (Source::Wikipedia, Outcome::Timeout(bound)) => format!(
                "=== WIKIPEDIA TIMEOUT: {} ===\nSearch timed out after {} seconds",
                query,
                bound.as_secs()
            ),
            (Source::Wikipedia, Outcome::Error(message)) => format!(
                "=== WIKIPEDIA ERROR: {} ===\nError: {}",
                query,
                crate::utils::text::truncate_chars(message, error_chars)
            ),
            _ => format!(
                "Search attempted for '{}' but no results retrieved from available sources.",
                query
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_wikipedia_blocks() {
        let ok = Snippet::new(Source::Wikipedia, "X", Outcome::Success("hello".into()));
        assert_eq!(ok.render(200), "=== WIKIPEDIA: X ===\nhello");

        let empty = Snippet::new(Source::Wikipedia, "X", Outcome::Success("  ".into()));
        assert_eq!(empty.render(200), "=== WIKIPEDIA: X ===\nNo content found");

        let timeout = Snippet::new(
            Source::Wikipedia,
            "Y",
            Outcome::Timeout(Duration::from_secs(20)),
        );
        assert_eq!(
            timeout.render(200),
            "=== WIKIPEDIA TIMEOUT: Y ===\nSearch timed out after 20 seconds"
        );
    }

    #[test]
    fn test_render_error_truncates_message() {
        let long = "e".repeat(500);
        let snippet = Snippet::new(Source::Wikipedia, "Z", Outcome::Error(long));
        let rendered = snippet.render(200);

        assert!(rendered.starts_with("=== WIKIPEDIA ERROR: Z ===\nError: "));
        assert_eq!(rendered.lines().last().unwrap().len(), "Error: ".len() + 200);
    }

    #[test]
    fn test_render_search_sources() {
        let ddg = Snippet::new(Source::DuckDuckGo, "rust", Outcome::Success("text".into()));
        assert_eq!(ddg.render(200), "DuckDuckGo Search Results for 'rust':\ntext");

        let placeholder = Snippet::placeholder("rust");
        assert!(!placeholder.has_content());
        assert_eq!(
            placeholder.render(200),
            "Search attempted for 'rust' but no results retrieved from available sources."
        );
    }
}
