//! 批量检索
//!
//! 按顺序逐条执行查询，每条之间留出间隔，单条失败不影响后续查询。
//! 每个查询/标题都会留下一个结果：片段、占位或标记块。

use std::time::Duration;
use tracing::{info, warn};

use crate::generator::context::ResearchContext;
use crate::generator::state::{ResearchState, StateDelta};
use crate::retrieval::{Snippet, fetch_with_timeout};

pub const SEARCH_RESULT_SEPARATOR: &str = "\n\n=== SEARCH RESULT ===\n";
pub const NO_SEARCH_RESULTS: &str = "No search results found.";
pub const NO_WIKI_RESULTS: &str = "No Wikipedia results found.";

/// 两次请求之间的节流等待，最后一条之后不等待
async fn pace(index: usize, total: usize, delay: Duration) {
    if index + 1 < total && !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// 逐条执行网络搜索，并把全部片段拼接为一段文本
///
/// 只有占位片段（没有任何查询取到内容）时返回 [`NO_SEARCH_RESULTS`]。
pub async fn run_search_tool(ctx: &ResearchContext, queries: &[String]) -> String {
    let error_chars = ctx.config.wiki.error_message_chars;
    let pacing = ctx.config.search.pacing();
    let mut snippets: Vec<Snippet> = Vec::new();

    for (i, query) in queries.iter().enumerate() {
        info!("处理搜索查询 {}/{}: {}", i + 1, queries.len(), query);
        match ctx.web_search.search(query).await {
            Ok(results) => {
                info!("查询 '{}' 得到 {} 条结果", query, results.len());
                snippets.extend(results);
            }
            Err(e) => {
                warn!("搜索 '{}' 出错: {}", query, e);
                snippets.push(Snippet::placeholder(query.as_str()));
            }
        }
        pace(i, queries.len(), pacing).await;
    }

    let text = if snippets.iter().any(Snippet::has_content) {
        snippets
            .iter()
            .map(|s| s.render(error_chars))
            .collect::<Vec<_>>()
            .join(SEARCH_RESULT_SEPARATOR)
    } else {
        NO_SEARCH_RESULTS.to_string()
    };

    info!(
        "共收集 {} 条搜索片段 ({} 字符)",
        snippets.len(),
        text.chars().count()
    );
    text
}

/// 逐个获取维基百科条目，每个标题对应一个文本块
pub async fn run_wiki_tool(ctx: &ResearchContext, titles: &[String]) -> String {
    let wiki = &ctx.config.wiki;
    let mut blocks: Vec<String> = Vec::with_capacity(titles.len());

    for (i, title) in titles.iter().enumerate() {
        info!("获取维基百科 ({}/{}): {}", i + 1, titles.len(), title);
        let snippet = fetch_with_timeout(ctx.encyclopedia.clone(), title, wiki.timeout()).await;
        blocks.push(snippet.render(wiki.error_message_chars));
        pace(i, titles.len(), wiki.pacing()).await;
    }

    let text = if blocks.is_empty() {
        NO_WIKI_RESULTS.to_string()
    } else {
        blocks.join("\n\n")
    };

    info!(
        "共获取 {} 个维基百科结果 ({} 字符)",
        blocks.len(),
        text.chars().count()
    );
    text
}

/// 节点 run_search
pub async fn run_search(ctx: &ResearchContext, state: &ResearchState) -> StateDelta {
    info!("=== 执行网络搜索 ===");
    StateDelta {
        search_results: Some(run_search_tool(ctx, &state.search_queries).await),
        ..Default::default()
    }
}

/// 节点 run_wiki
pub async fn run_wiki(ctx: &ResearchContext, state: &ResearchState) -> StateDelta {
    info!("=== 执行维基百科检索 ===");
    StateDelta {
        wiki_results: Some(run_wiki_tool(ctx, &state.wiki_queries).await),
        ..Default::default()
    }
}
