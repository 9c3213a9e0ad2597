//! 查询生成
//!
//! 让语言模型按编号列表输出搜索查询与百科标题，再逐行解析。
//! 模型输出的格式并不稳定，解析时丢弃不符合格式的行而不是报错。

use regex::Regex;
use std::sync::LazyLock;
use tracing::{info, warn};

use crate::generator::context::ResearchContext;
use crate::generator::state::{ResearchState, StateDelta};

static NUMBERED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.?\s+").expect("valid numbered-list pattern"));

const SEARCH_QUERIES_PROMPT: &str = "Generate 20 short, specific search queries for researching: {topic}
Each query should be 5-10 words maximum, no descriptions.
Format as simple numbered list:
1. short query here
2. another short query
Examples:
1. AI breakthroughs 2024
2. machine learning advances
3. AI healthcare applications";

const WIKI_QUERIES_PROMPT: &str = "Generate 5 short Wikipedia article titles for: {topic}
Use simple, direct titles that likely exist on Wikipedia.
Format as numbered list:
1. Article Title One
2. Article Title Two
Examples:
1. Artificial Intelligence
2. Machine Learning
3. Natural Language Processing";

pub fn search_queries_prompt(topic: &str) -> String {
    SEARCH_QUERIES_PROMPT.replace("{topic}", topic)
}

pub fn wiki_queries_prompt(topic: &str) -> String {
    WIKI_QUERIES_PROMPT.replace("{topic}", topic)
}

/// 取出编号列表中的条目文本
///
/// 只保留以“数字 + 可选句点 + 空白”开头的行，去掉编号、
/// 截断第一个 " - " 之后的描述，并去掉首尾引号。
pub fn parse_numbered_items(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let matched = NUMBERED_PREFIX.find(line)?;
            let item = line[matched.end()..].trim();
            let item = item.split(" - ").next().unwrap_or_default();
            Some(item.trim_matches(|c| c == '"' || c == '\'').to_string())
        })
        .filter(|item| !item.is_empty())
        .collect()
}

/// 解析搜索查询：单词数不超过 `max_words`，最多保留 `max_queries` 条
pub fn parse_search_queries(raw: &str, max_words: usize, max_queries: usize) -> Vec<String> {
    parse_numbered_items(raw)
        .into_iter()
        .filter(|query| query.split_whitespace().count() <= max_words)
        .take(max_queries)
        .collect()
}

/// 解析百科标题：字符数小于 `max_chars`，最多保留 `max_titles` 条
pub fn parse_wiki_titles(raw: &str, max_chars: usize, max_titles: usize) -> Vec<String> {
    parse_numbered_items(raw)
        .into_iter()
        .filter(|title| title.chars().count() < max_chars)
        .take(max_titles)
        .collect()
}

/// 节点 gen_search_qs：生成搜索查询
pub async fn generate_search_queries(ctx: &ResearchContext, state: &ResearchState) -> StateDelta {
    info!("=== 生成搜索查询 ===");
    let search = &ctx.config.search;

    let queries = match ctx.llm.complete(&search_queries_prompt(&state.topic)).await {
        Ok(raw) => parse_search_queries(&raw, search.max_query_words, search.max_queries),
        Err(e) => {
            warn!("搜索查询生成失败: {}", e);
            Vec::new()
        }
    };

    info!("生成了 {} 条搜索查询: {:?}", queries.len(), queries);
    StateDelta {
        search_queries: queries,
        ..Default::default()
    }
}

/// 节点 gen_wiki_qs：生成维基百科标题
pub async fn generate_wiki_queries(ctx: &ResearchContext, state: &ResearchState) -> StateDelta {
    info!("=== 生成维基百科标题 ===");
    let wiki = &ctx.config.wiki;

    let titles = match ctx.llm.complete(&wiki_queries_prompt(&state.topic)).await {
        Ok(raw) => parse_wiki_titles(&raw, wiki.max_title_chars, wiki.max_titles),
        Err(e) => {
            warn!("维基百科标题生成失败: {}", e);
            Vec::new()
        }
    };

    info!("生成了 {} 个维基百科标题: {:?}", titles.len(), titles);
    StateDelta {
        wiki_queries: titles,
        ..Default::default()
    }
}
