use tracing::info;

use crate::generator::state::{ResearchState, StateDelta};

pub const NO_CONTENT_AVAILABLE: &str = "No content available for compilation.";

/// 合并搜索结果与维基百科结果，空的部分直接跳过
///
/// 搜索部分总在维基百科部分之前。
pub fn compile(search_results: &str, wiki_results: &str) -> String {
    let mut sections: Vec<&str> = Vec::new();

    if !search_results.trim().is_empty() {
        sections.push("# Web Search Results\n");
        sections.push(search_results);
    }

    if !wiki_results.trim().is_empty() {
        sections.push("\n\n# Wikipedia Results\n");
        sections.push(wiki_results);
    }

    if sections.is_empty() {
        NO_CONTENT_AVAILABLE.to_string()
    } else {
        sections.join("\n")
    }
}

/// 节点 compile
pub fn compile_results(state: &ResearchState) -> StateDelta {
    info!("=== 汇编检索结果 ===");
    let compilation = compile(state.search_results_text(), state.wiki_results_text());
    info!("汇编完成: {} 字符", compilation.chars().count());

    StateDelta {
        compilation: Some(compilation),
        ..Default::default()
    }
}
