use serde::{Deserialize, Serialize};
use tracing::warn;

/// 一次研究运行的状态记录
///
/// 查询列表只追加，其余派生字段每次运行只写一次；
/// 在对应步骤执行之前，派生字段保持为空。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchState {
    pub topic: String,
    pub search_queries: Vec<String>,
    pub wiki_queries: Vec<String>,
    pub search_results: Option<String>,
    pub wiki_results: Option<String>,
    pub compilation: Option<String>,
    pub response: Option<String>,
}

/// 单个节点返回的状态增量
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDelta {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub search_queries: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub wiki_queries: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub search_results: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub wiki_results: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub compilation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub response: Option<String>,
}

impl ResearchState {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Default::default()
        }
    }

    /// 合并节点返回的增量
    pub fn apply(&mut self, delta: StateDelta) {
        self.search_queries.extend(delta.search_queries);
        self.wiki_queries.extend(delta.wiki_queries);
        write_once("search_results", &mut self.search_results, delta.search_results);
        write_once("wiki_results", &mut self.wiki_results, delta.wiki_results);
        write_once("compilation", &mut self.compilation, delta.compilation);
        write_once("response", &mut self.response, delta.response);
    }

    pub fn search_results_text(&self) -> &str {
        self.search_results.as_deref().unwrap_or_default()
    }

    pub fn wiki_results_text(&self) -> &str {
        self.wiki_results.as_deref().unwrap_or_default()
    }

    pub fn compilation_text(&self) -> &str {
        self.compilation.as_deref().unwrap_or_default()
    }

    pub fn response_text(&self) -> &str {
        self.response.as_deref().unwrap_or_default()
    }
}

fn write_once(field: &str, slot: &mut Option<String>, value: Option<String>) {
    let Some(value) = value else {
        return;
    };
    if slot.is_some() {
        warn!("字段 {} 已写入，忽略重复写入", field);
        return;
    }
    *slot = Some(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_only_topic() {
        let state = ResearchState::new("rust");

        assert_eq!(state.topic, "rust");
        assert!(state.search_queries.is_empty());
        assert!(state.search_results.is_none());
        assert_eq!(state.compilation_text(), "");
        assert_eq!(state.response_text(), "");
    }

    #[test]
    fn test_apply_appends_query_lists() {
        let mut state = ResearchState::new("rust");
        state.apply(StateDelta {
            search_queries: vec!["a".into()],
            ..Default::default()
        });
        state.apply(StateDelta {
            search_queries: vec!["b".into()],
            wiki_queries: vec!["W".into()],
            ..Default::default()
        });

        assert_eq!(state.search_queries, vec!["a", "b"]);
        assert_eq!(state.wiki_queries, vec!["W"]);
    }

    #[test]
    fn test_apply_keeps_first_write() {
        let mut state = ResearchState::new("rust");
        state.apply(StateDelta {
            compilation: Some("first".into()),
            ..Default::default()
        });
        state.apply(StateDelta {
            compilation: Some("second".into()),
            ..Default::default()
        });

        assert_eq!(state.compilation_text(), "first");
    }

    #[test]
    fn test_delta_serializes_only_written_fields() {
        let delta = StateDelta {
            wiki_results: Some("text".into()),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&delta).unwrap(),
            serde_json::json!({"wiki_results": "text"})
        );
    }
}
