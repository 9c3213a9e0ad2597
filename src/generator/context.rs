use std::sync::Arc;

use crate::config::Config;
use crate::llm::client::LanguageModel;
use crate::retrieval::{Encyclopedia, WebSearch};

/// 工作流各节点共享的外部协作者
#[derive(Clone)]
pub struct ResearchContext {
    /// 语言模型，用于生成查询和撰写报告
    pub llm: Arc<dyn LanguageModel>,
    /// 带回退的网络搜索
    pub web_search: Arc<dyn WebSearch>,
    /// 百科条目来源
    pub encyclopedia: Arc<dyn Encyclopedia>,
    /// 配置
    pub config: Config,
}

impl ResearchContext {
    /// 由调用方注入协作者，测试中可替换为假实现
    pub fn with_collaborators(
        config: Config,
        llm: Arc<dyn LanguageModel>,
        web_search: Arc<dyn WebSearch>,
        encyclopedia: Arc<dyn Encyclopedia>,
    ) -> Self {
        Self {
            llm,
            web_search,
            encyclopedia,
            config,
        }
    }
}
