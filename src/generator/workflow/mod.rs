use crate::config::Config;
use crate::generator::compile::compile_results;
use crate::generator::context::ResearchContext;
use crate::generator::queries::{generate_search_queries, generate_wiki_queries};
use crate::generator::report::write_report;
use crate::generator::runners::{run_search, run_wiki};
use crate::generator::state::{ResearchState, StateDelta};
use crate::llm::client::LLMClient;
use crate::retrieval::{FallbackWebSearch, WikipediaClient};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};
use uuid::Uuid;

/// 工作流节点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    GenSearchQs,
    RunSearch,
    GenWikiQs,
    RunWiki,
    Join,
    Compile,
    Report,
}

impl NodeId {
    pub const ENTRY: NodeId = NodeId::GenSearchQs;

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeId::GenSearchQs => "gen_search_qs",
            NodeId::RunSearch => "run_search",
            NodeId::GenWikiQs => "gen_wiki_qs",
            NodeId::RunWiki => "run_wiki",
            NodeId::Join => "join",
            NodeId::Compile => "compile",
            NodeId::Report => "report",
        }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 静态的有向无环图，`report` 之后即结束
pub const EDGES: &[(NodeId, NodeId)] = &[
    (NodeId::GenSearchQs, NodeId::RunSearch),
    (NodeId::GenSearchQs, NodeId::GenWikiQs),
    (NodeId::RunSearch, NodeId::Join),
    (NodeId::GenWikiQs, NodeId::RunWiki),
    (NodeId::RunWiki, NodeId::Join),
    (NodeId::Join, NodeId::Compile),
    (NodeId::Compile, NodeId::Report),
];

/// 节点的直接后继
pub fn successors(node: NodeId) -> Vec<NodeId> {
    EDGES
        .iter()
        .filter(|(from, _)| *from == node)
        .map(|(_, to)| *to)
        .collect()
}

/// 节点的直接前驱
pub fn predecessors(node: NodeId) -> Vec<NodeId> {
    EDGES
        .iter()
        .filter(|(_, to)| *to == node)
        .map(|(from, _)| *from)
        .collect()
}

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: Instant,
    phase_durations: BTreeMap<NodeId, Duration>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_durations: BTreeMap::new(),
        }
    }

    /// 记录一个节点的执行时间
    pub fn record(&mut self, node: NodeId, duration: Duration) {
        self.phase_durations.insert(node, duration);
    }

    /// 获取总执行时间
    pub fn total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 各节点执行时间（毫秒）
    pub fn durations_ms(&self) -> BTreeMap<String, u64> {
        self.phase_durations
            .iter()
            .map(|(node, d)| (node.to_string(), d.as_millis() as u64))
            .collect()
    }
}

/// 运行结束后的摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub search_queries: Vec<String>,
    pub wiki_queries: Vec<String>,
    pub search_results_length: usize,
    pub wiki_results_length: usize,
    pub compilation_length: usize,
    pub node_durations_ms: BTreeMap<String, u64>,
    pub total_duration_ms: u64,
}

impl RunMetadata {
    fn from_state(run_id: Uuid, state: &ResearchState, timing: &TimingScope) -> Self {
        Self {
            run_id,
            search_queries: state.search_queries.clone(),
            wiki_queries: state.wiki_queries.clone(),
            search_results_length: state.search_results_text().chars().count(),
            wiki_results_length: state.wiki_results_text().chars().count(),
            compilation_length: state.compilation_text().chars().count(),
            node_durations_ms: timing.durations_ms(),
            total_duration_ms: timing.total_duration().as_millis() as u64,
        }
    }
}

/// 工作流事件：每个节点完成后一条 `stream`，结束时一条 `metadata`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum WorkflowEvent {
    Stream(BTreeMap<NodeId, StateDelta>),
    Metadata(RunMetadata),
}

impl WorkflowEvent {
    fn step(node: NodeId, delta: StateDelta) -> Self {
        WorkflowEvent::Stream(BTreeMap::from([(node, delta)]))
    }
}

/// 事件出口，接收端已关闭时静默丢弃
#[derive(Clone, Default)]
struct EventSink(Option<UnboundedSender<WorkflowEvent>>);

impl EventSink {
    fn emit(&self, event: WorkflowEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }
}

/// 执行单个节点：计时、记日志并发出事件
async fn execute_node<Fut>(node: NodeId, events: &EventSink, step: Fut) -> (StateDelta, Duration)
where
    Fut: std::future::Future<Output = StateDelta>,
{
    debug!("▶ 节点 {} 开始", node);
    let started = Instant::now();
    let delta = step.await;
    let elapsed = started.elapsed();
    info!("✓ 节点 {} 完成 ({:.2}秒)", node, elapsed.as_secs_f64());
    events.emit(WorkflowEvent::step(node, delta.clone()));
    (delta, elapsed)
}

/// 执行研究工作流，返回最终状态
///
/// `run_search` 与 `gen_wiki_qs -> run_wiki` 两个分支并发执行，
/// 两者都完成后才进入 `join`，随后依次执行 `compile` 与 `report`。
pub async fn run_workflow(
    ctx: &ResearchContext,
    topic: &str,
    events: Option<UnboundedSender<WorkflowEvent>>,
) -> ResearchState {
    let run_id = Uuid::new_v4();
    let events = EventSink(events);
    let mut timing = TimingScope::new();
    let mut state = ResearchState::new(topic);
    info!("🚀 开始研究 [{}]: {}", run_id, topic);
    debug!("入口节点 {} -> {:?}", NodeId::ENTRY, successors(NodeId::ENTRY));

    let (delta, elapsed) =
        execute_node(NodeId::GenSearchQs, &events, generate_search_queries(ctx, &state)).await;
    timing.record(NodeId::GenSearchQs, elapsed);
    state.apply(delta);

    let search_branch = async {
        execute_node(NodeId::RunSearch, &events, run_search(ctx, &state)).await
    };
    let wiki_branch = async {
        let (wiki_qs, wiki_qs_elapsed) =
            execute_node(NodeId::GenWikiQs, &events, generate_wiki_queries(ctx, &state)).await;
        let mut branch_state = state.clone();
        branch_state.apply(wiki_qs.clone());
        let (wiki_results, run_wiki_elapsed) =
            execute_node(NodeId::RunWiki, &events, run_wiki(ctx, &branch_state)).await;
        ((wiki_qs, wiki_qs_elapsed), (wiki_results, run_wiki_elapsed))
    };
    let ((search_results, search_elapsed), ((wiki_qs, wiki_qs_elapsed), (wiki_results, run_wiki_elapsed))) =
        tokio::join!(search_branch, wiki_branch);

    timing.record(NodeId::RunSearch, search_elapsed);
    timing.record(NodeId::GenWikiQs, wiki_qs_elapsed);
    timing.record(NodeId::RunWiki, run_wiki_elapsed);
    state.apply(search_results);
    state.apply(wiki_qs);
    state.apply(wiki_results);

    // join 不修改状态，只保证两个分支都已完成
    debug!("join 汇合分支: {:?}", predecessors(NodeId::Join));
    let (delta, elapsed) = execute_node(NodeId::Join, &events, async { StateDelta::default() }).await;
    timing.record(NodeId::Join, elapsed);
    state.apply(delta);

    let (delta, elapsed) =
        execute_node(NodeId::Compile, &events, async { compile_results(&state) }).await;
    timing.record(NodeId::Compile, elapsed);
    state.apply(delta);

    let (delta, elapsed) = execute_node(NodeId::Report, &events, write_report(ctx, &state)).await;
    timing.record(NodeId::Report, elapsed);
    state.apply(delta);

    let metadata = RunMetadata::from_state(run_id, &state, &timing);
    info!(
        "✓ 研究完成 [{}]，总耗时 {:.2}秒",
        run_id,
        timing.total_duration().as_secs_f64()
    );
    events.emit(WorkflowEvent::Metadata(metadata));

    state
}

/// 启动研究报告生成流程
pub async fn launch(config: &Config, topic: &str) -> Result<ResearchState> {
    let llm = LLMClient::new(config.llm.clone())?;

    // 启动时检查模型连接
    if config.check_connection {
        llm.check_connection().await?;
    }

    let web_search = FallbackWebSearch::from_config(&config.search)?;
    let encyclopedia = WikipediaClient::new(&config.wiki, &config.search.user_agent)?;
    let ctx = ResearchContext::with_collaborators(
        config.clone(),
        Arc::new(llm),
        Arc::new(web_search),
        Arc::new(encyclopedia),
    );

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let stream_events = config.stream_events;
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if stream_events {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => tracing::warn!("事件序列化失败: {}", e),
                }
            }
        }
    });

    let state = run_workflow(&ctx, topic, Some(tx)).await;
    printer.await.context("事件输出任务异常退出")?;

    if let Some(output_path) = &config.output_path {
        tokio::fs::write(output_path, state.response_text())
            .await
            .context(format!("Failed to write report to {:?}", output_path))?;
        info!("📄 报告已保存到 {:?}", output_path);
    }

    if !stream_events {
        println!("{}", state.response_text());
    }

    Ok(state)
}
