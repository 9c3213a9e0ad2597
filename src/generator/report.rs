use tracing::{info, warn};

use crate::generator::context::ResearchContext;
use crate::generator::state::{ResearchState, StateDelta};
use crate::utils::text::truncate_chars;

pub const INSUFFICIENT_MATERIAL: &str =
    "Unable to generate report: Insufficient source material collected.";

const REPORT_PROMPT: &str = "Create a comprehensive professional research report based on the following information:

{data}

Report Structure:
# [Topic Title]
**Date:** {date}

## Executive Summary
[2-3 paragraph overview of key findings]

## Introduction
[Background and context]

## Key Findings
[Main discoveries and facts organized by themes]

## Analysis
[Detailed examination of important aspects]

## Current Developments
[Recent trends and updates]

## Implications
[Significance and impact]

## Conclusion
[Summary and future outlook]

Guidelines:
- Write in formal, professional tone
- Minimum 1200-1500 words (2 full pages)
- Use detailed analysis and comprehensive coverage
- Include specific facts, statistics, and examples from the source material
- Ensure each section is substantive with multiple paragraphs
- No promotional language or unnecessary adjectives
- Separate paragraphs and sections with line breaks
- Focus on factual content and objective analysis";

pub fn report_prompt(data: &str, date: &str) -> String {
    REPORT_PROMPT
        .replace("{date}", date)
        .replace("{data}", data)
}

/// 根据汇编内容撰写报告，返回值永远非空
///
/// 汇编内容不足时直接返回固定提示，不调用模型；
/// 模型调用失败时返回错误信息和部分原始数据。
pub async fn generate_report(ctx: &ResearchContext, compilation: Option<&str>) -> String {
    let report = &ctx.config.report;
    let compilation = compilation.unwrap_or_default();

    if compilation.trim().chars().count() < report.min_compilation_chars {
        warn!("汇编内容不足，跳过报告生成");
        return INSUFFICIENT_MATERIAL.to_string();
    }

    let data = truncate_chars(compilation, report.max_compilation_chars);
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();

    match ctx.llm.complete(&report_prompt(data, &date)).await {
        Ok(text) if !text.trim().is_empty() => {
            info!("报告生成成功 ({} 字符)", text.chars().count());
            text
        }
        Ok(_) => {
            warn!("模型返回了空报告");
            fallback_report("model returned an empty report", compilation, report.fallback_excerpt_chars)
        }
        Err(e) => {
            warn!("报告生成失败: {}", e);
            fallback_report(&e.to_string(), compilation, report.fallback_excerpt_chars)
        }
    }
}

fn fallback_report(error: &str, compilation: &str, excerpt_chars: usize) -> String {
    format!(
        "Report generation failed: {}\n\nRaw compilation data:\n{}...",
        error,
        truncate_chars(compilation, excerpt_chars)
    )
}

/// 节点 report
pub async fn write_report(ctx: &ResearchContext, state: &ResearchState) -> StateDelta {
    info!("=== 生成报告 ===");
    StateDelta {
        response: Some(generate_report(ctx, state.compilation.as_deref()).await),
        ..Default::default()
    }
}
