//! # Analysis 模块
//!
//! 提取 + 审计的完整流水线，输出带汇总计数的报告。

use serde::Serialize;

use crate::config::AuditConfig;
use crate::diagnostic::{AuditResult, Auditor, Finding, Severity};
use crate::error::ExtractResult;
use crate::extract::{Extractor, SkipNote};
use crate::model::Entity;

/// 单个实体及其诊断
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReport {
    pub entity: Entity,
    pub findings: Vec<Finding>,
}

/// 汇总计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// 成功提取的对话实体
    pub entities_parsed: usize,
    /// 因类型标记不符被过滤的实体
    pub entities_filtered: usize,
    /// 被跳过的实体
    pub entities_skipped: usize,
    /// 成功解析的记录
    pub records_parsed: usize,
    /// 被跳过的记录
    pub records_skipped: usize,
    /// 诊断总数
    pub findings: usize,
    pub critical: usize,
    pub warnings: usize,
    pub infos: usize,
}

/// 分析报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    /// 按文档顺序排列的实体报告
    pub entities: Vec<EntityReport>,
    /// 跳过清单
    pub skipped: Vec<SkipNote>,
    pub summary: Summary,
}

impl AnalysisReport {
    /// 所有诊断（实体顺序 → 记录顺序 → 规则顺序）
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.entities.iter().flat_map(|report| report.findings.iter())
    }

    /// 把所有诊断收集为 [`AuditResult`]
    pub fn audit_result(&self) -> AuditResult {
        AuditResult {
            findings: self.findings().cloned().collect(),
        }
    }

    /// 是否存在严重问题
    pub fn has_critical(&self) -> bool {
        self.summary.critical > 0
    }
}

/// 分析文档
///
/// # 参数
///
/// - `text`: 完整的数据文件内容
/// - `config`: 字段名与阈值配置
///
/// # 返回
///
/// 找不到容器时返回 `ContainerNotFound`（唯一的致命错误）；
/// 否则总是返回报告，无法提取的部分记入 `skipped`。
pub fn analyze(text: &str, config: &AuditConfig) -> ExtractResult<AnalysisReport> {
    let extraction = Extractor::new(config.clone()).extract(text)?;
    let auditor = Auditor::new(config);

    let entities: Vec<EntityReport> = extraction
        .entities
        .into_iter()
        .map(|entity| {
            let findings = auditor.audit_entity(&entity).findings;
            EntityReport { entity, findings }
        })
        .collect();

    let summary = summarize(&entities, &extraction.skipped, extraction.filtered.len());

    Ok(AnalysisReport {
        entities,
        skipped: extraction.skipped,
        summary,
    })
}

fn summarize(entities: &[EntityReport], skipped: &[SkipNote], filtered: usize) -> Summary {
    let count = |severity: Severity| {
        entities
            .iter()
            .flat_map(|report| report.findings.iter())
            .filter(|f| f.severity == severity)
            .count()
    };

    let critical = count(Severity::Critical);
    let warnings = count(Severity::Warning);
    let infos = count(Severity::Info);

    Summary {
        entities_parsed: entities.len(),
        entities_filtered: filtered,
        entities_skipped: skipped.iter().filter(|s| s.record_index.is_none()).count(),
        records_parsed: entities.iter().map(|r| r.entity.records.len()).sum(),
        records_skipped: skipped.iter().filter(|s| s.record_index.is_some()).count(),
        findings: critical + warnings + infos,
        critical,
        warnings,
        infos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "const NPCS = {
    a: {
        type: 'dialogue_npc',
        dialogues: [
            { condition: (game) => true, text: 'Hi', choices: [{ text: 'Ok' }] },
            { text: 'orphan' }
        ]
    },
    b: { type: 'shop' }
};";

    #[test]
    fn test_analyze_summary() {
        let report = analyze(TEXT, &AuditConfig::default()).unwrap();

        assert_eq!(report.entities.len(), 1);
        assert_eq!(report.summary.entities_filtered, 1);
        assert_eq!(report.summary.records_parsed, 1);
        assert_eq!(report.summary.records_skipped, 1);
        assert_eq!(report.summary.entities_skipped, 0);
        assert_eq!(report.summary.critical, 1);
        assert!(report.has_critical());
    }

    #[test]
    fn test_audit_result_collects_all_findings() {
        let report = analyze(TEXT, &AuditConfig::default()).unwrap();
        let result = report.audit_result();

        assert_eq!(result.len(), report.summary.findings);
        assert_eq!(result.findings[0].rule, "single-forced-choice");
    }
}
