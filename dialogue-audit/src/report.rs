//! # Report 模块
//!
//! 把实体、诊断和汇总格式化为纯文本（对话树报告）。

use crate::analysis::{AnalysisReport, Summary};
use crate::model::{Choices, Entity};

const RULE_WIDTH: usize = 80;

/// 渲染单个实体的对话树
pub fn render_entity_tree(entity: &Entity) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    let mut out = vec![
        heavy.clone(),
        format!("NPC: {} (id: {})", entity.display_name, entity.id),
        heavy,
    ];

    for (index, record) in entity.records.iter().enumerate() {
        out.push(String::new());
        out.push(format!("对话 #{}", index + 1));
        out.push(format!("条件: {}", record.condition));
        out.push(String::new());

        match record.lines() {
            [line] => out.push(format!("  NPC: \"{}\"", line)),
            lines => {
                out.push("  NPC（多句对话）:".to_string());
                for (n, line) in lines.iter().enumerate() {
                    out.push(format!("    {}. \"{}\"", n + 1, line));
                }
            }
        }
        out.push(String::new());

        match (&record.choices, record.choice_labels()) {
            (Choices::Unresolved, _) => {
                out.push("  玩家选项: [运行时生成，无法静态读取]".to_string());
            }
            (_, []) => out.push("  玩家操作: [按空格/点击关闭]".to_string()),
            (_, [only]) => {
                out.push("  玩家选项 (1):".to_string());
                out.push(format!("    [►] \"{}\"", only));
                out.push("    ⚠️  唯一选项，应自动推进".to_string());
            }
            (_, labels) => {
                out.push(format!("  玩家选项 ({}):", labels.len()));
                for (n, label) in labels.iter().enumerate() {
                    out.push(format!("    [{}] \"{}\"", choice_marker(n), label));
                }
            }
        }
        out.push(String::new());
        out.push(light.clone());
    }

    out.join("\n")
}

/// 选项序号：A..Z，超出后用数字
fn choice_marker(n: usize) -> String {
    u8::try_from(n)
        .ok()
        .filter(|&n| n < 26)
        .map_or_else(|| (n + 1).to_string(), |n| char::from(b'A' + n).to_string())
}

/// 渲染全部实体的对话树
pub fn render_trees(report: &AnalysisReport) -> String {
    report
        .entities
        .iter()
        .map(|r| render_entity_tree(&r.entity))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// 按实体分组渲染诊断
pub fn render_findings(report: &AnalysisReport) -> String {
    let mut out = Vec::new();
    for entity_report in &report.entities {
        if entity_report.findings.is_empty() {
            continue;
        }
        let entity = &entity_report.entity;
        out.push(format!("{} ({}):", entity.display_name, entity.id));
        for finding in &entity_report.findings {
            out.push(format!(
                "  [{}] 对话 #{}: {}",
                finding.severity,
                finding.record_index + 1,
                finding.message
            ));
        }
        out.push(String::new());
    }

    for note in &report.skipped {
        let location = match note.record_index {
            Some(index) => format!("{} 对话 #{}", note.entity_id, index + 1),
            None => note.entity_id.clone(),
        };
        out.push(format!("  [SKIP] {}: {}", location, note.error));
    }

    out.join("\n").trim_end().to_string()
}

/// 渲染汇总
pub fn render_summary(summary: &Summary) -> String {
    [
        format!(
            "实体: {}（过滤 {}，跳过 {}）",
            summary.entities_parsed, summary.entities_filtered, summary.entities_skipped
        ),
        format!(
            "对话记录: {}（跳过 {}）",
            summary.records_parsed, summary.records_skipped
        ),
        format!(
            "诊断: {}（严重 {}，警告 {}，提示 {}）",
            summary.findings, summary.critical, summary.warnings, summary.infos
        ),
    ]
    .join("\n")
}
