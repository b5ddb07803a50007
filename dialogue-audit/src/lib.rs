//! # Dialogue Audit
//!
//! NPC 对话数据的提取与结构审计核心库。
//!
//! ## 架构概述
//!
//! `dialogue-audit` 是纯逻辑核心，不做任何 IO。
//! 宿主（命令行工具）读入数据文件文本，交给核心分析：
//!
//! ```text
//! 数据文件文本 ──► [extract] ──► Vec<Entity> ──► [diagnostic] ──► Vec<Finding>
//!                     │                                  │
//!                     └──────── SkipNote ────────────────┴──► AnalysisReport
//! ```
//!
//! 提取基于括号深度扫描而非完整语法解析：字符串中的未转义括号可能导致切分错误，
//! 这是已知且保留的行为。
//!
//! ## 使用示例
//!
//! ```ignore
//! use dialogue_audit::{AuditConfig, analyze, render_summary};
//!
//! let report = analyze(&text, &AuditConfig::default())?;
//! for finding in report.findings() {
//!     eprintln!("{finding}");
//! }
//! eprintln!("{}", render_summary(&report.summary));
//! ```
//!
//! ## 模块结构
//!
//! - [`scan`]：括号深度扫描与容器定位
//! - [`extract`]：实体切分、记录切分、字段提取
//! - [`model`]：实体与对话记录
//! - [`diagnostic`]：结构审计规则
//! - [`analysis`]：提取 + 审计流水线
//! - [`report`]：文本报告
//! - [`config`]：配置
//! - [`error`]：错误类型定义

pub mod analysis;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod extract;
pub mod model;
pub mod report;
pub mod scan;

// 重导出核心类型
pub use analysis::{AnalysisReport, EntityReport, Summary, analyze};
pub use config::AuditConfig;
pub use diagnostic::{AuditResult, AuditRule, Auditor, Finding, RuleHit, Severity};
pub use error::{ConfigError, ExtractError, ExtractResult};
pub use extract::{Extraction, Extractor, SkipNote};
pub use model::{Choices, Entity, Lines, Record, UNKNOWN_CONDITION};
pub use report::{render_entity_tree, render_findings, render_summary, render_trees};
pub use scan::{find_container, match_balanced};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // 验证所有公共类型都可以正常使用
        let config = AuditConfig::default();
        let _auditor = Auditor::new(&config);
        let _extractor = Extractor::new(config.clone());

        let report = analyze("const NPCS = {\n};", &config).unwrap();
        assert!(report.entities.is_empty());
        assert_eq!(report.summary, Summary::default());
    }
}
