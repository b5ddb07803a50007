//! # 诊断模块
//!
//! 对提取出的对话图做结构审计，不依赖 IO。
//!
//! ## 设计原则
//!
//! - 纯函数 API：规则只读记录，不修改任何数据，重复运行结果相同
//! - 诊断分级：Critical（必须修复）、Warning（建议修复）、Info（信息提示）
//! - 规则是有序列表，每条规则是 `Record -> Option<RuleHit>`，新增规则只需追加
//! - 输出顺序：实体顺序 → 记录顺序 → 规则顺序

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::config::AuditConfig;
use crate::model::{Entity, Record};

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// 信息提示
    Info,
    /// 警告（建议修复）
    Warning,
    /// 严重（必须修复）
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// 诊断级别
    pub severity: Severity,
    /// 触发的规则
    pub rule: &'static str,
    /// 实体 id
    pub entity_id: String,
    /// 记录序号（从 0 开始）
    pub record_index: usize,
    /// 诊断消息
    pub message: String,
    /// 诊断详情（可选）
    pub detail: Option<String>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} 对话 #{}: {}",
            self.severity,
            self.entity_id,
            self.record_index + 1,
            self.message
        )?;
        if let Some(detail) = &self.detail {
            write!(f, "\n  | {}", detail)?;
        }
        Ok(())
    }
}

/// 规则命中结果（由审计器补上实体与记录位置）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit {
    pub severity: Severity,
    pub message: String,
    pub detail: Option<String>,
}

impl RuleHit {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            detail: None,
        }
    }

    /// 设置详情
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// 审计规则
pub trait AuditRule {
    /// 规则标识
    fn id(&self) -> &'static str;

    /// 检查单条记录
    fn check(&self, record: &Record) -> Option<RuleHit>;
}

/// 只有一个选项：应当自动推进，而不是让玩家点击
pub struct SingleForcedChoice;

impl AuditRule for SingleForcedChoice {
    fn id(&self) -> &'static str {
        "single-forced-choice"
    }

    fn check(&self, record: &Record) -> Option<RuleHit> {
        match record.choice_labels() {
            [only] => Some(
                RuleHit::new(
                    Severity::Critical,
                    format!("唯一选项 '{}'：玩家不需要点击它", only),
                )
                .with_detail("单一选项应作为自动过渡，而不是分支"),
            ),
            _ => None,
        }
    }
}

/// 台词过长
pub struct OversizedLine {
    pub max_chars: usize,
}

impl AuditRule for OversizedLine {
    fn id(&self) -> &'static str {
        "oversized-line"
    }

    fn check(&self, record: &Record) -> Option<RuleHit> {
        let oversized: Vec<(usize, usize)> = record
            .lines()
            .iter()
            .enumerate()
            .map(|(index, line)| (index, line.chars().count()))
            .filter(|&(_, len)| len > self.max_chars)
            .collect();

        let &(first_index, first_len) = oversized.first()?;
        let mut hit = RuleHit::new(
            Severity::Warning,
            format!(
                "第 {} 行台词过长（{} 字符，上限 {}）",
                first_index + 1,
                first_len,
                self.max_chars
            ),
        );
        if oversized.len() > 1 {
            hit = hit.with_detail(format!("共 {} 行超长", oversized.len()));
        }
        Some(hit)
    }
}

/// 数组里只有一行台词
pub struct UnnecessaryWrapping;

impl AuditRule for UnnecessaryWrapping {
    fn id(&self) -> &'static str {
        "unnecessary-wrapping"
    }

    fn check(&self, record: &Record) -> Option<RuleHit> {
        (record.lines.is_array() && record.lines.len() == 1)
            .then(|| RuleHit::new(Severity::Info, "数组中只有一行台词，可简化为字符串"))
    }
}

/// 选项是显式的空数组：对话以 NPC 发言突然结束
pub struct AbruptEnd;

impl AuditRule for AbruptEnd {
    fn id(&self) -> &'static str {
        "abrupt-end"
    }

    fn check(&self, record: &Record) -> Option<RuleHit> {
        record
            .choices
            .is_explicit_empty()
            .then(|| RuleHit::new(Severity::Info, "选项为空数组：对话以 NPC 发言结束，显得突兀"))
    }
}

/// 选项文本重复（精确匹配）
pub struct DuplicateChoices;

impl AuditRule for DuplicateChoices {
    fn id(&self) -> &'static str {
        "duplicate-choices"
    }

    fn check(&self, record: &Record) -> Option<RuleHit> {
        let labels = record.choice_labels();
        let mut seen = HashSet::new();
        let mut duplicates: Vec<&str> = Vec::new();
        for label in labels {
            if !seen.insert(label.as_str()) && !duplicates.contains(&label.as_str()) {
                duplicates.push(label);
            }
        }

        if duplicates.is_empty() {
            return None;
        }
        let quoted: Vec<String> = duplicates.iter().map(|d| format!("'{}'", d)).collect();
        Some(RuleHit::new(
            Severity::Warning,
            format!("选项文本重复: {}", quoted.join(", ")),
        ))
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditResult {
    /// 诊断条目列表
    pub findings: Vec<Finding>,
}

impl AuditResult {
    /// 创建空结果
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加诊断
    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// 合并另一个结果
    pub fn merge(&mut self, other: AuditResult) {
        self.findings.extend(other.findings);
    }

    /// 指定级别的数量
    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    pub fn critical_count(&self) -> usize {
        self.count(Severity::Critical)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn info_count(&self) -> usize {
        self.count(Severity::Info)
    }

    /// 是否有严重问题
    pub fn has_critical(&self) -> bool {
        self.critical_count() > 0
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// 按级别过滤（不低于 `min`）
    pub fn filter_by_severity(&self, min: Severity) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.severity >= min).collect()
    }
}

/// 结构审计器
pub struct Auditor {
    rules: Vec<Box<dyn AuditRule>>,
}

impl Auditor {
    /// 使用默认规则集创建审计器
    ///
    /// 规则顺序固定：唯一选项 → 台词过长 → 多余数组 → 突然结束 → 重复选项。
    pub fn new(config: &AuditConfig) -> Self {
        Self::empty()
            .with_rule(SingleForcedChoice)
            .with_rule(OversizedLine {
                max_chars: config.max_line_chars,
            })
            .with_rule(UnnecessaryWrapping)
            .with_rule(AbruptEnd)
            .with_rule(DuplicateChoices)
    }

    /// 不含任何规则的审计器
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// 追加规则（在已有规则之后执行）
    pub fn with_rule(mut self, rule: impl AuditRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// 规则标识列表（按执行顺序）
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    /// 审计单个实体
    pub fn audit_entity(&self, entity: &Entity) -> AuditResult {
        let mut result = AuditResult::new();
        for (record_index, record) in entity.records.iter().enumerate() {
            for rule in &self.rules {
                if let Some(hit) = rule.check(record) {
                    result.push(Finding {
                        severity: hit.severity,
                        rule: rule.id(),
                        entity_id: entity.id.clone(),
                        record_index,
                        message: hit.message,
                        detail: hit.detail,
                    });
                }
            }
        }
        result
    }

    /// 审计多个实体，结果按实体顺序拼接
    pub fn audit_entities(&self, entities: &[Entity]) -> AuditResult {
        let mut result = AuditResult::new();
        for entity in entities {
            result.merge(self.audit_entity(entity));
        }
        result
    }
}

impl Default for Auditor {
    fn default() -> Self {
        Self::new(&AuditConfig::default())
    }
}
