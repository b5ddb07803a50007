//! # Model 模块
//!
//! 提取结果的数据模型：实体（NPC）与对话记录。
//!
//! 所有结构在构造后不再修改；审计只读地遍历它们。

use serde::Serialize;

/// 条件缺失或无法解析时使用的占位文本
pub const UNKNOWN_CONDITION: &str = "unknown";

/// 对话实体（一个可对话的 NPC）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    /// 容器中的键，稳定且唯一
    pub id: String,
    /// 显示名称（缺省为 id）
    pub display_name: String,
    /// 按书写顺序排列的对话记录
    pub records: Vec<Record>,
}

impl Entity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            records,
        }
    }
}

/// 一轮对话：条件 + 台词 + 选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// 条件表达式原文，仅用于展示，从不求值
    pub condition: String,
    /// 台词
    pub lines: Lines,
    /// 玩家选项
    pub choices: Choices,
}

impl Record {
    /// 台词列表（始终非空）
    pub fn lines(&self) -> &[String] {
        self.lines.as_slice()
    }

    /// 选项文本列表（Absent / Null 时为空）
    pub fn choice_labels(&self) -> &[String] {
        self.choices.labels()
    }
}

/// 台词字段，保留书写形式
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", content = "value", rename_all = "snake_case")]
pub enum Lines {
    /// `text: "..."` 或内联表达式
    Scalar(String),
    /// `text: [ ... ]`
    Array(Vec<String>),
}

impl Lines {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Scalar(line) => std::slice::from_ref(line),
            Self::Array(lines) => lines,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// 是否以数组形式书写
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }
}

/// 选项字段，保留书写形式
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", content = "labels", rename_all = "snake_case")]
pub enum Choices {
    /// 没有 choices 字段
    Absent,
    /// `choices: null`
    Null,
    /// `choices: [ ... ]`，每个选项对象只保留其 `text`
    List(Vec<String>),
    /// 有选项但无法静态读出文本（`choices: build(game)`、`text: game.label`）
    Unresolved,
}

impl Choices {
    pub fn labels(&self) -> &[String] {
        match self {
            Self::List(labels) => labels,
            Self::Absent | Self::Null | Self::Unresolved => &[],
        }
    }

    /// 是否是显式的空数组（区别于没有字段 / null）
    pub fn is_explicit_empty(&self) -> bool {
        matches!(self, Self::List(labels) if labels.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_shapes() {
        let scalar = Lines::Scalar("Morning.".to_string());
        assert_eq!(scalar.as_slice(), ["Morning.".to_string()]);
        assert!(!scalar.is_array());

        let array = Lines::Array(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(array.len(), 2);
        assert!(array.is_array());
    }

    #[test]
    fn test_choices_labels() {
        assert!(Choices::Absent.labels().is_empty());
        assert!(Choices::Null.labels().is_empty());
        assert!(!Choices::Null.is_explicit_empty());
        assert!(Choices::List(vec![]).is_explicit_empty());
        assert!(Choices::Unresolved.labels().is_empty());
        assert!(!Choices::Unresolved.is_explicit_empty());

        let list = Choices::List(vec!["Yes".to_string()]);
        assert_eq!(list.labels(), ["Yes".to_string()]);
        assert!(!list.is_explicit_empty());
    }

    #[test]
    fn test_record_serializes_shapes() {
        let record = Record {
            condition: UNKNOWN_CONDITION.to_string(),
            lines: Lines::Scalar("Hi".to_string()),
            choices: Choices::Null,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["lines"]["shape"], "scalar");
        assert_eq!(json["lines"]["value"], "Hi");
        assert_eq!(json["choices"]["shape"], "null");
    }
}
