//! # Error 模块
//!
//! 定义 dialogue-audit 中使用的错误类型。
//!
//! 只有 [`ExtractError::ContainerNotFound`] 会中止整次分析；
//! 其余错误都在实体/对话记录边界内被消化，记录到跳过清单中。

use serde::Serialize;
use thiserror::Error;

/// 提取错误
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractError {
    /// 找不到 `const <KEYWORD> = {` … `\n};` 容器
    #[error("未找到容器 'const {keyword} = {{ ... }};'")]
    ContainerNotFound { keyword: String },

    /// 括号扫描到达文本末尾仍未闭合
    #[error("偏移 {offset} 处的 '{open}' 未闭合")]
    UnbalancedDelimiter { open: char, offset: usize },

    /// 实体头已匹配，但实体块无法提取
    #[error("实体 '{entity_id}' 的块无法提取: {reason}")]
    MalformedEntity { entity_id: String, reason: String },

    /// 缺少字段
    #[error("缺少字段 '{field}'")]
    FieldNotFound { field: String },

    /// 对话记录字段存在，但值不是数组字面量
    #[error("字段 '{field}' 不是数组")]
    RecordsFieldNotArray { field: String },
}

impl ExtractError {
    pub(crate) fn field_not_found(field: &str) -> Self {
        Self::FieldNotFound {
            field: field.to_string(),
        }
    }
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// JSON 解析失败
    #[error("配置解析失败: {0}")]
    Parse(String),

    /// 配置校验失败
    #[error("配置验证失败: {0}")]
    Invalid(String),
}

/// Result 类型别名
pub type ExtractResult<T> = Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractError::ContainerNotFound {
            keyword: "NPCS".to_string(),
        };
        assert_eq!(err.to_string(), "未找到容器 'const NPCS = { ... };'");

        let err = ExtractError::UnbalancedDelimiter {
            open: '[',
            offset: 12,
        };
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains('['));
    }

    #[test]
    fn test_error_serializes_with_kind_tag() {
        let err = ExtractError::field_not_found("text");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "field_not_found");
        assert_eq!(json["field"], "text");
    }
}
