//! # Config 模块
//!
//! 提取与审计的可调参数，集中管理所有配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件（JSON）
//! 3. 默认值（最低）

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 审计配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// 容器关键字：`const <KEYWORD> = {`
    #[serde(default = "default_container_keyword")]
    pub container_keyword: String,

    /// 实体类型标记字段
    #[serde(default = "default_type_field")]
    pub type_field: String,

    /// 需要保留的实体类型值，其他类型的实体会被过滤
    #[serde(default = "default_type_value")]
    pub type_value: String,

    /// 显示名称字段
    #[serde(default = "default_name_field")]
    pub name_field: String,

    /// 对话记录数组字段
    #[serde(default = "default_records_field")]
    pub records_field: String,

    /// 条件字段（同时作为记录的必需标记）
    #[serde(default = "default_condition_field")]
    pub condition_field: String,

    /// 台词字段
    #[serde(default = "default_text_field")]
    pub text_field: String,

    /// 选项字段
    #[serde(default = "default_choices_field")]
    pub choices_field: String,

    /// 单行台词的最大字符数，超过则告警
    #[serde(default = "default_max_line_chars")]
    pub max_line_chars: usize,
}

fn default_container_keyword() -> String {
    "NPCS".to_string()
}

fn default_type_field() -> String {
    "type".to_string()
}

fn default_type_value() -> String {
    "dialogue_npc".to_string()
}

fn default_name_field() -> String {
    "name".to_string()
}

fn default_records_field() -> String {
    "dialogues".to_string()
}

fn default_condition_field() -> String {
    "condition".to_string()
}

fn default_text_field() -> String {
    "text".to_string()
}

fn default_choices_field() -> String {
    "choices".to_string()
}

fn default_max_line_chars() -> usize {
    120
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            container_keyword: default_container_keyword(),
            type_field: default_type_field(),
            type_value: default_type_value(),
            name_field: default_name_field(),
            records_field: default_records_field(),
            condition_field: default_condition_field(),
            text_field: default_text_field(),
            choices_field: default_choices_field(),
            max_line_chars: default_max_line_chars(),
        }
    }
}

impl AuditConfig {
    /// 从 JSON 文本解析配置（缺失字段取默认值）
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 使用指定的容器关键字
    pub fn with_container_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.container_keyword = keyword.into();
        self
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier(&self.container_keyword) {
            return Err(ConfigError::Invalid(format!(
                "容器关键字必须是标识符: '{}'",
                self.container_keyword
            )));
        }

        let fields = [
            ("type_field", &self.type_field),
            ("name_field", &self.name_field),
            ("records_field", &self.records_field),
            ("condition_field", &self.condition_field),
            ("text_field", &self.text_field),
            ("choices_field", &self.choices_field),
        ];
        for (key, value) in fields {
            if !is_identifier(value) {
                return Err(ConfigError::Invalid(format!(
                    "{} 必须是标识符: '{}'",
                    key, value
                )));
            }
        }

        if self.type_value.is_empty() {
            return Err(ConfigError::Invalid("type_value 不能为空".to_string()));
        }

        if self.max_line_chars == 0 {
            return Err(ConfigError::Invalid(
                "max_line_chars 必须大于 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// `[A-Za-z0-9_]+`
pub(crate) fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_identifier_char)
}

pub(crate) fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuditConfig::default();
        assert_eq!(config.container_keyword, "NPCS");
        assert_eq!(config.type_value, "dialogue_npc");
        assert_eq!(config.max_line_chars, 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AuditConfig::from_json_str(r#"{ "max_line_chars": 80 }"#).unwrap();
        assert_eq!(config.max_line_chars, 80);
        assert_eq!(config.records_field, "dialogues");
    }

    #[test]
    fn test_invalid_json() {
        let err = AuditConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let err = AuditConfig::from_json_str(r#"{ "max_line_chars": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let config = AuditConfig::default().with_container_keyword("NPC LIST");
        assert!(config.validate().is_err());

        let config = AuditConfig {
            text_field: String::new(),
            ..AuditConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
