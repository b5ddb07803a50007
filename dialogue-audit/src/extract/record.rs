//! # 对话记录切分
//!
//! 把 `dialogues: [ ... ]` 数组内容按顶层 `{...}` 切成单条记录，再解析记录字段。
//!
//! 切分只看花括号深度：深度 0→1 开始一条记录，1→0 结束一条记录。
//! 不校验记录内部结构，数组中任何顶层 `{...}` 都算一条记录。

use tracing::debug;

use super::field::{FieldShape, FieldValue, extract_field};
use super::helpers::{find_field, strip_arrow_params, strip_comments, value_span};
use crate::config::AuditConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::model::{Choices, Lines, Record, UNKNOWN_CONDITION};

/// 切分结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segments<'a> {
    /// 各条记录花括号之间的原文
    pub records: Vec<&'a str>,
    /// 末尾未闭合记录的起始偏移
    pub unterminated_at: Option<usize>,
}

/// 按顶层花括号切分记录
pub fn segment_records(text: &str) -> Segments<'_> {
    let mut segments = Segments::default();
    let mut depth = 0usize;
    let mut record_start = 0;

    for (offset, ch) in text.char_indices() {
        match ch {
            '{' => {
                if depth == 0 {
                    record_start = offset;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    segments.records.push(&text[record_start + 1..offset]);
                }
            }
            _ => {}
        }
    }

    if depth > 0 {
        segments.unterminated_at = Some(record_start);
    }

    segments
}

/// 记录是否带有必需的条件标记
pub fn has_condition_marker(raw: &str, config: &AuditConfig) -> bool {
    find_field(raw, &config.condition_field).is_some()
}

/// 解析单条记录
///
/// - 缺少条件：`condition` 取 `"unknown"`
/// - 缺少台词（或台词为空数组）：返回 `FieldNotFound`，由调用方丢弃该记录
/// - 缺少选项：`Choices::Absent`
/// - 选项读不出字面量文本：`Choices::Unresolved`
pub fn parse_record(raw: &str, config: &AuditConfig) -> ExtractResult<Record> {
    let condition = extract_condition(raw, &config.condition_field);

    let lines = match extract_field(raw, &config.text_field, FieldShape::StringOrArray)? {
        FieldValue::Scalar(line) => Lines::Scalar(line),
        FieldValue::Array(lines) if !lines.is_empty() => Lines::Array(lines),
        FieldValue::Array(_) | FieldValue::Null | FieldValue::Opaque(_) => {
            return Err(ExtractError::field_not_found(&config.text_field));
        }
    };

    let shape = FieldShape::OptionalArray {
        label: &config.text_field,
    };
    let choices = match extract_field(raw, &config.choices_field, shape) {
        Ok(FieldValue::Array(labels)) => Choices::List(labels),
        Ok(FieldValue::Null) => Choices::Null,
        Ok(FieldValue::Opaque(_) | FieldValue::Scalar(_)) => Choices::Unresolved,
        Err(ExtractError::FieldNotFound { .. }) => Choices::Absent,
        Err(e) => return Err(e),
    };

    debug!(
        condition = %condition,
        lines = lines.len(),
        choices = choices.labels().len(),
        "解析对话记录"
    );

    Ok(Record {
        condition,
        lines,
        choices,
    })
}

/// 提取条件表达式原文
fn extract_condition(raw: &str, field: &str) -> String {
    let Some(start) = find_field(raw, field) else {
        return UNKNOWN_CONDITION.to_string();
    };

    let text = strip_comments(strip_arrow_params(value_span(raw, start)));
    if text.is_empty() {
        UNKNOWN_CONDITION.to_string()
    } else {
        text
    }
}
