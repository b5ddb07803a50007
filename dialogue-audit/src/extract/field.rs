//! # 字段提取
//!
//! 在块文本中定位 `name:` 标签，按指定形状读取字段值。
//!
//! 数组形式的值通过 [`match_balanced`] 确定边界，
//! 因此与块切分共享同一个“字符串中的括号也会被计数”的局限。

use super::helpers::{
    find_field, has_top_level_object, labelled_strings, quoted_strings, read_quoted,
    strip_comments, value_span,
};
use super::record::segment_records;
use crate::error::{ExtractError, ExtractResult};
use crate::scan::match_balanced;

/// 字段值的期望形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape<'a> {
    /// 单个字符串字面量
    ScalarString,
    /// 字符串，或字符串数组
    StringOrArray,
    /// `null`、空值，或对象数组（只保留每个对象中 `label` 字段的字符串）
    ///
    /// 非数组表达式、或没有任何字面量标签的非空数组返回 `Opaque`。
    OptionalArray { label: &'a str },
}

/// 提取出的字段值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    Array(Vec<String>),
    Null,
    /// 有值但读不出字符串（表达式、标签不是字面量的数组），保留原文
    Opaque(String),
}

/// 提取字段
///
/// 字段不存在时返回 [`ExtractError::FieldNotFound`]，由调用方决定是否致命。
pub fn extract_field(block: &str, name: &str, shape: FieldShape<'_>) -> ExtractResult<FieldValue> {
    let start = find_field(block, name).ok_or_else(|| ExtractError::field_not_found(name))?;
    let value = &block[start..];

    match shape {
        FieldShape::ScalarString => read_quoted(value)
            .map(|(text, _)| FieldValue::Scalar(text))
            .ok_or_else(|| ExtractError::field_not_found(name)),

        FieldShape::StringOrArray => {
            if value.starts_with('[') {
                let (content, _) = match_balanced(block, start, '[', ']')?;
                Ok(FieldValue::Array(array_items(content, name)))
            } else if let Some((text, _)) = read_quoted(value) {
                Ok(FieldValue::Scalar(text))
            } else {
                // 内联表达式：原样保留
                Ok(FieldValue::Scalar(strip_comments(value_span(block, start))))
            }
        }

        FieldShape::OptionalArray { label } => {
            let span = strip_comments(value_span(block, start));
            if span.is_empty() || span == "null" {
                return Ok(FieldValue::Null);
            }
            if !value.starts_with('[') {
                return Ok(FieldValue::Opaque(span));
            }

            let (content, _) = match_balanced(block, start, '[', ']')?;
            let labels = labelled_strings(content, label);
            let elements = strip_comments(content);
            // 只有空数组才是 Array(vec![])；有元素却读不出标签的数组不是
            if labels.is_empty() && !elements.is_empty() {
                return Ok(FieldValue::Opaque(elements));
            }
            Ok(FieldValue::Array(labels))
        }
    }
}

/// 数组元素：字符串数组取全部字符串；对象数组取每个对象中同名字段的字符串
fn array_items(content: &str, name: &str) -> Vec<String> {
    if !has_top_level_object(content) {
        return quoted_strings(content);
    }

    segment_records(content)
        .records
        .into_iter()
        .filter_map(|element| match extract_field(element, name, FieldShape::ScalarString) {
            Ok(FieldValue::Scalar(text)) => Some(text),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_string() {
        let block = "name: 'Marlowe', role: 'keeper'";
        assert_eq!(
            extract_field(block, "name", FieldShape::ScalarString),
            Ok(FieldValue::Scalar("Marlowe".to_string()))
        );
        assert_eq!(
            extract_field(block, "title", FieldShape::ScalarString),
            Err(ExtractError::field_not_found("title"))
        );
    }

    #[test]
    fn test_scalar_string_not_quoted() {
        assert_eq!(
            extract_field("name: someVar", "name", FieldShape::ScalarString),
            Err(ExtractError::field_not_found("name"))
        );
    }

    #[test]
    fn test_optional_array_nested_labels() {
        let block = r#"choices: [
            { text: "Ask", next: { text: "Deeper" } },
            { action: 'leave' },
            { text: 'Bye' }
        ]"#;
        let shape = FieldShape::OptionalArray { label: "text" };
        assert_eq!(
            extract_field(block, "choices", shape),
            Ok(FieldValue::Array(vec![
                "Ask".to_string(),
                "Deeper".to_string(),
                "Bye".to_string()
            ]))
        );
    }

    #[test]
    fn test_optional_array_null_and_empty() {
        let shape = FieldShape::OptionalArray { label: "text" };
        assert_eq!(
            extract_field("choices: null", "choices", shape),
            Ok(FieldValue::Null)
        );
        assert_eq!(
            extract_field("choices: ,", "choices", shape),
            Ok(FieldValue::Null)
        );
        assert_eq!(
            extract_field("choices: []", "choices", shape),
            Ok(FieldValue::Array(vec![]))
        );
        assert_eq!(
            extract_field("choices: [ /* 待定 */ ]", "choices", shape),
            Ok(FieldValue::Array(vec![]))
        );
    }

    #[test]
    fn test_optional_array_without_literal_labels() {
        let shape = FieldShape::OptionalArray { label: "text" };
        assert_eq!(
            extract_field("choices: buildChoices(game)", "choices", shape),
            Ok(FieldValue::Opaque("buildChoices(game)".to_string()))
        );
        assert_eq!(
            extract_field("choices: [{ text: game.label, action: 'go' }]", "choices", shape),
            Ok(FieldValue::Opaque("{ text: game.label, action: 'go' }".to_string()))
        );
    }

    #[test]
    fn test_string_or_array_unbalanced() {
        let err = extract_field("text: [\"a\", \"b\"", "text", FieldShape::StringOrArray)
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractError::UnbalancedDelimiter { open: '[', .. }
        ));
    }

    #[test]
    fn test_array_items_object_lines() {
        let content = r#"
            { speaker: "Marlowe", text: "Morning." },
            { speaker: "You", text: "Hi." }
        "#;
        assert_eq!(array_items(content, "text"), vec!["Morning.", "Hi."]);
    }
}
