//! # 实体切分
//!
//! 在容器文本中找出所有顶层的 `identifier: {` 实体头，
//! 再用括号深度扫描截出每个实体的完整块。

use tracing::warn;

use crate::config::is_identifier_char;
use crate::error::ExtractError;
use crate::scan::{match_balanced, track_brace_depth};

/// 一个实体的原始块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityBlock<'a> {
    pub id: String,
    /// 花括号之间的文本
    pub body: &'a str,
}

/// 切分结果（按文档顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySplit<'a> {
    pub blocks: Vec<EntityBlock<'a>>,
    /// 实体头匹配但块无法提取（`MalformedEntity`）
    pub malformed: Vec<ExtractError>,
}

/// 解析行首的实体头，返回 (标识符, `{` 在行内的偏移)
fn parse_entity_header(line: &str) -> Option<(&str, usize)> {
    let trimmed = line.trim_start();

    let id_len = trimmed
        .find(|c: char| !is_identifier_char(c))
        .unwrap_or(trimmed.len());
    if id_len == 0 {
        return None;
    }

    let after_id = &trimmed[id_len..];
    let after_colon = after_id.trim_start().strip_prefix(':')?;
    let brace = after_colon.trim_start();
    if !brace.starts_with('{') {
        return None;
    }

    Some((&trimmed[..id_len], line.len() - brace.len()))
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// 切分容器中的实体
///
/// 只在顶层（花括号深度为 0 的行首）识别实体头。
/// 某个实体块无法闭合时记录 `MalformedEntity`，跳过缩进比该实体头更深的行，
/// 在第一个缩进不更深的非空行处恢复扫描，因此后面的兄弟实体仍能被提取，
/// 而坏实体内部的嵌套对象不会被当成实体。
pub fn split_entities(container: &str) -> EntitySplit<'_> {
    let mut split = EntitySplit::default();
    let mut cursor = 0;
    let mut depth = 0usize;
    // 坏实体头的缩进
    let mut skip_deeper_than: Option<usize> = None;

    while cursor < container.len() {
        let line_end = container[cursor..]
            .find('\n')
            .map_or(container.len(), |p| cursor + p);
        let line = &container[cursor..line_end];

        if let Some(indent) = skip_deeper_than {
            if line.trim().is_empty() || indent_of(line) > indent {
                cursor = line_end + 1;
                continue;
            }
            skip_deeper_than = None;
        }

        if depth == 0
            && let Some((id, brace_offset)) = parse_entity_header(line)
        {
            match match_balanced(container, cursor + brace_offset, '{', '}') {
                Ok((body, end)) => {
                    split.blocks.push(EntityBlock {
                        id: id.to_string(),
                        body,
                    });
                    cursor = end;
                }
                Err(e) => {
                    warn!(entity = id, error = %e, "实体块无法提取，已跳过");
                    split.malformed.push(ExtractError::MalformedEntity {
                        entity_id: id.to_string(),
                        reason: e.to_string(),
                    });
                    skip_deeper_than = Some(indent_of(line));
                    cursor = line_end + 1;
                }
            }
            continue;
        }

        depth = track_brace_depth(depth, line);
        cursor = line_end + 1;
    }

    split
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entity_header() {
        assert_eq!(parse_entity_header("    marlowe: {"), Some(("marlowe", 13)));
        assert_eq!(parse_entity_header("npc_2 :{ name: 'x' }"), Some(("npc_2", 7)));
        assert_eq!(parse_entity_header("    name: 'Marlowe',"), None);
        assert_eq!(parse_entity_header("    dialogues: ["), None);
        assert_eq!(parse_entity_header("    // old: {"), None);
        assert_eq!(parse_entity_header(""), None);
    }

    #[test]
    fn test_split_entities_in_order() {
        let container = "
    alpha: {
        name: 'A',
        nested: {
            beta: { x: 1 }
        }
    },
    gamma: { name: 'G' }
";
        let split = split_entities(container);
        let ids: Vec<&str> = split.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "gamma"]);
        assert!(split.malformed.is_empty());
        assert_eq!(split.blocks[1].body, " name: 'G' ");
    }

    #[test]
    fn test_split_entities_skips_nested_headers() {
        let container = "
    outer: {
        inner: {
            deep: 1
        }
    }
";
        let split = split_entities(container);
        assert_eq!(split.blocks.len(), 1);
        assert_eq!(split.blocks[0].id, "outer");
    }

    #[test]
    fn test_split_entities_truncated_sibling() {
        let container = "
    broken: {
        name: 'B',
        dialogues: [
            { condition: (game) => true, text: 'x' }
        ],
    good: {
        name: 'G'
    }
";
        let split = split_entities(container);
        let ids: Vec<&str> = split.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["good"]);
        assert_eq!(split.malformed.len(), 1);
        assert!(matches!(
            &split.malformed[0],
            ExtractError::MalformedEntity { entity_id, .. } if entity_id == "broken"
        ));
    }

    #[test]
    fn test_truncated_entity_nested_blocks_stay_hidden() {
        let container = "
    broken: {
        name: 'B',
        position: { x: 1, y: 2 },
        stats: {
            type: 'dialogue_npc',
            dialogues: [
                { condition: (game) => true, text: 'x' }
            ]
        },

    good: {
        name: 'G'
    }
";
        let split = split_entities(container);
        let ids: Vec<&str> = split.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["good"]);
        assert_eq!(split.malformed.len(), 1);
    }

    #[test]
    fn test_split_entities_empty_container() {
        let split = split_entities("\n");
        assert!(split.blocks.is_empty());
        assert!(split.malformed.is_empty());
    }
}
