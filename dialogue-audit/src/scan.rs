//! # Scan 模块
//!
//! 括号深度扫描：在不做完整词法分析的前提下，找出平衡的 `{...}` / `[...]` 区域。
//!
//! ## 已知局限
//!
//! 扫描器不区分字符串字面量内部的字符和结构字符。
//! 如果字符串值本身包含未转义的 `{` `}` `[` `]`，切分结果可能出错。
//! 下游的实体切分和记录切分都依赖这一行为，不要把它改成完整的 tokenizer。

use crate::error::{ExtractError, ExtractResult};

/// 从 `start` 处的 `open` 开始，找到使深度回到 0 的 `close`
///
/// 返回开闭字符之间（不含两端）的内容，以及闭合字符之后的偏移。
///
/// 输入: `"a { b { c } d } e"`, `2`, `'{'`, `'}'`
/// 输出: `Ok((" b { c } d ", 15))`
pub fn match_balanced(
    text: &str,
    start: usize,
    open: char,
    close: char,
) -> ExtractResult<(&str, usize)> {
    let unbalanced = ExtractError::UnbalancedDelimiter {
        open,
        offset: start,
    };

    let Some(tail) = text.get(start..) else {
        return Err(unbalanced);
    };
    if !tail.starts_with(open) {
        return Err(unbalanced);
    }

    let content_start = start + open.len_utf8();
    let mut depth = 0usize;
    for (offset, ch) in tail.char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                let close_at = start + offset;
                return Ok((&text[content_start..close_at], close_at + close.len_utf8()));
            }
        }
    }

    Err(unbalanced)
}

/// 定位 `const <KEYWORD> = {` … `\n};` 容器，返回两者之间的文本
///
/// 闭合标记必须是单独一行的 `};`，取开头之后第一次出现的位置。
pub fn find_container<'a>(text: &'a str, keyword: &str) -> ExtractResult<&'a str> {
    let not_found = || ExtractError::ContainerNotFound {
        keyword: keyword.to_string(),
    };

    let header = format!("const {} = {{", keyword);
    let body_start = text.find(&header).ok_or_else(not_found)? + header.len();
    let body_len = text[body_start..].find("\n};").ok_or_else(not_found)?;

    Ok(&text[body_start..body_start + body_len])
}

/// 按行累计 `{` / `}` 深度，多余的 `}` 不会让深度变为负数
pub(crate) fn track_brace_depth(depth: usize, line: &str) -> usize {
    line.chars().fold(depth, |depth, ch| match ch {
        '{' => depth + 1,
        '}' => depth.saturating_sub(1),
        _ => depth,
    })
}
