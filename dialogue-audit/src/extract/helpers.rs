//! # 辅助解析函数
//!
//! 手写的文本扫描辅助函数，无正则依赖。
//!
//! 这里的扫描只用于定位字段标签和读取字符串值，会跳过字符串字面量和注释；
//! 块边界的切分仍由 [`crate::scan`] 的括号深度扫描负责。

use std::ops::Range;

use crate::config::is_identifier_char;

/// 文本片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    /// 代码字节（位置, 字节）
    Code(usize, u8),
    /// 字符串字面量（含引号）
    Quoted(Range<usize>),
    /// `//` 或 `/* */` 注释
    Comment(Range<usize>),
}

/// 把文本切成代码字节、字符串字面量和注释
///
/// 只识别 ASCII 结构字符，多字节字符的各个字节会作为 `Code` 原样产出。
pub(crate) struct Pieces<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Pieces<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }
}

impl Iterator for Pieces<'_> {
    type Item = Piece;

    fn next(&mut self) -> Option<Piece> {
        let start = self.pos;
        let byte = *self.bytes.get(start)?;
        let next = self.bytes.get(start + 1).copied();

        let piece = match (byte, next) {
            (b'"' | b'\'' | b'`', _) => {
                self.pos = skip_quoted(self.bytes, start);
                Piece::Quoted(start..self.pos)
            }
            (b'/', Some(b'/')) => {
                self.pos = self.bytes[start..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(self.bytes.len(), |p| start + p);
                Piece::Comment(start..self.pos)
            }
            (b'/', Some(b'*')) => {
                self.pos = self.bytes[start + 2..]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .map_or(self.bytes.len(), |p| start + 2 + p + 2);
                Piece::Comment(start..self.pos)
            }
            _ => {
                self.pos += 1;
                Piece::Code(start, byte)
            }
        };

        Some(piece)
    }
}

/// 返回字符串字面量结束引号之后的位置（未闭合时为文本末尾）
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// 读取开头的字符串字面量，返回去掉引号、处理转义后的内容和消耗的字节数
///
/// 输入: `"'I\\'ll go', next"`
/// 输出: `Some(("I'll go", 10))`
pub fn read_quoted(s: &str) -> Option<(String, usize)> {
    let quote = s.chars().next().filter(|c| matches!(c, '"' | '\'' | '`'))?;

    let mut out = String::new();
    let mut chars = s.char_indices().skip(1);
    while let Some((i, ch)) = chars.next() {
        if ch == '\\' {
            let (_, escaped) = chars.next()?;
            out.push(match escaped {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
        } else if ch == quote {
            return Some((out, i + 1));
        } else {
            out.push(ch);
        }
    }

    None
}

fn is_identifier_byte(b: u8) -> bool {
    is_identifier_char(b as char) || b == b'$'
}

/// 如果 `at` 处是标签 `name:`，返回冒号之后第一个非空白字符的位置
fn label_value_at(text: &str, at: usize, name: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    if at > 0 && is_identifier_byte(bytes[at - 1]) {
        return None;
    }
    let after = text[at..].strip_prefix(name)?;
    let value = after.trim_start().strip_prefix(':')?.trim_start();
    Some(text.len() - value.len())
}

/// 在块的顶层查找字段 `name:`，返回字段值的起始位置
///
/// 不匹配字符串和注释中的文本，也不匹配更长标识符的后缀（`repeatText:` 不是 `text:`）。
pub fn find_field(block: &str, name: &str) -> Option<usize> {
    let mut depth = 0usize;
    for piece in Pieces::new(block) {
        let Piece::Code(at, byte) = piece else {
            continue;
        };
        match byte {
            b'{' | b'[' | b'(' => depth += 1,
            b'}' | b']' | b')' => depth = depth.saturating_sub(1),
            b if depth == 0 && is_identifier_byte(b) => {
                if let Some(value) = label_value_at(block, at, name) {
                    return Some(value);
                }
            }
            _ => {}
        }
    }
    None
}

/// 从 `start` 开始截取字段值，直到顶层的 `,` 或所在块结束
pub fn value_span(block: &str, start: usize) -> &str {
    let tail = &block[start..];
    let mut depth = 0usize;
    for piece in Pieces::new(tail) {
        let Piece::Code(at, byte) = piece else {
            continue;
        };
        match byte {
            b'{' | b'[' | b'(' => depth += 1,
            b'}' | b']' | b')' if depth == 0 => return tail[..at].trim_end(),
            b'}' | b']' | b')' => depth -= 1,
            b',' if depth == 0 => return tail[..at].trim_end(),
            _ => {}
        }
    }
    tail.trim_end()
}

/// 去掉注释并裁剪首尾空白
pub fn strip_comments(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut kept_from = 0;
    for piece in Pieces::new(s) {
        if let Piece::Comment(range) = piece {
            out.push_str(&s[kept_from..range.start]);
            kept_from = range.end;
        }
    }
    out.push_str(&s[kept_from..]);
    out.trim().to_string()
}

/// 按出现顺序提取所有字符串字面量
pub fn quoted_strings(s: &str) -> Vec<String> {
    Pieces::new(s)
        .filter_map(|piece| match piece {
            Piece::Quoted(range) => read_quoted(&s[range]).map(|(value, _)| value),
            _ => None,
        })
        .collect()
}

/// 按出现顺序提取任意深度下 `label: "..."` 的字符串值
pub fn labelled_strings(s: &str, label: &str) -> Vec<String> {
    Pieces::new(s)
        .filter_map(|piece| match piece {
            Piece::Code(at, byte) if is_identifier_byte(byte) => label_value_at(s, at, label),
            _ => None,
        })
        .filter_map(|value| read_quoted(&s[value..]).map(|(text, _)| text))
        .collect()
}

/// 顶层是否出现 `{`（用于区分对象数组和字符串数组）
pub(crate) fn has_top_level_object(s: &str) -> bool {
    let mut depth = 0usize;
    for piece in Pieces::new(s) {
        if let Piece::Code(_, byte) = piece {
            match byte {
                b'{' if depth == 0 => return true,
                b'[' | b'(' => depth += 1,
                b']' | b')' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
    }
    false
}

/// 去掉开头的箭头函数参数表：`(game) =>`、`game =>`
pub fn strip_arrow_params(s: &str) -> &str {
    let s = s.trim_start();
    let params_end = if s.starts_with('(') {
        s.find(')').map(|p| p + 1)
    } else {
        s.find(|c: char| !is_identifier_char(c) && c != '$')
            .filter(|&p| p > 0)
    };

    params_end
        .and_then(|end| s[end..].trim_start().strip_prefix("=>"))
        .map_or(s, str::trim_start)
}
