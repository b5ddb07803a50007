//! # Extract 模块
//!
//! 从手写的 JS 数据文件中提取对话图（括号深度启发式，无完整语法解析）。
//!
//! ## 架构
//!
//! ```text
//! 原始文本 → [容器定位] → [实体切分] → 实体块
//!          → [类型过滤 + 名称字段] + [记录切分] → 记录原文
//!          → [字段提取: condition / text / choices] → Vec<Entity>
//! ```
//!
//! ## 容错策略
//!
//! - 只有找不到容器是致命错误
//! - 实体块、记录数组、单条记录的错误都被限制在各自边界内，记入跳过清单
//!
//! ## 模块结构
//!
//! - `helpers`: 文本扫描辅助函数
//! - `field`: 字段提取
//! - `entity`: 实体切分
//! - `record`: 记录切分与解析

mod entity;
mod field;
mod helpers;
mod record;


use serde::Serialize;
use tracing::{debug, warn};

use crate::config::AuditConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::model::Entity;
use crate::scan::{find_container, match_balanced};

pub use entity::{EntityBlock, EntitySplit, split_entities};
pub use field::{FieldShape, FieldValue, extract_field};
pub use helpers::{
    find_field, labelled_strings, quoted_strings, read_quoted, strip_arrow_params,
    strip_comments, value_span,
};
pub use record::{Segments, has_condition_marker, parse_record, segment_records};

/// 被跳过的实体或记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipNote {
    /// 所属实体
    pub entity_id: String,
    /// 记录在数组中的原始序号（实体级跳过时为 None）
    pub record_index: Option<usize>,
    /// 跳过原因
    pub error: ExtractError,
}

/// 提取结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// 按文档顺序排列的对话实体
    pub entities: Vec<Entity>,
    /// 因类型标记不符而过滤掉的实体 id
    pub filtered: Vec<String>,
    /// 跳过清单
    pub skipped: Vec<SkipNote>,
}

/// 对话提取器
pub struct Extractor {
    config: AuditConfig,
}

impl Extractor {
    /// 创建新的提取器
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// 提取文档中的全部对话实体
    ///
    /// # 返回
    ///
    /// 找不到容器时返回 `ContainerNotFound`；其余错误记入 [`Extraction::skipped`]。
    pub fn extract(&self, text: &str) -> ExtractResult<Extraction> {
        let container = find_container(text, &self.config.container_keyword)?;
        let split = split_entities(container);

        let mut extraction = Extraction::default();
        for error in split.malformed {
            let entity_id = match &error {
                ExtractError::MalformedEntity { entity_id, .. } => entity_id.clone(),
                _ => String::new(),
            };
            extraction.skipped.push(SkipNote {
                entity_id,
                record_index: None,
                error,
            });
        }

        for block in split.blocks {
            if !self.is_dialogue_entity(block.body) {
                debug!(entity = %block.id, "非对话实体，已过滤");
                extraction.filtered.push(block.id);
                continue;
            }

            match self.extract_entity(&block, &mut extraction.skipped) {
                Ok(entity) => {
                    debug!(
                        entity = %entity.id,
                        records = entity.records.len(),
                        "提取对话实体"
                    );
                    extraction.entities.push(entity);
                }
                Err(error) => {
                    warn!(entity = %block.id, error = %error, "对话实体已跳过");
                    extraction.skipped.push(SkipNote {
                        entity_id: block.id,
                        record_index: None,
                        error,
                    });
                }
            }
        }

        Ok(extraction)
    }

    /// 实体是否带有对话类型标记
    fn is_dialogue_entity(&self, body: &str) -> bool {
        matches!(
            extract_field(body, &self.config.type_field, FieldShape::ScalarString),
            Ok(FieldValue::Scalar(ref value)) if *value == self.config.type_value
        )
    }

    /// 提取单个实体
    fn extract_entity(
        &self,
        block: &EntityBlock<'_>,
        skipped: &mut Vec<SkipNote>,
    ) -> ExtractResult<Entity> {
        let display_name =
            match extract_field(block.body, &self.config.name_field, FieldShape::ScalarString) {
                Ok(FieldValue::Scalar(name)) => name,
                _ => block.id.clone(),
            };

        let records_field = &self.config.records_field;
        let start = find_field(block.body, records_field)
            .ok_or_else(|| ExtractError::field_not_found(records_field))?;
        if !block.body[start..].starts_with('[') {
            return Err(ExtractError::RecordsFieldNotArray {
                field: records_field.clone(),
            });
        }
        let (records_text, _) = match_balanced(block.body, start, '[', ']')?;

        let segments = segment_records(records_text);
        let raw_count = segments.records.len();
        let mut records = Vec::with_capacity(raw_count);
        for (index, raw) in segments.records.into_iter().enumerate() {
            if !has_condition_marker(raw, &self.config) {
                warn!(entity = %block.id, record = index, "对话记录缺少条件，已跳过");
                skipped.push(SkipNote {
                    entity_id: block.id.clone(),
                    record_index: Some(index),
                    error: ExtractError::field_not_found(&self.config.condition_field),
                });
                continue;
            }

            match parse_record(raw, &self.config) {
                Ok(record) => records.push(record),
                Err(error) => {
                    warn!(entity = %block.id, record = index, error = %error, "对话记录已丢弃");
                    skipped.push(SkipNote {
                        entity_id: block.id.clone(),
                        record_index: Some(index),
                        error,
                    });
                }
            }
        }

        // offset 相对于记录数组内容
        if let Some(offset) = segments.unterminated_at {
            warn!(entity = %block.id, offset, "末尾对话记录未闭合");
            skipped.push(SkipNote {
                entity_id: block.id.clone(),
                record_index: Some(raw_count),
                error: ExtractError::UnbalancedDelimiter { open: '{', offset },
            });
        }

        Ok(Entity::new(block.id.clone(), display_name, records))
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(AuditConfig::default())
    }
}
