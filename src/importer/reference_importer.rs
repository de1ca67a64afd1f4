// ==========================================
// 补充剂成本核算系统 - 工时参考表导入器
// ==========================================
// 流程: 文件解析 → 行映射与校验 → 单事务整表替换
// 红线: 任一行校验失败则整体拒绝, 不做部分写入
// ==========================================

use crate::domain::reference::ReferenceTier;
use crate::domain::types::{ProcessCategory, RunRangeBasis};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawRecord, UniversalFileParser};
use crate::repository::ReferenceTierRepository;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

// ===== 表头 =====
pub const COL_PRODUCT_CLASS: &str = "ProductClass";
pub const COL_PROCESS_CATEGORY: &str = "ProcessCategory";
pub const COL_PROCESS_DESCRIPTION: &str = "ProcessDescription";
pub const COL_HEADCOUNT: &str = "Headcount";
pub const COL_SETUP_HOURS: &str = "SetupHours";
pub const COL_RUN_RATE: &str = "RunRate";
pub const COL_RUN_UNITS_PER_HOUR: &str = "RunUnitsPerHour";
pub const COL_RUN_RANGE_BASIS: &str = "RunRangeBasis";
pub const COL_RUN_LOW_RANGE: &str = "RunLowRange";
pub const COL_RUN_HIGH_RANGE: &str = "RunHighRange";

/// 导入结果摘要
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceImportSummary {
    pub batch_id: String,
    pub file_name: String,
    pub row_count: usize,
    pub imported_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

// ==========================================
// ReferenceImporter
// ==========================================
pub struct ReferenceImporter {
    repo: ReferenceTierRepository,
    parser: UniversalFileParser,
}

impl ReferenceImporter {
    pub fn new(repo: ReferenceTierRepository) -> Self {
        Self {
            repo,
            parser: UniversalFileParser,
        }
    }

    /// 导入 .csv / .xlsx 参考表, 替换现有全部档位
    #[instrument(skip(self, file_path), fields(batch_id))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ReferenceImportSummary> {
        let start_time = Instant::now();
        let path = file_path.as_ref();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(batch_id = %batch_id, file_path = %path.display(), "开始导入工时参考表");

        let records = self.parser.parse(path)?;
        info!(total_rows = records.len(), "文件解析完成");

        let tiers = parse_tiers(&records)?;
        let row_count = self.repo.replace_all(&tiers, Some(&batch_id))?;

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(batch_id = %batch_id, row_count, elapsed_ms, "工时参考表导入完成");

        Ok(ReferenceImportSummary {
            batch_id,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            row_count,
            imported_at: Utc::now(),
            elapsed_ms,
        })
    }
}

/// 原始行 → 档位（全部校验通过才返回）
pub fn parse_tiers(records: &[RawRecord]) -> ImportResult<Vec<ReferenceTier>> {
    if records.is_empty() {
        return Err(ImportError::FieldMappingError {
            row: 0,
            message: "文件无数据行".to_string(),
        });
    }

    records
        .iter()
        .enumerate()
        // 行号按表格显示: 表头占第 1 行
        .map(|(idx, record)| parse_tier(idx + 2, record))
        .collect()
}

fn parse_tier(row: usize, record: &RawRecord) -> ImportResult<ReferenceTier> {
    let category_text = required_text(row, record, COL_PROCESS_CATEGORY)?;
    let process_category =
        ProcessCategory::parse(category_text).ok_or_else(|| ImportError::ValueRangeError {
            row,
            field: COL_PROCESS_CATEGORY.to_string(),
            message: format!("未知工序类别: {}", category_text),
        })?;

    let basis_text = required_text(row, record, COL_RUN_RANGE_BASIS)?;
    let run_range_basis =
        RunRangeBasis::parse(basis_text).ok_or_else(|| ImportError::ValueRangeError {
            row,
            field: COL_RUN_RANGE_BASIS.to_string(),
            message: format!("未知区间依据: {}", basis_text),
        })?;

    let run_low_range = required_number(row, record, COL_RUN_LOW_RANGE)?;
    let run_high_range = required_number(row, record, COL_RUN_HIGH_RANGE)?;
    if run_low_range > run_high_range {
        return Err(ImportError::ValueRangeError {
            row,
            field: COL_RUN_LOW_RANGE.to_string(),
            message: format!("区间下界 {} 大于上界 {}", run_low_range, run_high_range),
        });
    }

    Ok(ReferenceTier {
        product_class: required_text(row, record, COL_PRODUCT_CLASS)?.to_string(),
        process_category,
        process_description: required_text(row, record, COL_PROCESS_DESCRIPTION)?.to_string(),
        headcount: required_number(row, record, COL_HEADCOUNT)?,
        setup_hours: required_number(row, record, COL_SETUP_HOURS)?,
        run_rate: optional_number(row, record, COL_RUN_RATE)?,
        run_units_per_hour: optional_number(row, record, COL_RUN_UNITS_PER_HOUR)?.unwrap_or(0.0),
        run_range_basis,
        run_low_range,
        run_high_range,
    })
}

fn required_text<'a>(row: usize, record: &'a RawRecord, field: &str) -> ImportResult<&'a str> {
    match record.get(field).map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ImportError::FieldMappingError {
            row,
            message: format!("缺少必填字段 {}", field),
        }),
    }
}

fn optional_number(row: usize, record: &RawRecord, field: &str) -> ImportResult<Option<f64>> {
    let text = match record.get(field).map(|v| v.trim()) {
        Some(v) if !v.is_empty() => v,
        _ => return Ok(None),
    };

    let value: f64 = text.parse().map_err(|_| ImportError::TypeConversionError {
        row,
        field: field.to_string(),
        message: format!("无法解析为数值: {}", text),
    })?;

    if !value.is_finite() || value < 0.0 {
        return Err(ImportError::ValueRangeError {
            row,
            field: field.to_string(),
            message: format!("数值必须为非负数: {}", text),
        });
    }
    Ok(Some(value))
}

fn required_number(row: usize, record: &RawRecord, field: &str) -> ImportResult<f64> {
    optional_number(row, record, field)?.ok_or_else(|| ImportError::FieldMappingError {
        row,
        message: format!("缺少必填字段 {}", field),
    })
}
