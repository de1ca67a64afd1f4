// ==========================================
// 补充剂成本核算系统 - 导入层
// ==========================================
// 职责: 外部工时参考表导入, 替换 reference_tier
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod file_parser;
pub mod reference_importer;

pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
pub use reference_importer::{parse_tiers, ReferenceImportSummary, ReferenceImporter};
