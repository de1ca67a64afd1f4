// ==========================================
// 补充剂成本核算系统 - 应用层
// ==========================================
// 职责: 组装数据库、配置、参考表与 API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
