// ==========================================
// 补充剂成本核算系统 - API 层
// ==========================================
// 职责: 提供可独立调用的核算接口, 供阶段运行器与上层服务调用
// ==========================================

pub mod costing_api;
pub mod error;
pub mod validator;

// 重导出核心类型
pub use costing_api::{CostingApi, CostingStage, PackagingCatalogQuery};
pub use error::{ApiError, ApiResult};
pub use validator::RequestValidator;
