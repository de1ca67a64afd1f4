// ==========================================
// 补充剂成本核算系统 - 引擎层
// ==========================================
// 职责: 五个核算阶段的纯计算实现, 不拼 SQL
// 阶段: 效价调整 → 原料 → 制造 → 包装 → 总成本汇总
// ==========================================

pub mod assay;
pub mod blender;
pub mod density;
pub mod error;
pub mod manufacturing;
pub mod orchestrator;
pub mod packaging;
pub mod potency;
pub mod raw_materials;
pub mod rounding;
pub mod validation;

// 重导出核心引擎
pub use assay::AssayAdjuster;
pub use blender::BlenderSelector;
pub use error::{CostingError, CostingResult};
pub use manufacturing::ManufacturingCoster;
pub use orchestrator::{stage_names, CostingOrchestrator};
pub use packaging::PackagingCoster;
pub use potency::{PotencyResolver, RuleBasedPotencyResolver};
pub use raw_materials::RawMaterialsCoster;
pub use validation::{FieldChecks, FieldViolation};
