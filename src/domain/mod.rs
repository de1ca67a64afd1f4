// ==========================================
// 补充剂成本核算系统 - 领域模型层
// ==========================================
// 职责: 定义各核算阶段的请求/结果实体与枚举类型
// 红线: 不含数据访问逻辑, 不含引擎逻辑
// ==========================================

pub mod costing;
pub mod ingredient;
pub mod manufacturing;
pub mod matching;
pub mod packaging;
pub mod raw_material;
pub mod reference;
pub mod types;

// 重导出核心类型
pub use costing::{CostingTotals, TotalCostingRequest, TotalCostingResult};
pub use ingredient::{
    AdjustedIngredient, AssayAdjustmentRequest, AssayAdjustmentResult, ConstituentForm,
    FormAmount, MatchedIngredient, PotencyQuery, PotencyResult,
};
pub use manufacturing::{
    BlenderOption, BlenderSelection, ManufacturingRequest, ManufacturingResult,
    ManufacturingTotals, OperationBreakdown,
};
pub use matching::{CandidateCost, IngredientCandidate, IngredientMatcher, LabelClaim};
pub use packaging::{
    PackagingBreakdownRow, PackagingCatalogItem, PackagingComponentLine, PackagingMaterials,
    PackagingMaterialsSummary, PackagingOverhead, PackagingOverheadBasis, PackagingRequest,
    PackagingResult,
};
pub use raw_material::{
    DensityPoint, DensityProfile, MaterialBreakdownRow, ProductDensity, RawMaterialLine,
    RawMaterialsRequest, RawMaterialsResult, RawMaterialsSummary,
};
pub use reference::{ReferenceTable, ReferenceTier, SOLID_DOSE};
pub use types::{
    OperationKind, PackagingLine, PackagingUom, PotencyConfidence, ProcessCategory,
    ProductForm, RunRangeBasis,
};
