// ==========================================
// 补充剂成本核算系统 - 核心库
// ==========================================
// 流水线: 效价调整 → 原料成本 → 制造成本 → 包装成本 → 总成本汇总
// 技术栈: Rust + SQLite
// 系统定位: 报价支持 (低置信度结果必须人工复核)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 请求/响应与实体
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 核算规则
pub mod engine;

// 导入层 - 工时参考表
pub mod importer;

// 配置层 - 核算参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 核算接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    OperationKind, PackagingLine, PackagingUom, PotencyConfidence, ProcessCategory, ProductForm,
    RunRangeBasis,
};

// 领域实体
pub use domain::{
    AssayAdjustmentRequest, AssayAdjustmentResult, ManufacturingRequest, ManufacturingResult,
    PackagingRequest, PackagingResult, RawMaterialsRequest, RawMaterialsResult, ReferenceTable,
    TotalCostingRequest, TotalCostingResult,
};

// 引擎
pub use engine::{
    AssayAdjuster, BlenderSelector, CostingError, CostingOrchestrator, ManufacturingCoster,
    PackagingCoster, PotencyResolver, RawMaterialsCoster, RuleBasedPotencyResolver,
};

// API
pub use api::{ApiError, CostingApi, CostingStage};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "补充剂成本核算系统";
