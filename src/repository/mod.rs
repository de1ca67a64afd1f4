// ==========================================
// 补充剂成本核算系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 参考表与包材目录的数据访问
// 约束: 所有查询使用参数化
// ==========================================

pub mod error;
pub mod packaging_catalog_repo;
pub mod reference_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use packaging_catalog_repo::PackagingCatalogRepository;
pub use reference_repo::ReferenceTierRepository;
