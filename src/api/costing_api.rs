// ==========================================
// 补充剂成本核算系统 - 成本核算 API
// ==========================================
// 职责: 各核算阶段的独立调用入口 + 按阶段名的 JSON 调用
// 约定: 请求先经 RequestValidator 汇总全部违规, 再交给引擎计算
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::RequestValidator;
use crate::config::CostingConfig;
use crate::domain::costing::{TotalCostingRequest, TotalCostingResult};
use crate::domain::ingredient::{AssayAdjustmentRequest, AssayAdjustmentResult};
use crate::domain::manufacturing::{ManufacturingRequest, ManufacturingResult};
use crate::domain::packaging::{PackagingCatalogItem, PackagingRequest, PackagingResult};
use crate::domain::raw_material::{RawMaterialsRequest, RawMaterialsResult};
use crate::domain::reference::ReferenceTable;
use crate::domain::types::ProductForm;
use crate::engine::{
    AssayAdjuster, CostingOrchestrator, ManufacturingCoster, PackagingCoster, PotencyResolver,
    RawMaterialsCoster,
};
use crate::repository::PackagingCatalogRepository;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

// ==========================================
// CostingStage - 可调用阶段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostingStage {
    Assay,
    RawMaterials,
    Manufacturing,
    Packaging,
    Total,
    PackagingCatalog,
}

impl CostingStage {
    pub const ALL: [CostingStage; 6] = [
        CostingStage::Assay,
        CostingStage::RawMaterials,
        CostingStage::Manufacturing,
        CostingStage::Packaging,
        CostingStage::Total,
        CostingStage::PackagingCatalog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CostingStage::Assay => "assay",
            CostingStage::RawMaterials => "raw-materials",
            CostingStage::Manufacturing => "manufacturing",
            CostingStage::Packaging => "packaging",
            CostingStage::Total => "total",
            CostingStage::PackagingCatalog => "packaging-catalog",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|stage| stage.as_str() == s)
    }
}

impl fmt::Display for CostingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 包材目录查询请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingCatalogQuery {
    pub product_form: ProductForm,
}

// ==========================================
// CostingApi - 成本核算 API
// ==========================================
pub struct CostingApi {
    assay: AssayAdjuster,
    raw_materials: RawMaterialsCoster,
    manufacturing: ManufacturingCoster,
    packaging: PackagingCoster,
    orchestrator: CostingOrchestrator,
    catalog_repo: Arc<PackagingCatalogRepository>,
}

impl CostingApi {
    /// 创建新的 CostingApi 实例
    pub fn new(
        resolver: Arc<dyn PotencyResolver>,
        reference: Arc<ReferenceTable>,
        config: Arc<CostingConfig>,
        catalog_repo: Arc<PackagingCatalogRepository>,
    ) -> Self {
        Self {
            assay: AssayAdjuster::new(resolver, config.clone()),
            raw_materials: RawMaterialsCoster::new(config.clone()),
            manufacturing: ManufacturingCoster::new(reference.clone(), config.clone()),
            packaging: PackagingCoster::new(reference.clone(), config.clone()),
            orchestrator: CostingOrchestrator::new(reference, config),
            catalog_repo,
        }
    }

    /// 效价调整
    pub async fn adjust_assay(
        &self,
        request: &AssayAdjustmentRequest,
    ) -> ApiResult<AssayAdjustmentResult> {
        RequestValidator::validate_assay(request)?;
        Ok(self.assay.adjust(request).await?)
    }

    /// 原料成本
    pub fn cost_raw_materials(&self, request: &RawMaterialsRequest) -> ApiResult<RawMaterialsResult> {
        RequestValidator::validate_raw_materials(request)?;
        Ok(self.raw_materials.cost(request)?)
    }

    /// 制造成本
    pub fn cost_manufacturing(
        &self,
        request: &ManufacturingRequest,
    ) -> ApiResult<ManufacturingResult> {
        RequestValidator::validate_manufacturing(request)?;
        Ok(self.manufacturing.cost(request)?)
    }

    /// 包装成本
    pub fn cost_packaging(&self, request: &PackagingRequest) -> ApiResult<PackagingResult> {
        RequestValidator::validate_packaging(request)?;
        Ok(self.packaging.cost(request)?)
    }

    /// 总成本
    pub fn cost_total(&self, request: &TotalCostingRequest) -> ApiResult<TotalCostingResult> {
        RequestValidator::validate_total(request)?;
        Ok(self.orchestrator.run(request)?)
    }

    /// 按剂型列出可用包材
    pub fn list_packaging_materials(
        &self,
        product_form: ProductForm,
    ) -> ApiResult<Vec<PackagingCatalogItem>> {
        Ok(self.catalog_repo.list_by_product_form(product_form)?)
    }

    /// 按阶段名调用（JSON 请求 → JSON 响应）
    ///
    /// # 参数
    /// - stage: 阶段名（assay / raw-materials / manufacturing / packaging / total / packaging-catalog）
    /// - request_json: 请求体
    #[instrument(skip(self, request_json), fields(request_bytes = request_json.len()))]
    pub async fn invoke_json(&self, stage: &str, request_json: &str) -> ApiResult<String> {
        let stage =
            CostingStage::parse(stage).ok_or_else(|| ApiError::UnknownStage(stage.to_string()))?;
        debug!(stage = %stage, "按阶段名调用");

        match stage {
            CostingStage::Assay => {
                let request: AssayAdjustmentRequest = parse_request(request_json)?;
                to_json(&self.adjust_assay(&request).await?)
            }
            CostingStage::RawMaterials => {
                to_json(&self.cost_raw_materials(&parse_request(request_json)?)?)
            }
            CostingStage::Manufacturing => {
                to_json(&self.cost_manufacturing(&parse_request(request_json)?)?)
            }
            CostingStage::Packaging => to_json(&self.cost_packaging(&parse_request(request_json)?)?),
            CostingStage::Total => to_json(&self.cost_total(&parse_request(request_json)?)?),
            CostingStage::PackagingCatalog => {
                let query: PackagingCatalogQuery = parse_request(request_json)?;
                to_json(&self.list_packaging_materials(query.product_form)?)
            }
        }
    }
}

fn parse_request<T: DeserializeOwned>(request_json: &str) -> ApiResult<T> {
    Ok(serde_json::from_str(request_json)?)
}

fn to_json<T: Serialize>(value: &T) -> ApiResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::InternalError(format!("响应序列化失败: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names_round_trip() {
        for stage in CostingStage::ALL {
            assert_eq!(CostingStage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(CostingStage::parse("raw-materials-costing"), None);
    }
}
