// ==========================================
// 补充剂成本核算系统 - 总成本汇总领域模型
// ==========================================
// 依据: 成本核算流水线 - 4.5 TotalRollUp
// ==========================================

use crate::domain::manufacturing::ManufacturingResult;
use crate::domain::packaging::{PackagingRequest, PackagingResult};
use crate::domain::raw_material::{RawMaterialsRequest, RawMaterialsResult};
use crate::domain::types::ProductForm;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCostingRequest {
    pub raw_materials: RawMaterialsRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_form: Option<ProductForm>,
    pub packaging: PackagingRequest,
}

// ==========================================
// CostingTotals - 总成本
// ==========================================
// 不变量: grandTotal = 四项成本之和（无隐藏调整项）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostingTotals {
    pub raw_materials_cost: f64,
    pub packaging_materials_cost: f64,
    pub packaging_overhead_cost: f64,
    pub manufacturing_cost: f64,
    pub grand_total: f64,
    pub cost_per_finished_good: f64,
    pub cost_per_unit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCostingResult {
    pub raw_materials: RawMaterialsResult,
    pub manufacturing: ManufacturingResult,
    pub packaging: PackagingResult,
    pub totals: CostingTotals,
}
