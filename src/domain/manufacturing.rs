// ==========================================
// 补充剂成本核算系统 - 制造成本领域模型
// ==========================================
// 依据: 成本核算流水线 - 4.3 ManufacturingCoster
// ==========================================

use crate::domain::types::{OperationKind, ProductForm};
use serde::{Deserialize, Serialize};

// ==========================================
// ManufacturingRequest - 制造成本请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturingRequest {
    pub num_raw_materials: u32, // 原料行数（决定称量/混合档位）
    pub total_mass_kg: f64,
    pub bulk_density_kg_per_l: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_form: Option<ProductForm>,
}

// ==========================================
// BlenderOption / BlenderSelection - 混合机方案
// ==========================================
// 生命周期: 每次运行重新计算, 不缓存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlenderOption {
    pub blender_size_cu_ft: f64,
    pub working_capacity_cu_ft: f64,
    pub batches: u32,
    pub fill_fraction: f64, // 实际装载率
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlenderSelection {
    pub blender_size_cu_ft: f64,
    pub batches: u32,
    pub required_volume_cu_ft: f64,
    pub working_capacity_cu_ft: f64,
    pub working_fill_fraction: f64, // 工作装载系数 (0.8 / 1.0)
}

// ==========================================
// OperationBreakdown - 单工序成本
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationBreakdown {
    pub operation: OperationKind,
    pub headcount: f64,
    pub setup_hours: f64,
    pub run_hours: f64,
    pub machine_hours: f64,
    pub labor_hours: f64,
    pub overhead_cost: f64,
    pub labor_cost: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturingTotals {
    pub machine_hours: f64,
    pub labor_hours: f64,
    pub overhead_cost: f64,
    pub labor_cost: f64,
    pub grand_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturingResult {
    pub blender: BlenderSelection,
    pub blender_options: Vec<BlenderOption>,
    pub operations: Vec<OperationBreakdown>,
    pub totals: ManufacturingTotals,
}
