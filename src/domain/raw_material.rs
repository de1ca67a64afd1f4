// ==========================================
// 补充剂成本核算系统 - 原料成本领域模型
// ==========================================
// 依据: 成本核算流水线 - 4.2 RawMaterialsCoster
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// RawMaterialLine - 原料行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub material_name: String,
    pub cost_per_purchasing_unit: f64, // $/kg
    pub quantity_per_unit_mg: f64,
    #[serde(default)]
    pub ingredient_overage_percent: f64,
    pub density_g_per_ml: f64, // > 0
}

// ==========================================
// RawMaterialsRequest - 原料成本请求
// ==========================================
// 百分比字段缺省时由配置补齐
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialsRequest {
    pub raw_materials: Vec<RawMaterialLine>,
    pub units_per_finished_good: f64,
    pub finished_good_quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freight_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_loss_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_overage_percent: Option<f64>,
}

impl RawMaterialsRequest {
    /// 总单位数 = 每成品单位数 × 成品数量
    pub fn total_units(&self) -> f64 {
        self.units_per_finished_good * self.finished_good_quantity
    }

    /// 有效原料行数（quantityPerUnitMg > 0）
    pub fn active_line_count(&self) -> usize {
        self.raw_materials
            .iter()
            .filter(|m| m.quantity_per_unit_mg > 0.0)
            .count()
    }
}

// ==========================================
// MaterialBreakdownRow - 单原料全批次成本
// ==========================================
// 不变量: requiredMg = quantityPerUnitMg × totalUnits × (1 + overage/100)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialBreakdownRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub material_name: String,
    pub required_mg: f64,
    pub required_kg: f64,
    pub cost_per_purchasing_unit: f64,
    pub ingredient_overage_percent: f64,
    pub density_g_per_ml: f64,
    pub volume_per_unit_ml: f64,
    pub mass_per_unit_g: f64,
    pub total_cost_for_material: f64,
    pub cost_per_finished_good: f64,
    pub cost_per_unit: f64,
}

// ==========================================
// DensityProfile - 加权堆密度
// ==========================================
// 不变量: density = Σmass / Σvolume（总体积为 0 时密度为 0）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityPoint {
    pub density_g_per_ml: f64,
    pub mass_g: f64,
    pub volume_ml: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDensity {
    pub density_g_per_ml: f64,
    pub total_mass_g: f64,
    pub total_mass_kg: f64,
    pub total_volume_ml: f64,
    pub total_volume_l: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityProfile {
    pub per_unit: DensityPoint,
    pub per_finished_good: DensityPoint,
    pub product: ProductDensity,
}

// ==========================================
// RawMaterialsSummary - 成本汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialsSummary {
    pub total_units: f64,
    pub freight_percent: f64,
    pub yield_loss_percent: f64,
    pub product_overage_percent: f64,
    pub base_material_cost: f64,
    pub yield_loss_cost: f64,
    pub freight_cost: f64,
    pub product_overage_cost: f64,
    pub total_raw_material_cost: f64,
    pub cost_per_finished_good: f64,
    pub cost_per_unit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialsResult {
    pub summary: RawMaterialsSummary,
    pub material_breakdown: Vec<MaterialBreakdownRow>,
    pub density: DensityProfile,
}
