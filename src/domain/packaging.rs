// ==========================================
// 补充剂成本核算系统 - 包装成本领域模型
// ==========================================
// 依据: 成本核算流水线 - 4.4 PackagingCoster
// ==========================================

use crate::domain::manufacturing::OperationBreakdown;
use crate::domain::types::{PackagingLine, PackagingUom, ProductForm};
use serde::{Deserialize, Serialize};

// ==========================================
// PackagingComponentLine - 包材组件行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingComponentLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub component_name: String,
    pub uom: PackagingUom,
    pub quantity: f64, // 每成品用量
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_override: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_yield_percent_override: Option<f64>,
    #[serde(rename = "costPerPurchasingUoM")]
    pub cost_per_purchasing_uom: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_override: Option<f64>,
    #[serde(default)]
    pub moq_eaches: f64,
    #[serde(default)]
    pub customer_supplied: bool, // 客供: 不计材料与 MOQ 成本
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingRequest {
    pub packaging_components: Vec<PackagingComponentLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging_yield_percent_global: Option<f64>,
    pub units_per_finished_good: f64,
    pub finished_good_quantity: f64,
}

// ==========================================
// PackagingBreakdownRow - 包材成本行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingBreakdownRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub component_name: String,
    pub uom: PackagingUom,
    pub quantity_base: f64,
    pub quantity_used: f64,
    pub line_yield_percent_used: f64,
    pub required_units_with_yield: f64,
    pub cost_per_each_applied: f64,
    pub moq_eaches: f64,
    pub moq_shortfall_eaches: f64,
    pub moq_add_cost: f64,
    #[serde(rename = "lineCostBeforeMOQ")]
    pub line_cost_before_moq: f64,
    pub line_cost_total: f64,
    pub customer_supplied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingMaterialsSummary {
    pub packaging_yield_percent_global: f64,
    pub total_packaging_materials_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingMaterials {
    pub summary: PackagingMaterialsSummary,
    pub breakdown: Vec<PackagingBreakdownRow>,
}

// ==========================================
// PackagingOverhead - 包装线工时成本
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingOverheadBasis {
    pub inner_fill: f64,
    pub process_description: PackagingLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingOverhead {
    #[serde(flatten)]
    pub operation: OperationBreakdown,
    pub basis: PackagingOverheadBasis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingResult {
    pub materials: PackagingMaterials,
    /// 无匹配档位或产速为 0 时为 null（仅按材料计价）
    pub overhead: Option<PackagingOverhead>,
}

// ==========================================
// PackagingCatalogItem - 包材目录条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingCatalogItem {
    pub item_id: String,
    pub component_name: String,
    pub component_type: String, // bottle / cap / seal / label / desiccant / cotton
    pub uom: PackagingUom,
    #[serde(rename = "costPerPurchasingUoM")]
    pub cost_per_purchasing_uom: f64,
    pub moq_eaches: f64,
    pub product_forms: Vec<ProductForm>,
}

impl PackagingCatalogItem {
    /// 是否适用于指定剂型
    pub fn applies_to(&self, form: ProductForm) -> bool {
        self.product_forms.contains(&form)
    }

    /// 转换为包装成本阶段的组件行
    pub fn to_component_line(&self, quantity: f64) -> PackagingComponentLine {
        PackagingComponentLine {
            id: Some(self.item_id.clone()),
            component_name: self.component_name.clone(),
            uom: self.uom,
            quantity,
            quantity_override: None,
            line_yield_percent_override: None,
            cost_per_purchasing_uom: self.cost_per_purchasing_uom,
            cost_override: None,
            moq_eaches: self.moq_eaches,
            customer_supplied: false,
        }
    }
}
