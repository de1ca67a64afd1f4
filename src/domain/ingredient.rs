// ==========================================
// 补充剂成本核算系统 - 配料领域模型
// ==========================================
// 依据: 成本核算流水线 - 3. 数据模型 / 4.1 AssayAdjuster
// ==========================================
// 职责: 标签配料 → 效价结果 → 效价调整后配料
// 红线: 不含计算逻辑
// ==========================================

use crate::domain::raw_material::RawMaterialsRequest;
use crate::domain::types::{PotencyConfidence, ProductForm};
use serde::{Deserialize, Serialize};

fn default_claimed_unit() -> String {
    "mg".to_string()
}

fn default_serving_size() -> f64 {
    1.0
}

/// 兜底效价的依据描述
pub const FALLBACK_POTENCY_BASIS: &str = "assumed pure - no potency result";

// ==========================================
// ConstituentForm - 配料声明的组成形态
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormAmount {
    pub amount: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstituentForm {
    pub name: String,
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default, rename = "form_amounts", alias = "formAmounts")]
    pub form_amounts: Option<Vec<FormAmount>>,
}

// ==========================================
// MatchedIngredient - 已匹配到目录原料的标签配料
// ==========================================
// 约束: 声明量与份量单位已在上游归一化为 mg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedIngredient {
    pub label_name: String,
    pub claimed_amount_per_serving: f64, // 每份声明量
    #[serde(default = "default_claimed_unit")]
    pub claimed_unit: String,
    #[serde(default = "default_serving_size")]
    pub serving_size: f64, // 每份包含的单位数（粒/片）
    pub matched_item_id: String,
    pub matched_trade_name: String,
    #[serde(default)]
    pub matched_category: Option<String>,
    pub matched_cost_per_kg: f64,
    #[serde(default)]
    pub constituent_forms: Option<Vec<ConstituentForm>>,
    #[serde(default)]
    pub ingredient_overage_percent: f64,
}

// ==========================================
// PotencyQuery - 效价解析请求
// ==========================================
// 用途: PotencyResolver 的输入（按目录原料ID键控）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotencyQuery {
    pub label_name: String,
    pub matched_item_id: String,
    pub matched_trade_name: String,
    pub matched_category: String,
    pub constituent_forms: Option<Vec<ConstituentForm>>,
}

impl From<&MatchedIngredient> for PotencyQuery {
    fn from(ing: &MatchedIngredient) -> Self {
        Self {
            label_name: ing.label_name.clone(),
            matched_item_id: ing.matched_item_id.clone(),
            matched_trade_name: ing.matched_trade_name.clone(),
            matched_category: ing
                .matched_category
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            constituent_forms: ing.constituent_forms.clone(),
        }
    }
}

// ==========================================
// PotencyResult - 单个配料的效价结果
// ==========================================
// 生命周期: 每次 AssayAdjuster 运行产生一次, 立即消费, 不持久化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotencyResult {
    pub label_name: String,
    pub matched_item_id: String,
    pub potency_percent: f64, // (0, 100]
    pub potency_basis: String,
    pub confidence: PotencyConfidence,
    pub notes: String,
}

impl PotencyResult {
    /// 效价值是否合法 (0, 100]
    pub fn is_valid(&self) -> bool {
        self.potency_percent.is_finite()
            && self.potency_percent > 0.0
            && self.potency_percent <= 100.0
    }

    /// 是否为兜底结果
    pub fn is_fallback(&self) -> bool {
        self.potency_basis == FALLBACK_POTENCY_BASIS
    }

    /// 解析缺失时的低置信度占位结果
    pub fn fallback(query: &PotencyQuery, notes: impl Into<String>) -> Self {
        Self {
            label_name: query.label_name.clone(),
            matched_item_id: query.matched_item_id.clone(),
            potency_percent: 100.0,
            potency_basis: FALLBACK_POTENCY_BASIS.to_string(),
            confidence: PotencyConfidence::Low,
            notes: notes.into(),
        }
    }
}

// ==========================================
// AdjustedIngredient - 效价调整后的配料行
// ==========================================
// 不变量: adjusted = (claimed / servingSize) / (potency / 100), 各步保留 4 位小数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedIngredient {
    pub label_name: String,
    pub matched_item_id: String,
    pub matched_trade_name: String,
    pub matched_category: String,
    pub claimed_amount_per_serving: f64,
    pub claimed_amount_per_unit: f64,
    pub potency_percent: f64,
    pub potency_basis: String,
    pub potency_confidence: PotencyConfidence,
    /// 效价来自兜底（未解析 / 超时 / 越界）
    pub potency_fallback: bool,
    pub adjusted_weight_per_unit_mg: f64,
    pub density_g_per_ml: f64,
    pub cost_per_kg: f64,
    pub ingredient_overage_percent: f64,
    pub notes: String,
}

// ==========================================
// AssayAdjustment I/O
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssayAdjustmentRequest {
    pub ingredients: Vec<MatchedIngredient>,
    pub units_per_finished_good: f64,
    pub finished_good_quantity: f64,
    #[serde(default)]
    pub product_form: Option<ProductForm>,
    #[serde(default)]
    pub freight_percent: Option<f64>,
    #[serde(default)]
    pub yield_loss_percent: Option<f64>,
    #[serde(default)]
    pub product_overage_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssayAdjustmentResult {
    pub adjusted_ingredients: Vec<AdjustedIngredient>,
    /// 低置信度配料数量（需人工复核）
    pub low_confidence_count: usize,
    /// 可直接提交给原料成本阶段的请求
    pub raw_materials_costing_input: RawMaterialsRequest,
}
