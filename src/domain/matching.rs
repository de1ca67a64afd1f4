// ==========================================
// 补充剂成本核算系统 - 配料匹配协作方契约
// ==========================================
// 依据: 成本核算流水线 - 6. 外部接口（Ingredient matcher）
// ==========================================
// 职责: 定义匹配候选与成本单位判定
// 红线: 非公斤计价的候选必须交给人工处理, 不得自动换算
// ==========================================

use crate::domain::ingredient::MatchedIngredient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;

// ==========================================
// IngredientCandidate - 目录匹配候选
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientCandidate {
    pub item_id: String,
    pub trade_name: String,
    pub similarity_score: f64, // [0, 1]
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub cost_unit: Option<String>,
}

/// 候选成本判定结果
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateCost {
    /// 公斤计价
    PerKg(f64),
    /// 非公斤计价或缺失, 需人工确认
    NeedsManualResolution { cost_unit: Option<String> },
}

/// 标签上的单个配料声明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelClaim {
    pub label_name: String,
    pub claimed_amount_per_serving: f64,
    pub serving_size: f64,
    #[serde(default)]
    pub ingredient_overage_percent: f64,
}

fn is_kilogram_unit(unit: &str) -> bool {
    let normalized: String = unit
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$')
        .collect();
    matches!(
        normalized.as_str(),
        "kg" | "/kg" | "perkg" | "kilogram" | "perkilogram" | "usd/kg"
    )
}

impl IngredientCandidate {
    /// 判定候选成本单位
    pub fn cost_per_kg(&self) -> CandidateCost {
        match (self.cost, self.cost_unit.as_deref()) {
            (Some(cost), Some(unit)) if is_kilogram_unit(unit) && cost >= 0.0 => {
                CandidateCost::PerKg(cost)
            }
            (_, unit) => CandidateCost::NeedsManualResolution {
                cost_unit: unit.map(|u| u.to_string()),
            },
        }
    }

    /// 组装为已匹配配料（仅限公斤计价候选）
    ///
    /// # 返回
    /// - Some(MatchedIngredient): 成本单位为公斤
    /// - None: 需人工确认成本单位（调用方通过 cost_per_kg() 获取原因）
    pub fn into_matched(&self, claim: &LabelClaim) -> Option<MatchedIngredient> {
        let cost = match self.cost_per_kg() {
            CandidateCost::PerKg(v) => v,
            CandidateCost::NeedsManualResolution { .. } => return None,
        };

        Some(MatchedIngredient {
            label_name: claim.label_name.clone(),
            claimed_amount_per_serving: claim.claimed_amount_per_serving,
            claimed_unit: "mg".to_string(),
            serving_size: claim.serving_size,
            matched_item_id: self.item_id.clone(),
            matched_trade_name: self.trade_name.clone(),
            matched_category: self.category.clone(),
            matched_cost_per_kg: cost,
            constituent_forms: None,
            ingredient_overage_percent: claim.ingredient_overage_percent,
        })
    }
}

// ==========================================
// Trait: IngredientMatcher
// ==========================================
// 实现者: 外部相似度检索服务（本系统不实现）
#[async_trait]
pub trait IngredientMatcher: Send + Sync {
    /// 按配料名称返回排序后的候选列表（相似度降序）
    async fn find_candidates(
        &self,
        ingredient_name: &str,
    ) -> Result<Vec<IngredientCandidate>, Box<dyn Error + Send + Sync>>;
}
