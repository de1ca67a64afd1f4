// ==========================================
// 补充剂成本核算系统 - 效价调整阶段 (AssayAdjuster)
// ==========================================
// 职责: 标签声明量 → 每单位实际投料量
// 输入: 已匹配配料 + 效价解析器
// 输出: 调整后配料 + 原料成本阶段请求
// ==========================================
// 红线:
// - 效价解析失败 / 超时 / 越界只影响该配料, 按 100% 低置信度兜底
// - 整个阶段不因单个配料失败而失败
// ==========================================

use crate::config::CostingConfig;
use crate::domain::ingredient::{
    AdjustedIngredient, AssayAdjustmentRequest, AssayAdjustmentResult, MatchedIngredient,
    PotencyQuery, PotencyResult,
};
use crate::domain::raw_material::{RawMaterialLine, RawMaterialsRequest};
use crate::domain::types::PotencyConfidence;
use crate::engine::density::density_for_category;
use crate::engine::error::CostingResult;
use crate::engine::potency::PotencyResolver;
use crate::engine::rounding::{round2, round_dp};
use crate::engine::validation::check_assay_request;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 解析后的效价（附兜底标记）
#[derive(Debug, Clone)]
struct ResolvedPotency {
    result: PotencyResult,
    fallback: bool,
}

// ==========================================
// AssayAdjuster - 效价调整
// ==========================================
pub struct AssayAdjuster {
    resolver: Arc<dyn PotencyResolver>,
    config: Arc<CostingConfig>,
}

impl AssayAdjuster {
    pub fn new(resolver: Arc<dyn PotencyResolver>, config: Arc<CostingConfig>) -> Self {
        Self { resolver, config }
    }

    /// 执行效价调整
    ///
    /// # 返回
    /// - Ok: 调整结果（含低置信度计数）
    /// - Err(InvalidInput): 请求字段不合法
    #[instrument(skip_all, fields(ingredients = request.ingredients.len()))]
    pub async fn adjust(
        &self,
        request: &AssayAdjustmentRequest,
    ) -> CostingResult<AssayAdjustmentResult> {
        check_assay_request(request).into_result()?;

        info!(
            units_per_finished_good = request.units_per_finished_good,
            finished_good_quantity = request.finished_good_quantity,
            "效价调整开始"
        );

        let potencies = self.resolve_all(&request.ingredients).await;

        let adjusted_ingredients: Vec<AdjustedIngredient> = request
            .ingredients
            .iter()
            .map(|ing| {
                let resolved = potencies.get(&ing.matched_item_id);
                adjust_ingredient(ing, resolved)
            })
            .collect();

        let low_confidence_count = adjusted_ingredients
            .iter()
            .filter(|a| a.potency_confidence == PotencyConfidence::Low)
            .count();

        let raw_materials_costing_input = RawMaterialsRequest {
            raw_materials: adjusted_ingredients
                .iter()
                .map(|a| RawMaterialLine {
                    id: Some(a.matched_item_id.clone()),
                    material_name: a.matched_trade_name.clone(),
                    cost_per_purchasing_unit: a.cost_per_kg,
                    quantity_per_unit_mg: a.adjusted_weight_per_unit_mg,
                    ingredient_overage_percent: a.ingredient_overage_percent,
                    density_g_per_ml: a.density_g_per_ml,
                })
                .collect(),
            units_per_finished_good: request.units_per_finished_good,
            finished_good_quantity: request.finished_good_quantity,
            freight_percent: Some(
                request
                    .freight_percent
                    .unwrap_or(self.config.default_freight_percent),
            ),
            yield_loss_percent: Some(
                request
                    .yield_loss_percent
                    .unwrap_or(self.config.default_yield_loss_percent),
            ),
            product_overage_percent: Some(
                request
                    .product_overage_percent
                    .unwrap_or(self.config.default_product_overage_percent),
            ),
        };

        info!(
            adjusted = adjusted_ingredients.len(),
            low_confidence_count, "效价调整完成"
        );

        Ok(AssayAdjustmentResult {
            adjusted_ingredients,
            low_confidence_count,
            raw_materials_costing_input,
        })
    }

    /// 并发解析所有不同原料的效价（按目录原料ID去重）
    async fn resolve_all(
        &self,
        ingredients: &[MatchedIngredient],
    ) -> HashMap<String, ResolvedPotency> {
        let mut queries: Vec<PotencyQuery> = Vec::new();
        for ing in ingredients {
            if !queries.iter().any(|q| q.matched_item_id == ing.matched_item_id) {
                queries.push(PotencyQuery::from(ing));
            }
        }

        let timeout = self.config.potency_timeout();
        let outcomes = join_all(queries.iter().map(|query| async move {
            let outcome = tokio::time::timeout(timeout, self.resolver.resolve(query)).await;
            let resolved = match outcome {
                Ok(Ok(Some(result))) if result.is_valid() => {
                    let fallback = result.is_fallback();
                    ResolvedPotency { result, fallback }
                }
                Ok(Ok(Some(result))) => fallback(
                    query,
                    format!("potency out of range: {}", result.potency_percent),
                ),
                Ok(Ok(None)) => fallback(query, "resolver returned no result".to_string()),
                Ok(Err(e)) => fallback(query, format!("resolver error: {}", e)),
                Err(_) => fallback(
                    query,
                    format!("resolver timed out after {} ms", timeout.as_millis()),
                ),
            };

            if resolved.fallback {
                warn!(
                    matched_item_id = %query.matched_item_id,
                    trade_name = %query.matched_trade_name,
                    notes = %resolved.result.notes,
                    "效价按 100% 兜底"
                );
            }
            (query.matched_item_id.clone(), resolved)
        }))
        .await;

        outcomes.into_iter().collect()
    }
}

fn fallback(query: &PotencyQuery, notes: String) -> ResolvedPotency {
    ResolvedPotency {
        result: PotencyResult::fallback(query, notes),
        fallback: true,
    }
}

/// 单个配料的效价调整
fn adjust_ingredient(ing: &MatchedIngredient, resolved: Option<&ResolvedPotency>) -> AdjustedIngredient {
    let category = ing
        .matched_category
        .clone()
        .unwrap_or_else(|| "unknown".to_string());

    let (result, is_fallback) = match resolved {
        Some(r) => (r.result.clone(), r.fallback),
        None => (
            PotencyResult::fallback(&PotencyQuery::from(ing), "resolver returned no result"),
            true,
        ),
    };

    // 份量为 0 时按 1 处理
    let serving = if ing.serving_size == 0.0 { 1.0 } else { ing.serving_size };
    let per_unit = round_dp(ing.claimed_amount_per_serving / serving, 4);
    let adjusted = round_dp(per_unit / (result.potency_percent / 100.0), 4);

    AdjustedIngredient {
        label_name: ing.label_name.clone(),
        matched_item_id: ing.matched_item_id.clone(),
        matched_trade_name: ing.matched_trade_name.clone(),
        density_g_per_ml: round_dp(density_for_category(Some(category.as_str())), 1),
        matched_category: category,
        claimed_amount_per_serving: ing.claimed_amount_per_serving,
        claimed_amount_per_unit: per_unit,
        potency_percent: round2(result.potency_percent),
        potency_basis: result.potency_basis,
        potency_confidence: result.confidence,
        potency_fallback: is_fallback,
        adjusted_weight_per_unit_mg: adjusted,
        cost_per_kg: ing.matched_cost_per_kg,
        ingredient_overage_percent: ing.ingredient_overage_percent,
        notes: result.notes,
    }
}
