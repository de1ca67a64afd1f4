// ==========================================
// 配料匹配 → 效价调整 集成测试
// ==========================================
// 测试目标: 匹配候选按公斤计价组装为已匹配配料, 非公斤计价候选留待人工确认
// ==========================================

mod test_helpers;

use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use supplement_costing::domain::{
    AssayAdjustmentRequest, CandidateCost, IngredientCandidate, IngredientMatcher, LabelClaim,
    MatchedIngredient,
};
use supplement_costing::logging;
use supplement_costing::PotencyConfidence;
use test_helpers::{assert_close, create_test_state};

// ==========================================
// 测试用匹配器（固定目录）
// ==========================================

struct CatalogMatcher {
    catalog: HashMap<String, Vec<IngredientCandidate>>,
}

#[async_trait]
impl IngredientMatcher for CatalogMatcher {
    async fn find_candidates(
        &self,
        ingredient_name: &str,
    ) -> Result<Vec<IngredientCandidate>, Box<dyn Error + Send + Sync>> {
        self.catalog
            .get(ingredient_name)
            .cloned()
            .ok_or_else(|| format!("no catalog entry for {}", ingredient_name).into())
    }
}

fn candidate(item_id: &str, trade_name: &str, category: &str, cost: f64, unit: &str) -> IngredientCandidate {
    IngredientCandidate {
        item_id: item_id.to_string(),
        trade_name: trade_name.to_string(),
        similarity_score: 0.9,
        category: Some(category.to_string()),
        cost: Some(cost),
        cost_unit: Some(unit.to_string()),
    }
}

fn matcher() -> CatalogMatcher {
    let mut catalog = HashMap::new();
    catalog.insert(
        "Vitamin C".to_string(),
        vec![candidate("RM-ASC-001", "Ascorbic Acid USP", "vitamin", 12.0, "kg")],
    );
    catalog.insert(
        "Magnesium".to_string(),
        vec![
            candidate("RM-MGO-001", "Magnesium Oxide Heavy", "mineral", 6.2, "$/kg"),
            candidate("RM-MGC-002", "Magnesium Citrate", "mineral", 9.0, "kg"),
        ],
    );
    catalog.insert(
        "Biotin".to_string(),
        vec![candidate("RM-BIO-001", "Biotin 1% SD", "vitamin", 4.1, "lb")],
    );
    CatalogMatcher { catalog }
}

fn claim(label_name: &str, per_serving: f64) -> LabelClaim {
    LabelClaim {
        label_name: label_name.to_string(),
        claimed_amount_per_serving: per_serving,
        serving_size: 2.0,
        ingredient_overage_percent: 0.0,
    }
}

/// 取首个候选; 非公斤计价时返回其成本单位
async fn match_claims(
    matcher: &dyn IngredientMatcher,
    claims: &[LabelClaim],
) -> (Vec<MatchedIngredient>, Vec<(String, Option<String>)>) {
    let mut matched = Vec::new();
    let mut manual = Vec::new();

    for claim in claims {
        let candidates = matcher
            .find_candidates(&claim.label_name)
            .await
            .expect("catalog entry");
        let top = &candidates[0];
        match top.into_matched(claim) {
            Some(ing) => matched.push(ing),
            None => {
                let unit = match top.cost_per_kg() {
                    CandidateCost::NeedsManualResolution { cost_unit } => cost_unit,
                    CandidateCost::PerKg(_) => None,
                };
                manual.push((claim.label_name.clone(), unit));
            }
        }
    }
    (matched, manual)
}

#[tokio::test]
async fn test_matched_candidates_feed_assay_stage() {
    logging::init_test();
    let (_temp_file, state) = create_test_state().expect("Failed to create test state");

    let claims = vec![
        claim("Vitamin C", 500.0),
        claim("Magnesium", 100.0),
        claim("Biotin", 0.3),
    ];
    let (ingredients, manual) = match_claims(&matcher(), &claims).await;

    // 按磅计价的候选不自动换算
    assert_eq!(manual, vec![("Biotin".to_string(), Some("lb".to_string()))]);
    assert_eq!(ingredients.len(), 2);

    let request = AssayAdjustmentRequest {
        ingredients,
        units_per_finished_good: 60.0,
        finished_good_quantity: 5000.0,
        product_form: None,
        freight_percent: None,
        yield_loss_percent: None,
        product_overage_percent: None,
    };
    let result = state
        .costing_api
        .adjust_assay(&request)
        .await
        .expect("assay stage");

    let vitamin_c = &result.adjusted_ingredients[0];
    assert_eq!(vitamin_c.matched_item_id, "RM-ASC-001");
    assert_eq!(vitamin_c.adjusted_weight_per_unit_mg, 250.0);
    assert_eq!(vitamin_c.cost_per_kg, 12.0);

    let magnesium = &result.adjusted_ingredients[1];
    assert_eq!(magnesium.potency_confidence, PotencyConfidence::High);
    assert_close(magnesium.adjusted_weight_per_unit_mg, 82.9187, 1e-9);
    assert_eq!(result.low_confidence_count, 0);

    let input = &result.raw_materials_costing_input;
    assert_eq!(input.raw_materials[1].cost_per_purchasing_unit, 6.2);
}

#[tokio::test]
async fn test_unknown_ingredient_reports_matcher_error() {
    logging::init_test();

    let err = matcher().find_candidates("Vitamin K2").await.unwrap_err();
    assert!(err.to_string().contains("Vitamin K2"));
}
