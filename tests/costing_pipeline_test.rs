// ==========================================
// 成本核算流水线 端到端测试
// ==========================================
// 测试目标: 效价调整 → 原料 → 制造 → 包装 → 总成本 全链路
// 约定: 前一阶段输出可直接作为下一阶段输入
// ==========================================

mod test_helpers;

use serde_json::{json, Value};
use supplement_costing::domain::{
    AssayAdjustmentRequest, PackagingRequest, RawMaterialsRequest, TotalCostingRequest,
};
use supplement_costing::{PotencyConfidence, ProductForm};
use test_helpers::{assert_close, assay_request_json, create_test_state, packaging_request_json};

#[tokio::test]
async fn test_assay_output_feeds_raw_materials() {
    let (_temp_file, state) = create_test_state().expect("Failed to create test state");
    let api = &state.costing_api;

    let request: AssayAdjustmentRequest =
        serde_json::from_value(assay_request_json()).expect("assay request");
    let assay = api.adjust_assay(&request).await.expect("assay stage");

    // 纯品 100%, 每粒 250mg
    let vitamin_c = &assay.adjusted_ingredients[0];
    assert_eq!(vitamin_c.claimed_amount_per_unit, 250.0);
    assert_eq!(vitamin_c.adjusted_weight_per_unit_mg, 250.0);
    assert_eq!(vitamin_c.potency_basis, "pure compound");

    // 氧化镁按元素镁 60.30% 折算
    let magnesium = &assay.adjusted_ingredients[1];
    assert_eq!(magnesium.potency_percent, 60.3);
    assert_close(magnesium.adjusted_weight_per_unit_mg, 82.9187, 1e-9);
    assert_eq!(magnesium.density_g_per_ml, 0.6);

    // 无规则命中 → 低置信度兜底, 按 100% 计
    let blend = &assay.adjusted_ingredients[2];
    assert!(blend.potency_fallback);
    assert_eq!(blend.potency_confidence, PotencyConfidence::Low);
    assert_eq!(blend.adjusted_weight_per_unit_mg, 25.0);
    assert_eq!(assay.low_confidence_count, 1);

    let raw = api
        .cost_raw_materials(&assay.raw_materials_costing_input)
        .expect("raw materials stage");
    assert_eq!(raw.summary.total_units, 300_000.0);
    assert_eq!(raw.material_breakdown.len(), 3);
    assert_eq!(raw.summary.freight_percent, 4.0);
}

#[tokio::test]
async fn test_total_roll_up_through_json() {
    let (_temp_file, state) = create_test_state().expect("Failed to create test state");
    let api = &state.costing_api;

    let assay_json = api
        .invoke_json("assay", &assay_request_json().to_string())
        .await
        .expect("assay stage");
    let assay: Value = serde_json::from_str(&assay_json).unwrap();

    let total_request = json!({
        "rawMaterials": assay["rawMaterialsCostingInput"],
        "productForm": "capsule",
        "packaging": packaging_request_json(),
    });
    let total_json = api
        .invoke_json("total", &total_request.to_string())
        .await
        .expect("total stage");
    let total: Value = serde_json::from_str(&total_json).unwrap();

    let totals = &total["totals"];
    let components = totals["rawMaterialsCost"].as_f64().unwrap()
        + totals["packagingMaterialsCost"].as_f64().unwrap()
        + totals["packagingOverheadCost"].as_f64().unwrap()
        + totals["manufacturingCost"].as_f64().unwrap();
    assert_close(totals["grandTotal"].as_f64().unwrap(), components, 1e-4);

    // 胶囊剂型追加胶囊填充工序
    let operations: Vec<&str> = total["manufacturing"]["operations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|op| op["operation"].as_str().unwrap())
        .collect();
    assert_eq!(operations, vec!["Weigh-Up", "Mixing", "Encapsulation"]);

    // 每瓶 60 粒命中普通瓶包装线
    assert_eq!(
        total["packaging"]["overhead"]["basis"]["processDescription"],
        "Bottle - Normal"
    );
}

#[tokio::test]
async fn test_catalog_lines_priced_by_packaging_stage() {
    let (_temp_file, state) = create_test_state().expect("Failed to create test state");
    let api = &state.costing_api;

    let catalog = api
        .list_packaging_materials(ProductForm::Tablet)
        .expect("catalog");
    let lines = catalog
        .iter()
        .filter(|item| ["PK-BTL-G120", "PK-CAP-45", "PK-COT-12"].contains(&item.item_id.as_str()))
        .map(|item| item.to_component_line(1.0))
        .collect();

    let request = PackagingRequest {
        packaging_components: lines,
        packaging_yield_percent_global: None,
        units_per_finished_good: 90.0,
        finished_good_quantity: 10_000.0,
    };
    let result = api.cost_packaging(&request).expect("packaging stage");

    assert_eq!(result.materials.breakdown.len(), 3);
    assert_eq!(result.materials.summary.packaging_yield_percent_global, 1.5);
    let overhead = result.overhead.expect("glass line tier");
    assert_eq!(overhead.basis.inner_fill, 90.0);
    assert_eq!(
        overhead.basis.process_description.as_str(),
        "Bottle - Glass"
    );
}

#[tokio::test]
async fn test_total_failure_returns_no_partial_result() {
    let (_temp_file, state) = create_test_state().expect("Failed to create test state");

    let mut raw: RawMaterialsRequest = serde_json::from_value(json!({
        "rawMaterials": [],
        "unitsPerFinishedGood": 60.0,
        "finishedGoodQuantity": 5000.0
    }))
    .unwrap();
    // 75 个原料行超出内置称量档位
    for i in 0..75 {
        raw.raw_materials.push(
            serde_json::from_value(json!({
                "materialName": format!("Material {}", i),
                "costPerPurchasingUnit": 10.0,
                "quantityPerUnitMg": 5.0,
                "densityGPerMl": 0.5
            }))
            .unwrap(),
        );
    }
    let request = TotalCostingRequest {
        raw_materials: raw,
        product_form: None,
        packaging: serde_json::from_value(packaging_request_json()).unwrap(),
    };

    let err = state.costing_api.cost_total(&request).unwrap_err();
    match err {
        supplement_costing::ApiError::StageFailed { stage, message } => {
            assert_eq!(stage, "manufacturing-costs");
            assert!(message.contains("75"));
        }
        other => panic!("Expected StageFailed, got {:?}", other),
    }
}
