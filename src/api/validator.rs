// ==========================================
// 补充剂成本核算系统 - 请求校验器
// ==========================================
// 职责: 计算前一次性收集请求中的全部违规字段
// 区别: 引擎入口只报告首个违规, API 层报告全部
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::costing::TotalCostingRequest;
use crate::domain::ingredient::AssayAdjustmentRequest;
use crate::domain::manufacturing::ManufacturingRequest;
use crate::domain::packaging::PackagingRequest;
use crate::domain::raw_material::RawMaterialsRequest;
use crate::engine::validation::{
    check_assay_request, check_manufacturing_request, check_packaging_request,
    check_raw_materials_request, check_total_request, FieldChecks,
};
use tracing::warn;

/// 请求校验器
pub struct RequestValidator;

impl RequestValidator {
    pub fn validate_assay(request: &AssayAdjustmentRequest) -> ApiResult<()> {
        finish("assay", check_assay_request(request))
    }

    pub fn validate_raw_materials(request: &RawMaterialsRequest) -> ApiResult<()> {
        finish("raw-materials", check_raw_materials_request(request))
    }

    pub fn validate_manufacturing(request: &ManufacturingRequest) -> ApiResult<()> {
        finish("manufacturing", check_manufacturing_request(request))
    }

    pub fn validate_packaging(request: &PackagingRequest) -> ApiResult<()> {
        finish("packaging", check_packaging_request(request))
    }

    pub fn validate_total(request: &TotalCostingRequest) -> ApiResult<()> {
        finish("total", check_total_request(request))
    }
}

fn finish(stage: &str, checks: FieldChecks) -> ApiResult<()> {
    if checks.is_ok() {
        return Ok(());
    }
    let violations = checks.into_violations();
    warn!(stage, count = violations.len(), "请求校验未通过");
    Err(ApiError::from_violations(violations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::raw_material::RawMaterialLine;

    fn material(name: &str, qty: f64, cost: f64, density: f64) -> RawMaterialLine {
        RawMaterialLine {
            id: None,
            material_name: name.to_string(),
            cost_per_purchasing_unit: cost,
            quantity_per_unit_mg: qty,
            ingredient_overage_percent: 0.0,
            density_g_per_ml: density,
        }
    }

    #[test]
    fn test_reports_every_violation() {
        let request = RawMaterialsRequest {
            raw_materials: vec![
                material("Ascorbic Acid", 250.0, -1.0, 0.6),
                material("Magnesium Oxide", 10.0, 5.0, 0.0),
            ],
            units_per_finished_good: 0.0,
            finished_good_quantity: 1000.0,
            freight_percent: None,
            yield_loss_percent: None,
            product_overage_percent: None,
        };

        let err = RequestValidator::validate_raw_materials(&request).unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "unitsPerFinishedGood",
                "rawMaterials[0].costPerPurchasingUnit",
                "rawMaterials[1].densityGPerMl",
            ]
        );
    }

    #[test]
    fn test_valid_request_passes() {
        let request = RawMaterialsRequest {
            raw_materials: vec![material("Ascorbic Acid", 250.0, 12.0, 0.6)],
            units_per_finished_good: 60.0,
            finished_good_quantity: 1000.0,
            freight_percent: Some(4.0),
            yield_loss_percent: None,
            product_overage_percent: None,
        };
        assert!(RequestValidator::validate_raw_materials(&request).is_ok());
    }
}
