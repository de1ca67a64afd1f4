// ==========================================
// 补充剂成本核算系统 - 请求字段校验
// ==========================================
// 红线: 非正的份量 / 数量 / 成品数在计算前拒绝, 错误必须指明字段
// 用途: 引擎入口取首个违规, API 层汇总全部违规
// ==========================================

use crate::domain::costing::TotalCostingRequest;
use crate::domain::ingredient::AssayAdjustmentRequest;
use crate::domain::manufacturing::ManufacturingRequest;
use crate::domain::packaging::PackagingRequest;
use crate::domain::raw_material::RawMaterialsRequest;
use crate::engine::error::{CostingError, CostingResult};
use serde::{Deserialize, Serialize};

/// 单个字段违规
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// 字段校验收集器
#[derive(Debug, Default)]
pub struct FieldChecks {
    prefix: String,
    violations: Vec<FieldViolation>,
}

impl FieldChecks {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            violations: Vec::new(),
        }
    }

    fn push(&mut self, field: &str, message: &str) {
        self.violations.push(FieldViolation {
            field: format!("{}{}", self.prefix, field),
            message: message.to_string(),
        });
    }

    pub fn positive(&mut self, field: &str, value: f64) -> &mut Self {
        if !value.is_finite() || value <= 0.0 {
            self.push(field, &format!("必须为大于 0 的有限数值，实际 {}", value));
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: f64) -> &mut Self {
        if !value.is_finite() || value < 0.0 {
            self.push(field, &format!("必须为不小于 0 的有限数值，实际 {}", value));
        }
        self
    }

    pub fn optional_non_negative(&mut self, field: &str, value: Option<f64>) -> &mut Self {
        if let Some(v) = value {
            self.non_negative(field, v);
        }
        self
    }

    pub fn non_empty(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, "不能为空");
        }
        self
    }

    fn absorb(&mut self, other: FieldChecks) {
        self.violations.extend(other.violations);
    }

    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<FieldViolation> {
        self.violations
    }

    /// 转换为引擎结果（取首个违规）
    pub fn into_result(self) -> CostingResult<()> {
        match self.violations.into_iter().next() {
            None => Ok(()),
            Some(v) => Err(CostingError::invalid(v.field, v.message)),
        }
    }
}

// ==========================================
// 各阶段请求校验
// ==========================================

pub fn check_assay_request(req: &AssayAdjustmentRequest) -> FieldChecks {
    let mut checks = FieldChecks::new();
    checks
        .positive("unitsPerFinishedGood", req.units_per_finished_good)
        .positive("finishedGoodQuantity", req.finished_good_quantity)
        .optional_non_negative("freightPercent", req.freight_percent)
        .optional_non_negative("yieldLossPercent", req.yield_loss_percent)
        .optional_non_negative("productOveragePercent", req.product_overage_percent);

    for (i, ing) in req.ingredients.iter().enumerate() {
        let field = |name: &str| format!("ingredients[{}].{}", i, name);
        checks
            .non_empty(&field("matchedItemId"), &ing.matched_item_id)
            .non_negative(&field("claimedAmountPerServing"), ing.claimed_amount_per_serving)
            .positive(&field("servingSize"), ing.serving_size)
            .non_negative(&field("matchedCostPerKg"), ing.matched_cost_per_kg)
            .non_negative(&field("ingredientOveragePercent"), ing.ingredient_overage_percent);
    }
    checks
}

fn check_raw_materials_into(checks: &mut FieldChecks, req: &RawMaterialsRequest) {
    checks
        .positive("unitsPerFinishedGood", req.units_per_finished_good)
        .positive("finishedGoodQuantity", req.finished_good_quantity)
        .optional_non_negative("freightPercent", req.freight_percent)
        .optional_non_negative("yieldLossPercent", req.yield_loss_percent)
        .optional_non_negative("productOveragePercent", req.product_overage_percent);

    for (i, mat) in req.raw_materials.iter().enumerate() {
        let field = |name: &str| format!("rawMaterials[{}].{}", i, name);
        checks
            .non_negative(&field("costPerPurchasingUnit"), mat.cost_per_purchasing_unit)
            .non_negative(&field("quantityPerUnitMg"), mat.quantity_per_unit_mg)
            .non_negative(&field("ingredientOveragePercent"), mat.ingredient_overage_percent)
            .positive(&field("densityGPerMl"), mat.density_g_per_ml);
    }
}

pub fn check_raw_materials_request(req: &RawMaterialsRequest) -> FieldChecks {
    let mut checks = FieldChecks::new();
    check_raw_materials_into(&mut checks, req);
    checks
}

pub fn check_manufacturing_request(req: &ManufacturingRequest) -> FieldChecks {
    let mut checks = FieldChecks::new();
    if req.num_raw_materials == 0 {
        checks.push("numRawMaterials", "必须为正整数");
    }
    checks
        .positive("totalMassKg", req.total_mass_kg)
        .positive("bulkDensityKgPerL", req.bulk_density_kg_per_l);
    checks
}

fn check_packaging_into(checks: &mut FieldChecks, req: &PackagingRequest) {
    checks
        .positive("unitsPerFinishedGood", req.units_per_finished_good)
        .positive("finishedGoodQuantity", req.finished_good_quantity)
        .optional_non_negative(
            "packagingYieldPercentGlobal",
            req.packaging_yield_percent_global,
        );

    for (i, c) in req.packaging_components.iter().enumerate() {
        let field = |name: &str| format!("packagingComponents[{}].{}", i, name);
        checks
            .non_negative(&field("quantity"), c.quantity)
            .optional_non_negative(&field("quantityOverride"), c.quantity_override)
            .optional_non_negative(
                &field("lineYieldPercentOverride"),
                c.line_yield_percent_override,
            )
            .non_negative(&field("costPerPurchasingUoM"), c.cost_per_purchasing_uom)
            .optional_non_negative(&field("costOverride"), c.cost_override)
            .non_negative(&field("moqEaches"), c.moq_eaches);
    }
}

pub fn check_packaging_request(req: &PackagingRequest) -> FieldChecks {
    let mut checks = FieldChecks::new();
    check_packaging_into(&mut checks, req);
    checks
}

pub fn check_total_request(req: &TotalCostingRequest) -> FieldChecks {
    let mut checks = FieldChecks::new();

    let mut raw = FieldChecks::with_prefix("rawMaterials.");
    check_raw_materials_into(&mut raw, &req.raw_materials);
    checks.absorb(raw);

    let mut packaging = FieldChecks::with_prefix("packaging.");
    check_packaging_into(&mut packaging, &req.packaging);
    checks.absorb(packaging);

    checks
}
