// ==========================================
// 补充剂成本核算系统 - 原料成本阶段 (RawMaterialsCoster)
// ==========================================
// 职责: 单原料全批次用量与成本 + 加权堆密度 + 损耗/运费/超量汇总
// 输入: RawMaterialsRequest
// 输出: RawMaterialsResult
// ==========================================
// 公式:
// - totalUnits = unitsPerFinishedGood × finishedGoodQuantity
// - requiredMg = quantityPerUnitMg × totalUnits × (1 + overage/100)
// - 堆密度 = Σ质量 / Σ体积（按单位, 不含原料超量）
// - 损耗 / 运费 / 产品超量均以基础成本为基数, 互不叠加
// ==========================================

use crate::config::CostingConfig;
use crate::domain::raw_material::{
    DensityPoint, DensityProfile, MaterialBreakdownRow, ProductDensity, RawMaterialLine,
    RawMaterialsRequest, RawMaterialsResult, RawMaterialsSummary,
};
use crate::engine::error::CostingResult;
use crate::engine::rounding::round_dp;
use crate::engine::validation::check_raw_materials_request;
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// RawMaterialsCoster - 原料成本核算
// ==========================================
pub struct RawMaterialsCoster {
    config: Arc<CostingConfig>,
}

impl RawMaterialsCoster {
    pub fn new(config: Arc<CostingConfig>) -> Self {
        Self { config }
    }

    /// 计算原料成本
    #[instrument(skip_all, fields(materials = request.raw_materials.len()))]
    pub fn cost(&self, request: &RawMaterialsRequest) -> CostingResult<RawMaterialsResult> {
        check_raw_materials_request(request).into_result()?;

        let total_units = request.total_units();
        let fg_qty = request.finished_good_quantity;

        let freight_percent = request
            .freight_percent
            .unwrap_or(self.config.default_freight_percent);
        let yield_loss_percent = request
            .yield_loss_percent
            .unwrap_or(self.config.default_yield_loss_percent);
        let product_overage_percent = request
            .product_overage_percent
            .unwrap_or(self.config.default_product_overage_percent);

        let material_breakdown: Vec<MaterialBreakdownRow> = request
            .raw_materials
            .iter()
            .map(|mat| breakdown_row(mat, total_units, fg_qty))
            .collect();

        let density = density_profile(
            &request.raw_materials,
            request.units_per_finished_good,
            total_units,
        );

        // 基础成本取各行舍入后的金额之和
        let base: f64 = material_breakdown
            .iter()
            .map(|row| row.total_cost_for_material)
            .sum();
        let yield_loss = yield_loss_percent / 100.0 * base;
        let freight = freight_percent / 100.0 * base;
        let overage = product_overage_percent / 100.0 * base;
        let total = base + yield_loss + freight + overage;

        let summary = RawMaterialsSummary {
            total_units,
            freight_percent,
            yield_loss_percent,
            product_overage_percent,
            base_material_cost: round_dp(base, 4),
            yield_loss_cost: round_dp(yield_loss, 4),
            freight_cost: round_dp(freight, 4),
            product_overage_cost: round_dp(overage, 4),
            total_raw_material_cost: round_dp(total, 4),
            cost_per_finished_good: round_dp(total / fg_qty, 6),
            cost_per_unit: round_dp(total / total_units, 8),
        };

        info!(
            total_units,
            total_raw_material_cost = summary.total_raw_material_cost,
            bulk_density = density.product.density_g_per_ml,
            total_mass_kg = density.product.total_mass_kg,
            "原料成本核算完成"
        );

        Ok(RawMaterialsResult {
            summary,
            material_breakdown,
            density,
        })
    }
}

fn breakdown_row(mat: &RawMaterialLine, total_units: f64, fg_qty: f64) -> MaterialBreakdownRow {
    let required_mg =
        mat.quantity_per_unit_mg * total_units * (1.0 + mat.ingredient_overage_percent / 100.0);
    let required_kg = required_mg / 1_000_000.0;
    let total_cost = required_kg * mat.cost_per_purchasing_unit;
    let mass_g = mat.quantity_per_unit_mg / 1000.0;
    let volume_ml = mass_g / mat.density_g_per_ml;

    MaterialBreakdownRow {
        id: mat.id.clone(),
        material_name: mat.material_name.clone(),
        required_mg: round_dp(required_mg, 2),
        required_kg: round_dp(required_kg, 5),
        cost_per_purchasing_unit: mat.cost_per_purchasing_unit,
        ingredient_overage_percent: mat.ingredient_overage_percent,
        density_g_per_ml: round_dp(mat.density_g_per_ml, 4),
        volume_per_unit_ml: round_dp(volume_ml, 4),
        mass_per_unit_g: round_dp(mass_g, 4),
        total_cost_for_material: round_dp(total_cost, 4),
        cost_per_finished_good: round_dp(total_cost / fg_qty, 6),
        cost_per_unit: round_dp(total_cost / total_units, 8),
    }
}

/// 加权堆密度（单位 / 成品 / 全批次三个层级）
fn density_profile(
    materials: &[RawMaterialLine],
    units_per_finished_good: f64,
    total_units: f64,
) -> DensityProfile {
    let (mass_g, volume_ml) = materials.iter().fold((0.0, 0.0), |(m, v), mat| {
        let g = mat.quantity_per_unit_mg / 1000.0;
        (m + g, v + g / mat.density_g_per_ml)
    });

    let density = if volume_ml > 0.0 { mass_g / volume_ml } else { 0.0 };
    let density_4 = round_dp(density, 4);

    DensityProfile {
        per_unit: DensityPoint {
            density_g_per_ml: density_4,
            mass_g: round_dp(mass_g, 4),
            volume_ml: round_dp(volume_ml, 4),
        },
        per_finished_good: DensityPoint {
            density_g_per_ml: density_4,
            mass_g: round_dp(mass_g * units_per_finished_good, 4),
            volume_ml: round_dp(volume_ml * units_per_finished_good, 4),
        },
        product: ProductDensity {
            density_g_per_ml: density_4,
            total_mass_g: round_dp(mass_g * total_units, 2),
            total_mass_kg: round_dp(mass_g * total_units / 1000.0, 4),
            total_volume_ml: round_dp(volume_ml * total_units, 2),
            total_volume_l: round_dp(volume_ml * total_units / 1000.0, 4),
        },
    }
}
