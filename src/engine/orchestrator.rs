// ==========================================
// 补充剂成本核算系统 - 总成本编排 (TotalRollUp)
// ==========================================
// 用途: 按 原料 → 制造 → 包装 顺序执行并汇总总成本
// 红线: 任一子阶段失败即整体失败, 不返回部分总计
// ==========================================

use crate::config::CostingConfig;
use crate::domain::costing::{CostingTotals, TotalCostingRequest, TotalCostingResult};
use crate::domain::manufacturing::ManufacturingRequest;
use crate::domain::reference::ReferenceTable;
use crate::engine::error::CostingResult;
use crate::engine::manufacturing::ManufacturingCoster;
use crate::engine::packaging::PackagingCoster;
use crate::engine::raw_materials::RawMaterialsCoster;
use crate::engine::rounding::round_dp;
use std::sync::Arc;
use tracing::{info, instrument};

/// 子阶段名称
pub mod stage_names {
    pub const RAW_MATERIALS: &str = "raw-materials-costing";
    pub const MANUFACTURING: &str = "manufacturing-costs";
    pub const PACKAGING: &str = "packaging-costs";
}

// ==========================================
// CostingOrchestrator - 总成本编排器
// ==========================================
pub struct CostingOrchestrator {
    raw_materials: RawMaterialsCoster,
    manufacturing: ManufacturingCoster,
    packaging: PackagingCoster,
}

impl CostingOrchestrator {
    pub fn new(reference: Arc<ReferenceTable>, config: Arc<CostingConfig>) -> Self {
        Self {
            raw_materials: RawMaterialsCoster::new(config.clone()),
            manufacturing: ManufacturingCoster::new(reference.clone(), config.clone()),
            packaging: PackagingCoster::new(reference, config),
        }
    }

    /// 执行总成本核算
    ///
    /// # 返回
    /// - Ok: 三个子阶段结果 + 总计
    /// - Err(StageFailed): 子阶段失败（附阶段名）
    #[instrument(skip_all, fields(
        finished_good_quantity = request.raw_materials.finished_good_quantity
    ))]
    pub fn run(&self, request: &TotalCostingRequest) -> CostingResult<TotalCostingResult> {
        info!("总成本核算开始");

        // ===== 1. 原料 =====
        let raw_materials = self
            .raw_materials
            .cost(&request.raw_materials)
            .map_err(|e| e.in_stage(stage_names::RAW_MATERIALS))?;

        // ===== 2. 制造（以原料阶段的全批次质量与堆密度为输入）=====
        let manufacturing_request = ManufacturingRequest {
            num_raw_materials: request.raw_materials.active_line_count() as u32,
            total_mass_kg: raw_materials.density.product.total_mass_kg,
            bulk_density_kg_per_l: raw_materials.density.product.density_g_per_ml,
            product_form: request.product_form,
        };
        let manufacturing = self
            .manufacturing
            .cost(&manufacturing_request)
            .map_err(|e| e.in_stage(stage_names::MANUFACTURING))?;

        // ===== 3. 包装 =====
        let packaging = self
            .packaging
            .cost(&request.packaging)
            .map_err(|e| e.in_stage(stage_names::PACKAGING))?;

        // ===== 4. 汇总 =====
        let raw_materials_cost = round_dp(raw_materials.summary.total_raw_material_cost, 4);
        let packaging_materials_cost =
            round_dp(packaging.materials.summary.total_packaging_materials_cost, 4);
        let packaging_overhead_cost = round_dp(
            packaging
                .overhead
                .as_ref()
                .map(|o| o.operation.total_cost)
                .unwrap_or(0.0),
            4,
        );
        let manufacturing_cost = round_dp(manufacturing.totals.grand_total, 4);
        let grand_total = round_dp(
            raw_materials_cost + packaging_materials_cost + packaging_overhead_cost + manufacturing_cost,
            4,
        );

        let fg_qty = request.raw_materials.finished_good_quantity;
        let total_units = request.raw_materials.total_units();

        let totals = CostingTotals {
            raw_materials_cost,
            packaging_materials_cost,
            packaging_overhead_cost,
            manufacturing_cost,
            grand_total,
            cost_per_finished_good: round_dp(grand_total / fg_qty, 6),
            cost_per_unit: round_dp(grand_total / total_units, 8),
        };

        info!(
            grand_total = totals.grand_total,
            cost_per_finished_good = totals.cost_per_finished_good,
            "总成本核算完成"
        );

        Ok(TotalCostingResult {
            raw_materials,
            manufacturing,
            packaging,
            totals,
        })
    }
}
