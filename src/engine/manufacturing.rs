// ==========================================
// 补充剂成本核算系统 - 制造成本阶段 (ManufacturingCoster)
// ==========================================
// 职责: 混合机选型 + 称量/混合工时 + 包衣/胶囊填充工时
// 输入: ManufacturingRequest + 参考表
// 输出: ManufacturingResult
// ==========================================
// 公式:
// - 准备工时 = ceil_0.1(setup + (批次 - 1) × setup / 2)
// - 运行工时 = runRate × 批次
// - 机时 = 准备 + 运行, 人时 = 人数 × 机时
// 红线: 参考表缺档即失败, 不做默认值补齐
// ==========================================

use crate::config::CostingConfig;
use crate::domain::manufacturing::{
    ManufacturingRequest, ManufacturingResult, ManufacturingTotals, OperationBreakdown,
};
use crate::domain::reference::ReferenceTable;
use crate::domain::types::{OperationKind, ProcessCategory, RunRangeBasis};
use crate::engine::blender::BlenderSelector;
use crate::engine::error::{CostingError, CostingResult};
use crate::engine::rounding::{ceil_to_tenth, round2};
use crate::engine::validation::check_manufacturing_request;
use std::sync::Arc;
use tracing::{debug, info, instrument};

// ==========================================
// ManufacturingCoster - 制造成本核算
// ==========================================
pub struct ManufacturingCoster {
    reference: Arc<ReferenceTable>,
    config: Arc<CostingConfig>,
}

impl ManufacturingCoster {
    pub fn new(reference: Arc<ReferenceTable>, config: Arc<CostingConfig>) -> Self {
        Self { reference, config }
    }

    /// 计算制造成本
    #[instrument(skip_all, fields(
        num_raw_materials = request.num_raw_materials,
        total_mass_kg = request.total_mass_kg
    ))]
    pub fn cost(&self, request: &ManufacturingRequest) -> CostingResult<ManufacturingResult> {
        check_manufacturing_request(request).into_result()?;

        let (blender, blender_options) =
            BlenderSelector::select(request.total_mass_kg, request.bulk_density_kg_per_l)?;

        let mut operations = vec![
            self.bulk_operation(OperationKind::WeighUp, request.num_raw_materials, blender.batches)?,
            self.bulk_operation(OperationKind::Mixing, request.num_raw_materials, blender.batches)?,
        ];

        if let Some(form) = request.product_form {
            operations.push(self.form_operation(form.form_operation()));
        }

        let totals = sum_operations(&operations);

        info!(
            blender_size = blender.blender_size_cu_ft,
            batches = blender.batches,
            grand_total = totals.grand_total,
            "制造成本核算完成"
        );

        Ok(ManufacturingResult {
            blender,
            blender_options,
            operations,
            totals,
        })
    }

    /// 称量 / 混合工序（按原料行数查档）
    fn bulk_operation(
        &self,
        operation: OperationKind,
        num_raw_materials: u32,
        batches: u32,
    ) -> CostingResult<OperationBreakdown> {
        let lines = num_raw_materials as f64;
        let tier = self
            .reference
            .find_tier(
                ProcessCategory::Manufacturing,
                operation.as_str(),
                RunRangeBasis::RmLines,
                lines,
            )
            .ok_or_else(|| CostingError::ReferenceTierMissing {
                operation: operation.as_str().to_string(),
                basis: RunRangeBasis::RmLines,
                value: lines,
            })?;

        debug!(
            operation = operation.as_str(),
            low = tier.run_low_range,
            high = tier.run_high_range,
            "命中参考档位"
        );

        let extra_batches = batches.saturating_sub(1) as f64;
        let setup_hours = ceil_to_tenth(tier.setup_hours + extra_batches * tier.setup_hours / 2.0);
        let run_hours = tier.run_rate.unwrap_or(0.0) * batches as f64;

        Ok(self.breakdown(operation, tier.headcount, setup_hours, run_hours))
    }

    /// 包衣 / 胶囊填充（固定准备工时, 单人）
    fn form_operation(&self, operation: OperationKind) -> OperationBreakdown {
        self.breakdown(operation, 1.0, self.config.form_operation_setup_hours, 0.0)
    }

    fn breakdown(
        &self,
        operation: OperationKind,
        headcount: f64,
        setup_hours: f64,
        run_hours: f64,
    ) -> OperationBreakdown {
        operation_breakdown(&self.config, operation, headcount, setup_hours, run_hours)
    }
}

/// 工时 → 成本（费用先舍入再求和）
pub(crate) fn operation_breakdown(
    config: &CostingConfig,
    operation: OperationKind,
    headcount: f64,
    setup_hours: f64,
    run_hours: f64,
) -> OperationBreakdown {
    let machine_hours = setup_hours + run_hours;
    let labor_hours = headcount * machine_hours;
    let overhead_cost = round2(machine_hours * config.overhead_rate_per_machine_hour);
    let labor_cost = round2(labor_hours * config.labor_rate_per_person_hour);

    OperationBreakdown {
        operation,
        headcount,
        setup_hours: round2(setup_hours),
        run_hours: round2(run_hours),
        machine_hours: round2(machine_hours),
        labor_hours: round2(labor_hours),
        overhead_cost,
        labor_cost,
        total_cost: round2(overhead_cost + labor_cost),
    }
}

fn sum_operations(operations: &[OperationBreakdown]) -> ManufacturingTotals {
    let sum = operations
        .iter()
        .fold(ManufacturingTotals::default(), |acc, op| ManufacturingTotals {
            machine_hours: acc.machine_hours + op.machine_hours,
            labor_hours: acc.labor_hours + op.labor_hours,
            overhead_cost: acc.overhead_cost + op.overhead_cost,
            labor_cost: acc.labor_cost + op.labor_cost,
            grand_total: acc.grand_total + op.total_cost,
        });

    ManufacturingTotals {
        machine_hours: round2(sum.machine_hours),
        labor_hours: round2(sum.labor_hours),
        overhead_cost: round2(sum.overhead_cost),
        labor_cost: round2(sum.labor_cost),
        grand_total: round2(sum.grand_total),
    }
}
