// ==========================================
// 补充剂成本核算系统 - 包装成本阶段 (PackagingCoster)
// ==========================================
// 职责: 包材成本（得率 / 计量单位 / MOQ）+ 包装线工时成本
// 输入: PackagingRequest + 参考表
// 输出: PackagingResult
// ==========================================
// 规则:
// - 用量 = quantityOverride ?? quantity
// - 得率 = lineYieldPercentOverride ?? 全局得率
// - 单价 = costOverride ?? costPerPurchasingUoM（"M" 按千个计价）
// - MOQ 缺口按含得率的需求量计算
// - 客供组件材料与 MOQ 成本为 0
// - 包装线: 任一组件名称含 glass（不区分大小写）走玻璃瓶线
// - 无匹配档位或产速为 0 时工时成本为 null
// ==========================================

use crate::config::CostingConfig;
use crate::domain::packaging::{
    PackagingBreakdownRow, PackagingComponentLine, PackagingMaterials, PackagingMaterialsSummary,
    PackagingOverhead, PackagingOverheadBasis, PackagingRequest, PackagingResult,
};
use crate::domain::reference::ReferenceTable;
use crate::domain::types::{OperationKind, PackagingLine, ProcessCategory, RunRangeBasis};
use crate::engine::error::CostingResult;
use crate::engine::manufacturing::operation_breakdown;
use crate::engine::rounding::round_dp;
use crate::engine::validation::check_packaging_request;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ==========================================
// PackagingCoster - 包装成本核算
// ==========================================
pub struct PackagingCoster {
    reference: Arc<ReferenceTable>,
    config: Arc<CostingConfig>,
}

impl PackagingCoster {
    pub fn new(reference: Arc<ReferenceTable>, config: Arc<CostingConfig>) -> Self {
        Self { reference, config }
    }

    /// 计算包装成本
    #[instrument(skip_all, fields(components = request.packaging_components.len()))]
    pub fn cost(&self, request: &PackagingRequest) -> CostingResult<PackagingResult> {
        check_packaging_request(request).into_result()?;

        let global_yield = request
            .packaging_yield_percent_global
            .unwrap_or(self.config.default_packaging_yield_percent);

        let breakdown: Vec<PackagingBreakdownRow> = request
            .packaging_components
            .iter()
            .map(|c| material_row(c, global_yield))
            .collect();

        let total: f64 = breakdown.iter().map(|row| row.line_cost_total).sum();

        let materials = PackagingMaterials {
            summary: PackagingMaterialsSummary {
                packaging_yield_percent_global: round_dp(global_yield, 4),
                total_packaging_materials_cost: round_dp(total, 6),
            },
            breakdown,
        };

        let overhead = self.line_overhead(request);

        info!(
            total_packaging_materials_cost = materials.summary.total_packaging_materials_cost,
            overhead_cost = overhead.as_ref().map(|o| o.operation.total_cost),
            "包装成本核算完成"
        );

        Ok(PackagingResult {
            materials,
            overhead,
        })
    }

    /// 包装线工时成本（准备工时不随批量缩放）
    fn line_overhead(&self, request: &PackagingRequest) -> Option<PackagingOverhead> {
        let line = packaging_line(&request.packaging_components);
        let inner_fill = request.units_per_finished_good;

        let tier = match self.reference.find_tier(
            ProcessCategory::Packaging,
            line.as_str(),
            RunRangeBasis::InnerFill,
            inner_fill,
        ) {
            Some(t) if t.run_units_per_hour > 0.0 => t,
            Some(_) => {
                warn!(line = line.as_str(), inner_fill, "包装线产速为 0, 不计工时成本");
                return None;
            }
            None => {
                warn!(line = line.as_str(), inner_fill, "包装线无匹配档位, 不计工时成本");
                return None;
            }
        };

        debug!(
            line = line.as_str(),
            low = tier.run_low_range,
            high = tier.run_high_range,
            units_per_hour = tier.run_units_per_hour,
            "命中参考档位"
        );

        let run_hours = request.finished_good_quantity / tier.run_units_per_hour;
        let operation = operation_breakdown(
            &self.config,
            OperationKind::Packaging,
            tier.headcount,
            tier.setup_hours,
            run_hours,
        );

        Some(PackagingOverhead {
            operation,
            basis: PackagingOverheadBasis {
                inner_fill,
                process_description: line,
            },
        })
    }
}

/// 包装线选择
pub fn packaging_line(components: &[PackagingComponentLine]) -> PackagingLine {
    let has_glass = components
        .iter()
        .any(|c| c.component_name.to_lowercase().contains("glass"));
    if has_glass {
        PackagingLine::BottleGlass
    } else {
        PackagingLine::BottleNormal
    }
}

fn material_row(c: &PackagingComponentLine, global_yield: f64) -> PackagingBreakdownRow {
    let quantity_used = c.quantity_override.unwrap_or(c.quantity);
    let yield_percent = c.line_yield_percent_override.unwrap_or(global_yield);
    let required_with_yield = quantity_used * (1.0 + yield_percent / 100.0);
    let cost_each = c.uom.cost_each(c.cost_override.unwrap_or(c.cost_per_purchasing_uom));

    let line_before = if c.customer_supplied {
        0.0
    } else {
        required_with_yield * cost_each
    };
    let shortfall = (c.moq_eaches - required_with_yield).max(0.0);
    let moq_add = if c.customer_supplied {
        0.0
    } else {
        shortfall * cost_each
    };

    PackagingBreakdownRow {
        id: c.id.clone(),
        component_name: c.component_name.clone(),
        uom: c.uom,
        quantity_base: c.quantity,
        quantity_used: round_dp(quantity_used, 6),
        line_yield_percent_used: yield_percent,
        required_units_with_yield: round_dp(required_with_yield, 6),
        cost_per_each_applied: round_dp(cost_each, 6),
        moq_eaches: c.moq_eaches,
        moq_shortfall_eaches: round_dp(shortfall, 6),
        moq_add_cost: round_dp(moq_add, 6),
        line_cost_before_moq: round_dp(line_before, 6),
        line_cost_total: round_dp(line_before + moq_add, 6),
        customer_supplied: c.customer_supplied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::PackagingUom;

    fn component(name: &str, quantity: f64, cost: f64, uom: PackagingUom) -> PackagingComponentLine {
        PackagingComponentLine {
            id: None,
            component_name: name.to_string(),
            uom,
            quantity,
            quantity_override: None,
            line_yield_percent_override: None,
            cost_per_purchasing_uom: cost,
            cost_override: None,
            moq_eaches: 0.0,
            customer_supplied: false,
        }
    }

    fn request(components: Vec<PackagingComponentLine>) -> PackagingRequest {
        PackagingRequest {
            packaging_components: components,
            packaging_yield_percent_global: Some(0.0),
            units_per_finished_good: 60.0,
            finished_good_quantity: 5000.0,
        }
    }

    fn coster() -> PackagingCoster {
        PackagingCoster::new(
            Arc::new(ReferenceTable::builtin()),
            Arc::new(CostingConfig::default()),
        )
    }

    #[test]
    fn test_moq_shortfall() {
        let mut bottle = component("150cc HDPE Bottle", 5000.0, 0.10, PackagingUom::Each);
        bottle.moq_eaches = 10_000.0;

        let result = coster().cost(&request(vec![bottle])).unwrap();
        let row = &result.materials.breakdown[0];
        assert_eq!(row.moq_shortfall_eaches, 5000.0);
        assert_eq!(row.moq_add_cost, 500.0);
        assert_eq!(row.line_cost_before_moq, 500.0);
        assert_eq!(row.line_cost_total, 1000.0);
    }

    #[test]
    fn test_no_moq_surcharge_once_yield_covers_moq() {
        // 9800 件: 损耗前不足 MOQ, 按 3% 损耗后 10094 件已覆盖
        let mut bottle = component("150cc HDPE Bottle", 9800.0, 0.10, PackagingUom::Each);
        bottle.moq_eaches = 10_000.0;
        bottle.line_yield_percent_override = Some(3.0);

        let mut exact = component("38mm CRC Cap", 10_000.0, 0.05, PackagingUom::Each);
        exact.moq_eaches = 10_000.0;

        let mut short = component("Induction Seal", 9800.0, 0.02, PackagingUom::Each);
        short.moq_eaches = 10_000.0;
        short.line_yield_percent_override = Some(2.0);

        let result = coster().cost(&request(vec![bottle, exact, short])).unwrap();
        let rows = &result.materials.breakdown;

        for row in &rows[..2] {
            assert!(row.required_units_with_yield >= row.moq_eaches);
            assert_eq!(row.moq_shortfall_eaches, 0.0);
            assert_eq!(row.moq_add_cost, 0.0);
            assert_eq!(row.line_cost_total, row.line_cost_before_moq);
        }
        assert!(rows[2].moq_add_cost > 0.0);
    }

    #[test]
    fn test_per_thousand_uom_and_yield() {
        let mut label = component("Front Label", 1000.0, 25.0, PackagingUom::PerThousand);
        label.line_yield_percent_override = Some(2.0);

        let result = coster().cost(&request(vec![label])).unwrap();
        let row = &result.materials.breakdown[0];
        assert_eq!(row.cost_per_each_applied, 0.025);
        assert_eq!(row.required_units_with_yield, 1020.0);
        assert_eq!(row.line_cost_total, 25.5);
        assert_eq!(row.line_yield_percent_used, 2.0);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut cap = component("38mm CRC Cap", 5000.0, 0.05, PackagingUom::Each);
        cap.quantity_override = Some(4000.0);
        cap.cost_override = Some(0.02);

        let result = coster().cost(&request(vec![cap])).unwrap();
        let row = &result.materials.breakdown[0];
        assert_eq!(row.quantity_base, 5000.0);
        assert_eq!(row.quantity_used, 4000.0);
        assert_eq!(row.cost_per_each_applied, 0.02);
        assert_eq!(row.line_cost_total, 80.0);
    }

    #[test]
    fn test_customer_supplied_costs_nothing() {
        let mut bottle = component("Customer Bottle", 5000.0, 0.10, PackagingUom::Each);
        bottle.customer_supplied = true;
        bottle.moq_eaches = 10_000.0;

        let result = coster().cost(&request(vec![bottle])).unwrap();
        let row = &result.materials.breakdown[0];
        assert_eq!(row.line_cost_total, 0.0);
        assert_eq!(row.moq_add_cost, 0.0);
        assert!(row.customer_supplied);
        assert_eq!(result.materials.summary.total_packaging_materials_cost, 0.0);
    }

    #[test]
    fn test_default_global_yield_applied() {
        let mut req = request(vec![component("Seal", 1000.0, 0.01, PackagingUom::Each)]);
        req.packaging_yield_percent_global = None;

        let result = coster().cost(&req).unwrap();
        assert_eq!(result.materials.summary.packaging_yield_percent_global, 1.5);
        assert_eq!(result.materials.breakdown[0].required_units_with_yield, 1015.0);
    }

    #[test]
    fn test_normal_line_overhead() {
        let result = coster()
            .cost(&request(vec![component("HDPE Bottle", 5000.0, 0.1, PackagingUom::Each)]))
            .unwrap();

        // 装量 60: 普通瓶 1~60 档, 4 人, 准备 1.0, 1800 瓶/时
        let overhead = result.overhead.unwrap();
        assert_eq!(overhead.basis.process_description, PackagingLine::BottleNormal);
        assert_eq!(overhead.basis.inner_fill, 60.0);
        assert_eq!(overhead.operation.setup_hours, 1.0);
        assert_eq!(overhead.operation.run_hours, 2.78);
        assert_eq!(overhead.operation.headcount, 4.0);
    }

    #[test]
    fn test_glass_line_selected() {
        let result = coster()
            .cost(&request(vec![
                component("Amber GLASS Bottle 120cc", 5000.0, 0.4, PackagingUom::Each),
                component("Cap", 5000.0, 0.05, PackagingUom::Each),
            ]))
            .unwrap();
        let overhead = result.overhead.unwrap();
        assert_eq!(overhead.basis.process_description, PackagingLine::BottleGlass);
        assert_eq!(overhead.operation.headcount, 5.0);
    }

    #[test]
    fn test_no_tier_gives_null_overhead() {
        let mut req = request(vec![component("Bottle", 100.0, 0.1, PackagingUom::Each)]);
        req.units_per_finished_good = 500.0;

        let result = coster().cost(&req).unwrap();
        assert!(result.overhead.is_none());
        assert_eq!(result.materials.summary.total_packaging_materials_cost, 10.0);
    }

    #[test]
    fn test_overhead_serializes_flat() {
        let result = coster()
            .cost(&request(vec![component("Bottle", 5000.0, 0.1, PackagingUom::Each)]))
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["overhead"]["operation"], "Packaging");
        assert_eq!(json["overhead"]["basis"]["processDescription"], "Bottle - Normal");
        assert!(json["materials"]["breakdown"][0].get("lineCostBeforeMOQ").is_some());
    }
}
