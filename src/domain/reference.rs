// ==========================================
// 补充剂成本核算系统 - 工时参考表 (ORM 分档)
// ==========================================
// 依据: 成本核算流水线 - 9. 设计说明（按区间键控的只读有序集合）
// ==========================================
// 职责: 参考行定义 + 只读查询
// 红线: 运行期只读, 进程生命周期内不可变, 无需加锁
// ==========================================

use crate::domain::types::{ProcessCategory, RunRangeBasis};
use serde::{Deserialize, Serialize};

/// 固体制剂产品类
pub const SOLID_DOSE: &str = "Solid Dose";

// ==========================================
// ReferenceTier - 参考表单行
// ==========================================
// 区间上下界均为闭区间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReferenceTier {
    pub product_class: String,
    pub process_category: ProcessCategory,
    pub process_description: String,
    pub headcount: f64,
    pub setup_hours: f64,
    pub run_rate: Option<f64>, // 每批运行小时（制造）
    pub run_units_per_hour: f64, // 每小时产出成品数（包装）
    pub run_range_basis: RunRangeBasis,
    pub run_low_range: f64,
    pub run_high_range: f64,
}

impl ReferenceTier {
    /// 区间是否覆盖给定值
    pub fn covers(&self, value: f64) -> bool {
        value >= self.run_low_range && value <= self.run_high_range
    }
}

// ==========================================
// ReferenceTable - 只读参考表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    tiers: Vec<ReferenceTier>,
}

impl ReferenceTable {
    pub fn new(tiers: Vec<ReferenceTier>) -> Self {
        Self { tiers }
    }

    /// 内置默认分档（未配置数据库时使用, 也是首次建库的种子数据）
    pub fn builtin() -> Self {
        Self::new(builtin_tiers())
    }

    pub fn tiers(&self) -> &[ReferenceTier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// 查找匹配档位（首个命中的行）
    ///
    /// # 参数
    /// - category: 工序类别
    /// - description: 工序描述（如 "Weigh-Up" / "Bottle - Glass"）
    /// - basis: 区间依据
    /// - value: 区间键值（原料行数 / 单瓶装量）
    pub fn find_tier(
        &self,
        category: ProcessCategory,
        description: &str,
        basis: RunRangeBasis,
        value: f64,
    ) -> Option<&ReferenceTier> {
        self.tiers.iter().find(|t| {
            t.product_class == SOLID_DOSE
                && t.process_category == category
                && t.process_description == description
                && t.run_range_basis == basis
                && t.covers(value)
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn tier(
    category: ProcessCategory,
    description: &str,
    headcount: f64,
    setup_hours: f64,
    run_rate: Option<f64>,
    run_units_per_hour: f64,
    basis: RunRangeBasis,
    low: f64,
    high: f64,
) -> ReferenceTier {
    ReferenceTier {
        product_class: SOLID_DOSE.to_string(),
        process_category: category,
        process_description: description.to_string(),
        headcount,
        setup_hours,
        run_rate,
        run_units_per_hour,
        run_range_basis: basis,
        run_low_range: low,
        run_high_range: high,
    }
}

/// 内置默认分档数据
pub fn builtin_tiers() -> Vec<ReferenceTier> {
    use ProcessCategory::{Manufacturing, Packaging};
    use RunRangeBasis::{InnerFill, RmLines};

    vec![
        // ===== 称量 (Weigh-Up) =====
        tier(Manufacturing, "Weigh-Up", 2.0, 0.5, Some(0.5), 0.0, RmLines, 1.0, 10.0),
        tier(Manufacturing, "Weigh-Up", 2.0, 0.75, Some(1.0), 0.0, RmLines, 11.0, 20.0),
        tier(Manufacturing, "Weigh-Up", 3.0, 1.0, Some(1.5), 0.0, RmLines, 21.0, 40.0),
        tier(Manufacturing, "Weigh-Up", 3.0, 1.25, Some(2.0), 0.0, RmLines, 41.0, 60.0),
        // ===== 混合 (Mixing) =====
        tier(Manufacturing, "Mixing", 1.0, 1.0, Some(0.5), 0.0, RmLines, 1.0, 10.0),
        tier(Manufacturing, "Mixing", 1.0, 1.0, Some(0.75), 0.0, RmLines, 11.0, 20.0),
        tier(Manufacturing, "Mixing", 2.0, 1.5, Some(1.0), 0.0, RmLines, 21.0, 40.0),
        tier(Manufacturing, "Mixing", 2.0, 1.5, Some(1.25), 0.0, RmLines, 41.0, 60.0),
        // ===== 包装线 (普通瓶) =====
        tier(Packaging, "Bottle - Normal", 4.0, 1.0, None, 1800.0, InnerFill, 1.0, 60.0),
        tier(Packaging, "Bottle - Normal", 4.0, 1.0, None, 1500.0, InnerFill, 61.0, 120.0),
        tier(Packaging, "Bottle - Normal", 5.0, 1.5, None, 1200.0, InnerFill, 121.0, 250.0),
        // ===== 包装线 (玻璃瓶) =====
        tier(Packaging, "Bottle - Glass", 5.0, 1.5, None, 1200.0, InnerFill, 1.0, 60.0),
        tier(Packaging, "Bottle - Glass", 5.0, 1.5, None, 1000.0, InnerFill, 61.0, 120.0),
        tier(Packaging, "Bottle - Glass", 6.0, 2.0, None, 800.0, InnerFill, 121.0, 250.0),
    ]
}
