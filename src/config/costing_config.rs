// ==========================================
// 补充剂成本核算系统 - 成本核算配置
// ==========================================
// 生命周期: 启动时从 config_kv 物化一次, 运行期不可变
// ==========================================

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ==========================================
// CostingConfig - 成本核算参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostingConfig {
    pub overhead_rate_per_machine_hour: f64, // $/机时
    pub labor_rate_per_person_hour: f64,     // $/人时
    pub default_freight_percent: f64,
    pub default_yield_loss_percent: f64,
    pub default_product_overage_percent: f64,
    pub default_packaging_yield_percent: f64,
    pub form_operation_setup_hours: f64, // 包衣 / 胶囊填充准备工时
    pub potency_timeout_ms: u64,
}

impl Default for CostingConfig {
    fn default() -> Self {
        Self {
            overhead_rate_per_machine_hour: 205.0,
            labor_rate_per_person_hour: 40.0,
            default_freight_percent: 4.0,
            default_yield_loss_percent: 8.0,
            default_product_overage_percent: 0.0,
            default_packaging_yield_percent: 1.5,
            form_operation_setup_hours: 0.75,
            potency_timeout_ms: 10_000,
        }
    }
}

impl CostingConfig {
    /// 单个配料效价解析超时
    pub fn potency_timeout(&self) -> Duration {
        Duration::from_millis(self.potency_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = CostingConfig::default();
        assert_eq!(cfg.overhead_rate_per_machine_hour, 205.0);
        assert_eq!(cfg.labor_rate_per_person_hour, 40.0);
        assert_eq!(cfg.default_packaging_yield_percent, 1.5);
        assert_eq!(cfg.potency_timeout(), Duration::from_secs(10));
    }
}
