// ==========================================
// 补充剂成本核算系统 - 配置层
// ==========================================
// 职责: 成本核算参数加载与覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod costing_config;

pub use config_manager::{config_keys, ConfigManager};
pub use costing_config::CostingConfig;
