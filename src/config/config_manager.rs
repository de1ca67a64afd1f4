// ==========================================
// 补充剂成本核算系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::costing_config::CostingConfig;
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    // ===== 成本核算参数 =====

    /// 读取非负数值配置（缺失取默认值, 非数值或负数报错）
    fn get_non_negative_f64(&self, key: &str, default: f64) -> Result<f64, Box<dyn Error>> {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| format!("配置 {} 不是数值: {}", key, raw))?;

        if !value.is_finite() || value < 0.0 {
            return Err(format!("配置 {} 必须为非负数值: {}", key, raw).into());
        }
        Ok(value)
    }

    /// 物化成本核算配置
    pub fn load_costing_config(&self) -> Result<CostingConfig, Box<dyn Error>> {
        let defaults = CostingConfig::default();

        let timeout_ms = self.get_non_negative_f64(
            config_keys::POTENCY_TIMEOUT_MS,
            defaults.potency_timeout_ms as f64,
        )?;

        let config = CostingConfig {
            overhead_rate_per_machine_hour: self.get_non_negative_f64(
                config_keys::OVERHEAD_RATE_PER_MACHINE_HOUR,
                defaults.overhead_rate_per_machine_hour,
            )?,
            labor_rate_per_person_hour: self.get_non_negative_f64(
                config_keys::LABOR_RATE_PER_PERSON_HOUR,
                defaults.labor_rate_per_person_hour,
            )?,
            default_freight_percent: self.get_non_negative_f64(
                config_keys::DEFAULT_FREIGHT_PERCENT,
                defaults.default_freight_percent,
            )?,
            default_yield_loss_percent: self.get_non_negative_f64(
                config_keys::DEFAULT_YIELD_LOSS_PERCENT,
                defaults.default_yield_loss_percent,
            )?,
            default_product_overage_percent: self.get_non_negative_f64(
                config_keys::DEFAULT_PRODUCT_OVERAGE_PERCENT,
                defaults.default_product_overage_percent,
            )?,
            default_packaging_yield_percent: self.get_non_negative_f64(
                config_keys::DEFAULT_PACKAGING_YIELD_PERCENT,
                defaults.default_packaging_yield_percent,
            )?,
            form_operation_setup_hours: self.get_non_negative_f64(
                config_keys::FORM_OPERATION_SETUP_HOURS,
                defaults.form_operation_setup_hours,
            )?,
            potency_timeout_ms: timeout_ms.round() as u64,
        };

        tracing::debug!(?config, "成本核算配置已加载");
        Ok(config)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 费率
    pub const OVERHEAD_RATE_PER_MACHINE_HOUR: &str = "costing/overhead_rate_per_machine_hour";
    pub const LABOR_RATE_PER_PERSON_HOUR: &str = "costing/labor_rate_per_person_hour";

    // 原料成本默认百分比
    pub const DEFAULT_FREIGHT_PERCENT: &str = "costing/default_freight_percent";
    pub const DEFAULT_YIELD_LOSS_PERCENT: &str = "costing/default_yield_loss_percent";
    pub const DEFAULT_PRODUCT_OVERAGE_PERCENT: &str = "costing/default_product_overage_percent";

    // 包装
    pub const DEFAULT_PACKAGING_YIELD_PERCENT: &str = "costing/default_packaging_yield_percent";

    // 成型工序
    pub const FORM_OPERATION_SETUP_HOURS: &str = "costing/form_operation_setup_hours";

    // 效价解析
    pub const POTENCY_TIMEOUT_MS: &str = "costing/potency_timeout_ms";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_empty() {
        let mgr = manager();
        assert_eq!(mgr.load_costing_config().unwrap(), CostingConfig::default());
    }

    #[test]
    fn test_override_and_snapshot() {
        let mgr = manager();
        mgr.set_config_value(config_keys::LABOR_RATE_PER_PERSON_HOUR, "42.5").unwrap();
        mgr.set_config_value(config_keys::POTENCY_TIMEOUT_MS, "2500").unwrap();

        let cfg = mgr.load_costing_config().unwrap();
        assert_eq!(cfg.labor_rate_per_person_hour, 42.5);
        assert_eq!(cfg.potency_timeout_ms, 2500);

        let snapshot: HashMap<String, String> =
            serde_json::from_str(&mgr.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(
            snapshot.get(config_keys::LABOR_RATE_PER_PERSON_HOUR).map(String::as_str),
            Some("42.5")
        );
    }

    #[test]
    fn test_invalid_value_rejected() {
        let mgr = manager();
        mgr.set_config_value(config_keys::DEFAULT_FREIGHT_PERCENT, "four").unwrap();
        assert!(mgr.load_costing_config().is_err());

        mgr.set_config_value(config_keys::DEFAULT_FREIGHT_PERCENT, "-1").unwrap();
        let err = mgr.load_costing_config().unwrap_err().to_string();
        assert!(err.contains("default_freight_percent"));
    }
}
