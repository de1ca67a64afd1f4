// ==========================================
// 补充剂成本核算系统 - 包材目录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: packaging_catalog 表的查询 / 写入 / 首次种子数据
// 存储: product_forms 以逗号分隔（如 "tablet,capsule"）
// ==========================================

use crate::domain::packaging::PackagingCatalogItem;
use crate::domain::types::{PackagingUom, ProductForm};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// PackagingCatalogRepository - 包材目录仓储
// ==========================================
pub struct PackagingCatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PackagingCatalogRepository {
    /// 创建新的 PackagingCatalogRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(format!("{}: {}", db_path, e)))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入或覆盖单个条目
    pub fn upsert(&self, item: &PackagingCatalogItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let forms: Vec<String> = item.product_forms.iter().map(|f| f.to_string()).collect();
        conn.execute(
            r#"
            INSERT INTO packaging_catalog (
                item_id, component_name, component_type, uom,
                cost_per_purchasing_uom, moq_eaches, product_forms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(item_id) DO UPDATE SET
                component_name = ?2, component_type = ?3, uom = ?4,
                cost_per_purchasing_uom = ?5, moq_eaches = ?6, product_forms = ?7
            "#,
            params![
                item.item_id,
                item.component_name,
                item.component_type,
                item.uom.to_string(),
                item.cost_per_purchasing_uom,
                item.moq_eaches,
                forms.join(","),
            ],
        )?;
        Ok(())
    }

    /// 全部条目（按 item_id 排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<PackagingCatalogItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT item_id, component_name, component_type, uom,
                   cost_per_purchasing_uom, moq_eaches, product_forms
            FROM packaging_catalog
            ORDER BY item_id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut items = Vec::new();
        for row in rows {
            let (item_id, component_name, component_type, uom, cost, moq, forms) = row?;
            let uom = PackagingUom::parse(&uom).ok_or_else(|| RepositoryError::FieldValueError {
                field: "uom".to_string(),
                message: format!("未知计量单位: {} (item_id={})", uom, item_id),
            })?;

            items.push(PackagingCatalogItem {
                item_id,
                component_name,
                component_type,
                uom,
                cost_per_purchasing_uom: cost,
                moq_eaches: moq,
                product_forms: forms.split(',').filter_map(ProductForm::parse).collect(),
            });
        }
        Ok(items)
    }

    /// 按剂型筛选
    pub fn list_by_product_form(
        &self,
        form: ProductForm,
    ) -> RepositoryResult<Vec<PackagingCatalogItem>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|item| item.applies_to(form))
            .collect())
    }

    /// 表为空时写入默认目录
    pub fn seed_defaults_if_empty(&self) -> RepositoryResult<usize> {
        let count: i64 = {
            let conn = self.get_conn()?;
            conn.query_row("SELECT COUNT(*) FROM packaging_catalog", [], |row| row.get(0))?
        };
        if count > 0 {
            return Ok(0);
        }

        let defaults = default_catalog();
        for item in &defaults {
            self.upsert(item)?;
        }
        tracing::info!(rows = defaults.len(), "包材目录为空, 已写入默认目录");
        Ok(defaults.len())
    }
}

fn catalog_item(
    item_id: &str,
    name: &str,
    component_type: &str,
    uom: PackagingUom,
    cost: f64,
    moq: f64,
    forms: &[ProductForm],
) -> PackagingCatalogItem {
    PackagingCatalogItem {
        item_id: item_id.to_string(),
        component_name: name.to_string(),
        component_type: component_type.to_string(),
        uom,
        cost_per_purchasing_uom: cost,
        moq_eaches: moq,
        product_forms: forms.to_vec(),
    }
}

/// 默认包材目录
pub fn default_catalog() -> Vec<PackagingCatalogItem> {
    use PackagingUom::{Each, PerThousand};
    use ProductForm::{Capsule, Tablet};
    let both = [Tablet, Capsule];

    vec![
        catalog_item("PK-BTL-075", "75cc HDPE Bottle White", "bottle", Each, 0.085, 10_000.0, &both),
        catalog_item("PK-BTL-150", "150cc HDPE Bottle White", "bottle", Each, 0.11, 10_000.0, &both),
        catalog_item("PK-BTL-250", "250cc HDPE Bottle White", "bottle", Each, 0.14, 10_000.0, &both),
        catalog_item("PK-BTL-G120", "120cc Amber Glass Bottle", "bottle", Each, 0.42, 5_000.0, &both),
        catalog_item("PK-CAP-38", "38mm CRC Cap", "cap", Each, 0.045, 10_000.0, &both),
        catalog_item("PK-CAP-45", "45mm Screw Cap", "cap", Each, 0.05, 10_000.0, &both),
        catalog_item("PK-SEAL-38", "38mm Induction Seal", "seal", PerThousand, 9.5, 20_000.0, &both),
        catalog_item("PK-LBL-FR", "Front Label 2.5x6in", "label", PerThousand, 28.0, 5_000.0, &both),
        catalog_item("PK-DES-1G", "1g Silica Desiccant Canister", "desiccant", Each, 0.03, 25_000.0, &[Capsule]),
        catalog_item("PK-COT-12", "12g Pharmaceutical Cotton Coil", "cotton", PerThousand, 15.0, 10_000.0, &[Tablet]),
    ]
}
