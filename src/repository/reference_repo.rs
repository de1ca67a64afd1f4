// ==========================================
// 补充剂成本核算系统 - 工时参考表仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: reference_tier 表的加载 / 整表替换 / 首次种子数据
// ==========================================

use crate::domain::reference::{builtin_tiers, ReferenceTable, ReferenceTier};
use crate::domain::types::{ProcessCategory, RunRangeBasis};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ReferenceTierRepository - 参考表仓储
// ==========================================
pub struct ReferenceTierRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReferenceTierRepository {
    /// 创建新的 ReferenceTierRepository 实例
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

    /// 行数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM reference_tier", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// 按导入顺序读取全部档位
    pub fn list_all(&self) -> RepositoryResult<Vec<ReferenceTier>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                product_class, process_category, process_description,
                headcount, setup_hours, run_rate, run_units_per_hour,
                run_range_basis, run_low_range, run_high_range
            FROM reference_tier
            ORDER BY tier_id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, Option<f64>>(5)?,
                row.get::<_, f64>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, f64>(8)?,
                row.get::<_, f64>(9)?,
            ))
        })?;

        let mut tiers = Vec::new();
        for row in rows {
            let (
                product_class,
                category,
                description,
                headcount,
                setup_hours,
                run_rate,
                run_units_per_hour,
                basis,
                low,
                high,
            ) = row?;

            let process_category =
                ProcessCategory::parse(&category).ok_or_else(|| RepositoryError::FieldValueError {
                    field: "process_category".to_string(),
                    message: format!("未知工序类别: {}", category),
                })?;
            let run_range_basis =
                RunRangeBasis::parse(&basis).ok_or_else(|| RepositoryError::FieldValueError {
                    field: "run_range_basis".to_string(),
                    message: format!("未知区间依据: {}", basis),
                })?;

            tiers.push(ReferenceTier {
                product_class,
                process_category,
                process_description: description,
                headcount,
                setup_hours,
                run_rate,
                run_units_per_hour,
                run_range_basis,
                run_low_range: low,
                run_high_range: high,
            });
        }
        Ok(tiers)
    }

    /// 加载为只读参考表
    pub fn load_table(&self) -> RepositoryResult<ReferenceTable> {
        Ok(ReferenceTable::new(self.list_all()?))
    }

    /// 整表替换（单事务）
    ///
    /// # 返回
    /// 写入行数
    pub fn replace_all(
        &self,
        tiers: &[ReferenceTier],
        import_batch_id: Option<&str>,
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute("DELETE FROM reference_tier", [])?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO reference_tier (
                    product_class, process_category, process_description,
                    headcount, setup_hours, run_rate, run_units_per_hour,
                    run_range_basis, run_low_range, run_high_range, import_batch_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )?;

            for t in tiers {
                stmt.execute(params![
                    t.product_class,
                    t.process_category.to_string(),
                    t.process_description,
                    t.headcount,
                    t.setup_hours,
                    t.run_rate,
                    t.run_units_per_hour,
                    t.run_range_basis.to_string(),
                    t.run_low_range,
                    t.run_high_range,
                    import_batch_id,
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(tiers.len())
    }

    /// 表为空时写入内置默认档位
    ///
    /// # 返回
    /// 写入行数（已有数据时为 0）
    pub fn seed_builtin_if_empty(&self) -> RepositoryResult<usize> {
        if self.count()? > 0 {
            return Ok(0);
        }
        let written = self.replace_all(&builtin_tiers(), None)?;
        tracing::info!(rows = written, "参考表为空, 已写入内置默认档位");
        Ok(written)
    }
}
