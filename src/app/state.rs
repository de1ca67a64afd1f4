// ==========================================
// 补充剂成本核算系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 启动顺序: 打开数据库 → 建表 → 种子数据 → 物化配置与参考表 → 组装 API
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::CostingApi;
use crate::config::{ConfigManager, CostingConfig};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::reference::ReferenceTable;
use crate::engine::{PotencyResolver, RuleBasedPotencyResolver};
use crate::repository::{PackagingCatalogRepository, ReferenceTierRepository};

/// 应用状态
///
/// 参考表与配置在启动时物化, 进程生命周期内只读
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器（用于配置查询与快照）
    pub config_manager: Arc<ConfigManager>,

    /// 启动时物化的核算配置
    pub costing_config: Arc<CostingConfig>,

    /// 启动时加载的工时参考表
    pub reference_table: Arc<ReferenceTable>,

    /// 参考表仓储（用于导入）
    pub reference_repo: Arc<ReferenceTierRepository>,

    /// 成本核算API
    pub costing_api: Arc<CostingApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        let resolver = RuleBasedPotencyResolver::new()
            .map_err(|e| format!("效价规则表编译失败: {}", e))?;
        Self::with_resolver(db_path, Arc::new(resolver))
    }

    /// 使用指定效价解析器创建 AppState（测试或外部解析服务）
    pub fn with_resolver(
        db_path: String,
        resolver: Arc<dyn PotencyResolver>,
    ) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn =
            open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let reference_repo = Arc::new(ReferenceTierRepository::from_connection(conn.clone()));
        let catalog_repo = Arc::new(PackagingCatalogRepository::from_connection(conn.clone()));

        reference_repo
            .seed_builtin_if_empty()
            .map_err(|e| format!("参考表种子数据写入失败: {}", e))?;
        catalog_repo
            .seed_defaults_if_empty()
            .map_err(|e| format!("包材目录种子数据写入失败: {}", e))?;

        // ==========================================
        // 物化配置与参考表
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let costing_config = Arc::new(
            config_manager
                .load_costing_config()
                .map_err(|e| format!("核算配置加载失败: {}", e))?,
        );
        let reference_table = Arc::new(
            reference_repo
                .load_table()
                .map_err(|e| format!("参考表加载失败: {}", e))?,
        );
        tracing::info!(tiers = reference_table.len(), "工时参考表已加载");

        // ==========================================
        // 创建API实例
        // ==========================================
        let costing_api = Arc::new(CostingApi::new(
            resolver,
            reference_table.clone(),
            costing_config.clone(),
            catalog_repo,
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config_manager,
            costing_config,
            reference_table,
            reference_repo,
            costing_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先使用环境变量 SUPPLEMENT_COSTING_DB_PATH, 否则放在用户数据目录下
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("SUPPLEMENT_COSTING_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./supplement_costing.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("supplement-costing");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("supplement_costing.db");
        }
    }

    path.to_string_lossy().to_string()
}
