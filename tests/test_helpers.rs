// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================
#![allow(dead_code)]

use rusqlite::Connection;
use serde_json::{json, Value};
use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use supplement_costing::app::AppState;
use supplement_costing::db::{ensure_schema, open_sqlite_connection};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径非 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// 创建测试数据库并组装 AppState（内置参考表 + 默认包材目录）
pub fn create_test_state() -> Result<(NamedTempFile, Arc<AppState>), Box<dyn Error>> {
    let (temp_file, db_path) = create_test_db()?;
    let state = AppState::new(db_path)?;
    Ok((temp_file, Arc::new(state)))
}

/// 写出 ORM 参考表 CSV
pub fn write_reference_csv(rows: &[&str]) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
    writeln!(
        file,
        "ProductClass,ProcessCategory,ProcessDescription,Headcount,SetupHours,RunRate,RunUnitsPerHour,RunRangeBasis,RunLowRange,RunHighRange"
    )?;
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    file.flush()?;
    Ok(file)
}

// ==========================================
// 测试请求数据
// ==========================================

/// 三个配料: 纯品 / 矿物盐 / 无规则命中
pub fn assay_request_json() -> Value {
    json!({
        "ingredients": [
            {
                "labelName": "Vitamin C",
                "claimedAmountPerServing": 500.0,
                "servingSize": 2.0,
                "matchedItemId": "RM-ASC-001",
                "matchedTradeName": "Ascorbic Acid USP",
                "matchedCategory": "vitamin",
                "matchedCostPerKg": 12.0
            },
            {
                "labelName": "Magnesium",
                "claimedAmountPerServing": 100.0,
                "servingSize": 2.0,
                "matchedItemId": "RM-MGO-001",
                "matchedTradeName": "Magnesium Oxide Heavy",
                "matchedCategory": "mineral",
                "matchedCostPerKg": 6.2
            },
            {
                "labelName": "Proprietary Blend",
                "claimedAmountPerServing": 50.0,
                "servingSize": 2.0,
                "matchedItemId": "RM-BLD-009",
                "matchedTradeName": "House Blend 9",
                "matchedCategory": "blend",
                "matchedCostPerKg": 40.0
            }
        ],
        "unitsPerFinishedGood": 60.0,
        "finishedGoodQuantity": 5000.0,
        "productForm": "capsule"
    })
}

/// 包装请求（瓶 + 盖 + 标签, 每瓶 60 粒）
pub fn packaging_request_json() -> Value {
    json!({
        "packagingComponents": [
            { "id": "PK-BTL-150", "componentName": "150cc HDPE Bottle White", "uom": "ea", "quantity": 1.0, "costPerPurchasingUoM": 0.11, "moqEaches": 10000.0 },
            { "id": "PK-CAP-38", "componentName": "38mm CRC Cap", "uom": "ea", "quantity": 1.0, "costPerPurchasingUoM": 0.045, "moqEaches": 10000.0 },
            { "id": "PK-LBL-FR", "componentName": "Front Label 2.5x6in", "uom": "M", "quantity": 1.0, "costPerPurchasingUoM": 28.0, "moqEaches": 5000.0 }
        ],
        "unitsPerFinishedGood": 60.0,
        "finishedGoodQuantity": 5000.0
    })
}

/// 浮点近似比较
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}
