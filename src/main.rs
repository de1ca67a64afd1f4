// ==========================================
// 补充剂成本核算系统 - 阶段运行器
// ==========================================
// 用法:
//   supplement-costing <stage> <request.json | -> [db_path]
// 阶段: assay / raw-materials / manufacturing / packaging / total / packaging-catalog
// 输出: stdout 为 JSON 响应; 失败时 stderr 为 JSON 错误, 退出码 1
// ==========================================

use std::io::Read;
use std::process::ExitCode;

use supplement_costing::api::{ApiError, CostingStage};
use supplement_costing::app::{get_default_db_path, AppState};
use supplement_costing::logging;

fn usage() -> String {
    let stages: Vec<&str> = CostingStage::ALL.iter().map(|s| s.as_str()).collect();
    format!(
        "用法: supplement-costing <stage> <request.json | -> [db_path]\n可用阶段: {}",
        stages.join(", ")
    )
}

fn read_request(source: &str) -> std::io::Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source)
    }
}

fn error_json(err: &ApiError) -> String {
    serde_json::json!({
        "error": err.to_string(),
        "violations": err.violations(),
    })
    .to_string()
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (stage, source) = match (args.first(), args.get(1)) {
        (Some(stage), Some(source)) => (stage.clone(), source.clone()),
        _ => {
            eprintln!("{}", usage());
            return ExitCode::from(2);
        }
    };
    let db_path = args.get(2).cloned().unwrap_or_else(get_default_db_path);

    tracing::info!("{} v{}", supplement_costing::APP_NAME, supplement_costing::VERSION);
    tracing::info!("使用数据库: {}", db_path);

    let request_json = match read_request(&source) {
        Ok(body) => body,
        Err(e) => {
            eprintln!("无法读取请求 {}: {}", source, e);
            return ExitCode::from(2);
        }
    };

    let state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("初始化失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match state.costing_api.invoke_json(&stage, &request_json).await {
        Ok(response) => {
            println!("{}", response);
            ExitCode::SUCCESS
        }
        Err(ApiError::UnknownStage(name)) => {
            eprintln!("未知核算阶段: {}\n{}", name, usage());
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!(stage = %stage, error = %e, "阶段执行失败");
            eprintln!("{}", error_json(&e));
            ExitCode::FAILURE
        }
    }
}
