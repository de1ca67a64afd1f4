// ==========================================
// 补充剂成本核算系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型, 将引擎 / 仓储 / 导入错误转换为用户可读的错误消息
// 红线: 不可定价的异常必须给出具体、可操作的原因
// ==========================================

use crate::engine::error::CostingError;
use crate::engine::validation::FieldViolation;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 请求字段校验失败（带全部违规字段）
    #[error("请求校验失败: {reason}")]
    ValidationFailed {
        reason: String,
        violations: Vec<FieldViolation>,
    },

    #[error("未知核算阶段: {0}")]
    UnknownStage(String),

    // ==========================================
    // 核算错误
    // ==========================================
    #[error("参考表缺档: {0}")]
    ReferenceTierMissing(String),

    #[error("子阶段 {stage} 执行失败: {message}")]
    StageFailed { stage: String, message: String },

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 由违规列表构造校验错误
    pub fn from_violations(violations: Vec<FieldViolation>) -> Self {
        let reason = match violations.as_slice() {
            [only] => format!("字段 {} {}", only.field, only.message),
            [first, ..] => format!(
                "{} 个字段不合法（首个: {} {}）",
                violations.len(),
                first.field,
                first.message
            ),
            [] => "请求不合法".to_string(),
        };
        ApiError::ValidationFailed { reason, violations }
    }

    /// 违规字段列表（非校验错误时为空）
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            ApiError::ValidationFailed { violations, .. } => violations,
            _ => &[],
        }
    }
}

// ==========================================
// 从 CostingError 转换
// ==========================================
impl From<CostingError> for ApiError {
    fn from(err: CostingError) -> Self {
        match err {
            CostingError::InvalidInput { field, message } => {
                ApiError::from_violations(vec![FieldViolation { field, message }])
            }
            CostingError::ReferenceTierMissing { .. } => ApiError::ReferenceTierMissing(err.to_string()),
            CostingError::StageFailed { stage, source } => ApiError::StageFailed {
                stage,
                message: source.to_string(),
            },
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::DatabaseError(format!("字段{}存储值错误: {}", field, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(repo_err) => repo_err.into(),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidInput(format!("JSON 解析失败: {}", err))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
