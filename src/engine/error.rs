// ==========================================
// 补充剂成本核算系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类:
// - 输入不合法: 计算前拒绝, 指明字段
// - 参考表缺档: 该阶段致命, 指明工序与键值
// - 子阶段失败: 汇总阶段整体失败, 不返回部分总计
// ==========================================

use crate::domain::types::RunRangeBasis;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum CostingError {
    // ===== 输入错误 =====
    #[error("输入不合法 (field={field}): {message}")]
    InvalidInput { field: String, message: String },

    // ===== 参考表错误 =====
    #[error("参考表缺少档位: operation={operation}, basis={basis}, value={value}")]
    ReferenceTierMissing {
        operation: String,
        basis: RunRangeBasis,
        value: f64,
    },

    // ===== 编排错误 =====
    #[error("子阶段 {stage} 执行失败: {source}")]
    StageFailed {
        stage: String,
        #[source]
        source: Box<CostingError>,
    },
}

impl CostingError {
    /// 构造字段校验错误
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        CostingError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 包装为子阶段失败
    pub fn in_stage(self, stage: &str) -> Self {
        CostingError::StageFailed {
            stage: stage.to_string(),
            source: Box::new(self),
        }
    }
}

/// Result 类型别名
pub type CostingResult<T> = Result<T, CostingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_missing_names_key() {
        let err = CostingError::ReferenceTierMissing {
            operation: "Mixing".to_string(),
            basis: RunRangeBasis::RmLines,
            value: 75.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("Mixing"));
        assert!(msg.contains("RM lines"));
        assert!(msg.contains("75"));
    }

    #[test]
    fn test_stage_failed_wraps_source() {
        let err = CostingError::invalid("totalMassKg", "必须大于 0").in_stage("manufacturing-costs");
        let msg = err.to_string();
        assert!(msg.contains("manufacturing-costs"));
        assert!(msg.contains("totalMassKg"));
    }
}
