// ==========================================
// 补充剂成本核算系统 - 领域类型定义
// ==========================================
// 依据: 成本核算流水线 - 3. 数据模型
// 序列化格式: 与上游 JSON 请求保持一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 产品剂型 (Product Form)
// ==========================================
// 决定是否追加包衣/胶囊填充工序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductForm {
    Tablet,  // 片剂 → Coating
    Capsule, // 胶囊 → Encapsulation
}

impl fmt::Display for ProductForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductForm::Tablet => write!(f, "tablet"),
            ProductForm::Capsule => write!(f, "capsule"),
        }
    }
}

impl ProductForm {
    /// 从字符串解析剂型（大小写不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "tablet" => Some(ProductForm::Tablet),
            "capsule" => Some(ProductForm::Capsule),
            _ => None,
        }
    }

    /// 剂型对应的成型工序
    pub fn form_operation(&self) -> OperationKind {
        match self {
            ProductForm::Tablet => OperationKind::Coating,
            ProductForm::Capsule => OperationKind::Encapsulation,
        }
    }
}

// ==========================================
// 效价置信度 (Potency Confidence)
// ==========================================
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PotencyConfidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for PotencyConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PotencyConfidence::Low => write!(f, "low"),
            PotencyConfidence::Medium => write!(f, "medium"),
            PotencyConfidence::High => write!(f, "high"),
        }
    }
}

// ==========================================
// 包材计量单位 (Packaging UoM)
// ==========================================
// "ea" = 按个计价, "M" = 按千个计价
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackagingUom {
    #[serde(rename = "ea")]
    Each,
    #[serde(rename = "M")]
    PerThousand,
}

impl fmt::Display for PackagingUom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackagingUom::Each => write!(f, "ea"),
            PackagingUom::PerThousand => write!(f, "M"),
        }
    }
}

impl PackagingUom {
    /// 从字符串解析计量单位
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "ea" | "EA" | "each" => Some(PackagingUom::Each),
            "M" | "per-thousand" => Some(PackagingUom::PerThousand),
            _ => None,
        }
    }

    /// 将采购单位价格换算为单个价格
    pub fn cost_each(&self, cost_per_uom: f64) -> f64 {
        match self {
            PackagingUom::Each => cost_per_uom,
            PackagingUom::PerThousand => cost_per_uom / 1000.0,
        }
    }
}

// ==========================================
// 工序类别 (Process Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessCategory {
    Manufacturing,
    Packaging,
}

impl fmt::Display for ProcessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessCategory::Manufacturing => write!(f, "Manufacturing"),
            ProcessCategory::Packaging => write!(f, "Packaging"),
        }
    }
}

impl ProcessCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Manufacturing" => Some(ProcessCategory::Manufacturing),
            "Packaging" => Some(ProcessCategory::Packaging),
            _ => None,
        }
    }
}

// ==========================================
// 档位区间依据 (Run Range Basis)
// ==========================================
// 制造工序按原料行数分档, 包装工序按单瓶装量分档
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunRangeBasis {
    #[serde(rename = "RM lines")]
    RmLines,
    #[serde(rename = "Inner fill")]
    InnerFill,
}

impl fmt::Display for RunRangeBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunRangeBasis::RmLines => write!(f, "RM lines"),
            RunRangeBasis::InnerFill => write!(f, "Inner fill"),
        }
    }
}

impl RunRangeBasis {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "RM lines" => Some(RunRangeBasis::RmLines),
            "Inner fill" => Some(RunRangeBasis::InnerFill),
            _ => None,
        }
    }
}

// ==========================================
// 工序类型 (Operation Kind)
// ==========================================
// 取代按工序类型的多态分发
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    #[serde(rename = "Weigh-Up")]
    WeighUp,
    Mixing,
    Coating,
    Encapsulation,
    Packaging,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl OperationKind {
    /// 参考表中的工序描述
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::WeighUp => "Weigh-Up",
            OperationKind::Mixing => "Mixing",
            OperationKind::Coating => "Coating",
            OperationKind::Encapsulation => "Encapsulation",
            OperationKind::Packaging => "Packaging",
        }
    }
}

// ==========================================
// 包装线类型 (Packaging Line)
// ==========================================
// 含玻璃瓶组件时走玻璃瓶线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackagingLine {
    #[serde(rename = "Bottle - Normal")]
    BottleNormal,
    #[serde(rename = "Bottle - Glass")]
    BottleGlass,
}

impl fmt::Display for PackagingLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PackagingLine {
    /// 参考表中的工序描述
    pub fn as_str(&self) -> &'static str {
        match self {
            PackagingLine::BottleNormal => "Bottle - Normal",
            PackagingLine::BottleGlass => "Bottle - Glass",
        }
    }
}
