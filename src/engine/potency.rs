// ==========================================
// 补充剂成本核算系统 - 效价解析
// ==========================================
// 职责: 由目录原料的商品名 / 类别 / 组成形态推断有效成分百分比
// 输入: PotencyQuery
// 输出: PotencyResult（可能为兜底结果）
// ==========================================
// 规则顺序（首个命中生效）:
// 1) 维生素 D 以 IU/g 标示
// 2) 名称中明示百分比
// 3) 矿物盐元素含量表
// 4) 酶 / 益生菌
// 5) 非维生素 D 的 IU/g 标示 / 载体稀释 / 未标示标准化的提取物 → 兜底
// 6) 纯品（USP / FCC 或纯品类别）
// 7) 兜底
// ==========================================

use crate::domain::ingredient::{PotencyQuery, PotencyResult};
use crate::domain::types::PotencyConfidence;
use async_trait::async_trait;
use regex::Regex;
use std::error::Error;

// ==========================================
// Trait: PotencyResolver
// ==========================================
// 实现者: 规则解析器 / 外部检索服务
#[async_trait]
pub trait PotencyResolver: Send + Sync {
    /// 解析单个配料的效价
    ///
    /// # 返回
    /// - Ok(Some): 解析结果（越界值由调用方按失败处理）
    /// - Ok(None): 无结果
    /// - Err: 解析失败
    async fn resolve(
        &self,
        query: &PotencyQuery,
    ) -> Result<Option<PotencyResult>, Box<dyn Error + Send + Sync>>;
}

/// 维生素 D 换算: 40 IU = 1 mcg
const VITAMIN_D_IU_PER_MCG: f64 = 40.0;

/// 矿物盐元素含量表: (盐名及别名, 元素, 元素百分比), 首个名称为标准名
const MINERAL_SALTS: &[(&[&str], &str, f64)] = &[
    (&["calcium carbonate"], "calcium", 40.04),
    (&["calcium citrate"], "calcium", 21.10),
    (
        &["dicalcium phosphate", "calcium phosphate dibasic", "dibasic calcium phosphate"],
        "calcium",
        29.46,
    ),
    (&["magnesium oxide"], "magnesium", 60.30),
    (&["magnesium citrate"], "magnesium", 16.20),
    (&["magnesium glycinate", "magnesium bisglycinate"], "magnesium", 14.10),
    (&["zinc oxide"], "zinc", 80.34),
    (&["zinc gluconate"], "zinc", 14.35),
    (&["zinc citrate"], "zinc", 31.00),
    (&["zinc picolinate"], "zinc", 21.10),
    (&["ferrous fumarate", "iron fumarate"], "iron", 32.87),
    (&["iron bisglycinate", "ferrous bisglycinate"], "iron", 20.00),
    (&["chromium picolinate"], "chromium", 12.43),
    (&["sodium selenite", "selenium selenite"], "selenium", 45.66),
    (&["selenomethionine"], "selenium", 40.00),
    (&["potassium chloride"], "potassium", 52.44),
    (&["potassium citrate"], "potassium", 38.28),
    (&["copper gluconate"], "copper", 14.20),
    (&["manganese gluconate"], "manganese", 11.42),
    (&["sodium molybdate"], "molybdenum", 39.66),
];

const ACTIVITY_CATEGORIES: &[&str] = &["enzyme", "probiotic"];

const PURE_CATEGORIES: &[&str] = &[
    "vitamin",
    "amino_acid",
    "protein",
    "fatty_acid",
    "fiber",
    "carbohydrate",
    "antioxidant_compound",
    "excipient",
    "additive",
];

/// 小写并压缩空白, 便于盐名子串匹配
fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn normalize_category(category: &str) -> String {
    category
        .trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}

// ==========================================
// RuleBasedPotencyResolver - 确定性规则解析器
// ==========================================
pub struct RuleBasedPotencyResolver {
    iu_per_gram: Regex,
    vitamin_d: Regex,
    stated_percent: Regex,
    carrier_marker: Regex,
    extract: Regex,
    pure_grade: Regex,
    activity_name: Regex,
}

impl RuleBasedPotencyResolver {
    /// 编译规则表达式
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            iu_per_gram: Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*iu\s*/\s*g\b")?,
            vitamin_d: Regex::new(
                r"(?i)\b(vitamin\s*d[23]?|d[23]|cholecalciferol|ergocalciferol)\b",
            )?,
            stated_percent: Regex::new(r"(\d+(?:\.\d+)?)\s*%\s*([A-Za-z][A-Za-z\-]*)?")?,
            carrier_marker: Regex::new(
                r"(?i)\b(sd|cws|ws|dc|beadlets?|triturate|trituration)\b",
            )?,
            extract: Regex::new(r"(?i)\bextract\b")?,
            pure_grade: Regex::new(r"(?i)\b(usp|fcc)\b")?,
            activity_name: Regex::new(
                r"(?i)\b(enzymes?|protease|amylase|lipase|lactase|cellulase|bromelain|papain|probiotics?|lactobacillus|bifidobacterium|cfu)\b",
            )?,
        })
    }

    /// 按规则顺序求值（同步, 无 I/O）
    pub fn evaluate(&self, query: &PotencyQuery) -> PotencyResult {
        let name = query.matched_trade_name.as_str();
        let category = normalize_category(&query.matched_category);

        let hit = self
            .vitamin_d_rule(name)
            .or_else(|| self.stated_percent_rule(name))
            .or_else(|| self.mineral_rule(query))
            .or_else(|| self.activity_rule(name, &category));

        if let Some((potency, basis, confidence, notes)) = hit {
            return PotencyResult {
                label_name: query.label_name.clone(),
                matched_item_id: query.matched_item_id.clone(),
                potency_percent: potency,
                potency_basis: basis,
                confidence,
                notes,
            };
        }

        // 维生素 D 以外的 IU/g 原料必为稀释形态, 纯度未知
        if self.iu_per_gram.is_match(name) {
            return PotencyResult::fallback(
                query,
                format!("IU/g material without stated percentage: {}", name),
            );
        }
        if self.carrier_marker.is_match(name) {
            return PotencyResult::fallback(
                query,
                format!("carrier-diluted material without stated percentage: {}", name),
            );
        }
        if self.extract.is_match(name) {
            return PotencyResult::fallback(
                query,
                format!("extract without stated standardisation: {}", name),
            );
        }

        if self.pure_grade.is_match(name)
            || PURE_CATEGORIES.contains(&category.as_str())
            || (category == "botanical" && name.to_lowercase().contains("powder"))
        {
            return PotencyResult {
                label_name: query.label_name.clone(),
                matched_item_id: query.matched_item_id.clone(),
                potency_percent: 100.0,
                potency_basis: "pure compound".to_string(),
                confidence: PotencyConfidence::High,
                notes: String::new(),
            };
        }

        PotencyResult::fallback(
            query,
            format!(
                "no potency rule matched trade name '{}' (category {})",
                name, query.matched_category
            ),
        )
    }

    fn vitamin_d_rule(&self, name: &str) -> Option<(f64, String, PotencyConfidence, String)> {
        if !self.vitamin_d.is_match(name) {
            return None;
        }
        let caps = self.iu_per_gram.captures(name)?;
        let iu_per_g: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;

        // IU/g → mcg/g → %（1 g = 1,000,000 mcg）
        let potency = iu_per_g / VITAMIN_D_IU_PER_MCG / 10_000.0;
        Some((
            potency,
            "cholecalciferol (40 IU/mcg)".to_string(),
            PotencyConfidence::High,
            format!("{} IU/g", iu_per_g),
        ))
    }

    fn stated_percent_rule(&self, name: &str) -> Option<(f64, String, PotencyConfidence, String)> {
        let caps = self.stated_percent.captures(name)?;
        let percent: f64 = caps.get(1)?.as_str().parse().ok()?;

        let basis = match caps.get(2).map(|m| m.as_str()) {
            Some(marker) if !self.carrier_marker.is_match(marker) => marker.to_string(),
            _ => "stated dilution".to_string(),
        };

        Some((
            percent,
            basis,
            PotencyConfidence::High,
            format!("stated in trade name: {}", name),
        ))
    }

    fn mineral_rule(&self, query: &PotencyQuery) -> Option<(f64, String, PotencyConfidence, String)> {
        let mut haystacks = vec![normalize_name(&query.matched_trade_name)];
        if let Some(forms) = &query.constituent_forms {
            haystacks.extend(forms.iter().map(|f| normalize_name(&f.name)));
        }

        MINERAL_SALTS
            .iter()
            .find(|(aliases, _, _)| {
                aliases
                    .iter()
                    .any(|alias| haystacks.iter().any(|h| h.contains(alias)))
            })
            .map(|(aliases, element, percent)| {
                (
                    *percent,
                    format!("elemental {}", element),
                    PotencyConfidence::High,
                    format!("{} elemental yield", aliases[0]),
                )
            })
    }

    fn activity_rule(
        &self,
        name: &str,
        category: &str,
    ) -> Option<(f64, String, PotencyConfidence, String)> {
        if ACTIVITY_CATEGORIES.contains(&category) || self.activity_name.is_match(name) {
            return Some((
                100.0,
                "activity-based".to_string(),
                PotencyConfidence::Medium,
                "potency expressed as activity units, mass taken as-is".to_string(),
            ));
        }
        None
    }
}

#[async_trait]
impl PotencyResolver for RuleBasedPotencyResolver {
    async fn resolve(
        &self,
        query: &PotencyQuery,
    ) -> Result<Option<PotencyResult>, Box<dyn Error + Send + Sync>> {
        Ok(Some(self.evaluate(query)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingredient::ConstituentForm;

    fn query(trade_name: &str, category: &str) -> PotencyQuery {
        PotencyQuery {
            label_name: "label".to_string(),
            matched_item_id: "RM-1".to_string(),
            matched_trade_name: trade_name.to_string(),
            matched_category: category.to_string(),
            constituent_forms: None,
        }
    }

    fn resolver() -> RuleBasedPotencyResolver {
        RuleBasedPotencyResolver::new().unwrap()
    }

    #[test]
    fn test_vitamin_d_iu_per_gram() {
        let r = resolver().evaluate(&query("Vitamin D3 100,000 IU/g", "vitamin"));
        assert!((r.potency_percent - 0.25).abs() < 1e-12);
        assert_eq!(r.confidence, PotencyConfidence::High);
    }

    #[test]
    fn test_stated_percent() {
        let r = resolver().evaluate(&query("Turmeric Extract 95% Curcuminoids", "botanical"));
        assert_eq!(r.potency_percent, 95.0);
        assert_eq!(r.potency_basis, "Curcuminoids");

        let r = resolver().evaluate(&query("Vitamin B12 1% SD", "vitamin"));
        assert_eq!(r.potency_percent, 1.0);
        assert_eq!(r.potency_basis, "stated dilution");
    }

    #[test]
    fn test_mineral_salt() {
        let r = resolver().evaluate(&query("Magnesium Oxide Heavy", "mineral"));
        assert_eq!(r.potency_percent, 60.30);
        assert_eq!(r.potency_basis, "elemental magnesium");

        let mut q = query("Mag-Ox 300", "mineral");
        q.constituent_forms = Some(vec![ConstituentForm {
            name: "Magnesium Oxide".to_string(),
            relation: None,
            form_amounts: None,
        }]);
        assert_eq!(resolver().evaluate(&q).potency_percent, 60.30);
    }

    #[test]
    fn test_mineral_salt_aliases() {
        let cases = [
            ("Dicalcium Phosphate Anhydrous", 29.46, "calcium"),
            ("Calcium Phosphate Dibasic Anhydrous", 29.46, "calcium"),
            ("Dibasic Calcium Phosphate Dihydrate", 29.46, "calcium"),
            ("Ferrous Fumarate", 32.87, "iron"),
            ("Iron Fumarate", 32.87, "iron"),
            ("Iron Bisglycinate Chelate", 20.00, "iron"),
            ("Ferrous Bisglycinate Chelate", 20.00, "iron"),
            ("Sodium  Selenite", 45.66, "selenium"),
            ("Selenium Selenite", 45.66, "selenium"),
            ("Sodium Molybdate Dihydrate", 39.66, "molybdenum"),
            ("Molybdenum Sodium Molybdate", 39.66, "molybdenum"),
            ("Magnesium Bisglycinate", 14.10, "magnesium"),
        ];

        for (name, percent, element) in cases {
            let r = resolver().evaluate(&query(name, "mineral"));
            assert_eq!(r.potency_percent, percent, "{}", name);
            assert_eq!(r.confidence, PotencyConfidence::High, "{}", name);
            assert_eq!(r.potency_basis, format!("elemental {}", element), "{}", name);
        }
    }

    #[test]
    fn test_non_vitamin_d_iu_per_gram_flagged() {
        let r = resolver().evaluate(&query("Vitamin A Acetate 500,000 IU/g", "vitamin"));
        assert!(r.is_fallback());
        assert_eq!(r.potency_percent, 100.0);
        assert_eq!(r.confidence, PotencyConfidence::Low);
        assert!(r.notes.contains("IU/g"));

        let r = resolver().evaluate(&query("Vitamin E 1,000 IU/g", "vitamin"));
        assert!(r.is_fallback());
    }

    #[test]
    fn test_enzyme_activity_based() {
        let r = resolver().evaluate(&query("Bromelain 2400 GDU", "botanical"));
        assert_eq!(r.potency_percent, 100.0);
        assert_eq!(r.confidence, PotencyConfidence::Medium);
    }

    #[test]
    fn test_carrier_and_extract_fall_back() {
        let r = resolver().evaluate(&query("Vitamin A Palmitate 250 CWS", "vitamin"));
        assert!(r.is_fallback());
        assert_eq!(r.confidence, PotencyConfidence::Low);

        let r = resolver().evaluate(&query("Green Tea Extract", "botanical"));
        assert!(r.is_fallback());
    }

    #[test]
    fn test_pure_compound() {
        let r = resolver().evaluate(&query("Ascorbic Acid USP", "unknown"));
        assert_eq!(r.potency_percent, 100.0);
        assert_eq!(r.confidence, PotencyConfidence::High);

        let r = resolver().evaluate(&query("L-Theanine", "Amino Acid"));
        assert_eq!(r.confidence, PotencyConfidence::High);
    }

    #[test]
    fn test_unmatched_falls_back() {
        let r = resolver().evaluate(&query("Mystery Blend", "unknown"));
        assert!(r.is_fallback());
        assert_eq!(r.potency_percent, 100.0);
        assert!(r.notes.contains("Mystery Blend"));
    }

    #[tokio::test]
    async fn test_resolve_async() {
        let r = resolver()
            .resolve(&query("Zinc Gluconate", "mineral"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(r.potency_percent, 14.35);
    }
}
