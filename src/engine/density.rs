// ==========================================
// 补充剂成本核算系统 - 类别堆密度表
// ==========================================
// 单位: g/mL（≡ kg/L）
// 未知类别默认 0.5
// ==========================================

/// 未知类别的默认堆密度
pub const DEFAULT_DENSITY_G_PER_ML: f64 = 0.5;

const CATEGORY_DENSITY: &[(&str, f64)] = &[
    ("mineral", 0.6),
    ("electrolyte", 0.6),
    ("botanical", 0.4),
    ("polyphenol", 0.4),
    ("vitamin", 0.5),
    ("amino_acid", 0.5),
    ("protein", 0.5),
    ("fatty_acid", 0.5),
    ("enzyme", 0.5),
    ("probiotic", 0.5),
    ("fiber", 0.5),
    ("carbohydrate", 0.5),
    ("antioxidant_compound", 0.5),
    ("excipient", 0.5),
    ("additive", 0.5),
];

/// 按类别查堆密度（大小写不敏感）
pub fn density_for_category(category: Option<&str>) -> f64 {
    let key = match category {
        Some(c) => c.trim().to_lowercase(),
        None => return DEFAULT_DENSITY_G_PER_ML,
    };

    CATEGORY_DENSITY
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, d)| *d)
        .unwrap_or(DEFAULT_DENSITY_G_PER_ML)
}
