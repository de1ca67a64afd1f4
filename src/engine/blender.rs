// ==========================================
// 补充剂成本核算系统 - 混合机选型
// ==========================================
// 职责: 按所需体积在固定机型序列中选出批次最少的方案
// 规则:
// - 所需体积 (cu ft) = (总质量 kg / 堆密度 kg/L) / 28.316846592
// - 工作装载系数 0.8, 300 cu ft 机型为 1.0
// - 批次 = max(1, ceil(所需体积 / 工作容量))
// - 排序: 批次少 → 装载率接近 1 → 机型小
// ==========================================

use crate::domain::manufacturing::{BlenderOption, BlenderSelection};
use crate::engine::error::{CostingError, CostingResult};
use std::cmp::Ordering;

/// 每立方英尺升数
pub const LITERS_PER_CU_FT: f64 = 28.316846592;

/// 机型序列 (cu ft)
pub const BLENDER_SIZES_CU_FT: [f64; 5] = [5.0, 12.5, 60.0, 150.0, 300.0];

const WORKING_FILL_FRACTION: f64 = 0.8;
const LARGEST_BLENDER_FILL_FRACTION: f64 = 1.0;

fn working_fill_fraction(size: f64) -> f64 {
    if size >= 300.0 {
        LARGEST_BLENDER_FILL_FRACTION
    } else {
        WORKING_FILL_FRACTION
    }
}

// ==========================================
// BlenderSelector - 混合机选型器
// ==========================================
pub struct BlenderSelector;

impl BlenderSelector {
    /// 所需体积 (cu ft)
    pub fn required_volume_cu_ft(total_mass_kg: f64, bulk_density_kg_per_l: f64) -> f64 {
        total_mass_kg / bulk_density_kg_per_l / LITERS_PER_CU_FT
    }

    /// 枚举所有机型方案（按机型顺序）
    pub fn options(required_cu_ft: f64) -> Vec<BlenderOption> {
        BLENDER_SIZES_CU_FT
            .iter()
            .map(|&size| {
                let working_capacity = size * working_fill_fraction(size);
                let batches = ((required_cu_ft / working_capacity).ceil() as u32).max(1);
                let fill_fraction = (required_cu_ft / (batches as f64 * working_capacity)).min(1.0);
                BlenderOption {
                    blender_size_cu_ft: size,
                    working_capacity_cu_ft: working_capacity,
                    batches,
                    fill_fraction,
                }
            })
            .collect()
    }

    /// 选型
    ///
    /// # 返回
    /// (选中方案, 全部方案)
    pub fn select(
        total_mass_kg: f64,
        bulk_density_kg_per_l: f64,
    ) -> CostingResult<(BlenderSelection, Vec<BlenderOption>)> {
        let required = Self::required_volume_cu_ft(total_mass_kg, bulk_density_kg_per_l);
        let options = Self::options(required);

        let best = options
            .iter()
            .min_by(|a, b| compare_options(a, b))
            .ok_or_else(|| CostingError::invalid("totalMassKg", "无可用混合机机型"))?;
        let selection = BlenderSelection {
            blender_size_cu_ft: best.blender_size_cu_ft,
            batches: best.batches,
            required_volume_cu_ft: required,
            working_capacity_cu_ft: best.working_capacity_cu_ft,
            working_fill_fraction: best.working_capacity_cu_ft / best.blender_size_cu_ft,
        };

        tracing::debug!(
            required_cu_ft = required,
            blender_size = selection.blender_size_cu_ft,
            batches = selection.batches,
            "混合机选型完成"
        );

        Ok((selection, options))
    }
}

fn compare_options(a: &BlenderOption, b: &BlenderOption) -> Ordering {
    a.batches
        .cmp(&b.batches)
        .then_with(|| {
            let da = (1.0 - a.fill_fraction).abs();
            let db = (1.0 - b.fill_fraction).abs();
            da.partial_cmp(&db).unwrap_or(Ordering::Equal)
        })
        .then_with(|| {
            a.blender_size_cu_ft
                .partial_cmp(&b.blender_size_cu_ft)
                .unwrap_or(Ordering::Equal)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select_for_volume(cu_ft: f64) -> BlenderSelection {
        // 密度 1 kg/L 时质量 = 体积(L)
        BlenderSelector::select(cu_ft * LITERS_PER_CU_FT, 1.0).unwrap().0
    }

    #[test]
    fn test_single_batch_medium_volume() {
        let sel = select_for_volume(50.0);
        assert_eq!(sel.blender_size_cu_ft, 150.0);
        assert_eq!(sel.batches, 1);
        assert_eq!(sel.working_fill_fraction, 0.8);
        assert!((sel.required_volume_cu_ft - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_tiny_volume_picks_smallest() {
        let sel = select_for_volume(1.0);
        assert_eq!(sel.blender_size_cu_ft, 5.0);
        assert_eq!(sel.batches, 1);
    }

    #[test]
    fn test_fill_closest_to_one() {
        // 45 cu ft: 60 机型工作容量 48 装载 0.9375 优于 150 机型
        let sel = select_for_volume(45.0);
        assert_eq!(sel.blender_size_cu_ft, 60.0);
        assert_eq!(sel.batches, 1);
    }

    #[test]
    fn test_largest_blender_full_fill() {
        let sel = select_for_volume(290.0);
        assert_eq!(sel.blender_size_cu_ft, 300.0);
        assert_eq!(sel.batches, 1);
        assert_eq!(sel.working_fill_fraction, 1.0);
    }

    #[test]
    fn test_multiple_batches() {
        let sel = select_for_volume(700.0);
        assert_eq!(sel.blender_size_cu_ft, 300.0);
        assert_eq!(sel.batches, 3);
    }

    #[test]
    fn test_options_cover_all_sizes() {
        let options = BlenderSelector::options(50.0);
        assert_eq!(options.len(), 5);
        assert_eq!(options[0].batches, 13); // 50 / 4 = 12.5 → 13
        assert!(options.iter().all(|o| o.fill_fraction <= 1.0 && o.batches >= 1));
    }

    #[test]
    fn test_batches_non_decreasing_in_mass() {
        let mut last = 0;
        for mass in [10.0, 100.0, 1_000.0, 5_000.0, 20_000.0] {
            let (sel, _) = BlenderSelector::select(mass, 0.5).unwrap();
            assert!(sel.batches >= last);
            last = sel.batches;
        }
    }

    #[test]
    fn test_selected_batches_never_exceed_larger_sizes() {
        for step in 1..=480 {
            let cu_ft = step as f64 * 2.5;
            let (sel, options) = BlenderSelector::select(cu_ft * LITERS_PER_CU_FT, 1.0).unwrap();

            let fewest = options.iter().map(|o| o.batches).min().unwrap();
            assert_eq!(sel.batches, fewest, "{} cu ft", cu_ft);
            for larger in options
                .iter()
                .filter(|o| o.blender_size_cu_ft > sel.blender_size_cu_ft)
            {
                assert!(
                    sel.batches <= larger.batches,
                    "{} cu ft: {} batches on {} vs {} on {}",
                    cu_ft,
                    sel.batches,
                    sel.blender_size_cu_ft,
                    larger.batches,
                    larger.blender_size_cu_ft
                );
            }
        }
    }
}
