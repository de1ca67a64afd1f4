// ==========================================
// 补充剂成本核算系统 - 数值舍入工具
// ==========================================
// 规则: 各字段按固定小数位输出（2~8 位）
// ==========================================

/// 四舍五入到指定小数位
pub fn round_dp(value: f64, dp: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(dp as i32);
    (value * factor).round() / factor
}

/// 保留 2 位小数（工时 / 金额）
pub fn round2(value: f64) -> f64 {
    round_dp(value, 2)
}

/// 向上取整到 0.1 小时
///
/// 乘 10 后的浮点噪声（如 7.000000000000001）不应进位
pub fn ceil_to_tenth(value: f64) -> f64 {
    ((value * 10.0) - 1e-9).ceil() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_dp() {
        assert_eq!(round_dp(1.23456, 4), 1.2346);
        assert_eq!(round_dp(250.0, 4), 250.0);
        assert_eq!(round_dp(0.123456789, 8), 0.12345679);
        assert_eq!(round2(-2.345678), -2.35);
    }

    #[test]
    fn test_ceil_to_tenth() {
        assert_eq!(ceil_to_tenth(1.125), 1.2);
        assert_eq!(ceil_to_tenth(0.5), 0.5);
        assert_eq!(ceil_to_tenth(0.7), 0.7);
        assert_eq!(ceil_to_tenth(1.01), 1.1);
    }
}
