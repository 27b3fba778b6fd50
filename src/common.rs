//! 共享数值策略
//!
//! 各组件的"分母为零"退化情形统一收敛到这里的命名策略函数，
//! 契约集中可查，而不是散落在各处的条件分支里。

/// 零标准误策略：标准误为零时统计量定义为 0
pub(crate) fn statistic_or_zero(numerator: f64, standard_error: f64) -> f64 {
    if standard_error > 0.0 {
        numerator / standard_error
    } else {
        0.0
    }
}

/// 零方差策略：分母为零时比值定义为 0
pub(crate) fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// 线性插值百分位数
///
/// 输入必须非空且已升序排序，`pct` 取 0..=100。
pub(crate) fn percentile(sorted: &[f64], pct: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let weight = rank - lo as f64;
        sorted[lo] * (1.0 - weight) + sorted[hi] * weight
    }
}
