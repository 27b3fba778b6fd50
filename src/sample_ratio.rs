//! 样本比例校验（SRM）
//!
//! 随机分流被破坏时，观测到的变体分配会偏离预期分配比例，
//! 用卡方拟合优度检验来发现这种偏离。对 SRM 检出的实验，
//! 其余检验结果不可信，应由调用方优先处理。

use statrs::distribution::{ChiSquared, ContinuousCDF};
use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};
use crate::{SrmResult, DEFAULT_SRM_THRESHOLD};

/// 样本比例校验器
///
/// 该组件允许两臂以上的分配，变体数由观测计数序列的长度决定。
#[derive(Debug, Clone)]
pub struct SampleRatioChecker {
    significance_threshold: f64,
}

impl Default for SampleRatioChecker {
    fn default() -> Self {
        Self::new(DEFAULT_SRM_THRESHOLD)
    }
}

impl SampleRatioChecker {
    pub fn new(significance_threshold: f64) -> Self {
        Self {
            significance_threshold,
        }
    }

    /// 校验观测计数与预期分配比例
    ///
    /// `expected_proportions` 省略时使用均匀分配。
    pub fn check(
        &self,
        observed: &[u64],
        expected_proportions: Option<&[f64]>,
    ) -> AnalysisResult<SrmResult> {
        let arms = observed.len();
        if arms < 2 {
            return Err(AnalysisError::Input(format!(
                "sample ratio check needs at least two arms, got {arms}"
            )));
        }

        let uniform = vec![1.0 / arms as f64; arms];
        let proportions = expected_proportions.unwrap_or(&uniform);
        if proportions.len() != arms {
            return Err(AnalysisError::Input(format!(
                "expected {arms} proportions, got {}",
                proportions.len()
            )));
        }

        let total: u64 = observed.iter().sum();
        let mut chi2 = 0.0;
        for (count, proportion) in observed.iter().zip(proportions) {
            let expected = proportion * total as f64;
            if expected <= 0.0 {
                return Err(AnalysisError::InvalidAllocation(format!(
                    "expected count is zero for proportion {proportion}"
                )));
            }
            let delta = *count as f64 - expected;
            chi2 += delta * delta / expected;
        }

        let df = (arms - 1) as f64;
        let dist = ChiSquared::new(df).map_err(|e| {
            AnalysisError::Distribution(format!("failed to create chi-squared distribution: {e}"))
        })?;
        let p_value = 1.0 - dist.cdf(chi2);
        debug!("SRM check: chi2={}, df={}, p={}", chi2, df, p_value);

        Ok(SrmResult {
            chi2,
            df,
            p_value,
            flagged: p_value <= self.significance_threshold,
        })
    }
}
