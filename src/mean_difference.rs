//! Welch 均值差检验（连续指标）
//!
//! 不假设两臂方差相等，自由度用 Welch–Satterthwaite 公式估计。
//! 既接受 (n, mean, variance) 汇总统计，也接受原始样本序列。

use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

use crate::common::statistic_or_zero;
use crate::error::{AnalysisError, AnalysisResult};
use crate::types::MomentSummary;
use crate::{TestResult, DEFAULT_CONFIDENCE_LEVEL};

/// Welch t 检验
#[derive(Debug, Clone)]
pub struct MeanDifferenceTest {
    confidence_level: f64,
}

impl Default for MeanDifferenceTest {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_LEVEL)
    }
}

impl MeanDifferenceTest {
    pub fn new(confidence_level: f64) -> Self {
        Self { confidence_level }
    }

    /// 基于汇总统计检验，效应方向为 B − A
    ///
    /// 两臂方差均为零时没有离散度，统计量按零标准误策略取 0。
    pub fn from_summary(
        &self,
        control: MomentSummary,
        treatment: MomentSummary,
    ) -> AnalysisResult<TestResult> {
        validate_summary(control, "control")?;
        validate_summary(treatment, "treatment")?;

        let n_a = control.n as f64;
        let n_b = treatment.n as f64;
        let se = (control.variance / n_a + treatment.variance / n_b).sqrt();
        let effect = treatment.mean - control.mean;
        let t = statistic_or_zero(effect, se);

        let df = welch_satterthwaite(control, treatment);
        if df <= 0.0 {
            return Err(AnalysisError::InsufficientSample(format!(
                "{} observations across both arms leave no degrees of freedom",
                control.n + treatment.n
            )));
        }

        let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| {
            AnalysisError::Distribution(format!("failed to create t-distribution: {e}"))
        })?;
        let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));

        let t_critical = dist.inverse_cdf(0.5 + self.confidence_level / 2.0);
        let confidence_interval = (effect - t_critical * se, effect + t_critical * se);

        Ok(TestResult {
            statistic: t,
            p_value,
            effect,
            degrees_of_freedom: Some(df),
            confidence_interval: Some(confidence_interval),
        })
    }

    /// 基于原始样本检验，先计算均值与样本方差（除数 n−1）
    pub fn from_samples(&self, control: &[f64], treatment: &[f64]) -> AnalysisResult<TestResult> {
        let control = sample_moments(control, "control")?;
        let treatment = sample_moments(treatment, "treatment")?;
        self.from_summary(control, treatment)
    }
}

fn validate_summary(summary: MomentSummary, name: &str) -> AnalysisResult<()> {
    if summary.n == 0 {
        return Err(AnalysisError::InsufficientSample(format!(
            "{name} arm has zero units"
        )));
    }
    if !summary.variance.is_finite() || summary.variance < 0.0 {
        return Err(AnalysisError::Input(format!(
            "{name} arm has invalid variance {}",
            summary.variance
        )));
    }
    Ok(())
}

fn sample_moments(values: &[f64], name: &str) -> AnalysisResult<MomentSummary> {
    if values.len() < 2 {
        return Err(AnalysisError::InsufficientSample(format!(
            "{name} arm needs at least two observations, got {}",
            values.len()
        )));
    }
    Ok(MomentSummary {
        n: values.len() as u64,
        mean: values.mean(),
        variance: values.variance(),
    })
}

/// Welch–Satterthwaite 自由度
///
/// 精确公式的分母为零时（某臂只有一个观测，或两臂方差均为零）
/// 退化为 n_a + n_b − 2。
fn welch_satterthwaite(control: MomentSummary, treatment: MomentSummary) -> f64 {
    let n_a = control.n as f64;
    let n_b = treatment.n as f64;
    let fallback = n_a + n_b - 2.0;
    if control.n < 2 || treatment.n < 2 {
        return fallback;
    }

    let term_a = control.variance / n_a;
    let term_b = treatment.variance / n_b;
    let denominator = term_a * term_a / (n_a - 1.0) + term_b * term_b / (n_b - 1.0);
    if denominator > 0.0 {
        (term_a + term_b).powi(2) / denominator
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_summaries_yield_null_result() {
        let test = MeanDifferenceTest::default();
        let summary = MomentSummary::new(1000, 2.5, 1.8);
        let result = test.from_summary(summary, summary).unwrap();

        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.effect, 0.0);
        assert!((result.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_matches_samples() {
        // 同一数据的两种入口给出同一结果
        let test = MeanDifferenceTest::default();
        let control = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let treatment = vec![2.0, 3.0, 4.0, 5.0, 6.0];

        let from_samples = test.from_samples(&control, &treatment).unwrap();
        let from_summary = test
            .from_summary(
                MomentSummary::new(5, 3.0, 2.5),
                MomentSummary::new(5, 4.0, 2.5),
            )
            .unwrap();

        assert!((from_samples.statistic - from_summary.statistic).abs() < 1e-12);
        assert!((from_samples.p_value - from_summary.p_value).abs() < 1e-12);
    }

    #[test]
    fn test_welch_degrees_of_freedom() {
        // 方差不等时 df 介于 min(n)−1 和 n_a+n_b−2 之间
        let test = MeanDifferenceTest::default();
        let result = test
            .from_summary(
                MomentSummary::new(10, 1.0, 0.5),
                MomentSummary::new(40, 1.5, 4.0),
            )
            .unwrap();

        let df = result.degrees_of_freedom.unwrap();
        assert!(df > 9.0 && df < 48.0);
    }

    #[test]
    fn test_single_unit_arm_uses_fallback_df() {
        // n_a=1 时精确公式分母为零，退化为 n_a+n_b−2
        let test = MeanDifferenceTest::default();
        let result = test
            .from_summary(
                MomentSummary::new(1, 2.0, 0.0),
                MomentSummary::new(50, 2.4, 1.1),
            )
            .unwrap();

        assert_eq!(result.degrees_of_freedom, Some(49.0));
    }

    #[test]
    fn test_zero_variances_use_fallback_df() {
        let test = MeanDifferenceTest::default();
        let result = test
            .from_summary(
                MomentSummary::new(10, 2.0, 0.0),
                MomentSummary::new(10, 2.0, 0.0),
            )
            .unwrap();

        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.degrees_of_freedom, Some(18.0));
        assert!((result.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_interval_brackets_effect() {
        let test = MeanDifferenceTest::default();
        let result = test
            .from_summary(
                MomentSummary::new(200, 2.0, 1.5),
                MomentSummary::new(200, 2.3, 1.7),
            )
            .unwrap();

        let (low, high) = result.confidence_interval.unwrap();
        assert!(low < result.effect && result.effect < high);
        assert!((result.effect - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_short_samples_are_insufficient() {
        let test = MeanDifferenceTest::default();
        let err = test.from_samples(&[1.0], &[2.0, 3.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientSample(_)));
    }

    #[test]
    fn test_two_single_unit_arms_are_insufficient() {
        // fallback df 也为零，无法检验
        let test = MeanDifferenceTest::default();
        let err = test
            .from_summary(
                MomentSummary::new(1, 2.0, 0.0),
                MomentSummary::new(1, 3.0, 0.0),
            )
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientSample(_)));
    }

    #[test]
    fn test_zero_unit_summary_is_insufficient() {
        let test = MeanDifferenceTest::default();
        let err = test
            .from_summary(
                MomentSummary::new(0, 0.0, 0.0),
                MomentSummary::new(10, 2.0, 1.0),
            )
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientSample(_)));
    }
}
