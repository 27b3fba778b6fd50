//! CUPED 方差缩减
//!
//! 用与结果指标相关的实验前协变量消减结果方差：
//! `Y' = Y − theta·(X − mean(X))`，theta 在两臂合并样本上估计。
//! 协变量与结果不相关时调整近似无效但无害，协变量恒定时严格等价于不调整。

use statrs::statistics::Statistics;
use tracing::debug;

use crate::common::ratio_or_zero;
use crate::error::{AnalysisError, AnalysisResult};
use crate::mean_difference::MeanDifferenceTest;
use crate::types::{CupedObservation, VariantLabel};
use crate::{CupedResult, DEFAULT_CONFIDENCE_LEVEL};

/// CUPED 调整器
///
/// 调整前后的效应都用 Welch 检验（B vs A）报告，供调用方对照。
#[derive(Debug, Clone)]
pub struct CupedAdjuster {
    mean_test: MeanDifferenceTest,
}

impl Default for CupedAdjuster {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_LEVEL)
    }
}

impl CupedAdjuster {
    pub fn new(confidence_level: f64) -> Self {
        Self {
            mean_test: MeanDifferenceTest::new(confidence_level),
        }
    }

    /// 估计 theta、调整结果并对比调整前后的检验
    ///
    /// theta 与协变量均值都在合并样本上计算（ddof=1），
    /// `Var(X)=0` 时按零方差策略取 theta=0，调整退化为恒等变换。
    pub fn adjust(&self, rows: &[CupedObservation]) -> AnalysisResult<CupedResult> {
        if rows.len() < 2 {
            return Err(AnalysisError::InsufficientSample(format!(
                "CUPED needs at least two observations, got {}",
                rows.len()
            )));
        }

        let n = rows.len() as f64;
        let covariate_mean = rows.iter().map(|row| row.covariate).sum::<f64>() / n;
        let outcome_mean = rows.iter().map(|row| row.outcome).sum::<f64>() / n;

        let mut covariance = 0.0;
        let mut covariate_variance = 0.0;
        for row in rows {
            let dx = row.covariate - covariate_mean;
            covariance += (row.outcome - outcome_mean) * dx;
            covariate_variance += dx * dx;
        }
        covariance /= n - 1.0;
        covariate_variance /= n - 1.0;
        let theta = ratio_or_zero(covariance, covariate_variance);

        let mut raw_control = Vec::new();
        let mut raw_treatment = Vec::new();
        let mut adjusted_control = Vec::new();
        let mut adjusted_treatment = Vec::new();
        for row in rows {
            let adjusted = row.outcome - theta * (row.covariate - covariate_mean);
            match row.variant {
                VariantLabel::A => {
                    raw_control.push(row.outcome);
                    adjusted_control.push(adjusted);
                }
                VariantLabel::B => {
                    raw_treatment.push(row.outcome);
                    adjusted_treatment.push(adjusted);
                }
            }
        }

        let raw_test = self.mean_test.from_samples(&raw_control, &raw_treatment)?;
        let adjusted_test = self
            .mean_test
            .from_samples(&adjusted_control, &adjusted_treatment)?;

        // 两臂方差的均值之比衡量缩减幅度；原方差为零时缩减无定义，取 0
        let raw_variance = arm_variance_mean(&raw_control, &raw_treatment);
        let adjusted_variance = arm_variance_mean(&adjusted_control, &adjusted_treatment);
        let variance_reduction_pct = if raw_variance > 0.0 {
            100.0 * (1.0 - adjusted_variance / raw_variance)
        } else {
            0.0
        };
        debug!(
            "CUPED: theta={}, variance reduction={}%",
            theta, variance_reduction_pct
        );

        Ok(CupedResult {
            theta,
            variance_reduction_pct,
            raw_test,
            adjusted_test,
        })
    }
}

fn arm_variance_mean(control: &[f64], treatment: &[f64]) -> f64 {
    (control.variance() + treatment.variance()) / 2.0
}
