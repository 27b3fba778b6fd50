//! 实验数据模型
//!
//! 入站数据形态均为纯值对象：按调用创建，字段之外无身份，构造后不可变。
//! 数据获取与缓存是外部协作方的职责，这里只定义形状与一致性约束。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

/// 变体标签（双臂实验：A 为对照组，B 为处理组）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantLabel {
    A,
    B,
}

impl std::fmt::Display for VariantLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariantLabel::A => write!(f, "A"),
            VariantLabel::B => write!(f, "B"),
        }
    }
}

/// 变体级汇总指标（入站形态一）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSummary {
    pub variant: VariantLabel,
    pub units: u64,
    pub successes: u64,
    pub success_rate: f64,
    pub mean: f64,
    pub variance: f64,
}

impl VariantSummary {
    /// 由计数与矩构造
    ///
    /// `success_rate` 由 `successes / units` 派生，一致性约束由构造保证。
    pub fn new(
        variant: VariantLabel,
        units: u64,
        successes: u64,
        mean: f64,
        variance: f64,
    ) -> AnalysisResult<Self> {
        if units == 0 {
            return Err(AnalysisError::InsufficientSample(format!(
                "variant {variant} has zero units"
            )));
        }
        if successes > units {
            return Err(AnalysisError::Input(format!(
                "variant {variant} has {successes} successes out of {units} units"
            )));
        }
        if !variance.is_finite() || variance < 0.0 {
            return Err(AnalysisError::Input(format!(
                "variant {variant} has invalid variance {variance}"
            )));
        }
        Ok(Self {
            variant,
            units,
            successes,
            success_rate: successes as f64 / units as f64,
            mean,
            variance,
        })
    }
}

/// 单元级观测（入站形态二）
///
/// 二元结果取值限定 0/1，在拆分为样本数组时校验。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub unit_id: String,
    pub variant: VariantLabel,
    pub binary_outcomes: HashMap<String, u8>,
    pub continuous_outcomes: HashMap<String, f64>,
    pub pre_period_covariate: Option<f64>,
}

/// 按指标名将单元观测拆分为 (A, B) 两组 0/1 样本
pub fn split_binary(
    records: &[UnitRecord],
    metric: &str,
) -> AnalysisResult<(Vec<f64>, Vec<f64>)> {
    split_with(records, metric, |record| {
        match record.binary_outcomes.get(metric) {
            Some(value) if *value <= 1 => Ok(Some(f64::from(*value))),
            Some(value) => Err(AnalysisError::Input(format!(
                "binary metric '{metric}' has non-binary value {value} for unit {}",
                record.unit_id
            ))),
            None => Ok(None),
        }
    })
}

/// 按指标名将单元观测拆分为 (A, B) 两组连续样本
pub fn split_continuous(
    records: &[UnitRecord],
    metric: &str,
) -> AnalysisResult<(Vec<f64>, Vec<f64>)> {
    split_with(records, metric, |record| {
        Ok(record.continuous_outcomes.get(metric).copied())
    })
}

fn split_with<F>(
    records: &[UnitRecord],
    metric: &str,
    get: F,
) -> AnalysisResult<(Vec<f64>, Vec<f64>)>
where
    F: Fn(&UnitRecord) -> AnalysisResult<Option<f64>>,
{
    let mut control = Vec::new();
    let mut treatment = Vec::new();
    for record in records {
        let value = get(record)?.ok_or_else(|| {
            AnalysisError::Input(format!(
                "metric '{metric}' missing for unit {}",
                record.unit_id
            ))
        })?;
        match record.variant {
            VariantLabel::A => control.push(value),
            VariantLabel::B => treatment.push(value),
        }
    }
    Ok((control, treatment))
}

/// (n, mean, variance) 三元组，汇总统计形式的检验输入
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentSummary {
    pub n: u64,
    pub mean: f64,
    pub variance: f64,
}

impl MomentSummary {
    pub fn new(n: u64, mean: f64, variance: f64) -> Self {
        Self { n, mean, variance }
    }
}

impl From<&VariantSummary> for MomentSummary {
    /// 连续指标视角：取汇总行的 mean / variance
    fn from(summary: &VariantSummary) -> Self {
        Self {
            n: summary.units,
            mean: summary.mean,
            variance: summary.variance,
        }
    }
}

/// 比例检验的臂级计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmCounts {
    pub trials: u64,
    pub successes: u64,
}

impl ArmCounts {
    pub fn new(trials: u64, successes: u64) -> Self {
        Self { trials, successes }
    }
}

impl From<&VariantSummary> for ArmCounts {
    /// 二元指标视角：取汇总行的 units / successes
    fn from(summary: &VariantSummary) -> Self {
        Self {
            trials: summary.units,
            successes: summary.successes,
        }
    }
}

/// CUPED 观测行（入站形态三）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CupedObservation {
    pub variant: VariantLabel,
    pub outcome: f64,
    pub covariate: f64,
}

impl CupedObservation {
    pub fn new(variant: VariantLabel, outcome: f64, covariate: f64) -> Self {
        Self {
            variant,
            outcome,
            covariate,
        }
    }
}
