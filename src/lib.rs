//! 双臂随机实验统计推断引擎
//!
//! 五个相互独立、无状态的组件：样本比例校验（SRM）、双比例 z 检验、
//! Welch 均值差检验、自助法置信区间与 CUPED 方差缩减。
//! 引擎是纯计算层：不取数、不存储、不缓存，调用方提供表格化数据，
//! 组件返回不可变的结果记录。所有随机性由调用方显式给定的种子驱动，
//! 并发调用之间互不干扰。

pub mod bootstrap_estimator;
mod common;
pub mod cuped_adjuster;
pub mod error;
pub mod mean_difference;
pub mod sample_ratio;
pub mod types;

pub use bootstrap_estimator::BootstrapEstimator;
pub use cuped_adjuster::CupedAdjuster;
pub use error::{AnalysisError, AnalysisResult};
pub use mean_difference::MeanDifferenceTest;
pub use proportion_test::ProportionTest;
pub use sample_ratio::SampleRatioChecker;
pub use types::{
    split_binary, split_continuous, ArmCounts, CupedObservation, MomentSummary, UnitRecord,
    VariantLabel, VariantSummary,
};

use serde::{Deserialize, Serialize};

/// 默认自助法重采样次数（建议区间 500–4000）
pub const DEFAULT_RESAMPLE_COUNT: usize = 2000;

/// 默认置信水平
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// 默认 SRM 显著性阈值
pub const DEFAULT_SRM_THRESHOLD: f64 = 0.05;

/// 显著性检验结果
///
/// 效应方向统一为 B − A。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
    pub effect: f64,
    pub degrees_of_freedom: Option<f64>,
    pub confidence_interval: Option<(f64, f64)>,
}

/// 自助法结果
///
/// `distribution` 为原始重采样差值缓冲，供可视化协作方使用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapResult {
    pub point_estimate: f64,
    pub ci_low: f64,
    pub ci_high: f64,
    pub resample_count: usize,
    pub seed: u64,
    pub distribution: Vec<f64>,
}

/// CUPED 调整结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CupedResult {
    pub theta: f64,
    pub variance_reduction_pct: f64,
    pub raw_test: TestResult,
    pub adjusted_test: TestResult,
}

/// 样本比例校验（SRM）结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrmResult {
    pub chi2: f64,
    pub df: f64,
    pub p_value: f64,
    pub flagged: bool,
}
