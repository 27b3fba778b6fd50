use thiserror::Error;

/// 统计引擎错误类型
///
/// 所有计算失败都以类型化结果返回给调用方，引擎不重试、不终止进程。
/// 数值退化（零标准误、零方差）不是错误，见 `common` 中的命名策略函数。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Input error: {0}")]
    Input(String),

    #[error("Insufficient sample: {0}")]
    InsufficientSample(String),

    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),

    #[error("Distribution error: {0}")]
    Distribution(String),
}

/// 结果类型别名
pub type AnalysisResult<T> = Result<T, AnalysisError>;
