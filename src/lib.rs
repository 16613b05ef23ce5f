//! 西联智能平台 - 悬架能量回收数据分析模块
//!
//! 本模块对车辆悬架能量回收试验台（减振器、液压/电磁阻尼器、环境传感器）的遥测数据
//! 进行实时分析，输出数据质量评分、统计模式/异常报告以及预测性维护健康评估。
//!
//! # 功能特性
//!
//! - **数据预处理**: 范围钳制、枚举校验、缺失插值、有界缓冲与数据质量评分
//! - **模式识别**: 趋势拟合、自相关周期检测、Z-Score 异常检测、Pearson 相关分析
//! - **预测性维护**: 多因子组件健康评分、退化外推、故障预测
//! - **性能优化**: 基于阈值的优化建议生成与效果评估
//! - **分析编排**: 阈值告警、实时检查、综合分析报告
//!
//! # 示例
//!
//! ```rust
//! use suspension_analytics::{AnalyticsConfiguration, SuspensionDataAnalytics};
//! use suspension_analytics::types::RawShockAbsorberReading;
//!
//! let mut analytics = SuspensionDataAnalytics::new(AnalyticsConfiguration::default()).unwrap();
//! let shock = RawShockAbsorberReading {
//!     generated_power: Some(120.0),
//!     efficiency: Some(0.82),
//!     ..Default::default()
//! };
//! let point = analytics.process_data_point(Some(shock), None, None, None);
//! assert_eq!(point.shock_absorber_data.generated_power, 120.0);
//! ```

pub mod analytics;
pub mod config;
pub mod data_processor;
pub mod pattern_recognition;
pub mod performance_optimizer;
pub mod predictive_maintenance;
pub mod statistics;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

use thiserror::Error;

pub use analytics::{AnalyticsReport, SharedSuspensionAnalytics, SuspensionDataAnalytics};
pub use config::{AlertThresholds, AnalyticsConfiguration};
pub use data_processor::DataProcessor;
pub use pattern_recognition::PatternRecognitionEngine;
pub use performance_optimizer::PerformanceOptimizer;
pub use predictive_maintenance::PredictiveMaintenanceAnalyzer;
pub use types::SuspensionDataPoint;

// ============================================
// 错误类型
// ============================================

/// 分析错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("数据点不足 ({operation}): 需要 {required}, 实际 {actual}")]
    InsufficientData {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("无效的配置: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// 检查数据点数量是否满足分析的最低要求
pub(crate) fn ensure_min_points(operation: &'static str, required: usize, actual: usize) -> Result<()> {
    if actual < required {
        return Err(AnalyticsError::InsufficientData {
            operation,
            required,
            actual,
        });
    }
    Ok(())
}

// ============================================
// 日志
// ============================================

/// 初始化日志输出（默认级别 info，可通过 `RUST_LOG` 覆盖）
///
/// 重复调用是安全的，已初始化时直接返回。
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_min_points() {
        assert!(ensure_min_points("patterns", 10, 10).is_ok());

        let err = ensure_min_points("patterns", 10, 9).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::InsufficientData {
                operation: "patterns",
                required: 10,
                actual: 9,
            }
        );
        assert!(err.to_string().contains("需要 10"));
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
    }
}
