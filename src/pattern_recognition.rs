//! 模式识别
//!
//! 对一段数据窗口计算趋势方向、周期性、异常点、变量相关性以及启发式性能模式。
//! 异常检测基线保存在引擎实例上，每次分析按当前窗口重新计算。

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::statistics::{
    autocorrelation, correlation_significance, linear_regression_slope, mean, pearson_correlation,
    RunningStats, EPSILON,
};
use crate::types::{
    AnomalyDetection, AnomalyType, CorrelationAnalysis, Relationship, Severity,
    SuspensionDataPoint, TrendDirection,
};
use crate::{ensure_min_points, Result};

/// 模式分析所需的最少数据点
pub const MIN_PATTERN_POINTS: usize = 10;

const TREND_STABLE_SLOPE: f64 = 0.01;
const SEASONALITY_MIN_POINTS: usize = 50;
const MAX_AUTOCORRELATION_LAG: usize = 100;
const SEASONALITY_THRESHOLD: f64 = 0.3;
const CORRELATION_RETENTION: f64 = 0.1;

/// 异常等级的基础 Z-Score 阈值: low, medium, high, critical
const BASE_SEVERITY_THRESHOLDS: [f64; 4] = [2.0, 3.0, 4.0, 5.0];

const HIGH_EFFICIENCY_LEVEL: f64 = 0.8;
const HIGH_EFFICIENCY_MIN_FREQUENCY: f64 = 0.10;
const POWER_PEAK_FACTOR: f64 = 1.5;
const POWER_PEAK_MIN_FREQUENCY: f64 = 0.05;
const HIGH_TEMPERATURE: f64 = 80.0;
const TEMPERATURE_EFFICIENCY_RATIO: f64 = 0.9;
const ROUGH_ROAD_ROUGHNESS: f64 = 5.0;
const ROUGH_ROAD_POWER_RATIO: f64 = 1.2;

// ============================================
// 结果类型
// ============================================

/// 单个指标的趋势
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTrend {
    pub metric: String,
    pub slope: f64,
    pub direction: TrendDirection,
}

/// 周期性检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityResult {
    pub is_seasonal: bool,
    /// 最大自相关绝对值
    pub strength: f64,
    /// 自相关最强的滞后（采样数）
    pub dominant_period: Option<usize>,
}

impl SeasonalityResult {
    fn none() -> Self {
        Self {
            is_seasonal: false,
            strength: 0.0,
            dominant_period: None,
        }
    }
}

/// 模式影响方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternImpact {
    Positive,
    Negative,
}

/// 性能模式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePattern {
    pub name: String,
    /// 满足条件的数据点占比
    pub frequency: f64,
    pub conditions: Vec<String>,
    pub impact: PatternImpact,
    pub recommendation: String,
}

/// 模式分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysisResult {
    pub trend_direction: TrendDirection,
    pub metric_trends: Vec<MetricTrend>,
    pub seasonality: SeasonalityResult,
    pub anomalies: Vec<AnomalyDetection>,
    pub correlations: Vec<CorrelationAnalysis>,
    pub performance_patterns: Vec<PerformancePattern>,
    pub data_points: usize,
    pub analyzed_at: DateTime<Utc>,
}

/// 指标基线
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricBaseline {
    pub mean: f64,
    pub std_dev: f64,
    pub samples: usize,
}

// ============================================
// 模式识别引擎
// ============================================

/// 模式识别引擎
#[derive(Debug, Clone)]
pub struct PatternRecognitionEngine {
    sensitivity: f64,
    baselines: AHashMap<AnomalyType, MetricBaseline>,
}

impl PatternRecognitionEngine {
    /// 创建引擎，sensitivity 会被限制在 [0, 1]
    pub fn new(sensitivity: f64) -> Self {
        Self {
            sensitivity: sensitivity.clamp(0.0, 1.0),
            baselines: AHashMap::new(),
        }
    }

    /// 完整模式分析（至少 10 个数据点）
    pub fn analyze_patterns(&mut self, data: &[SuspensionDataPoint]) -> Result<PatternAnalysisResult> {
        ensure_min_points("pattern_analysis", MIN_PATTERN_POINTS, data.len())?;

        let metric_trends = self.metric_trends(data);
        let directions: Vec<TrendDirection> = metric_trends.iter().map(|t| t.direction).collect();
        let trend_direction = combine_trends(&directions);

        let seasonality = self.detect_seasonality(data);
        let anomalies = self.detect_anomalies(data);
        let correlations = self.analyze_correlations(data);
        let performance_patterns = self.detect_performance_patterns(data);

        debug!(
            "模式分析完成: {} 个数据点, 趋势={:?}, 异常={}, 相关={}, 模式={}",
            data.len(),
            trend_direction,
            anomalies.len(),
            correlations.len(),
            performance_patterns.len()
        );

        Ok(PatternAnalysisResult {
            trend_direction,
            metric_trends,
            seasonality,
            anomalies,
            correlations,
            performance_patterns,
            data_points: data.len(),
            analyzed_at: Utc::now(),
        })
    }

    // ============================================
    // 趋势
    // ============================================

    fn metric_trends(&self, data: &[SuspensionDataPoint]) -> Vec<MetricTrend> {
        let power: Vec<f64> = data.iter().map(SuspensionDataPoint::harvested_power).collect();
        let efficiency: Vec<f64> = data.iter().map(SuspensionDataPoint::mean_efficiency).collect();

        [("harvested_power", power), ("efficiency", efficiency)]
            .into_iter()
            .map(|(metric, values)| {
                let slope = linear_regression_slope(&values);
                MetricTrend {
                    metric: metric.to_string(),
                    slope,
                    direction: classify_slope(slope),
                }
            })
            .collect()
    }

    // ============================================
    // 周期性
    // ============================================

    /// 基于回收功率自相关的周期性检测（至少 50 个数据点）
    pub fn detect_seasonality(&self, data: &[SuspensionDataPoint]) -> SeasonalityResult {
        if data.len() < SEASONALITY_MIN_POINTS {
            return SeasonalityResult::none();
        }

        let power: Vec<f64> = data.iter().map(SuspensionDataPoint::harvested_power).collect();
        let max_lag = (power.len() / 4).min(MAX_AUTOCORRELATION_LAG);

        let strongest = (1..=max_lag)
            .map(|lag| (lag, autocorrelation(&power, lag).abs()))
            .fold(None, |best: Option<(usize, f64)>, (lag, ac)| match best {
                Some((_, best_ac)) if best_ac >= ac => best,
                _ => Some((lag, ac)),
            });

        match strongest {
            Some((lag, strength)) => SeasonalityResult {
                is_seasonal: strength > SEASONALITY_THRESHOLD,
                strength,
                dominant_period: Some(lag),
            },
            None => SeasonalityResult::none(),
        }
    }

    // ============================================
    // 异常检测
    // ============================================

    /// 当前灵敏度下的等级阈值: [low, medium, high, critical]
    pub fn severity_thresholds(&self) -> [f64; 4] {
        BASE_SEVERITY_THRESHOLDS.map(|t| t * (1.0 - self.sensitivity))
    }

    /// 最近一次异常检测使用的基线
    pub fn baseline(&self, metric: AnomalyType) -> Option<MetricBaseline> {
        self.baselines.get(&metric).copied()
    }

    /// Z-Score 异常检测：基线在整个输入窗口上重新计算
    pub fn detect_anomalies(&mut self, data: &[SuspensionDataPoint]) -> Vec<AnomalyDetection> {
        self.rebuild_baselines(data);

        let thresholds = self.severity_thresholds();
        let mut anomalies = Vec::new();
        for point in data {
            self.score_point(point, &thresholds, &mut anomalies);
        }

        anomalies.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| b.severity.cmp(&a.severity))
        });
        anomalies
    }

    /// 以整个窗口为基线，只对窗口中最后一个点评分
    pub fn detect_latest_anomalies(&mut self, window: &[SuspensionDataPoint]) -> Vec<AnomalyDetection> {
        let Some(latest) = window.last() else {
            return Vec::new();
        };
        self.rebuild_baselines(window);

        let thresholds = self.severity_thresholds();
        let mut anomalies = Vec::new();
        self.score_point(latest, &thresholds, &mut anomalies);
        anomalies.sort_by(|a, b| b.severity.cmp(&a.severity));
        anomalies
    }

    fn rebuild_baselines(&mut self, data: &[SuspensionDataPoint]) {
        self.baselines = AnomalyType::ALL
            .as_slice()
            .par_iter()
            .map(|&metric| {
                let stats: RunningStats = data.iter().map(|p| metric.value_of(p)).collect();
                (
                    metric,
                    MetricBaseline {
                        mean: stats.mean(),
                        std_dev: stats.std_dev(),
                        samples: stats.count(),
                    },
                )
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect();
    }

    fn score_point(
        &self,
        point: &SuspensionDataPoint,
        thresholds: &[f64; 4],
        anomalies: &mut Vec<AnomalyDetection>,
    ) {
        for metric in AnomalyType::ALL {
            let Some(baseline) = self.baselines.get(&metric) else {
                continue;
            };
            if baseline.std_dev < EPSILON {
                continue;
            }

            let value = metric.value_of(point);
            let z = (value - baseline.mean).abs() / baseline.std_dev;
            if let Some(severity) = classify_deviation(z, thresholds) {
                anomalies.push(AnomalyDetection {
                    anomaly_type: metric,
                    severity,
                    value,
                    expected_value: baseline.mean,
                    deviation: z,
                    timestamp: point.timestamp,
                    description: format!(
                        "{} 为 {:.2}，偏离基线 {:.2} 达 {:.1} 个标准差",
                        metric.label(),
                        value,
                        baseline.mean,
                        z
                    ),
                });
            }
        }
    }

    // ============================================
    // 相关性
    // ============================================

    /// 固定变量对的 Pearson 相关分析，仅保留 |r| > 0.1
    pub fn analyze_correlations(&self, data: &[SuspensionDataPoint]) -> Vec<CorrelationAnalysis> {
        let power: Vec<f64> = data.iter().map(SuspensionDataPoint::harvested_power).collect();
        let column = |f: fn(&SuspensionDataPoint) -> f64| -> Vec<f64> { data.iter().map(f).collect() };

        let pairs = [
            (
                "vehicle_speed",
                "harvested_power",
                column(|p| p.environmental_data.vehicle_speed),
                power.clone(),
            ),
            (
                "road_roughness",
                "harvested_power",
                column(|p| p.environmental_data.road_roughness),
                power,
            ),
            (
                "operating_temperature",
                "efficiency",
                column(|p| p.shock_absorber_data.operating_temperature),
                column(SuspensionDataPoint::mean_efficiency),
            ),
            (
                "storage_soc",
                "harvested_energy",
                column(|p| p.integration_data.storage_soc),
                column(|p| p.integration_data.harvested_energy),
            ),
        ];

        pairs
            .into_iter()
            .filter_map(|(v1, v2, x, y)| {
                let r = pearson_correlation(&x, &y);
                if r.abs() <= CORRELATION_RETENTION {
                    return None;
                }
                Some(CorrelationAnalysis {
                    variable1: v1.to_string(),
                    variable2: v2.to_string(),
                    correlation_coefficient: r,
                    significance: correlation_significance(r, x.len()),
                    relationship: Relationship::classify(r),
                })
            })
            .collect()
    }

    // ============================================
    // 性能模式
    // ============================================

    pub fn detect_performance_patterns(&self, data: &[SuspensionDataPoint]) -> Vec<PerformancePattern> {
        if data.is_empty() {
            return Vec::new();
        }

        [
            high_efficiency_pattern(data),
            power_peak_pattern(data),
            temperature_degradation_pattern(data),
            rough_road_pattern(data),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl Default for PatternRecognitionEngine {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// 按斜率分类单个指标的趋势
pub fn classify_slope(slope: f64) -> TrendDirection {
    if slope.abs() < TREND_STABLE_SLOPE {
        TrendDirection::Stable
    } else if slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    }
}

/// 合并多个指标的趋势
pub fn combine_trends(directions: &[TrendDirection]) -> TrendDirection {
    let count = |d: TrendDirection| directions.iter().filter(|x| **x == d).count();

    if count(TrendDirection::Increasing) >= 2 {
        TrendDirection::Increasing
    } else if count(TrendDirection::Decreasing) >= 2 {
        TrendDirection::Decreasing
    } else if count(TrendDirection::Stable) > 0 {
        TrendDirection::Stable
    } else {
        TrendDirection::Fluctuating
    }
}

fn classify_deviation(z: f64, thresholds: &[f64; 4]) -> Option<Severity> {
    let [low, medium, high, critical] = *thresholds;
    if z >= critical {
        Some(Severity::Critical)
    } else if z >= high {
        Some(Severity::High)
    } else if z >= medium {
        Some(Severity::Medium)
    } else if z >= low {
        Some(Severity::Low)
    } else {
        None
    }
}

fn mean_of<F>(points: &[&SuspensionDataPoint], field: F) -> f64
where
    F: Fn(&SuspensionDataPoint) -> f64,
{
    let values: Vec<f64> = points.iter().map(|p| field(p)).collect();
    mean(&values)
}

fn high_efficiency_pattern(data: &[SuspensionDataPoint]) -> Option<PerformancePattern> {
    let qualifying: Vec<&SuspensionDataPoint> = data
        .iter()
        .filter(|p| {
            p.shock_absorber_data.efficiency > HIGH_EFFICIENCY_LEVEL
                && p.damper_data.efficiency > HIGH_EFFICIENCY_LEVEL
        })
        .collect();

    let frequency = qualifying.len() as f64 / data.len() as f64;
    if frequency < HIGH_EFFICIENCY_MIN_FREQUENCY {
        return None;
    }

    Some(PerformancePattern {
        name: "high_efficiency_operation".to_string(),
        frequency,
        conditions: vec![
            format!(
                "平均车速 {:.1} km/h",
                mean_of(&qualifying, |p| p.environmental_data.vehicle_speed)
            ),
            format!(
                "平均路面粗糙度 {:.1}",
                mean_of(&qualifying, |p| p.environmental_data.road_roughness)
            ),
            format!(
                "平均工作温度 {:.1} °C",
                mean_of(&qualifying, |p| p.shock_absorber_data.operating_temperature)
            ),
        ],
        impact: PatternImpact::Positive,
        recommendation: "复现上述工况以保持 80% 以上的转换效率"
            .to_string(),
    })
}

fn power_peak_pattern(data: &[SuspensionDataPoint]) -> Option<PerformancePattern> {
    let powers: Vec<f64> = data.iter().map(SuspensionDataPoint::harvested_power).collect();
    let average = mean(&powers);
    if average <= 0.0 {
        return None;
    }

    let peaks: Vec<&SuspensionDataPoint> = data
        .iter()
        .filter(|p| p.harvested_power() > POWER_PEAK_FACTOR * average)
        .collect();

    let frequency = peaks.len() as f64 / data.len() as f64;
    if frequency < POWER_PEAK_MIN_FREQUENCY {
        return None;
    }

    Some(PerformancePattern {
        name: "power_peaks".to_string(),
        frequency,
        conditions: vec![
            format!(
                "峰值功率 {:.1} W，均值 {:.1} W",
                mean_of(&peaks, SuspensionDataPoint::harvested_power),
                average
            ),
            format!(
                "峰值期间平均路面粗糙度 {:.1}",
                mean_of(&peaks, |p| p.environmental_data.road_roughness)
            ),
        ],
        impact: PatternImpact::Positive,
        recommendation: "按短时功率峰值配置储能缓冲".to_string(),
    })
}

fn temperature_degradation_pattern(data: &[SuspensionDataPoint]) -> Option<PerformancePattern> {
    let (hot, normal): (Vec<&SuspensionDataPoint>, Vec<&SuspensionDataPoint>) = data
        .iter()
        .partition(|p| p.shock_absorber_data.operating_temperature > HIGH_TEMPERATURE);
    if hot.is_empty() || normal.is_empty() {
        return None;
    }

    let hot_efficiency = mean_of(&hot, SuspensionDataPoint::mean_efficiency);
    let normal_efficiency = mean_of(&normal, SuspensionDataPoint::mean_efficiency);
    if hot_efficiency >= TEMPERATURE_EFFICIENCY_RATIO * normal_efficiency {
        return None;
    }

    let drop = if normal_efficiency > EPSILON {
        (1.0 - hot_efficiency / normal_efficiency) * 100.0
    } else {
        0.0
    };

    Some(PerformancePattern {
        name: "temperature_degradation".to_string(),
        frequency: hot.len() as f64 / data.len() as f64,
        conditions: vec![
            format!("工作温度高于 {:.0} °C", HIGH_TEMPERATURE),
            format!("效率比常温时低 {:.1}%", drop),
        ],
        impact: PatternImpact::Negative,
        recommendation: format!(
            "加强冷却，使工作温度保持在 {:.0} °C 以下",
            HIGH_TEMPERATURE
        ),
    })
}

fn rough_road_pattern(data: &[SuspensionDataPoint]) -> Option<PerformancePattern> {
    let (rough, smooth): (Vec<&SuspensionDataPoint>, Vec<&SuspensionDataPoint>) = data
        .iter()
        .partition(|p| p.environmental_data.road_roughness >= ROUGH_ROAD_ROUGHNESS);
    if rough.is_empty() || smooth.is_empty() {
        return None;
    }

    let rough_power = mean_of(&rough, SuspensionDataPoint::harvested_power);
    let smooth_power = mean_of(&smooth, SuspensionDataPoint::harvested_power);
    if rough_power <= ROUGH_ROAD_POWER_RATIO * smooth_power {
        return None;
    }

    let mut conditions = vec![format!("路面粗糙度不低于 {:.0}", ROUGH_ROAD_ROUGHNESS)];
    if smooth_power > EPSILON {
        conditions.push(format!(
            "功率比平整路面高 {:.1}%",
            (rough_power / smooth_power - 1.0) * 100.0
        ));
    }

    Some(PerformancePattern {
        name: "rough_road_power_uplift".to_string(),
        frequency: rough.len() as f64 / data.len() as f64,
        conditions,
        impact: PatternImpact::Positive,
        recommendation: "粗糙路段切换到最大回收模式".to_string(),
    })
}
