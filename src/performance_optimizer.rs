//! 性能优化建议
//!
//! 四个独立分析器（阻尼、能量回收、热管理、维护）将统计量与固定阈值比较，
//! 生成按优先级排序的优化建议；并以 EMA 维护跨调用的性能基线用于漂移跟踪。

use std::cmp::Ordering;

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::statistics::{coefficient_of_variation, ema, mean, EPSILON};
use crate::types::{
    DamperMode, ImplementationComplexity, OptimizationAction, OptimizationCategory,
    OptimizationRecommendation, PerformanceMetrics, Priority, SuspensionDataPoint,
    TemperatureRange,
};
use crate::{ensure_min_points, Result};

/// 生成优化建议所需的最少数据点
pub const MIN_OPTIMIZATION_POINTS: usize = 50;

const BASELINE_ALPHA: f64 = 0.1;
const DRIFT_THRESHOLD: f64 = 0.2;
/// 实际改善达到预期改善的该比例即视为成功
const SUCCESS_RATIO: f64 = 0.5;

const MOVING_SPEED: f64 = 10.0;
const TARGET_EFFICIENCY: f64 = 0.85;
const TARGET_UPTIME: f64 = 0.98;
/// 相对提升的最小基准，避免除以接近 0 的当前值
const MIN_RELATIVE_BASE: f64 = 0.01;

// ============================================
// 性能指标
// ============================================

/// 由数据点聚合性能指标，空输入返回全零
pub fn calculate_performance_metrics(data: &[SuspensionDataPoint]) -> PerformanceMetrics {
    let (Some(first), Some(last)) = (data.first(), data.last()) else {
        return PerformanceMetrics {
            average_power: 0.0,
            peak_power: 0.0,
            total_energy_harvested: 0.0,
            average_efficiency: 0.0,
            uptime: 0.0,
            temperature_range: TemperatureRange { min: 0.0, max: 0.0 },
            operational_cycles: 0.0,
        };
    };

    let powers: Vec<f64> = data.iter().map(SuspensionDataPoint::harvested_power).collect();
    let efficiencies: Vec<f64> = data.iter().map(SuspensionDataPoint::mean_efficiency).collect();

    let temperature_range = data.iter().fold(
        TemperatureRange {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        },
        |range, p| {
            let low = p
                .shock_absorber_data
                .operating_temperature
                .min(p.damper_data.temperature);
            TemperatureRange {
                min: range.min.min(low),
                max: range.max.max(p.peak_temperature()),
            }
        },
    );

    PerformanceMetrics {
        average_power: mean(&powers),
        peak_power: powers.iter().copied().fold(0.0, f64::max),
        total_energy_harvested: (last.integration_data.harvested_energy
            - first.integration_data.harvested_energy)
            .max(0.0),
        average_efficiency: mean(&efficiencies),
        uptime: data.iter().filter(|p| p.is_online()).count() as f64 / data.len() as f64,
        temperature_range,
        operational_cycles: (last.integration_data.operational_cycles
            - first.integration_data.operational_cycles)
            .max(0.0),
    }
}

fn baseline_metrics(metrics: &PerformanceMetrics) -> [(&'static str, f64); 4] {
    [
        ("average_power", metrics.average_power),
        ("peak_power", metrics.peak_power),
        ("average_efficiency", metrics.average_efficiency),
        ("uptime", metrics.uptime),
    ]
}

/// 相对变化 (%)，基准为 0 时返回 0
fn relative_change(before: f64, after: f64) -> f64 {
    if before.abs() < EPSILON {
        0.0
    } else {
        (after - before) / before.abs() * 100.0
    }
}

/// 达到目标值所需的相对提升 (%)，与效果评估使用同一口径
fn relative_gap(current: f64, target: f64) -> f64 {
    relative_change(current.max(MIN_RELATIVE_BASE), target).max(0.0)
}

fn action(
    action: &str,
    parameter: &str,
    current_value: f64,
    recommended_value: f64,
    confidence: f64,
) -> OptimizationAction {
    OptimizationAction {
        action: action.to_string(),
        parameter: parameter.to_string(),
        current_value,
        recommended_value,
        confidence,
    }
}

// ============================================
// 优化效果评估
// ============================================

/// 已实施建议的效果评估
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationEffectiveness {
    /// 各指标相对变化 (%)，温度为降幅
    pub metric_improvements: IndexMap<String, f64>,
    /// 达到预期的建议标题
    pub successful: Vec<String>,
    pub failed: Vec<String>,
    pub success_rate: f64,
}

// ============================================
// 性能优化器
// ============================================

#[derive(Debug, Clone, Default)]
pub struct PerformanceOptimizer {
    baseline: IndexMap<String, f64>,
    drift: IndexMap<String, f64>,
}

impl PerformanceOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 生成优化建议（至少 50 个数据点）
    pub fn generate_optimization_recommendations(
        &mut self,
        data: &[SuspensionDataPoint],
        metrics: &PerformanceMetrics,
    ) -> Result<Vec<OptimizationRecommendation>> {
        ensure_min_points("optimization", MIN_OPTIMIZATION_POINTS, data.len())?;

        let mut recommendations = Vec::new();
        recommendations.extend(self.analyze_damping(data));
        recommendations.extend(self.analyze_energy_harvesting(data, metrics));
        recommendations.extend(self.analyze_thermal(data, metrics));
        recommendations.extend(self.analyze_maintenance(data, metrics));

        recommendations.sort_by(|a, b| {
            b.priority.cmp(&a.priority).then_with(|| {
                b.expected_improvement
                    .partial_cmp(&a.expected_improvement)
                    .unwrap_or(Ordering::Equal)
            })
        });

        self.update_baseline(metrics);

        debug!(
            "优化分析完成: 数据点={}, 建议={}",
            data.len(),
            recommendations.len()
        );
        Ok(recommendations)
    }

    fn analyze_damping(&self, data: &[SuspensionDataPoint]) -> Vec<OptimizationRecommendation> {
        let mut recommendations = Vec::new();

        let forces: Vec<f64> = data.iter().map(|p| p.shock_absorber_data.damping_force).collect();
        let variability = coefficient_of_variation(&forces);
        if variability > 0.3 {
            recommendations.push(OptimizationRecommendation {
                category: OptimizationCategory::Damping,
                priority: if variability > 0.5 {
                    Priority::High
                } else {
                    Priority::Medium
                },
                title: "阻尼力波动过大".to_string(),
                description: format!(
                    "阻尼力变异系数为 {:.2}，建议启用自适应阻尼控制以稳定乘坐与能量转换",
                    variability
                ),
                expected_improvement: 15.0,
                implementation_complexity: ImplementationComplexity::Medium,
                estimated_cost: 500.0,
                actions: vec![
                    action(
                        "启用自适应阻尼模式",
                        "damping_force_variability",
                        variability,
                        0.2,
                        0.8,
                    ),
                    action(
                        "重新标定阻尼力控制器",
                        "damping_force_mean",
                        mean(&forces),
                        mean(&forces),
                        0.6,
                    ),
                ],
            });
        }

        let vibrations: Vec<f64> = data.iter().map(|p| p.environmental_data.vibration_level).collect();
        let vibration = mean(&vibrations);
        if vibration > 20.0 {
            recommendations.push(OptimizationRecommendation {
                category: OptimizationCategory::Damping,
                priority: Priority::Medium,
                title: "改善振动隔离".to_string(),
                description: format!(
                    "平均振动水平 {:.1} m/s² 超过 20 m/s²，建议提高阻尼或加装隔振支座",
                    vibration
                ),
                expected_improvement: 8.0,
                implementation_complexity: ImplementationComplexity::High,
                estimated_cost: 1200.0,
                actions: vec![action(
                    "提高阻尼系数",
                    "vibration_level",
                    vibration,
                    15.0,
                    0.7,
                )],
            });
        }

        recommendations
    }

    fn analyze_energy_harvesting(
        &self,
        data: &[SuspensionDataPoint],
        metrics: &PerformanceMetrics,
    ) -> Vec<OptimizationRecommendation> {
        let mut recommendations = Vec::new();

        let efficiency = metrics.average_efficiency;
        if efficiency < 0.7 {
            recommendations.push(OptimizationRecommendation {
                category: OptimizationCategory::EnergyHarvesting,
                priority: if efficiency < 0.5 {
                    Priority::High
                } else {
                    Priority::Medium
                },
                title: "能量转换效率偏低".to_string(),
                description: format!(
                    "平均转换效率为 {:.1}%，需调整发电机负载匹配",
                    efficiency * 100.0
                ),
                expected_improvement: relative_gap(efficiency, TARGET_EFFICIENCY),
                implementation_complexity: ImplementationComplexity::Medium,
                estimated_cost: 800.0,
                actions: vec![
                    action(
                        "优化发电机负载阻抗",
                        "average_efficiency",
                        efficiency,
                        TARGET_EFFICIENCY,
                        0.75,
                    ),
                ],
            });
        }

        let moving: Vec<&SuspensionDataPoint> = data
            .iter()
            .filter(|p| p.environmental_data.vehicle_speed > MOVING_SPEED)
            .collect();
        if !moving.is_empty() {
            let hybrid_usage = moving
                .iter()
                .filter(|p| p.damper_data.operating_mode == DamperMode::Hybrid)
                .count() as f64
                / moving.len() as f64;

            if hybrid_usage < 0.5 {
                recommendations.push(OptimizationRecommendation {
                    category: OptimizationCategory::EnergyHarvesting,
                    priority: Priority::Medium,
                    title: "提高混合模式使用率".to_string(),
                    description: format!(
                        "行驶样本中混合阻尼模式占比 {:.0}%，混合模式在行驶中回收能量更多",
                        hybrid_usage * 100.0
                    ),
                    expected_improvement: 12.0,
                    implementation_complexity: ImplementationComplexity::Low,
                    estimated_cost: 100.0,
                    actions: vec![action(
                        "行驶时将阻尼器切换为混合模式",
                        "hybrid_mode_usage",
                        hybrid_usage,
                        0.8,
                        0.7,
                    )],
                });
            }
        }

        recommendations
    }

    fn analyze_thermal(
        &self,
        data: &[SuspensionDataPoint],
        metrics: &PerformanceMetrics,
    ) -> Vec<OptimizationRecommendation> {
        let mut recommendations = Vec::new();

        let max_temperature = metrics.temperature_range.max;
        if max_temperature > 100.0 {
            recommendations.push(OptimizationRecommendation {
                category: OptimizationCategory::Thermal,
                priority: if max_temperature > 120.0 {
                    Priority::Critical
                } else {
                    Priority::High
                },
                title: "工作温度过高".to_string(),
                description: format!(
                    "部件峰值温度达到 {:.1} °C，需加强散热",
                    max_temperature
                ),
                expected_improvement: 20.0,
                implementation_complexity: ImplementationComplexity::High,
                estimated_cost: 1500.0,
                actions: vec![
                    action(
                        "提升冷却能力",
                        "max_temperature",
                        max_temperature,
                        90.0,
                        0.85,
                    ),
                    action("持续负载下降额运行阻尼", "damping_mode", 0.0, 1.0, 0.6),
                ],
            });
        }

        let temperatures: Vec<f64> = data.iter().map(SuspensionDataPoint::peak_temperature).collect();
        let mean_temperature = mean(&temperatures);
        if mean_temperature > 70.0 {
            recommendations.push(OptimizationRecommendation {
                category: OptimizationCategory::Thermal,
                priority: Priority::Medium,
                title: "平均温度偏高".to_string(),
                description: format!(
                    "部件平均温度为 {:.1} °C，需检查冷却气流",
                    mean_temperature
                ),
                expected_improvement: 8.0,
                implementation_complexity: ImplementationComplexity::Medium,
                estimated_cost: 400.0,
                actions: vec![action(
                    "改善冷却气流",
                    "average_temperature",
                    mean_temperature,
                    60.0,
                    0.7,
                )],
            });
        }

        recommendations
    }

    fn analyze_maintenance(
        &self,
        data: &[SuspensionDataPoint],
        metrics: &PerformanceMetrics,
    ) -> Vec<OptimizationRecommendation> {
        let mut recommendations = Vec::new();

        if metrics.uptime < 0.95 {
            recommendations.push(OptimizationRecommendation {
                category: OptimizationCategory::Maintenance,
                priority: if metrics.uptime < 0.8 {
                    Priority::Critical
                } else {
                    Priority::High
                },
                title: "系统可用率偏低".to_string(),
                description: format!(
                    "系统在线时间占比 {:.1}%，需排查故障与待机时段",
                    metrics.uptime * 100.0
                ),
                expected_improvement: relative_gap(metrics.uptime, TARGET_UPTIME),
                implementation_complexity: ImplementationComplexity::Medium,
                estimated_cost: 1000.0,
                actions: vec![action(
                    "诊断重复出现的故障",
                    "uptime",
                    metrics.uptime,
                    TARGET_UPTIME,
                    0.8,
                )],
            });
        }

        let cycle_rate = metrics.operational_cycles / data.len().max(1) as f64;
        if cycle_rate > 5.0 {
            recommendations.push(OptimizationRecommendation {
                category: OptimizationCategory::Maintenance,
                priority: Priority::Medium,
                title: "安排预防性维护".to_string(),
                description: format!(
                    "每个样本累计运行循环 {:.1} 次，需缩短检查间隔",
                    cycle_rate
                ),
                expected_improvement: 5.0,
                implementation_complexity: ImplementationComplexity::Low,
                estimated_cost: 300.0,
                actions: vec![action(
                    "缩短检查间隔",
                    "cycle_rate",
                    cycle_rate,
                    5.0,
                    0.6,
                )],
            });
        }

        recommendations
    }

    /// 更新 EMA 基线（首次调用为种子），并记录相对漂移
    fn update_baseline(&mut self, metrics: &PerformanceMetrics) {
        for (name, value) in baseline_metrics(metrics) {
            match self.baseline.get_mut(name) {
                Some(baseline) => {
                    let drift = if baseline.abs() < EPSILON {
                        0.0
                    } else {
                        (value - *baseline).abs() / baseline.abs()
                    };
                    if drift > DRIFT_THRESHOLD {
                        info!(
                            "性能基线漂移: {} 当前={:.3}, 基线={:.3}, 漂移={:.1}%",
                            name,
                            value,
                            baseline,
                            drift * 100.0
                        );
                    }
                    self.drift.insert(name.to_string(), drift);
                    *baseline = ema(*baseline, value, BASELINE_ALPHA);
                }
                None => {
                    self.baseline.insert(name.to_string(), value);
                    self.drift.insert(name.to_string(), 0.0);
                }
            }
        }
    }

    pub fn performance_baseline(&self) -> &IndexMap<String, f64> {
        &self.baseline
    }

    /// 最近一次调用相对基线的漂移（比例）
    pub fn baseline_drift(&self) -> &IndexMap<String, f64> {
        &self.drift
    }

    /// 评估已实施建议的效果
    pub fn evaluate_optimization_effectiveness(
        &self,
        before: &PerformanceMetrics,
        after: &PerformanceMetrics,
        implemented: &[OptimizationRecommendation],
    ) -> OptimizationEffectiveness {
        let mut metric_improvements = IndexMap::new();
        for ((name, old), (_, new)) in baseline_metrics(before)
            .into_iter()
            .zip(baseline_metrics(after))
        {
            metric_improvements.insert(name.to_string(), relative_change(old, new));
        }
        // 温度以降幅计
        metric_improvements.insert(
            "max_temperature_reduction".to_string(),
            -relative_change(before.temperature_range.max, after.temperature_range.max),
        );

        let realized = |category: OptimizationCategory| -> f64 {
            let key = match category {
                OptimizationCategory::Damping | OptimizationCategory::EnergyHarvesting => {
                    "average_efficiency"
                }
                OptimizationCategory::Thermal => "max_temperature_reduction",
                OptimizationCategory::Maintenance => "uptime",
            };
            metric_improvements.get(key).copied().unwrap_or(0.0)
        };

        let (successful, failed): (Vec<_>, Vec<_>) = implemented
            .iter()
            .partition(|r| realized(r.category) >= r.expected_improvement * SUCCESS_RATIO);

        let success_rate = if implemented.is_empty() {
            0.0
        } else {
            successful.len() as f64 / implemented.len() as f64
        };

        OptimizationEffectiveness {
            successful: successful.iter().map(|r| r.title.clone()).collect(),
            failed: failed.iter().map(|r| r.title.clone()).collect(),
            success_rate,
            metric_improvements,
        }
    }
}
