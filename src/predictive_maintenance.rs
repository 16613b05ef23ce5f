//! 预测性维护
//!
//! 基于最近工况窗口为五个组件计算扣分制健康评分，结合历史快照外推退化速率，
//! 对评分偏低且持续退化的组件给出故障预测、建议措施与成本影响。

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::statistics::{coefficient_of_variation, linear_regression_slope, mean};
use crate::types::{
    Component, ComponentHealthScore, ControlMode, FailureMode, HealthIndicator, HealthScore,
    HealthStatus, HealthTrend, IndicatorStatus, MaintenancePrediction, Severity,
    SuspensionDataPoint, SystemStatus,
};
use crate::{ensure_min_points, Result};

/// 预测性维护分析所需的最少数据点
pub const MIN_MAINTENANCE_POINTS: usize = 100;

/// 健康评分使用的最近工况窗口
const CONDITION_WINDOW: usize = 100;
const HEALTH_HISTORY_LIMIT: usize = 1000;

const TREND_WINDOW: usize = 5;
const TREND_SLOPE_THRESHOLD: f64 = 0.02;
const DEGRADATION_WINDOW: usize = 10;
const DEGRADATION_MIN_SNAPSHOTS: usize = 5;

const PREDICTION_SCORE_CEILING: f64 = 75.0;
const FAILURE_SCORE: f64 = 30.0;
/// 预测日期的上限（天）
const MAX_PREDICTION_DAYS: f64 = 36_500.0;

const BASE_CONFIDENCE: f64 = 0.5;
const MAX_CONFIDENCE: f64 = 0.95;

/// 车速高于该值视为行驶中 (km/h)
const MOVING_SPEED: f64 = 10.0;

// ============================================
// 结果类型
// ============================================

/// 预测性维护分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceAnalysis {
    pub health_score: HealthScore,
    pub predictions: Vec<MaintenancePrediction>,
    pub recommendations: Vec<String>,
    /// 各组件退化速率（评分/快照）
    pub degradation_rates: IndexMap<Component, f64>,
    pub data_points: usize,
    pub analyzed_at: DateTime<Utc>,
}

// ============================================
// 扣分规则
// ============================================

#[derive(Debug, Clone, Copy)]
enum Limit {
    Above,
    Below,
}

/// 单条扣分规则：超过告警阈值扣 warning_deduction，超过严重阈值扣 critical_deduction
#[derive(Debug, Clone, Copy)]
struct DeductionRule {
    indicator: &'static str,
    limit: Limit,
    warning: f64,
    warning_deduction: f64,
    critical: f64,
    critical_deduction: f64,
}

impl DeductionRule {
    const fn above(indicator: &'static str, warning: (f64, f64), critical: (f64, f64)) -> Self {
        Self {
            indicator,
            limit: Limit::Above,
            warning: warning.0,
            warning_deduction: warning.1,
            critical: critical.0,
            critical_deduction: critical.1,
        }
    }

    const fn below(indicator: &'static str, warning: (f64, f64), critical: (f64, f64)) -> Self {
        Self {
            indicator,
            limit: Limit::Below,
            warning: warning.0,
            warning_deduction: warning.1,
            critical: critical.0,
            critical_deduction: critical.1,
        }
    }

    fn evaluate(&self, value: f64) -> (HealthIndicator, f64) {
        let breaches = |threshold: f64| match self.limit {
            Limit::Above => value > threshold,
            Limit::Below => value < threshold,
        };

        let (status, deduction) = if breaches(self.critical) {
            (IndicatorStatus::Critical, self.critical_deduction)
        } else if breaches(self.warning) {
            (IndicatorStatus::Warning, self.warning_deduction)
        } else {
            (IndicatorStatus::Normal, 0.0)
        };

        (
            HealthIndicator {
                name: self.indicator.to_string(),
                value,
                threshold: self.warning,
                status,
            },
            deduction,
        )
    }
}

const SHOCK_ABSORBER_RULES: [DeductionRule; 4] = [
    DeductionRule::above("damping_force_variability", (0.3, 15.0), (0.5, 25.0)),
    DeductionRule::below("average_efficiency", (0.7, 20.0), (0.5, 30.0)),
    DeductionRule::below("uptime", (0.95, 25.0), (0.8, 40.0)),
    DeductionRule::above("operating_temperature", (80.0, 15.0), (100.0, 25.0)),
];

const GENERATOR_RULES: [DeductionRule; 3] = [
    DeductionRule::below("generator_efficiency", (0.75, 20.0), (0.6, 35.0)),
    DeductionRule::above("power_output_variability", (0.6, 10.0), (1.0, 20.0)),
    DeductionRule::above("idle_generation_ratio", (0.1, 20.0), (0.3, 35.0)),
];

const HYDRAULIC_DAMPER_RULES: [DeductionRule; 3] = [
    DeductionRule::above("hydraulic_pressure", (200.0, 15.0), (250.0, 30.0)),
    DeductionRule::above("pressure_variability", (0.3, 15.0), (0.5, 25.0)),
    DeductionRule::above("fluid_temperature", (90.0, 15.0), (110.0, 30.0)),
];

const CONTROL_SYSTEM_RULES: [DeductionRule; 3] = [
    DeductionRule::below("system_efficiency", (0.7, 20.0), (0.5, 35.0)),
    DeductionRule::above("fault_ratio", (0.05, 20.0), (0.15, 40.0)),
    DeductionRule::above("manual_override_ratio", (0.5, 10.0), (0.8, 20.0)),
];

const THERMAL_MANAGEMENT_RULES: [DeductionRule; 3] = [
    DeductionRule::above("peak_temperature", (100.0, 20.0), (120.0, 35.0)),
    DeductionRule::above("temperature_differential", (15.0, 15.0), (25.0, 25.0)),
    DeductionRule::above("temperature_rise_rate", (0.1, 10.0), (0.5, 20.0)),
];

/// 组件的故障模式规则表：按顺序取第一个处于告警/严重状态的指标
fn failure_mode_table(component: Component) -> (&'static [(&'static str, FailureMode)], FailureMode) {
    match component {
        Component::ShockAbsorber => (
            &[
                ("damping_force_variability", FailureMode::SealDegradation),
                ("average_efficiency", FailureMode::EnergyConversionLoss),
                ("operating_temperature", FailureMode::FluidOverheating),
                ("uptime", FailureMode::MechanicalWear),
            ],
            FailureMode::MechanicalWear,
        ),
        Component::ElectromagneticGenerator => (
            &[
                ("generator_efficiency", FailureMode::CoilDegradation),
                ("idle_generation_ratio", FailureMode::WindingOpenCircuit),
                ("power_output_variability", FailureMode::MagnetDemagnetization),
            ],
            FailureMode::BearingWear,
        ),
        Component::HydraulicDamper => (
            &[
                ("hydraulic_pressure", FailureMode::PressureSealFailure),
                ("pressure_variability", FailureMode::ValveMalfunction),
                ("fluid_temperature", FailureMode::FluidDegradation),
            ],
            FailureMode::FluidContamination,
        ),
        Component::ControlSystem => (
            &[
                ("fault_ratio", FailureMode::SensorFailure),
                ("system_efficiency", FailureMode::CalibrationDrift),
                ("manual_override_ratio", FailureMode::ControlLogicFault),
            ],
            FailureMode::ControlLogicFault,
        ),
        Component::ThermalManagement => (
            &[
                ("peak_temperature", FailureMode::CoolingFailure),
                ("temperature_rise_rate", FailureMode::ThermalRunaway),
                ("temperature_differential", FailureMode::HeatExchangerFouling),
            ],
            FailureMode::ThermalFatigue,
        ),
    }
}

/// 按已触发的指标选择故障模式
pub fn determine_failure_mode(component: Component, indicators: &[HealthIndicator]) -> FailureMode {
    let (table, fallback) = failure_mode_table(component);
    table
        .iter()
        .find(|(name, _)| indicators.iter().any(|i| i.name == *name && i.is_flagged()))
        .map(|(_, mode)| *mode)
        .unwrap_or(fallback)
}

fn severity_multiplier(severity: Severity) -> f64 {
    match severity {
        Severity::Low => 1.0,
        Severity::Medium => 1.5,
        Severity::High => 2.5,
        Severity::Critical => 4.0,
    }
}

fn severity_for_days(days: f64) -> Severity {
    if days < 7.0 {
        Severity::Critical
    } else if days < 30.0 {
        Severity::High
    } else if days < 90.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

// ============================================
// 工况统计
// ============================================

/// 最近工况窗口上的统计量
#[derive(Debug, Clone, Default)]
struct ConditionStats {
    damping_force_cv: f64,
    shock_efficiency: f64,
    uptime: f64,
    shock_temperature: f64,
    generator_efficiency: f64,
    generator_power_cv: f64,
    idle_generation_ratio: f64,
    hydraulic_pressure: f64,
    pressure_cv: f64,
    fluid_temperature: f64,
    system_efficiency: f64,
    fault_ratio: f64,
    manual_ratio: f64,
    peak_temperature: f64,
    temperature_differential: f64,
    temperature_rise_rate: f64,
}

impl ConditionStats {
    fn from_window(window: &[SuspensionDataPoint]) -> Self {
        if window.is_empty() {
            return Self::default();
        }

        let column = |f: fn(&SuspensionDataPoint) -> f64| -> Vec<f64> { window.iter().map(f).collect() };
        let ratio = |pred: fn(&SuspensionDataPoint) -> bool| -> f64 {
            window.iter().filter(|p| pred(p)).count() as f64 / window.len() as f64
        };

        let shock_temperatures = column(|p| p.shock_absorber_data.operating_temperature);

        let moving: Vec<&SuspensionDataPoint> = window
            .iter()
            .filter(|p| p.environmental_data.vehicle_speed > MOVING_SPEED)
            .collect();
        let idle_generation_ratio = if moving.is_empty() {
            0.0
        } else {
            moving
                .iter()
                .filter(|p| p.damper_data.generated_power <= 0.0)
                .count() as f64
                / moving.len() as f64
        };

        Self {
            damping_force_cv: coefficient_of_variation(&column(|p| p.shock_absorber_data.damping_force)),
            shock_efficiency: mean(&column(|p| p.shock_absorber_data.efficiency)),
            uptime: ratio(SuspensionDataPoint::is_online),
            shock_temperature: mean(&shock_temperatures),
            generator_efficiency: mean(&column(|p| p.damper_data.efficiency)),
            generator_power_cv: coefficient_of_variation(&column(|p| p.damper_data.generated_power)),
            idle_generation_ratio,
            hydraulic_pressure: mean(&column(|p| p.damper_data.hydraulic_pressure)),
            pressure_cv: coefficient_of_variation(&column(|p| p.damper_data.hydraulic_pressure)),
            fluid_temperature: mean(&column(|p| p.damper_data.temperature)),
            system_efficiency: mean(&column(|p| p.integration_data.system_efficiency)),
            fault_ratio: ratio(|p| {
                matches!(
                    p.integration_data.system_status,
                    SystemStatus::Degraded | SystemStatus::Fault | SystemStatus::Offline
                )
            }),
            manual_ratio: ratio(|p| p.integration_data.control_mode == ControlMode::Manual),
            peak_temperature: window
                .iter()
                .map(SuspensionDataPoint::peak_temperature)
                .fold(f64::NEG_INFINITY, f64::max),
            temperature_differential: mean(&column(|p| {
                (p.shock_absorber_data.operating_temperature - p.damper_data.temperature).abs()
            })),
            temperature_rise_rate: linear_regression_slope(&shock_temperatures),
        }
    }

    fn rules_for(&self, component: Component) -> Vec<(DeductionRule, f64)> {
        let values: Vec<f64> = match component {
            Component::ShockAbsorber => vec![
                self.damping_force_cv,
                self.shock_efficiency,
                self.uptime,
                self.shock_temperature,
            ],
            Component::ElectromagneticGenerator => vec![
                self.generator_efficiency,
                self.generator_power_cv,
                self.idle_generation_ratio,
            ],
            Component::HydraulicDamper => vec![
                self.hydraulic_pressure,
                self.pressure_cv,
                self.fluid_temperature,
            ],
            Component::ControlSystem => {
                vec![self.system_efficiency, self.fault_ratio, self.manual_ratio]
            }
            Component::ThermalManagement => vec![
                self.peak_temperature,
                self.temperature_differential,
                self.temperature_rise_rate,
            ],
        };

        let rules: &[DeductionRule] = match component {
            Component::ShockAbsorber => &SHOCK_ABSORBER_RULES,
            Component::ElectromagneticGenerator => &GENERATOR_RULES,
            Component::HydraulicDamper => &HYDRAULIC_DAMPER_RULES,
            Component::ControlSystem => &CONTROL_SYSTEM_RULES,
            Component::ThermalManagement => &THERMAL_MANAGEMENT_RULES,
        };

        rules.iter().copied().zip(values).collect()
    }
}

// ============================================
// 预测性维护分析器
// ============================================

/// 预测性维护分析器，持有有界的健康评分历史
#[derive(Debug, Clone, Default)]
pub struct PredictiveMaintenanceAnalyzer {
    health_history: VecDeque<HealthScore>,
}

impl PredictiveMaintenanceAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预测性维护分析（至少 100 个数据点）
    pub fn analyze_predictive_maintenance(
        &mut self,
        data: &[SuspensionDataPoint],
    ) -> Result<MaintenanceAnalysis> {
        self.analyze_predictive_maintenance_at(data, Utc::now())
    }

    /// 以指定的当前时间进行分析（预测日期以 now 为起点）
    pub fn analyze_predictive_maintenance_at(
        &mut self,
        data: &[SuspensionDataPoint],
        now: DateTime<Utc>,
    ) -> Result<MaintenanceAnalysis> {
        ensure_min_points("predictive_maintenance", MIN_MAINTENANCE_POINTS, data.len())?;

        let window = &data[data.len().saturating_sub(CONDITION_WINDOW)..];
        let stats = ConditionStats::from_window(window);

        let components: Vec<ComponentHealthScore> = Component::ALL
            .iter()
            .map(|&component| score_component(component, &stats.rules_for(component)))
            .collect();
        let overall = weighted_overall(&components);
        let trend = self.overall_trend(overall);

        let health_score = HealthScore {
            overall,
            components,
            trend,
            last_updated: now,
        };

        self.health_history.push_back(health_score.clone());
        while self.health_history.len() > HEALTH_HISTORY_LIMIT {
            self.health_history.pop_front();
        }

        let degradation_rates: IndexMap<Component, f64> = Component::ALL
            .iter()
            .map(|&c| (c, self.degradation_rate(c)))
            .collect();

        let mut predictions: Vec<MaintenancePrediction> = health_score
            .components
            .iter()
            .filter_map(|c| {
                let rate = degradation_rates.get(&c.component).copied().unwrap_or(0.0);
                self.predict_failure(c, rate, data.len(), now)
            })
            .collect();
        predictions.sort_by(|a, b| a.predicted_failure_date.cmp(&b.predicted_failure_date));

        for prediction in predictions.iter().filter(|p| p.severity == Severity::Critical) {
            warn!(
                "组件 {} 预计 {:.1} 天内失效 ({:?})",
                prediction.component.as_str(),
                prediction.remaining_useful_life,
                prediction.failure_mode
            );
        }

        let recommendations = generate_recommendations(&health_score, &predictions);

        debug!(
            "预测性维护分析完成: 综合评分={:.1}, 趋势={:?}, 预测={}",
            health_score.overall,
            health_score.trend,
            predictions.len()
        );

        Ok(MaintenanceAnalysis {
            health_score,
            predictions,
            recommendations,
            degradation_rates,
            data_points: data.len(),
            analyzed_at: now,
        })
    }

    /// 最近 5 个综合评分（含本次）的斜率判定趋势
    fn overall_trend(&self, current: f64) -> HealthTrend {
        let mut scores: Vec<f64> = self
            .health_history
            .iter()
            .skip(self.health_history.len().saturating_sub(TREND_WINDOW - 1))
            .map(|h| h.overall)
            .collect();
        scores.push(current);

        if scores.len() < 2 {
            return HealthTrend::Stable;
        }

        let slope = linear_regression_slope(&scores);
        if slope > TREND_SLOPE_THRESHOLD {
            HealthTrend::Improving
        } else if slope < -TREND_SLOPE_THRESHOLD {
            HealthTrend::Degrading
        } else {
            HealthTrend::Stable
        }
    }

    /// 组件退化速率 = 最近 10 个快照评分斜率的相反数（不足 5 个快照时为 0）
    pub fn degradation_rate(&self, component: Component) -> f64 {
        if self.health_history.len() < DEGRADATION_MIN_SNAPSHOTS {
            return 0.0;
        }

        let scores: Vec<f64> = self
            .health_history
            .iter()
            .skip(self.health_history.len().saturating_sub(DEGRADATION_WINDOW))
            .filter_map(|h| h.component(component).map(|c| c.score))
            .collect();

        -linear_regression_slope(&scores)
    }

    fn predict_failure(
        &self,
        health: &ComponentHealthScore,
        degradation_rate: f64,
        data_points: usize,
        now: DateTime<Utc>,
    ) -> Option<MaintenancePrediction> {
        if health.score > PREDICTION_SCORE_CEILING || degradation_rate <= 0.0 {
            return None;
        }

        let days = ((health.score - FAILURE_SCORE) / degradation_rate).clamp(0.0, MAX_PREDICTION_DAYS);
        let severity = severity_for_days(days);
        let failure_mode = determine_failure_mode(health.component, &health.key_indicators);

        Some(MaintenancePrediction {
            component: health.component,
            predicted_failure_date: now + Duration::seconds((days * 86_400.0) as i64),
            confidence: self.prediction_confidence(data_points, health.score),
            remaining_useful_life: days,
            failure_mode,
            severity,
            recommended_action: failure_mode.recommended_action().to_string(),
            cost_impact: health.component.base_cost() * severity_multiplier(severity),
        })
    }

    fn prediction_confidence(&self, data_points: usize, score: f64) -> f64 {
        let history = self.health_history.len();
        let mut confidence = BASE_CONFIDENCE;

        if data_points > 500 {
            confidence += 0.1;
        }
        if data_points > 1000 {
            confidence += 0.1;
        }
        if history > 10 {
            confidence += 0.1;
        }
        if history > 50 {
            confidence += 0.05;
        }
        if score < 50.0 {
            confidence += 0.1;
        }
        if score < 30.0 {
            confidence += 0.05;
        }

        confidence.min(MAX_CONFIDENCE)
    }

    pub fn health_history(&self) -> &VecDeque<HealthScore> {
        &self.health_history
    }

    pub fn latest_health(&self) -> Option<&HealthScore> {
        self.health_history.back()
    }
}

fn score_component(component: Component, rules: &[(DeductionRule, f64)]) -> ComponentHealthScore {
    let mut score = 100.0;
    let mut key_indicators = Vec::with_capacity(rules.len());

    for (rule, value) in rules {
        let (indicator, deduction) = rule.evaluate(*value);
        score -= deduction;
        key_indicators.push(indicator);
    }

    let score = score.max(0.0);
    ComponentHealthScore {
        component,
        score,
        status: HealthStatus::from_score(score),
        key_indicators,
    }
}

/// 综合评分 = Σ 组件评分 × 权重
pub fn weighted_overall(components: &[ComponentHealthScore]) -> f64 {
    components
        .iter()
        .map(|c| c.score * c.component.weight())
        .sum()
}

fn generate_recommendations(
    health: &HealthScore,
    predictions: &[MaintenancePrediction],
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if health.overall < 60.0 {
        recommendations.push(
            "安排全面系统检查: 总体健康度低于 60".to_string(),
        );
    } else if health.overall < 80.0 {
        recommendations.push("提高监测频率: 总体健康度低于 80".to_string());
    }

    if health.trend == HealthTrend::Degrading {
        recommendations
            .push("系统健康度持续下降，需复查近期工况".to_string());
    }

    for component in &health.components {
        match component.status {
            HealthStatus::Critical => recommendations.push(format!(
                "{} 需立即处理 (评分 {:.0})",
                component.component.as_str(),
                component.score
            )),
            HealthStatus::Poor => recommendations.push(format!(
                "在下一个维护窗口内安排 {} 的维护",
                component.component.as_str()
            )),
            _ => {}
        }
    }

    for prediction in predictions
        .iter()
        .filter(|p| matches!(p.severity, Severity::Critical | Severity::High))
    {
        recommendations.push(format!(
            "{}: {} (预计 {:.0} 天后失效)",
            prediction.component.as_str(),
            prediction.recommended_action,
            prediction.remaining_useful_life
        ));
    }

    if recommendations.is_empty() {
        recommendations
            .push("系统运行参数正常，继续常规维护".to_string());
    }
    recommendations
}
