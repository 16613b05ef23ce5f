//! 分析编排
//!
//! `SuspensionDataAnalytics` 持有数据处理器与三个分析器，负责摄入后的阈值告警、
//! 实时异常检查，以及综合分析报告的生成与有界历史。

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::{debug, error, info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfiguration;
use crate::data_processor::DataProcessor;
use crate::pattern_recognition::{PatternAnalysisResult, PatternRecognitionEngine};
use crate::performance_optimizer::{
    calculate_performance_metrics, OptimizationEffectiveness, PerformanceOptimizer,
    MIN_OPTIMIZATION_POINTS,
};
use crate::predictive_maintenance::{
    MaintenanceAnalysis, PredictiveMaintenanceAnalyzer, MIN_MAINTENANCE_POINTS,
};
use crate::types::{
    AnomalyDetection, BufferStats, DataQualityMetrics, HealthScore, HealthStatus,
    OptimizationRecommendation, PerformanceMetrics, Priority, RawDamperReading,
    RawEnvironmentalReading, RawIntegrationReading, RawShockAbsorberReading, RawTelemetryFrame,
    Severity, SuspensionDataPoint,
};
use crate::{ensure_min_points, Result};

/// 生成报告所需的最少数据点
pub const MIN_REPORT_POINTS: usize = 10;

const REPORT_HISTORY_LIMIT: usize = 100;
const ALERT_HISTORY_LIMIT: usize = 1000;
const ANOMALY_HISTORY_LIMIT: usize = 1000;
/// 实时异常检查的窗口
const REAL_TIME_WINDOW: usize = 100;

/// 车速高于该值才检查低功率 (km/h)
const POWER_CHECK_SPEED: f64 = 5.0;
/// 综合性能评分中的功率归一化基准 (W)
const POWER_NORMALIZATION: f64 = 2000.0;
const STRONG_CORRELATION: f64 = 0.7;
const LOW_DATA_QUALITY: f64 = 0.8;

/// 多线程共享的分析实例
pub type SharedSuspensionAnalytics = Arc<RwLock<SuspensionDataAnalytics>>;

// ============================================
// 告警
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Temperature,
    Efficiency,
    Power,
    Vibration,
    Pressure,
}

/// 阈值告警记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub kind: AlertKind,
    pub message: String,
    pub value: f64,
    pub threshold: f64,
    pub timestamp: DateTime<Utc>,
}

// ============================================
// 报告
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// 报告摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub key_findings: Vec<String>,
    pub critical_issues: Vec<String>,
    pub recommendations: Vec<String>,
    /// 综合性能评分 [0, 100]
    pub average_system_performance: f64,
}

/// 综合分析报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub period: ReportPeriod,
    pub data_points: usize,
    pub data_quality: DataQualityMetrics,
    pub data_quality_score: f64,
    pub performance_metrics: PerformanceMetrics,
    pub pattern_analysis: PatternAnalysisResult,
    /// 数据不足或未启用时为 None
    pub maintenance: Option<MaintenanceAnalysis>,
    pub optimization_recommendations: Vec<OptimizationRecommendation>,
    pub summary: ReportSummary,
}

// ============================================
// 分析编排器
// ============================================

#[derive(Debug)]
pub struct SuspensionDataAnalytics {
    config: AnalyticsConfiguration,
    processor: DataProcessor,
    pattern_engine: PatternRecognitionEngine,
    maintenance_analyzer: PredictiveMaintenanceAnalyzer,
    optimizer: PerformanceOptimizer,
    report_history: VecDeque<AnalyticsReport>,
    alert_history: VecDeque<Alert>,
    recent_anomalies: VecDeque<AnomalyDetection>,
}

impl SuspensionDataAnalytics {
    /// 校验配置并创建分析实例
    pub fn new(config: AnalyticsConfiguration) -> Result<Self> {
        config.validate()?;

        info!(
            "悬架数据分析初始化: 缓冲容量={}, 采样率={}Hz, 实时分析={}, 预测性维护={}",
            config.buffer_capacity(),
            config.sampling_rate,
            config.enable_real_time_analysis,
            config.enable_predictive_maintenance
        );

        Ok(Self {
            processor: DataProcessor::new(&config),
            pattern_engine: PatternRecognitionEngine::new(config.anomaly_detection_sensitivity),
            maintenance_analyzer: PredictiveMaintenanceAnalyzer::new(),
            optimizer: PerformanceOptimizer::new(),
            report_history: VecDeque::new(),
            alert_history: VecDeque::new(),
            recent_anomalies: VecDeque::new(),
            config,
        })
    }

    pub fn into_shared(self) -> SharedSuspensionAnalytics {
        Arc::new(RwLock::new(self))
    }

    pub fn config(&self) -> &AnalyticsConfiguration {
        &self.config
    }

    // ---------- 数据摄入 ----------

    pub fn process_data_point(
        &mut self,
        shock: Option<RawShockAbsorberReading>,
        damper: Option<RawDamperReading>,
        integration: Option<RawIntegrationReading>,
        environment: Option<RawEnvironmentalReading>,
    ) -> SuspensionDataPoint {
        self.process_data_point_at(Utc::now(), shock, damper, integration, environment)
    }

    pub fn process_data_point_at(
        &mut self,
        timestamp: DateTime<Utc>,
        shock: Option<RawShockAbsorberReading>,
        damper: Option<RawDamperReading>,
        integration: Option<RawIntegrationReading>,
        environment: Option<RawEnvironmentalReading>,
    ) -> SuspensionDataPoint {
        let point = self
            .processor
            .process_data_point_at(timestamp, shock, damper, integration, environment);
        self.after_ingest(&point);
        point
    }

    pub fn process_frame(&mut self, frame: RawTelemetryFrame) -> SuspensionDataPoint {
        let point = self.processor.process_frame(frame);
        self.after_ingest(&point);
        point
    }

    fn after_ingest(&mut self, point: &SuspensionDataPoint) {
        self.check_alerts(point);

        if self.config.enable_real_time_analysis && self.processor.len() >= REAL_TIME_WINDOW {
            self.real_time_check();
        }
    }

    fn check_alerts(&mut self, point: &SuspensionDataPoint) {
        let thresholds = self.config.alert_thresholds.clone();
        let mut alerts = Vec::new();
        let mut raise = |level, kind, value: f64, threshold: f64, message: String| {
            alerts.push(Alert {
                level,
                kind,
                message,
                value,
                threshold,
                timestamp: point.timestamp,
            });
        };

        let temperature = point.peak_temperature();
        if temperature > thresholds.temperature_critical {
            raise(
                AlertLevel::Critical,
                AlertKind::Temperature,
                temperature,
                thresholds.temperature_critical,
                format!("温度严重超限: {:.1} °C", temperature),
            );
        } else if temperature > thresholds.temperature_high {
            raise(
                AlertLevel::Warning,
                AlertKind::Temperature,
                temperature,
                thresholds.temperature_high,
                format!("温度偏高: {:.1} °C", temperature),
            );
        }

        let efficiency = point.mean_efficiency();
        if efficiency < thresholds.efficiency_critical {
            raise(
                AlertLevel::Critical,
                AlertKind::Efficiency,
                efficiency,
                thresholds.efficiency_critical,
                format!("转换效率严重偏低: {:.1}%", efficiency * 100.0),
            );
        } else if efficiency < thresholds.efficiency_low {
            raise(
                AlertLevel::Warning,
                AlertKind::Efficiency,
                efficiency,
                thresholds.efficiency_low,
                format!("转换效率偏低: {:.1}%", efficiency * 100.0),
            );
        }

        let power = point.harvested_power();
        if point.environmental_data.vehicle_speed > POWER_CHECK_SPEED && power < thresholds.power_low {
            raise(
                AlertLevel::Warning,
                AlertKind::Power,
                power,
                thresholds.power_low,
                format!("行驶中回收功率偏低: {:.1} W", power),
            );
        }

        let vibration = point.environmental_data.vibration_level;
        if vibration > thresholds.vibration_high {
            raise(
                AlertLevel::Warning,
                AlertKind::Vibration,
                vibration,
                thresholds.vibration_high,
                format!("振动水平过高: {:.1} m/s²", vibration),
            );
        }

        let pressure = point.damper_data.hydraulic_pressure;
        if pressure > thresholds.pressure_high {
            raise(
                AlertLevel::Warning,
                AlertKind::Pressure,
                pressure,
                thresholds.pressure_high,
                format!("液压压力过高: {:.1} bar", pressure),
            );
        }

        for alert in alerts {
            match alert.level {
                AlertLevel::Critical => error!("[告警] {}", alert.message),
                AlertLevel::Warning => warn!("[告警] {}", alert.message),
            }
            self.alert_history.push_back(alert);
        }
        while self.alert_history.len() > ALERT_HISTORY_LIMIT {
            self.alert_history.pop_front();
        }
    }

    /// 以最近窗口为基线，只对窗口末尾的最新数据点评分
    fn real_time_check(&mut self) {
        let window = self.processor.get_recent_data(REAL_TIME_WINDOW);
        for anomaly in self.pattern_engine.detect_latest_anomalies(&window) {
            warn!("[实时异常] {:?}: {}", anomaly.severity, anomaly.description);
            self.recent_anomalies.push_back(anomaly);
        }
        while self.recent_anomalies.len() > ANOMALY_HISTORY_LIMIT {
            self.recent_anomalies.pop_front();
        }
    }

    // ---------- 分析 ----------

    /// 选取时间区间内的数据，未指定的端点视为无界
    fn select_data(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Vec<SuspensionDataPoint> {
        match (start, end) {
            (None, None) => self.processor.get_all_data(),
            (start, end) => self.processor.get_data_range(
                start.unwrap_or(DateTime::<Utc>::MIN_UTC),
                end.unwrap_or(DateTime::<Utc>::MAX_UTC),
            ),
        }
    }

    pub fn calculate_performance_metrics(&self, data: &[SuspensionDataPoint]) -> PerformanceMetrics {
        calculate_performance_metrics(data)
    }

    pub fn analyze_patterns(
        &mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<PatternAnalysisResult> {
        let data = self.select_data(start, end);
        self.pattern_engine.analyze_patterns(&data)
    }

    pub fn analyze_predictive_maintenance(
        &mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<MaintenanceAnalysis> {
        let data = self.select_data(start, end);
        self.maintenance_analyzer.analyze_predictive_maintenance(&data)
    }

    pub fn generate_optimization_recommendations(
        &mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<OptimizationRecommendation>> {
        let data = self.select_data(start, end);
        let metrics = calculate_performance_metrics(&data);
        self.optimizer
            .generate_optimization_recommendations(&data, &metrics)
    }

    pub fn evaluate_optimization_effectiveness(
        &self,
        before: &PerformanceMetrics,
        after: &PerformanceMetrics,
        implemented: &[OptimizationRecommendation],
    ) -> OptimizationEffectiveness {
        self.optimizer
            .evaluate_optimization_effectiveness(before, after, implemented)
    }

    /// 生成综合分析报告（至少 10 个数据点），并写入报告历史
    pub fn generate_analytics_report(
        &mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<AnalyticsReport> {
        let data = self.select_data(start, end);
        ensure_min_points("analytics_report", MIN_REPORT_POINTS, data.len())?;

        let (period_start, period_end) = match (data.first(), data.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => (Utc::now(), Utc::now()),
        };

        let performance_metrics = calculate_performance_metrics(&data);
        let pattern_analysis = self.pattern_engine.analyze_patterns(&data)?;

        let maintenance = if self.config.enable_predictive_maintenance
            && data.len() >= MIN_MAINTENANCE_POINTS
        {
            Some(self.maintenance_analyzer.analyze_predictive_maintenance(&data)?)
        } else {
            None
        };

        let optimization_recommendations = if data.len() >= MIN_OPTIMIZATION_POINTS {
            self.optimizer
                .generate_optimization_recommendations(&data, &performance_metrics)?
        } else {
            Vec::new()
        };

        let data_quality = self.processor.get_data_quality_metrics();
        let summary = build_summary(
            &performance_metrics,
            &pattern_analysis,
            maintenance.as_ref(),
            &optimization_recommendations,
            &data_quality,
            data.len(),
        );

        let report = AnalyticsReport {
            generated_at: Utc::now(),
            period: ReportPeriod {
                start: period_start,
                end: period_end,
            },
            data_points: data.len(),
            data_quality,
            data_quality_score: data_quality.overall(),
            performance_metrics,
            pattern_analysis,
            maintenance,
            optimization_recommendations,
            summary,
        };

        info!(
            "分析报告生成: 数据点={}, 综合性能={:.1}, 严重问题={}",
            report.data_points,
            report.summary.average_system_performance,
            report.summary.critical_issues.len()
        );

        self.report_history.push_back(report.clone());
        while self.report_history.len() > REPORT_HISTORY_LIMIT {
            self.report_history.pop_front();
        }
        debug!("报告历史: {}", self.report_history.len());

        Ok(report)
    }

    // ---------- 查询 ----------

    pub fn get_data_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<SuspensionDataPoint> {
        self.processor.get_data_range(start, end)
    }

    pub fn get_recent_data(&self, n: usize) -> Vec<SuspensionDataPoint> {
        self.processor.get_recent_data(n)
    }

    pub fn get_all_data(&self) -> Vec<SuspensionDataPoint> {
        self.processor.get_all_data()
    }

    pub fn get_data_quality_metrics(&self) -> DataQualityMetrics {
        self.processor.get_data_quality_metrics()
    }

    pub fn get_buffer_stats(&self) -> BufferStats {
        self.processor.get_buffer_stats()
    }

    pub fn report_history(&self) -> &VecDeque<AnalyticsReport> {
        &self.report_history
    }

    pub fn latest_report(&self) -> Option<&AnalyticsReport> {
        self.report_history.back()
    }

    pub fn alert_history(&self) -> &VecDeque<Alert> {
        &self.alert_history
    }

    /// 最近 n 条告警（按时间先后）
    pub fn recent_alerts(&self, n: usize) -> Vec<Alert> {
        self.alert_history
            .iter()
            .skip(self.alert_history.len().saturating_sub(n))
            .cloned()
            .collect()
    }

    pub fn recent_anomalies(&self) -> &VecDeque<AnomalyDetection> {
        &self.recent_anomalies
    }

    pub fn health_history(&self) -> &VecDeque<HealthScore> {
        self.maintenance_analyzer.health_history()
    }

    pub fn performance_baseline(&self) -> &IndexMap<String, f64> {
        self.optimizer.performance_baseline()
    }
}

// ============================================
// 报告摘要
// ============================================

/// 综合性能评分 = 100 × (0.4·效率 + 0.3·在线率 + 0.2·功率 + 0.1·(1 − 异常率))
pub fn average_system_performance(
    metrics: &PerformanceMetrics,
    anomaly_count: usize,
    data_points: usize,
) -> f64 {
    let power_score = (metrics.average_power / POWER_NORMALIZATION).min(1.0);
    let anomaly_rate = if data_points == 0 {
        0.0
    } else {
        (anomaly_count as f64 / data_points as f64).min(1.0)
    };

    let score = 100.0
        * (0.4 * metrics.average_efficiency
            + 0.3 * metrics.uptime
            + 0.2 * power_score
            + 0.1 * (1.0 - anomaly_rate));
    score.clamp(0.0, 100.0)
}

fn build_summary(
    metrics: &PerformanceMetrics,
    patterns: &PatternAnalysisResult,
    maintenance: Option<&MaintenanceAnalysis>,
    optimization: &[OptimizationRecommendation],
    quality: &DataQualityMetrics,
    data_points: usize,
) -> ReportSummary {
    let mut key_findings = vec![
        format!(
            "平均回收功率 {:.1} W (峰值 {:.1} W)",
            metrics.average_power, metrics.peak_power
        ),
        format!(
            "平均转换效率 {:.1}%",
            metrics.average_efficiency * 100.0
        ),
        format!(
            "共回收 {:.1} Wh, 数据点 {} 个",
            metrics.total_energy_harvested, data_points
        ),
        format!("性能趋势: {}", patterns.trend_direction.as_str()),
    ];

    if let Some(period) = patterns.seasonality.dominant_period.filter(|_| patterns.seasonality.is_seasonal) {
        key_findings.push(format!(
            "检测到周期性 (滞后 {} 个样本, 强度 {:.2})",
            period, patterns.seasonality.strength
        ));
    }
    for pattern in &patterns.performance_patterns {
        key_findings.push(format!(
            "{} 出现于 {:.0}% 的样本",
            pattern.name,
            pattern.frequency * 100.0
        ));
    }
    for correlation in patterns
        .correlations
        .iter()
        .filter(|c| c.correlation_coefficient.abs() > STRONG_CORRELATION)
    {
        key_findings.push(format!(
            "{} 与 {} 强相关 (r = {:.2})",
            correlation.variable1, correlation.variable2, correlation.correlation_coefficient
        ));
    }
    if quality.overall() < LOW_DATA_QUALITY {
        key_findings.push(format!("数据质量评分偏低 ({:.2})", quality.overall()));
    }

    let mut critical_issues = Vec::new();
    let severe_anomalies = patterns
        .anomalies
        .iter()
        .filter(|a| a.severity >= Severity::High)
        .count();
    if severe_anomalies > 0 {
        critical_issues.push(format!("检测到 {} 个高严重度异常", severe_anomalies));
    }

    let mut recommendations = Vec::new();

    if let Some(analysis) = maintenance {
        for component in analysis
            .health_score
            .components
            .iter()
            .filter(|c| c.status == HealthStatus::Critical)
        {
            critical_issues.push(format!(
                "{} 健康状态危急 ({:.0})",
                component.component.as_str(),
                component.score
            ));
        }
        for prediction in analysis
            .predictions
            .iter()
            .filter(|p| p.severity >= Severity::High)
        {
            critical_issues.push(format!(
                "{} 预计 {:.0} 天内失效",
                prediction.component.as_str(),
                prediction.remaining_useful_life
            ));
        }
        recommendations.extend(analysis.recommendations.iter().cloned());
    }

    for recommendation in optimization {
        if recommendation.priority == Priority::Critical {
            critical_issues.push(recommendation.title.clone());
        }
        if recommendation.priority >= Priority::High {
            recommendations.push(format!(
                "{}: {}",
                recommendation.title, recommendation.description
            ));
        }
    }
    for pattern in &patterns.performance_patterns {
        recommendations.push(pattern.recommendation.clone());
    }

    let mut seen = HashSet::new();
    recommendations.retain(|r| seen.insert(r.clone()));

    ReportSummary {
        key_findings,
        critical_issues,
        recommendations,
        average_system_performance: average_system_performance(
            metrics,
            patterns.anomalies.len(),
            data_points,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlertThresholds;
    use crate::test_support::{timestamp_at, Readings};
    use crate::types::Component;
    use crate::AnalyticsError;

    fn ingest<F>(analytics: &mut SuspensionDataAnalytics, range: std::ops::Range<usize>, customize: F)
    where
        F: Fn(usize, &mut Readings),
    {
        for i in range {
            let mut r = Readings::healthy();
            customize(i, &mut r);
            analytics.process_data_point_at(
                timestamp_at(i),
                Some(r.shock),
                Some(r.damper),
                Some(r.integration),
                Some(r.environment),
            );
        }
    }

    fn analytics() -> SuspensionDataAnalytics {
        SuspensionDataAnalytics::new(AnalyticsConfiguration::default()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_configuration() {
        let config = AnalyticsConfiguration::default().with_sampling_rate(0.0);
        assert!(matches!(
            SuspensionDataAnalytics::new(config),
            Err(AnalyticsError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_threshold_alerts() {
        let mut analytics = analytics();
        ingest(&mut analytics, 0..1, |_, r| {
            r.shock.operating_temperature = Some(105.0);
            r.shock.efficiency = Some(0.5);
            r.damper.efficiency = Some(0.5);
            r.environment.vibration_level = Some(25.0);
        });

        let alerts = analytics.recent_alerts(10);
        let kinds: Vec<(AlertKind, AlertLevel)> = alerts.iter().map(|a| (a.kind, a.level)).collect();
        assert_eq!(
            kinds,
            vec![
                (AlertKind::Temperature, AlertLevel::Critical),
                (AlertKind::Efficiency, AlertLevel::Warning),
                (AlertKind::Vibration, AlertLevel::Warning),
            ]
        );
        assert_eq!(alerts[0].threshold, 100.0);
        assert_eq!(alerts[0].timestamp, timestamp_at(0));
    }

    #[test]
    fn test_low_power_only_while_moving() {
        let mut analytics = analytics();
        ingest(&mut analytics, 0..2, |i, r| {
            r.shock.generated_power = Some(10.0);
            r.damper.generated_power = Some(10.0);
            r.environment.vehicle_speed = Some(if i == 0 { 0.0 } else { 40.0 });
        });

        let alerts = analytics.alert_history();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Power);
        assert_eq!(alerts[0].timestamp, timestamp_at(1));
    }

    #[test]
    fn test_custom_thresholds_silence_alerts() {
        let thresholds = AlertThresholds {
            vibration_high: 40.0,
            ..AlertThresholds::default()
        };
        let config = AnalyticsConfiguration::default().with_alert_thresholds(thresholds);
        let mut analytics = SuspensionDataAnalytics::new(config).unwrap();
        ingest(&mut analytics, 0..1, |_, r| r.environment.vibration_level = Some(25.0));
        assert!(analytics.alert_history().is_empty());
    }

    #[test]
    fn test_real_time_anomaly_on_newest_point() {
        let mut analytics = analytics();
        ingest(&mut analytics, 0..150, |_, _| {});
        assert!(analytics.recent_anomalies().is_empty());

        ingest(&mut analytics, 150..151, |_, r| r.shock.generated_power = Some(3000.0));
        let anomalies = analytics.recent_anomalies();
        assert!(!anomalies.is_empty());
        assert!(anomalies.iter().all(|a| a.timestamp == timestamp_at(150)));
        assert!(anomalies
            .iter()
            .any(|a| a.severity == Severity::Critical && a.value == 3000.0));
    }

    #[test]
    fn test_real_time_ignores_shared_timestamps() {
        let mut analytics = analytics();
        let stamp = timestamp_at(0);
        for i in 0..150 {
            let mut r = Readings::healthy();
            if i == 120 {
                r.shock.generated_power = Some(3000.0);
            }
            analytics.process_data_point_at(
                stamp,
                Some(r.shock),
                Some(r.damper),
                Some(r.integration),
                Some(r.environment),
            );
        }

        // 同一时间戳下，较早的尖峰只在自己入库时记录一次
        let spikes = analytics
            .recent_anomalies()
            .iter()
            .filter(|a| a.value == 3000.0)
            .count();
        assert_eq!(spikes, 1);
        assert_eq!(analytics.recent_anomalies().len(), 1);
    }

    #[test]
    fn test_alert_history_is_fifo_bounded() {
        let config = AnalyticsConfiguration::default().with_real_time_analysis(false);
        let mut analytics = SuspensionDataAnalytics::new(config).unwrap();
        ingest(&mut analytics, 0..ALERT_HISTORY_LIMIT + 5, |_, r| {
            r.environment.vibration_level = Some(25.0);
        });

        let history = analytics.alert_history();
        assert_eq!(history.len(), ALERT_HISTORY_LIMIT);
        assert_eq!(history.front().unwrap().timestamp, timestamp_at(5));
        assert_eq!(
            history.back().unwrap().timestamp,
            timestamp_at(ALERT_HISTORY_LIMIT + 4)
        );
    }

    #[test]
    fn test_anomaly_history_is_fifo_bounded() {
        // 高灵敏度下交替功率每个点都偏离 1 个标准差
        let config = AnalyticsConfiguration::default().with_sensitivity(0.9);
        let mut analytics = SuspensionDataAnalytics::new(config).unwrap();
        ingest(&mut analytics, 0..1200, |i, r| {
            r.shock.generated_power = Some(if i % 2 == 0 { 100.0 } else { 300.0 });
        });

        // 第 99 个点起每个点记录一条，共 1101 条
        let anomalies = analytics.recent_anomalies();
        assert_eq!(anomalies.len(), ANOMALY_HISTORY_LIMIT);
        assert_eq!(anomalies.front().unwrap().timestamp, timestamp_at(200));
        assert_eq!(anomalies.back().unwrap().timestamp, timestamp_at(1199));
    }

    #[test]
    fn test_real_time_analysis_disabled() {
        let config = AnalyticsConfiguration::default().with_real_time_analysis(false);
        let mut analytics = SuspensionDataAnalytics::new(config).unwrap();
        ingest(&mut analytics, 0..150, |_, _| {});
        ingest(&mut analytics, 150..151, |_, r| r.shock.generated_power = Some(3000.0));
        assert!(analytics.recent_anomalies().is_empty());
    }

    #[test]
    fn test_report_requires_ten_points() {
        let mut analytics = analytics();
        ingest(&mut analytics, 0..9, |_, _| {});
        assert!(matches!(
            analytics.generate_analytics_report(None, None),
            Err(AnalyticsError::InsufficientData {
                required: 10,
                actual: 9,
                ..
            })
        ));
        assert!(analytics.analyze_patterns(None, None).is_err());

        ingest(&mut analytics, 9..10, |_, _| {});
        let report = analytics.generate_analytics_report(None, None).unwrap();
        assert!(analytics.analyze_patterns(None, None).is_ok());
        assert_eq!(report.data_points, 10);
        assert!(report.maintenance.is_none());
        assert!(report.optimization_recommendations.is_empty());
        assert_eq!(report.period.start, timestamp_at(0));
        assert_eq!(report.period.end, timestamp_at(9));
        assert_eq!(analytics.report_history().len(), 1);
    }

    #[test]
    fn test_healthy_report_summary() {
        let mut analytics = analytics();
        ingest(&mut analytics, 0..120, |_, _| {});
        let report = analytics.generate_analytics_report(None, None).unwrap();

        // 100 × (0.4 × 0.85 + 0.3 × 1 + 0.2 × 250/2000 + 0.1 × 1)
        assert!((report.summary.average_system_performance - 76.5).abs() < 1e-6);
        assert!(report.summary.critical_issues.is_empty());
        assert!(report.maintenance.is_some());
        assert!(report.optimization_recommendations.is_empty());
        assert!((report.data_quality_score - 1.0).abs() < 1e-9);
        assert!(report
            .summary
            .key_findings
            .iter()
            .any(|f| f.starts_with("high_efficiency_operation")));
    }

    #[test]
    fn test_report_range_selection() {
        let mut analytics = analytics();
        ingest(&mut analytics, 0..60, |_, _| {});

        let report = analytics
            .generate_analytics_report(Some(timestamp_at(20)), None)
            .unwrap();
        assert_eq!(report.data_points, 40);
        assert_eq!(report.period.start, timestamp_at(20));

        let report = analytics
            .generate_analytics_report(None, Some(timestamp_at(14)))
            .unwrap();
        assert_eq!(report.data_points, 15);

        assert!(analytics
            .generate_analytics_report(Some(timestamp_at(55)), Some(timestamp_at(59)))
            .is_err());
    }

    #[test]
    fn test_report_history_is_fifo_bounded() {
        let mut analytics = analytics();
        ingest(&mut analytics, 0..9, |_, _| {});

        for k in 0..(REPORT_HISTORY_LIMIT + 5) {
            ingest(&mut analytics, 9 + k..10 + k, |_, _| {});
            analytics.generate_analytics_report(None, None).unwrap();
        }

        let history = analytics.report_history();
        assert_eq!(history.len(), REPORT_HISTORY_LIMIT);
        assert_eq!(history.front().map(|r| r.data_points), Some(15));
        assert_eq!(
            analytics.latest_report().map(|r| r.data_points),
            Some(REPORT_HISTORY_LIMIT + 14)
        );
    }

    #[test]
    fn test_decaying_shock_absorber_end_to_end() {
        let mut analytics = analytics();
        let decay = |i: usize, r: &mut Readings| {
            let progress = i as f64 / 199.0;
            r.shock.efficiency = Some(0.8 - 0.5 * progress);
            r.shock.operating_temperature = Some(60.0 + 30.0 * progress);
        };

        ingest(&mut analytics, 0..100, decay);
        let mut analysis = analytics.analyze_predictive_maintenance(None, None).unwrap();
        for n in (120..=200).step_by(20) {
            ingest(&mut analytics, n - 20..n, decay);
            analysis = analytics.analyze_predictive_maintenance(None, None).unwrap();
        }

        let shock = analysis.health_score.component(Component::ShockAbsorber).unwrap();
        assert!(matches!(shock.status, HealthStatus::Poor | HealthStatus::Critical));
        assert!(analysis.predictions.iter().any(|p| {
            p.component == Component::ShockAbsorber
                && matches!(p.severity, Severity::Medium | Severity::High | Severity::Critical)
        }));
        assert_eq!(analytics.health_history().len(), 6);

        let report = analytics.generate_analytics_report(None, None).unwrap();
        assert!(report
            .summary
            .critical_issues
            .iter()
            .any(|i| i.starts_with("shock_absorber 预计")));
        assert!(report.summary.average_system_performance < 76.5);
    }

    #[test]
    fn test_get_data_range_is_idempotent() {
        let mut analytics = analytics();
        ingest(&mut analytics, 0..30, |_, _| {});

        let first = analytics.get_data_range(timestamp_at(5), timestamp_at(15));
        let second = analytics.get_data_range(timestamp_at(5), timestamp_at(15));
        assert_eq!(first.len(), 11);
        assert_eq!(first, second);
        assert_eq!(analytics.get_buffer_stats().size, 30);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let mut analytics = analytics();
        ingest(&mut analytics, 0..120, |_, _| {});
        let report = analytics.generate_analytics_report(None, None).unwrap();

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["data_points"], 120);
        assert!(value["summary"]["average_system_performance"].is_number());
        assert!(value["maintenance"]["degradation_rates"]["shock_absorber"].is_number());
        assert_eq!(value["pattern_analysis"]["trend_direction"], "stable");

        let restored: AnalyticsReport = serde_json::from_value(value).unwrap();
        assert_eq!(restored.data_points, report.data_points);
    }

    #[test]
    fn test_shared_instance_across_threads() {
        let shared = analytics().into_shared();

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let shared = Arc::clone(&shared);
                scope.spawn(move || {
                    for i in 0..25 {
                        let r = Readings::healthy();
                        shared.write().process_data_point_at(
                            timestamp_at(worker * 25 + i),
                            Some(r.shock),
                            Some(r.damper),
                            Some(r.integration),
                            Some(r.environment),
                        );
                    }
                });
            }
        });

        let analytics = shared.read();
        assert_eq!(analytics.get_buffer_stats().total_processed, 100);
        assert_eq!(analytics.get_all_data().len(), 100);
    }
}
