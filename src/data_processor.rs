//! 数据预处理
//!
//! 原始读数在这里完成唯一一次校验：数值字段钳制到各自范围，枚举字段回退到取值集合的
//! 第一个成员，缺失的组件按最近数据插值。处理后的数据点写入有界缓冲区，同时滚动更新
//! 数据质量指标。

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use log::{debug, trace};

use crate::config::AnalyticsConfiguration;
use crate::statistics::ema;
use crate::types::{
    AllowedValues, BufferStats, ControlMode, DamperData, DamperMode, DampingMode,
    DataQualityMetrics, EnvironmentalData, IntegrationData, RawDamperReading,
    RawEnvironmentalReading, RawIntegrationReading, RawShockAbsorberReading, RawTelemetryFrame,
    RoadCondition, ShockAbsorberData, SuspensionDataPoint, SystemStatus,
};

/// 质量指标 EMA 系数
const QUALITY_ALPHA: f64 = 0.1;
/// 准确性/一致性开始更新所需的缓冲区长度（严格大于）
const QUALITY_WARMUP_POINTS: usize = 10;
const ACCURACY_WINDOW: usize = 10;
const CONSISTENCY_WINDOW: usize = 5;
/// 插值使用的最近数据点数
const INTERPOLATION_WINDOW: usize = 3;

// ============================================
// 字段范围
// ============================================

/// 数值字段的合法范围
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// 钳制到范围内；缺失或 NaN 取下限
    pub fn sanitize(&self, raw: Option<f64>) -> f64 {
        match raw {
            Some(v) if !v.is_nan() => v.clamp(self.min, self.max),
            _ => self.min,
        }
    }

    pub fn contains(&self, raw: Option<f64>) -> bool {
        matches!(raw, Some(v) if v >= self.min && v <= self.max)
    }
}

/// 各字段范围
pub mod ranges {
    use super::FieldRange;

    pub const DAMPING_FORCE: FieldRange = FieldRange::new(0.0, 10_000.0);
    pub const VELOCITY: FieldRange = FieldRange::new(-5.0, 5.0);
    pub const DISPLACEMENT: FieldRange = FieldRange::new(-0.2, 0.2);
    pub const GENERATED_POWER: FieldRange = FieldRange::new(0.0, 5_000.0);
    pub const EFFICIENCY: FieldRange = FieldRange::new(0.0, 1.0);
    pub const TEMPERATURE: FieldRange = FieldRange::new(-40.0, 150.0);

    pub const DAMPING_COEFFICIENT: FieldRange = FieldRange::new(0.0, 10_000.0);
    pub const HYDRAULIC_PRESSURE: FieldRange = FieldRange::new(0.0, 300.0);

    pub const TOTAL_POWER_OUTPUT: FieldRange = FieldRange::new(0.0, 10_000.0);
    pub const HARVESTED_ENERGY: FieldRange = FieldRange::new(0.0, 1.0e7);
    pub const STORAGE_SOC: FieldRange = FieldRange::new(0.0, 1.0);
    pub const OPERATIONAL_CYCLES: FieldRange = FieldRange::new(0.0, 1.0e12);

    pub const VEHICLE_SPEED: FieldRange = FieldRange::new(0.0, 300.0);
    pub const ROAD_ROUGHNESS: FieldRange = FieldRange::new(0.0, 10.0);
    pub const AMBIENT_TEMPERATURE: FieldRange = FieldRange::new(-40.0, 60.0);
    pub const VIBRATION_LEVEL: FieldRange = FieldRange::new(0.0, 50.0);
}

// ============================================
// 数据处理器
// ============================================

/// 数据处理器：校验、缓冲与质量评分
#[derive(Debug)]
pub struct DataProcessor {
    buffer: VecDeque<SuspensionDataPoint>,
    max_buffer_size: usize,
    expected_interval_ms: f64,
    quality: DataQualityMetrics,
    total_processed: u64,
    total_evicted: u64,
}

impl DataProcessor {
    /// 按配置创建（容量 = 保留天数 × 86400 × 采样率）
    pub fn new(config: &AnalyticsConfiguration) -> Self {
        Self::with_capacity(config.buffer_capacity(), config.sampling_rate)
    }

    /// 指定缓冲区容量和采样率创建
    pub fn with_capacity(max_buffer_size: usize, sampling_rate: f64) -> Self {
        Self {
            buffer: VecDeque::new(),
            max_buffer_size: max_buffer_size.max(1),
            expected_interval_ms: 1000.0 / sampling_rate,
            quality: DataQualityMetrics::default(),
            total_processed: 0,
            total_evicted: 0,
        }
    }

    /// 处理一组读数（时间戳取当前时间）
    pub fn process_data_point(
        &mut self,
        shock: Option<RawShockAbsorberReading>,
        damper: Option<RawDamperReading>,
        integration: Option<RawIntegrationReading>,
        environment: Option<RawEnvironmentalReading>,
    ) -> SuspensionDataPoint {
        self.process_data_point_at(Utc::now(), shock, damper, integration, environment)
    }

    /// 处理一帧原始遥测，帧内无时间戳时取当前时间
    pub fn process_frame(&mut self, frame: RawTelemetryFrame) -> SuspensionDataPoint {
        self.process_data_point_at(
            frame.timestamp.unwrap_or_else(Utc::now),
            frame.shock_absorber_data,
            frame.damper_data,
            frame.integration_data,
            frame.environmental_data,
        )
    }

    /// 以指定时间戳处理一组读数
    pub fn process_data_point_at(
        &mut self,
        timestamp: DateTime<Utc>,
        shock: Option<RawShockAbsorberReading>,
        damper: Option<RawDamperReading>,
        integration: Option<RawIntegrationReading>,
        environment: Option<RawEnvironmentalReading>,
    ) -> SuspensionDataPoint {
        let present = [
            shock.is_some(),
            damper.is_some(),
            integration.is_some(),
            environment.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count();

        // 有效性基于原始值判定（钳制后必然合法）
        let validity_checks = [
            ranges::EFFICIENCY.contains(shock.as_ref().and_then(|s| s.efficiency)),
            ranges::EFFICIENCY.contains(damper.as_ref().and_then(|d| d.efficiency)),
            ranges::VEHICLE_SPEED.contains(environment.as_ref().and_then(|e| e.vehicle_speed)),
            ranges::STORAGE_SOC.contains(integration.as_ref().and_then(|i| i.storage_soc)),
        ];
        let validity = validity_checks.iter().filter(|c| **c).count() as f64 / 4.0;

        let point = SuspensionDataPoint {
            timestamp,
            shock_absorber_data: match &shock {
                Some(raw) => sanitize_shock_absorber(raw),
                None => self.interpolate_shock_absorber(),
            },
            damper_data: match &damper {
                Some(raw) => sanitize_damper(raw),
                None => self.interpolate_damper(),
            },
            integration_data: match &integration {
                Some(raw) => sanitize_integration(raw),
                None => self.interpolate_integration(),
            },
            environmental_data: match &environment {
                Some(raw) => sanitize_environment(raw),
                None => EnvironmentalData::default(),
            },
        };

        let timeliness = self.timeliness_sample(timestamp);

        self.buffer.push_back(point.clone());
        self.total_processed += 1;
        self.trim_to_capacity();

        self.update_quality_metrics(present as f64 / 4.0, validity, timeliness);

        trace!(
            "数据点已处理: ts={}, 组件完整度={}/4, 缓冲区={}",
            timestamp,
            present,
            self.buffer.len()
        );
        point
    }

    /// 保留最新的 max_buffer_size 个数据点
    fn trim_to_capacity(&mut self) {
        if self.buffer.len() <= self.max_buffer_size {
            return;
        }
        let overflow = self.buffer.len() - self.max_buffer_size;
        self.buffer.drain(..overflow);
        self.total_evicted += overflow as u64;
        debug!("缓冲区已满，淘汰 {} 个最旧数据点", overflow);
    }

    // ============================================
    // 插值
    // ============================================

    /// 插值来源：最近 3 个数据点，不足 3 个时无法插值
    fn interpolation_source(&self) -> Option<impl Iterator<Item = &SuspensionDataPoint> + Clone> {
        if self.buffer.len() < INTERPOLATION_WINDOW {
            return None;
        }
        Some(self.buffer.iter().skip(self.buffer.len() - INTERPOLATION_WINDOW))
    }

    fn interpolate_shock_absorber(&self) -> ShockAbsorberData {
        let mut data = ShockAbsorberData::default();
        if let Some(recent) = self.interpolation_source() {
            data.generated_power = recent_mean(recent.clone(), |p| p.shock_absorber_data.generated_power);
            data.efficiency = recent_mean(recent, |p| p.shock_absorber_data.efficiency);
            debug!("减振器数据缺失，已按最近 {} 个数据点插值", INTERPOLATION_WINDOW);
        }
        data
    }

    fn interpolate_damper(&self) -> DamperData {
        let mut data = DamperData::default();
        if let Some(recent) = self.interpolation_source() {
            data.generated_power = recent_mean(recent.clone(), |p| p.damper_data.generated_power);
            data.efficiency = recent_mean(recent, |p| p.damper_data.efficiency);
            debug!("阻尼器数据缺失，已按最近 {} 个数据点插值", INTERPOLATION_WINDOW);
        }
        data
    }

    fn interpolate_integration(&self) -> IntegrationData {
        let mut data = IntegrationData::default();
        if let Some(recent) = self.interpolation_source() {
            data.total_power_output =
                recent_mean(recent.clone(), |p| p.integration_data.total_power_output);
            data.system_efficiency = recent_mean(recent, |p| p.integration_data.system_efficiency);
            debug!("集成数据缺失，已按最近 {} 个数据点插值", INTERPOLATION_WINDOW);
        }
        data
    }

    // ============================================
    // 数据质量
    // ============================================

    fn timeliness_sample(&self, timestamp: DateTime<Utc>) -> f64 {
        match self.buffer.back() {
            Some(last) => {
                let actual = (timestamp - last.timestamp).num_milliseconds() as f64;
                let expected = self.expected_interval_ms;
                (1.0 - (actual - expected).abs() / expected).max(0.0)
            }
            None => 1.0,
        }
    }

    fn update_quality_metrics(&mut self, completeness: f64, validity: f64, timeliness: f64) {
        let q = &mut self.quality;
        q.completeness = ema(q.completeness, completeness, QUALITY_ALPHA);
        q.validity = ema(q.validity, validity, QUALITY_ALPHA);
        q.timeliness = ema(q.timeliness, timeliness, QUALITY_ALPHA);

        if self.buffer.len() > QUALITY_WARMUP_POINTS {
            let accuracy = self.accuracy_sample();
            let consistency = self.consistency_sample();
            let q = &mut self.quality;
            q.accuracy = ema(q.accuracy, accuracy, QUALITY_ALPHA);
            q.consistency = ema(q.consistency, consistency, QUALITY_ALPHA);
        }
    }

    /// 最近 10 个点中，相邻功率变化不超过前值 50% 的比例
    fn accuracy_sample(&self) -> f64 {
        let powers: Vec<f64> = self
            .recent_iter(ACCURACY_WINDOW)
            .map(SuspensionDataPoint::harvested_power)
            .collect();
        if powers.len() < 2 {
            return 1.0;
        }

        let stable = powers
            .windows(2)
            .filter(|w| (w[1] - w[0]).abs() <= 0.5 * w[0])
            .count();
        stable as f64 / (powers.len() - 1) as f64
    }

    /// 最近 5 个点中同时满足功率/效率一致与温差 < 20°C 的比例
    fn consistency_sample(&self) -> f64 {
        let window: Vec<&SuspensionDataPoint> = self.recent_iter(CONSISTENCY_WINDOW).collect();
        if window.is_empty() {
            return 1.0;
        }

        let coherent = window
            .iter()
            .filter(|p| {
                let power_matches = (p.harvested_power() > 0.0) == (p.mean_efficiency() > 0.1);
                let temp_delta =
                    (p.shock_absorber_data.operating_temperature - p.damper_data.temperature).abs();
                power_matches && temp_delta < 20.0
            })
            .count();
        coherent as f64 / window.len() as f64
    }

    // ============================================
    // 查询
    // ============================================

    fn recent_iter(&self, n: usize) -> impl Iterator<Item = &SuspensionDataPoint> {
        let skip = self.buffer.len().saturating_sub(n);
        self.buffer.iter().skip(skip)
    }

    /// 获取时间范围内（含端点）的数据
    pub fn get_data_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<SuspensionDataPoint> {
        if start > end {
            return Vec::new();
        }
        self.buffer
            .iter()
            .filter(|p| p.timestamp >= start && p.timestamp <= end)
            .cloned()
            .collect()
    }

    /// 获取最近 n 个数据点
    pub fn get_recent_data(&self, n: usize) -> Vec<SuspensionDataPoint> {
        self.recent_iter(n).cloned().collect()
    }

    pub fn get_all_data(&self) -> Vec<SuspensionDataPoint> {
        self.buffer.iter().cloned().collect()
    }

    pub fn get_data_quality_metrics(&self) -> DataQualityMetrics {
        self.quality
    }

    pub fn get_buffer_stats(&self) -> BufferStats {
        BufferStats {
            size: self.buffer.len(),
            capacity: self.max_buffer_size,
            utilization: self.buffer.len() as f64 / self.max_buffer_size as f64,
            oldest_timestamp: self.buffer.front().map(|p| p.timestamp),
            newest_timestamp: self.buffer.back().map(|p| p.timestamp),
            total_processed: self.total_processed,
            total_evicted: self.total_evicted,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// 清空缓冲区（质量指标保留）
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

fn recent_mean<'a, I, F>(points: I, field: F) -> f64
where
    I: Iterator<Item = &'a SuspensionDataPoint>,
    F: Fn(&SuspensionDataPoint) -> f64,
{
    let (sum, count) = points.fold((0.0, 0usize), |(sum, count), p| (sum + field(p), count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

// ============================================
// 校验边界
// ============================================

fn sanitize_shock_absorber(raw: &RawShockAbsorberReading) -> ShockAbsorberData {
    ShockAbsorberData {
        damping_force: ranges::DAMPING_FORCE.sanitize(raw.damping_force),
        velocity: ranges::VELOCITY.sanitize(raw.velocity),
        displacement: ranges::DISPLACEMENT.sanitize(raw.displacement),
        generated_power: ranges::GENERATED_POWER.sanitize(raw.generated_power),
        efficiency: ranges::EFFICIENCY.sanitize(raw.efficiency),
        operating_temperature: ranges::TEMPERATURE.sanitize(raw.operating_temperature),
        damping_mode: DampingMode::from_label(raw.damping_mode.as_deref()),
    }
}

fn sanitize_damper(raw: &RawDamperReading) -> DamperData {
    DamperData {
        damping_coefficient: ranges::DAMPING_COEFFICIENT.sanitize(raw.damping_coefficient),
        hydraulic_pressure: ranges::HYDRAULIC_PRESSURE.sanitize(raw.hydraulic_pressure),
        generated_power: ranges::GENERATED_POWER.sanitize(raw.generated_power),
        efficiency: ranges::EFFICIENCY.sanitize(raw.efficiency),
        temperature: ranges::TEMPERATURE.sanitize(raw.temperature),
        operating_mode: DamperMode::from_label(raw.operating_mode.as_deref()),
    }
}

fn sanitize_integration(raw: &RawIntegrationReading) -> IntegrationData {
    IntegrationData {
        total_power_output: ranges::TOTAL_POWER_OUTPUT.sanitize(raw.total_power_output),
        harvested_energy: ranges::HARVESTED_ENERGY.sanitize(raw.harvested_energy),
        storage_soc: ranges::STORAGE_SOC.sanitize(raw.storage_soc),
        system_efficiency: ranges::EFFICIENCY.sanitize(raw.system_efficiency),
        operational_cycles: ranges::OPERATIONAL_CYCLES.sanitize(raw.operational_cycles),
        system_status: SystemStatus::from_label(raw.system_status.as_deref()),
        control_mode: ControlMode::from_label(raw.control_mode.as_deref()),
    }
}

fn sanitize_environment(raw: &RawEnvironmentalReading) -> EnvironmentalData {
    EnvironmentalData {
        vehicle_speed: ranges::VEHICLE_SPEED.sanitize(raw.vehicle_speed),
        road_roughness: ranges::ROAD_ROUGHNESS.sanitize(raw.road_roughness),
        ambient_temperature: ranges::AMBIENT_TEMPERATURE.sanitize(raw.ambient_temperature),
        vibration_level: ranges::VIBRATION_LEVEL.sanitize(raw.vibration_level),
        road_condition: RoadCondition::from_label(raw.road_condition.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{timestamp_at, Readings};
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use serde_json::json;

    fn ingest(processor: &mut DataProcessor, index: usize, readings: &Readings) -> SuspensionDataPoint {
        let r = readings.clone();
        processor.process_data_point_at(
            timestamp_at(index),
            Some(r.shock),
            Some(r.damper),
            Some(r.integration),
            Some(r.environment),
        )
    }

    #[test]
    fn test_clamping_extreme_values() {
        let mut processor = DataProcessor::with_capacity(100, 10.0);
        let mut readings = Readings::healthy();
        readings.shock.damping_force = Some(1.0e9);
        readings.shock.velocity = Some(-1.0e9);
        readings.shock.efficiency = Some(f64::INFINITY);
        readings.damper.hydraulic_pressure = Some(f64::NEG_INFINITY);
        readings.damper.temperature = Some(f64::NAN);
        readings.environment.vehicle_speed = Some(-30.0);

        let point = ingest(&mut processor, 0, &readings);

        assert_eq!(point.shock_absorber_data.damping_force, 10_000.0);
        assert_eq!(point.shock_absorber_data.velocity, -5.0);
        assert_eq!(point.shock_absorber_data.efficiency, 1.0);
        assert_eq!(point.damper_data.hydraulic_pressure, 0.0);
        assert_eq!(point.damper_data.temperature, -40.0);
        assert_eq!(point.environmental_data.vehicle_speed, 0.0);
    }

    #[test]
    fn test_clamping_random_inputs() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut processor = DataProcessor::with_capacity(1000, 10.0);

        for i in 0..500 {
            let mut readings = Readings::healthy();
            readings.shock.generated_power = Some(rng.gen_range(-1.0e6..1.0e6));
            readings.shock.displacement = Some(rng.gen_range(-10.0..10.0));
            readings.damper.efficiency = Some(rng.gen_range(-5.0..5.0));
            readings.integration.storage_soc = Some(rng.gen_range(-2.0..3.0));
            readings.environment.road_roughness = Some(rng.gen_range(-100.0..100.0));
            let point = ingest(&mut processor, i, &readings);

            assert!((0.0..=5_000.0).contains(&point.shock_absorber_data.generated_power));
            assert!((-0.2..=0.2).contains(&point.shock_absorber_data.displacement));
            assert!((0.0..=1.0).contains(&point.damper_data.efficiency));
            assert!((0.0..=1.0).contains(&point.integration_data.storage_soc));
            assert!((0.0..=10.0).contains(&point.environmental_data.road_roughness));
        }
    }

    #[test]
    fn test_non_numeric_and_invalid_labels() {
        let mut processor = DataProcessor::with_capacity(100, 10.0);
        let frame: RawTelemetryFrame = serde_json::from_value(json!({
            "timestamp": "2024-01-01T00:00:00Z",
            "shockAbsorberData": {
                "operatingTemperature": "hot",
                "generatedPower": "250",
                "dampingMode": "turbo"
            },
            "damperData": { "operatingMode": 7 },
            "integrationData": { "systemStatus": "fault" },
            "environmentalData": { "roadCondition": "ice", "vehicleSpeed": [1, 2] }
        }))
        .unwrap();

        let point = processor.process_frame(frame);

        assert_eq!(point.shock_absorber_data.operating_temperature, -40.0);
        assert_eq!(point.shock_absorber_data.generated_power, 250.0);
        assert_eq!(point.shock_absorber_data.damping_mode, DampingMode::Comfort);
        assert_eq!(point.damper_data.operating_mode, DamperMode::Hybrid);
        assert_eq!(point.integration_data.system_status, SystemStatus::Fault);
        assert_eq!(point.environmental_data.road_condition, RoadCondition::Ice);
        assert_eq!(point.environmental_data.vehicle_speed, 0.0);
    }

    #[test]
    fn test_buffer_trims_to_capacity() {
        let mut processor = DataProcessor::with_capacity(5, 10.0);
        let readings = Readings::healthy();

        for i in 0..12 {
            ingest(&mut processor, i, &readings);
            assert!(processor.len() <= 5);
        }

        let stats = processor.get_buffer_stats();
        assert_eq!(stats.size, 5);
        assert_eq!(stats.total_processed, 12);
        assert_eq!(stats.total_evicted, 7);
        assert_eq!(stats.oldest_timestamp, Some(timestamp_at(7)));
        assert_eq!(stats.newest_timestamp, Some(timestamp_at(11)));
        assert!((stats.utilization - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_interpolates_missing_component() {
        let mut processor = DataProcessor::with_capacity(100, 10.0);
        for (i, power) in [100.0, 200.0, 300.0].iter().enumerate() {
            let mut readings = Readings::healthy();
            readings.shock.generated_power = Some(*power);
            readings.shock.efficiency = Some(0.6 + 0.1 * i as f64);
            ingest(&mut processor, i, &readings);
        }

        let readings = Readings::healthy();
        let point = processor.process_data_point_at(
            timestamp_at(3),
            None,
            Some(readings.damper),
            Some(readings.integration),
            Some(readings.environment),
        );

        assert!((point.shock_absorber_data.generated_power - 200.0).abs() < 1e-9);
        assert!((point.shock_absorber_data.efficiency - 0.7).abs() < 1e-9);
        assert_eq!(point.shock_absorber_data.damping_force, 0.0);
    }

    #[test]
    fn test_early_missing_component_uses_zero_defaults() {
        let mut processor = DataProcessor::with_capacity(100, 10.0);
        let readings = Readings::healthy();
        ingest(&mut processor, 0, &readings);
        ingest(&mut processor, 1, &readings);

        let point = processor.process_data_point_at(timestamp_at(2), None, None, None, None);

        assert_eq!(point.shock_absorber_data, ShockAbsorberData::default());
        assert_eq!(point.damper_data, DamperData::default());
        assert_eq!(point.integration_data.system_status, SystemStatus::Online);
        assert_eq!(point.environmental_data, EnvironmentalData::default());
    }

    #[test]
    fn test_quality_scores_stay_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut processor = DataProcessor::with_capacity(200, 10.0);
        let mut ts = timestamp_at(0);

        for _ in 0..1000 {
            ts = ts + Duration::milliseconds(rng.gen_range(0..1000));
            let mut readings = Readings::healthy();
            readings.shock.generated_power = Some(rng.gen_range(-500.0..6000.0));
            readings.shock.efficiency = Some(rng.gen_range(-1.0..2.0));
            readings.damper.temperature = Some(rng.gen_range(-100.0..200.0));
            readings.environment.vehicle_speed = Some(rng.gen_range(-50.0..400.0));
            let r = readings.clone();

            processor.process_data_point_at(
                ts,
                rng.gen_bool(0.8).then_some(r.shock),
                rng.gen_bool(0.8).then_some(r.damper),
                rng.gen_bool(0.8).then_some(r.integration),
                rng.gen_bool(0.8).then_some(r.environment),
            );

            let q = processor.get_data_quality_metrics();
            for score in [q.completeness, q.accuracy, q.consistency, q.timeliness, q.validity] {
                assert!((0.0..=1.0).contains(&score), "评分超出范围: {}", score);
            }
        }
    }

    #[test]
    fn test_timeliness_tracks_cadence() {
        let mut on_time = DataProcessor::with_capacity(100, 10.0);
        let readings = Readings::healthy();
        for i in 0..30 {
            ingest(&mut on_time, i, &readings);
        }
        assert!((on_time.get_data_quality_metrics().timeliness - 1.0).abs() < 1e-9);

        let mut late = DataProcessor::with_capacity(100, 10.0);
        for i in 0..30 {
            ingest(&mut late, i * 3, &readings);
        }
        assert!(late.get_data_quality_metrics().timeliness < 0.1);
    }

    #[test]
    fn test_completeness_and_validity_decay() {
        let mut processor = DataProcessor::with_capacity(100, 10.0);
        let readings = Readings::healthy();
        for i in 0..20 {
            let r = readings.clone();
            processor.process_data_point_at(timestamp_at(i), Some(r.shock), None, None, None);
        }

        let q = processor.get_data_quality_metrics();
        assert!(q.completeness < 0.4);
        assert!(q.validity < 0.4);
    }

    #[test]
    fn test_accuracy_only_updates_after_warmup() {
        let mut processor = DataProcessor::with_capacity(100, 10.0);
        for i in 0..10 {
            let mut readings = Readings::healthy();
            readings.shock.generated_power = Some(if i % 2 == 0 { 10.0 } else { 1000.0 });
            ingest(&mut processor, i, &readings);
        }
        assert_eq!(processor.get_data_quality_metrics().accuracy, 1.0);

        let mut readings = Readings::healthy();
        readings.shock.generated_power = Some(10.0);
        ingest(&mut processor, 10, &readings);
        assert!(processor.get_data_quality_metrics().accuracy < 1.0);
    }

    #[test]
    fn test_consistency_detects_temperature_mismatch() {
        let mut processor = DataProcessor::with_capacity(100, 10.0);
        let mut readings = Readings::healthy();
        readings.shock.operating_temperature = Some(90.0);
        readings.damper.temperature = Some(40.0);
        for i in 0..30 {
            ingest(&mut processor, i, &readings);
        }
        assert!(processor.get_data_quality_metrics().consistency < 0.5);
    }

    #[test]
    fn test_data_range_queries() {
        let mut processor = DataProcessor::with_capacity(100, 10.0);
        let readings = Readings::healthy();
        for i in 0..20 {
            ingest(&mut processor, i, &readings);
        }

        let first = processor.get_data_range(timestamp_at(5), timestamp_at(9));
        let second = processor.get_data_range(timestamp_at(5), timestamp_at(9));
        assert_eq!(first.len(), 5);
        assert_eq!(first, second);

        assert!(processor
            .get_data_range(timestamp_at(100), timestamp_at(200))
            .is_empty());
        assert!(processor
            .get_data_range(timestamp_at(9), timestamp_at(5))
            .is_empty());

        let recent = processor.get_recent_data(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[2].timestamp, timestamp_at(19));
        assert_eq!(processor.get_recent_data(500).len(), 20);
        assert_eq!(processor.get_all_data().len(), 20);
    }
}
