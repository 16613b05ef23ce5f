//! 分析配置
//!
//! JSON 键名与外部配置保持一致（camelCase），缺失的键取默认值。

use serde::{Deserialize, Serialize};

use crate::{AnalyticsError, Result};

/// 告警阈值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertThresholds {
    /// 高温告警 (°C)
    pub temperature_high: f64,
    /// 高温严重告警 (°C)
    pub temperature_critical: f64,
    pub efficiency_low: f64,
    pub efficiency_critical: f64,
    /// 低功率告警 (W)
    pub power_low: f64,
    /// 振动告警 (m/s²)
    pub vibration_high: f64,
    /// 液压告警 (bar)
    pub pressure_high: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            temperature_high: 85.0,
            temperature_critical: 100.0,
            efficiency_low: 0.6,
            efficiency_critical: 0.4,
            power_low: 50.0,
            vibration_high: 20.0,
            pressure_high: 250.0,
        }
    }
}

/// 分析配置（会话期间不可变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsConfiguration {
    /// 数据保留期（天），决定缓冲区容量
    pub data_retention_period: f64,
    /// 采样率 (Hz)
    pub sampling_rate: f64,
    /// 异常检测灵敏度 (0-1)，越高阈值越低
    pub anomaly_detection_sensitivity: f64,
    /// 预测时间范围（天），仅供参考
    pub prediction_horizon: f64,
    pub enable_real_time_analysis: bool,
    pub enable_predictive_maintenance: bool,
    pub alert_thresholds: AlertThresholds,
}

impl Default for AnalyticsConfiguration {
    fn default() -> Self {
        Self {
            data_retention_period: 7.0,
            sampling_rate: 10.0,
            anomaly_detection_sensitivity: 0.1,
            prediction_horizon: 30.0,
            enable_real_time_analysis: true,
            enable_predictive_maintenance: true,
            alert_thresholds: AlertThresholds::default(),
        }
    }
}

impl AnalyticsConfiguration {
    /// 从 JSON 字符串解析并校验配置
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AnalyticsError::InvalidConfiguration(format!("JSON 解析失败: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_retention_days(mut self, days: f64) -> Self {
        self.data_retention_period = days;
        self
    }

    pub fn with_sampling_rate(mut self, hz: f64) -> Self {
        self.sampling_rate = hz;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f64) -> Self {
        self.anomaly_detection_sensitivity = sensitivity;
        self
    }

    pub fn with_real_time_analysis(mut self, enabled: bool) -> Self {
        self.enable_real_time_analysis = enabled;
        self
    }

    pub fn with_predictive_maintenance(mut self, enabled: bool) -> Self {
        self.enable_predictive_maintenance = enabled;
        self
    }

    pub fn with_alert_thresholds(mut self, thresholds: AlertThresholds) -> Self {
        self.alert_thresholds = thresholds;
        self
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if !self.sampling_rate.is_finite() || self.sampling_rate <= 0.0 {
            return Err(AnalyticsError::InvalidConfiguration(format!(
                "采样率必须为正数，实际值: {}",
                self.sampling_rate
            )));
        }
        if !self.data_retention_period.is_finite() || self.data_retention_period <= 0.0 {
            return Err(AnalyticsError::InvalidConfiguration(format!(
                "数据保留期必须为正数，实际值: {}",
                self.data_retention_period
            )));
        }
        if !(0.0..=1.0).contains(&self.anomaly_detection_sensitivity) {
            return Err(AnalyticsError::InvalidConfiguration(format!(
                "异常检测灵敏度必须在 [0, 1] 范围内，实际值: {}",
                self.anomaly_detection_sensitivity
            )));
        }
        if !self.prediction_horizon.is_finite() || self.prediction_horizon <= 0.0 {
            return Err(AnalyticsError::InvalidConfiguration(format!(
                "预测时间范围必须为正数，实际值: {}",
                self.prediction_horizon
            )));
        }

        let t = &self.alert_thresholds;
        if t.temperature_high >= t.temperature_critical {
            return Err(AnalyticsError::InvalidConfiguration(format!(
                "高温阈值 {} 必须低于严重阈值 {}",
                t.temperature_high, t.temperature_critical
            )));
        }
        if t.efficiency_critical >= t.efficiency_low {
            return Err(AnalyticsError::InvalidConfiguration(format!(
                "效率严重阈值 {} 必须低于告警阈值 {}",
                t.efficiency_critical, t.efficiency_low
            )));
        }
        Ok(())
    }

    /// 缓冲区容量 = 保留天数 × 86400 × 采样率（至少为 1）
    pub fn buffer_capacity(&self) -> usize {
        let capacity = (self.data_retention_period * 86_400.0 * self.sampling_rate).floor();
        if capacity.is_finite() && capacity >= 1.0 {
            capacity as usize
        } else {
            1
        }
    }

    /// 期望采样间隔 (ms)
    pub fn expected_interval_ms(&self) -> f64 {
        1000.0 / self.sampling_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalyticsConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.buffer_capacity(), 7 * 86_400 * 10);
        assert!((config.expected_interval_ms() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_json_partial() {
        let config = AnalyticsConfiguration::from_json_str(
            r#"{
                "dataRetentionPeriod": 1,
                "samplingRate": 50,
                "alertThresholds": { "pressureHigh": 180 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.sampling_rate, 50.0);
        assert_eq!(config.buffer_capacity(), 86_400 * 50);
        assert_eq!(config.alert_thresholds.pressure_high, 180.0);
        assert_eq!(config.alert_thresholds.temperature_high, 85.0);
        assert!(config.enable_predictive_maintenance);
    }

    #[test]
    fn test_invalid_configurations() {
        let bad_rate = AnalyticsConfiguration::default().with_sampling_rate(0.0);
        assert!(matches!(
            bad_rate.validate(),
            Err(AnalyticsError::InvalidConfiguration(_))
        ));

        let bad_sensitivity = AnalyticsConfiguration::default().with_sensitivity(1.5);
        assert!(bad_sensitivity.validate().is_err());

        let bad_thresholds = AnalyticsConfiguration::default().with_alert_thresholds(AlertThresholds {
            temperature_high: 120.0,
            ..AlertThresholds::default()
        });
        assert!(bad_thresholds.validate().is_err());

        assert!(AnalyticsConfiguration::from_json_str("not json").is_err());
        assert!(AnalyticsConfiguration::from_json_str(r#"{"samplingRate": -5}"#).is_err());
    }

    #[test]
    fn test_tiny_retention_capacity() {
        let config = AnalyticsConfiguration::default()
            .with_retention_days(1.0 / 86_400.0)
            .with_sampling_rate(0.5);
        assert_eq!(config.buffer_capacity(), 1);
    }
}
