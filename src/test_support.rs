//! 测试用合成数据

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::data_processor::DataProcessor;
use crate::types::{
    RawDamperReading, RawEnvironmentalReading, RawIntegrationReading, RawShockAbsorberReading,
    SuspensionDataPoint,
};

/// 一组完整的原始读数
#[derive(Debug, Clone)]
pub(crate) struct Readings {
    pub shock: RawShockAbsorberReading,
    pub damper: RawDamperReading,
    pub integration: RawIntegrationReading,
    pub environment: RawEnvironmentalReading,
}

impl Readings {
    /// 健康工况下的恒定读数
    pub fn healthy() -> Self {
        Self {
            shock: RawShockAbsorberReading {
                damping_force: Some(1200.0),
                velocity: Some(0.5),
                displacement: Some(0.02),
                generated_power: Some(150.0),
                efficiency: Some(0.85),
                operating_temperature: Some(55.0),
                damping_mode: Some("comfort".to_string()),
            },
            damper: RawDamperReading {
                damping_coefficient: Some(2500.0),
                hydraulic_pressure: Some(120.0),
                generated_power: Some(100.0),
                efficiency: Some(0.85),
                temperature: Some(50.0),
                operating_mode: Some("hybrid".to_string()),
            },
            integration: RawIntegrationReading {
                total_power_output: Some(250.0),
                harvested_energy: Some(1000.0),
                storage_soc: Some(0.7),
                system_efficiency: Some(0.85),
                operational_cycles: Some(10_000.0),
                system_status: Some("online".to_string()),
                control_mode: Some("automatic".to_string()),
            },
            environment: RawEnvironmentalReading {
                vehicle_speed: Some(60.0),
                road_roughness: Some(3.0),
                ambient_temperature: Some(20.0),
                vibration_level: Some(5.0),
                road_condition: Some("dry".to_string()),
            },
        }
    }
}

pub(crate) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// 第 index 个采样时刻（10 Hz）
pub(crate) fn timestamp_at(index: usize) -> DateTime<Utc> {
    base_time() + Duration::milliseconds(100 * index as i64)
}

/// 生成 n 个数据点，每个点的读数由 customize 在健康读数基础上调整
pub(crate) fn series<F>(n: usize, customize: F) -> Vec<SuspensionDataPoint>
where
    F: Fn(usize, &mut Readings),
{
    let mut processor = DataProcessor::with_capacity(n.max(1), 10.0);
    for i in 0..n {
        let mut readings = Readings::healthy();
        customize(i, &mut readings);
        processor.process_data_point_at(
            timestamp_at(i),
            Some(readings.shock),
            Some(readings.damper),
            Some(readings.integration),
            Some(readings.environment),
        );
    }
    processor.get_all_data()
}
