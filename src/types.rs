//! 核心类型定义
//!
//! 包含原始遥测输入（宽松类型）、校验后的数据点以及各分析阶段共享的输出类型。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================
// 宽松反序列化
// ============================================

/// 数值字段：数字与数字字符串可解析，布尔值映射为 1/0，其余视为缺失
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
        _ => None,
    })
}

/// 枚举字段：字符串原样保留，数字转为字符串，其余视为缺失
fn lenient_label<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

// ============================================
// 枚举字段
// ============================================

/// 带固定取值集合的枚举字段，集合第一个成员为回退值
pub trait AllowedValues: Sized + Copy + 'static {
    const ALLOWED: &'static [Self];

    fn as_str(&self) -> &'static str;

    /// 按标签匹配，无效或缺失时返回集合的第一个成员
    fn from_label(label: Option<&str>) -> Self {
        label
            .and_then(|l| Self::ALLOWED.iter().copied().find(|v| v.as_str() == l))
            .unwrap_or(Self::ALLOWED[0])
    }
}

macro_rules! allowed_values {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl AllowedValues for $name {
            const ALLOWED: &'static [Self] = &[$($name::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALLOWED[0]
            }
        }
    };
}

allowed_values! {
    /// 减振器阻尼模式
    DampingMode {
        Comfort => "comfort",
        Sport => "sport",
        Eco => "eco",
        Adaptive => "adaptive",
    }
}

allowed_values! {
    /// 阻尼器工作模式
    DamperMode {
        Hybrid => "hybrid",
        Electromagnetic => "electromagnetic",
        Hydraulic => "hydraulic",
    }
}

allowed_values! {
    /// 系统运行状态
    SystemStatus {
        Online => "online",
        Standby => "standby",
        Degraded => "degraded",
        Fault => "fault",
        Offline => "offline",
    }
}

allowed_values! {
    /// 控制模式
    ControlMode {
        Automatic => "automatic",
        Manual => "manual",
        Optimized => "optimized",
    }
}

allowed_values! {
    /// 路面状况
    RoadCondition {
        Dry => "dry",
        Wet => "wet",
        Snow => "snow",
        Ice => "ice",
        Gravel => "gravel",
    }
}

// ============================================
// 原始输入
// ============================================

/// 减振器原始读数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawShockAbsorberReading {
    #[serde(default, deserialize_with = "lenient_number")]
    pub damping_force: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub velocity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub displacement: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub generated_power: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub efficiency: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub operating_temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub damping_mode: Option<String>,
}

/// 液压/电磁阻尼器原始读数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDamperReading {
    #[serde(default, deserialize_with = "lenient_number")]
    pub damping_coefficient: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub hydraulic_pressure: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub generated_power: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub efficiency: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub operating_mode: Option<String>,
}

/// 系统集成原始读数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIntegrationReading {
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_power_output: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub harvested_energy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub storage_soc: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub system_efficiency: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub operational_cycles: Option<f64>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub system_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub control_mode: Option<String>,
}

/// 环境传感器原始读数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEnvironmentalReading {
    #[serde(default, deserialize_with = "lenient_number")]
    pub vehicle_speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub road_roughness: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub ambient_temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub vibration_level: Option<f64>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub road_condition: Option<String>,
}

/// 一帧完整的原始遥测（用于回放记录数据）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTelemetryFrame {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shock_absorber_data: Option<RawShockAbsorberReading>,
    #[serde(default)]
    pub damper_data: Option<RawDamperReading>,
    #[serde(default)]
    pub integration_data: Option<RawIntegrationReading>,
    #[serde(default)]
    pub environmental_data: Option<RawEnvironmentalReading>,
}

// ============================================
// 校验后的数据点
// ============================================

/// 减振器数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShockAbsorberData {
    /// 阻尼力 (N)
    pub damping_force: f64,
    /// 活塞速度 (m/s)
    pub velocity: f64,
    /// 位移 (m)
    pub displacement: f64,
    /// 回收功率 (W)
    pub generated_power: f64,
    pub efficiency: f64,
    /// 工作温度 (°C)
    pub operating_temperature: f64,
    pub damping_mode: DampingMode,
}

/// 阻尼器数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamperData {
    /// 阻尼系数 (N·s/m)
    pub damping_coefficient: f64,
    /// 液压 (bar)
    pub hydraulic_pressure: f64,
    /// 电磁回收功率 (W)
    pub generated_power: f64,
    pub efficiency: f64,
    /// 油液温度 (°C)
    pub temperature: f64,
    pub operating_mode: DamperMode,
}

/// 系统集成数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationData {
    /// 总输出功率 (W)
    pub total_power_output: f64,
    /// 累计回收能量 (Wh)
    pub harvested_energy: f64,
    /// 储能荷电状态 (0-1)
    pub storage_soc: f64,
    pub system_efficiency: f64,
    /// 累计工作循环数
    pub operational_cycles: f64,
    pub system_status: SystemStatus,
    pub control_mode: ControlMode,
}

/// 环境数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalData {
    /// 车速 (km/h)
    pub vehicle_speed: f64,
    /// 路面粗糙度指数 (0-10)
    pub road_roughness: f64,
    /// 环境温度 (°C)
    pub ambient_temperature: f64,
    /// 振动水平 (m/s²)
    pub vibration_level: f64,
    pub road_condition: RoadCondition,
}

/// 悬架数据点（写入缓冲区后不可变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspensionDataPoint {
    pub timestamp: DateTime<Utc>,
    pub shock_absorber_data: ShockAbsorberData,
    pub damper_data: DamperData,
    pub integration_data: IntegrationData,
    pub environmental_data: EnvironmentalData,
}

impl SuspensionDataPoint {
    /// 减振器与阻尼器回收功率之和 (W)
    pub fn harvested_power(&self) -> f64 {
        self.shock_absorber_data.generated_power + self.damper_data.generated_power
    }

    /// 减振器与阻尼器效率均值
    pub fn mean_efficiency(&self) -> f64 {
        (self.shock_absorber_data.efficiency + self.damper_data.efficiency) / 2.0
    }

    /// 减振器与阻尼器的最高温度 (°C)
    pub fn peak_temperature(&self) -> f64 {
        self.shock_absorber_data
            .operating_temperature
            .max(self.damper_data.temperature)
    }

    pub fn is_online(&self) -> bool {
        self.integration_data.system_status == SystemStatus::Online
    }
}

// ============================================
// 数据质量
// ============================================

/// 数据质量指标（各项均在 [0, 1]）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataQualityMetrics {
    pub completeness: f64,
    pub accuracy: f64,
    pub consistency: f64,
    pub timeliness: f64,
    pub validity: f64,
}

impl Default for DataQualityMetrics {
    fn default() -> Self {
        Self {
            completeness: 1.0,
            accuracy: 1.0,
            consistency: 1.0,
            timeliness: 1.0,
            validity: 1.0,
        }
    }
}

impl DataQualityMetrics {
    /// 五项指标的均值
    pub fn overall(&self) -> f64 {
        (self.completeness + self.accuracy + self.consistency + self.timeliness + self.validity)
            / 5.0
    }
}

/// 缓冲区统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferStats {
    pub size: usize,
    pub capacity: usize,
    pub utilization: f64,
    pub oldest_timestamp: Option<DateTime<Utc>>,
    pub newest_timestamp: Option<DateTime<Utc>>,
    pub total_processed: u64,
    pub total_evicted: u64,
}

// ============================================
// 分析输出类型
// ============================================

/// 严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// 趋势方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    Fluctuating,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
            TrendDirection::Fluctuating => "fluctuating",
        }
    }
}

/// 异常类型（按被检测的指标区分）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    ShockPower,
    DamperPower,
    ShockTemperature,
    DamperTemperature,
    Efficiency,
    HydraulicPressure,
}

impl AnomalyType {
    pub const ALL: [AnomalyType; 6] = [
        AnomalyType::ShockPower,
        AnomalyType::DamperPower,
        AnomalyType::ShockTemperature,
        AnomalyType::DamperTemperature,
        AnomalyType::Efficiency,
        AnomalyType::HydraulicPressure,
    ];

    /// 从数据点中取出该指标的值
    pub fn value_of(&self, point: &SuspensionDataPoint) -> f64 {
        match self {
            AnomalyType::ShockPower => point.shock_absorber_data.generated_power,
            AnomalyType::DamperPower => point.damper_data.generated_power,
            AnomalyType::ShockTemperature => point.shock_absorber_data.operating_temperature,
            AnomalyType::DamperTemperature => point.damper_data.temperature,
            AnomalyType::Efficiency => point.mean_efficiency(),
            AnomalyType::HydraulicPressure => point.damper_data.hydraulic_pressure,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnomalyType::ShockPower => "减振器功率",
            AnomalyType::DamperPower => "阻尼器功率",
            AnomalyType::ShockTemperature => "减振器温度",
            AnomalyType::DamperTemperature => "阻尼器温度",
            AnomalyType::Efficiency => "转换效率",
            AnomalyType::HydraulicPressure => "液压压力",
        }
    }
}

/// 异常检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyDetection {
    pub anomaly_type: AnomalyType,
    pub severity: Severity,
    pub value: f64,
    pub expected_value: f64,
    /// Z-Score
    pub deviation: f64,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

/// 相关关系分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    StrongPositive,
    ModeratePositive,
    WeakPositive,
    WeakNegative,
    ModerateNegative,
    StrongNegative,
}

impl Relationship {
    pub fn classify(r: f64) -> Self {
        let strength = r.abs();
        match (r >= 0.0, strength) {
            (true, s) if s >= 0.7 => Relationship::StrongPositive,
            (true, s) if s >= 0.4 => Relationship::ModeratePositive,
            (true, _) => Relationship::WeakPositive,
            (false, s) if s >= 0.7 => Relationship::StrongNegative,
            (false, s) if s >= 0.4 => Relationship::ModerateNegative,
            (false, _) => Relationship::WeakNegative,
        }
    }
}

/// 相关性分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationAnalysis {
    pub variable1: String,
    pub variable2: String,
    pub correlation_coefficient: f64,
    /// 双尾 p 值（近似）
    pub significance: f64,
    pub relationship: Relationship,
}

/// 受监测的系统组件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    ShockAbsorber,
    ElectromagneticGenerator,
    HydraulicDamper,
    ControlSystem,
    ThermalManagement,
}

impl Component {
    pub const ALL: [Component; 5] = [
        Component::ShockAbsorber,
        Component::ElectromagneticGenerator,
        Component::HydraulicDamper,
        Component::ControlSystem,
        Component::ThermalManagement,
    ];

    /// 综合健康评分中的权重（合计 1.0）
    pub fn weight(&self) -> f64 {
        match self {
            Component::ShockAbsorber => 0.25,
            Component::ElectromagneticGenerator => 0.25,
            Component::HydraulicDamper => 0.20,
            Component::ControlSystem => 0.15,
            Component::ThermalManagement => 0.15,
        }
    }

    /// 故障维修基础成本
    pub fn base_cost(&self) -> f64 {
        match self {
            Component::ShockAbsorber => 800.0,
            Component::ElectromagneticGenerator => 1500.0,
            Component::HydraulicDamper => 1200.0,
            Component::ControlSystem => 600.0,
            Component::ThermalManagement => 500.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::ShockAbsorber => "shock_absorber",
            Component::ElectromagneticGenerator => "electromagnetic_generator",
            Component::HydraulicDamper => "hydraulic_damper",
            Component::ControlSystem => "control_system",
            Component::ThermalManagement => "thermal_management",
        }
    }
}

/// 组件健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl HealthStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            HealthStatus::Excellent
        } else if score >= 75.0 {
            HealthStatus::Good
        } else if score >= 60.0 {
            HealthStatus::Fair
        } else if score >= 40.0 {
            HealthStatus::Poor
        } else {
            HealthStatus::Critical
        }
    }
}

/// 指标状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorStatus {
    Normal,
    Warning,
    Critical,
}

/// 健康指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthIndicator {
    pub name: String,
    pub value: f64,
    pub threshold: f64,
    pub status: IndicatorStatus,
}

impl HealthIndicator {
    pub fn is_flagged(&self) -> bool {
        self.status != IndicatorStatus::Normal
    }
}

/// 组件健康评分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealthScore {
    pub component: Component,
    pub score: f64,
    pub status: HealthStatus,
    pub key_indicators: Vec<HealthIndicator>,
}

/// 健康趋势
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthTrend {
    Improving,
    Stable,
    Degrading,
}

/// 系统健康评分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    pub overall: f64,
    pub components: Vec<ComponentHealthScore>,
    pub trend: HealthTrend,
    pub last_updated: DateTime<Utc>,
}

impl HealthScore {
    pub fn component(&self, component: Component) -> Option<&ComponentHealthScore> {
        self.components.iter().find(|c| c.component == component)
    }
}

/// 故障模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    SealDegradation,
    EnergyConversionLoss,
    FluidOverheating,
    MechanicalWear,
    CoilDegradation,
    MagnetDemagnetization,
    WindingOpenCircuit,
    BearingWear,
    PressureSealFailure,
    ValveMalfunction,
    FluidDegradation,
    FluidContamination,
    CalibrationDrift,
    SensorFailure,
    ControlLogicFault,
    CoolingFailure,
    HeatExchangerFouling,
    ThermalRunaway,
    ThermalFatigue,
}

impl FailureMode {
    /// 故障模式对应的建议措施
    pub fn recommended_action(&self) -> &'static str {
        match self {
            FailureMode::SealDegradation => "检查并更换减振器密封件",
            FailureMode::EnergyConversionLoss => {
                "检修能量回收换能器并校验功率电子"
            }
            FailureMode::FluidOverheating => "检查阻尼油液位并加强散热",
            FailureMode::MechanicalWear => "检查支座、衬套与活塞杆磨损",
            FailureMode::CoilDegradation => "测试发电机线圈绝缘电阻",
            FailureMode::MagnetDemagnetization => "测量磁通并更换转子磁铁",
            FailureMode::WindingOpenCircuit => "检查发电机绕组与接插件是否开路",
            FailureMode::BearingWear => "润滑或更换发电机轴承",
            FailureMode::PressureSealFailure => "更换液压密封件并检查泄漏",
            FailureMode::ValveMalfunction => "清洗或更换液压控制阀",
            FailureMode::FluidDegradation => "更换液压油",
            FailureMode::FluidContamination => "冲洗液压回路并更换滤芯",
            FailureMode::CalibrationDrift => "重新标定控制系统传感器",
            FailureMode::SensorFailure => "运行传感器诊断并更换故障传感器",
            FailureMode::ControlLogicFault => "更新控制固件并检查故障日志",
            FailureMode::CoolingFailure => "检查冷却回路与风扇",
            FailureMode::HeatExchangerFouling => "清洁换热器表面",
            FailureMode::ThermalRunaway => "降低负载并检查热保护电路",
            FailureMode::ThermalFatigue => "检查受热应力部件是否开裂",
        }
    }
}

/// 维护预测
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenancePrediction {
    pub component: Component,
    pub predicted_failure_date: DateTime<Utc>,
    pub confidence: f64,
    /// 剩余使用寿命（天）
    pub remaining_useful_life: f64,
    pub failure_mode: FailureMode,
    pub severity: Severity,
    pub recommended_action: String,
    pub cost_impact: f64,
}

/// 优化类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationCategory {
    Damping,
    EnergyHarvesting,
    Thermal,
    Maintenance,
}

/// 建议优先级（critical > high > medium > low）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// 实施复杂度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationComplexity {
    Low,
    Medium,
    High,
}

/// 优化动作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationAction {
    pub action: String,
    pub parameter: String,
    pub current_value: f64,
    pub recommended_value: f64,
    pub confidence: f64,
}

/// 优化建议
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRecommendation {
    pub category: OptimizationCategory,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    /// 预期改善 (%)
    pub expected_improvement: f64,
    pub implementation_complexity: ImplementationComplexity,
    pub estimated_cost: f64,
    pub actions: Vec<OptimizationAction>,
}

/// 温度范围 (°C)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

/// 聚合性能指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub average_power: f64,
    pub peak_power: f64,
    /// 区间内回收能量 (Wh)
    pub total_energy_harvested: f64,
    pub average_efficiency: f64,
    /// 在线时间占比
    pub uptime: f64,
    pub temperature_range: TemperatureRange,
    /// 区间内工作循环增量
    pub operational_cycles: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_numbers() {
        let raw: RawShockAbsorberReading = serde_json::from_value(json!({
            "dampingForce": "1250.5",
            "velocity": "fast",
            "displacement": null,
            "generatedPower": true,
            "efficiency": {"nested": 1},
            "unknownField": 42
        }))
        .unwrap();

        assert_eq!(raw.damping_force, Some(1250.5));
        assert_eq!(raw.velocity, None);
        assert_eq!(raw.displacement, None);
        assert_eq!(raw.generated_power, Some(1.0));
        assert_eq!(raw.efficiency, None);
        assert_eq!(raw.operating_temperature, None);
    }

    #[test]
    fn test_allowed_values_fallback() {
        assert_eq!(DampingMode::from_label(Some("sport")), DampingMode::Sport);
        assert_eq!(DampingMode::from_label(Some("SPORT")), DampingMode::Comfort);
        assert_eq!(DampingMode::from_label(None), DampingMode::Comfort);
        assert_eq!(SystemStatus::from_label(Some("fault")), SystemStatus::Fault);
        assert_eq!(RoadCondition::default(), RoadCondition::Dry);
    }

    #[test]
    fn test_component_weights_sum_to_one() {
        let total: f64 = Component::ALL.iter().map(|c| c.weight()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_health_status_bands() {
        assert_eq!(HealthStatus::from_score(95.0), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(90.0), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(75.0), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(60.0), HealthStatus::Fair);
        assert_eq!(HealthStatus::from_score(40.0), HealthStatus::Poor);
        assert_eq!(HealthStatus::from_score(39.9), HealthStatus::Critical);
    }

    #[test]
    fn test_relationship_classification() {
        assert_eq!(Relationship::classify(0.9), Relationship::StrongPositive);
        assert_eq!(Relationship::classify(0.5), Relationship::ModeratePositive);
        assert_eq!(Relationship::classify(0.2), Relationship::WeakPositive);
        assert_eq!(Relationship::classify(-0.2), Relationship::WeakNegative);
        assert_eq!(Relationship::classify(-1.0), Relationship::StrongNegative);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }
}
