//! 统计工具
//!
//! 各分析阶段共用的数值例程：均值/标准差、最小二乘斜率、自相关、Pearson 相关和
//! 简化的 Student-t 显著性估计。

use statrs::function::erf::erf;
use statrs::statistics::Statistics;

/// 判零阈值
pub const EPSILON: f64 = 1e-12;

/// 指数移动平均: new = α × sample + (1 − α) × old
pub fn ema(old: f64, sample: f64, alpha: f64) -> f64 {
    alpha * sample + (1.0 - alpha) * old
}

/// 算术均值，空序列返回 0
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().mean()
}

/// 总体标准差，空序列返回 0
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().population_std_dev()
}

/// 变异系数 = 标准差 / |均值|，均值为 0 时返回 0
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m.abs() < EPSILON {
        return 0.0;
    }
    std_dev(values) / m.abs()
}

/// 以下标为自变量的普通最小二乘斜率
pub fn linear_regression_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, &y)| {
            let dx = i as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });

    if den < EPSILON {
        0.0
    } else {
        num / den
    }
}

/// 指定滞后的自相关系数
pub fn autocorrelation(values: &[f64], lag: usize) -> f64 {
    let n = values.len();
    if lag == 0 || lag >= n {
        return 0.0;
    }

    let m = mean(values);
    let denominator: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    if denominator < EPSILON {
        return 0.0;
    }

    let numerator: f64 = (0..n - lag)
        .map(|i| (values[i] - m) * (values[i + lag] - m))
        .sum();

    numerator / denominator
}

/// Pearson 相关系数，长度不一致时按较短序列计算，方差为 0 时返回 0
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let (x, y) = (&x[..n], &y[..n]);

    let x_mean = mean(x);
    let y_mean = mean(y);

    let mut covariance = 0.0;
    let mut x_var = 0.0;
    let mut y_var = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        covariance += dx * dy;
        x_var += dx * dx;
        y_var += dy * dy;
    }

    let denominator = (x_var * y_var).sqrt();
    if denominator < EPSILON {
        return 0.0;
    }
    (covariance / denominator).clamp(-1.0, 1.0)
}

/// 简化的 Student-t 累积分布函数
///
/// 先将 t 统计量近似映射为标准正态变量，再用误差函数求正态 CDF。
/// 这是启发式近似，小自由度下精度有限。
pub fn student_t_cdf(t: f64, df: f64) -> f64 {
    let df = df.max(1.0);
    let z = t * (1.0 - 1.0 / (4.0 * df)) / (1.0 + t * t / (2.0 * df)).sqrt();
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// 相关系数的双尾 p 值（基于简化 t 分布）
pub fn correlation_significance(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 1.0;
    }
    let one_minus_r2 = 1.0 - r * r;
    if one_minus_r2 <= EPSILON {
        return 0.0;
    }

    let df = (n - 2) as f64;
    let t = r * (df / one_minus_r2).sqrt();
    (2.0 * (1.0 - student_t_cdf(t.abs(), df))).clamp(0.0, 1.0)
}

// ============================================
// 增量统计
// ============================================

/// Welford 在线算法 - 单次遍历计算均值和总体方差
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// 总体方差
    pub fn variance(&self) -> f64 {
        if self.count > 0 {
            self.m2 / self.count as f64
        } else {
            0.0
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = RunningStats::new();
        for value in iter {
            stats.add(value);
        }
        stats
    }
}
