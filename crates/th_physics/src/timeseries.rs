// crates/th_physics/src/timeseries.rs

//! 时间序列与时间函数
//!
//! 时变边界和时变变率的数据载体：
//!
//! - [`TimeSeries`]: 采样序列，支持区间内线性插值
//! - [`TimeFunction`]: 常数 / 序列 / 闭包的统一时间函数
//!
//! 支持区间外按"过早 / 过晚"区分报错：过早始终致命（模拟起点前
//! 不存在合理默认值），过晚可由调用方的默认函数恢复。

use serde::{Deserialize, Serialize};
use th_foundation::{ensure, ThError, ThResult};

/// 标量时间序列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// 创建时间序列
    ///
    /// 时间必须严格递增且至少两个采样点。
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> ThResult<Self> {
        ensure!(
            times.len() >= 2,
            ThError::config(format!("时间序列采样点不足: {} (至少 2)", times.len()))
        );
        ThError::check_size("timeseries_values", times.len(), values.len())?;
        ensure!(
            times.windows(2).all(|w| w[0] < w[1]),
            ThError::config("时间序列必须严格递增")
        );
        ensure!(
            values.iter().all(|v| v.is_finite()),
            ThError::config("时间序列含非有限值")
        );
        Ok(Self { times, values })
    }

    /// 支持区间起点 [s]
    #[inline]
    pub fn start(&self) -> f64 {
        self.times[0]
    }

    /// 支持区间终点 [s]
    #[inline]
    pub fn end(&self) -> f64 {
        *self.times.last().unwrap_or(&0.0)
    }

    /// 采样点数
    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// 序列是否为空（构造校验保证非空，保留以配合 len）
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// 区间内线性插值求值
    ///
    /// # 错误
    ///
    /// - [`ThError::TimeTooEarly`]: `time < start`
    /// - [`ThError::TimeTooLate`]: `time > end`
    pub fn evaluate(&self, time: f64) -> ThResult<f64> {
        ensure!(
            time >= self.start(),
            ThError::time_too_early(time, self.start())
        );
        ensure!(time <= self.end(), ThError::time_too_late(time, self.end()));

        let hi = self
            .times
            .partition_point(|&t| t < time)
            .clamp(1, self.times.len() - 1);
        let lo = hi - 1;

        let (t0, t1) = (self.times[lo], self.times[hi]);
        let alpha = (time - t0) / (t1 - t0);
        Ok(self.values[lo] + alpha * (self.values[hi] - self.values[lo]))
    }
}

// ============================================================
// 时间函数
// ============================================================

/// 带显式支持区间的标量时间函数
///
/// 时变边界和时变变率的统一载体：常数（无限支持）、采样序列、
/// 或调用方闭包加支持区间。
pub enum TimeFunction {
    /// 常数，支持区间无限
    Constant(f64),
    /// 采样序列，线性插值
    Series(TimeSeries),
    /// 闭包加显式支持区间
    Closure {
        /// 时间函数本体
        f: Box<dyn Fn(f64) -> f64 + Send + Sync>,
        /// 支持区间起点 [s]
        start: f64,
        /// 支持区间终点 [s]
        end: f64,
    },
}

impl TimeFunction {
    /// 常数时间函数
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    /// 由采样序列构建
    pub fn from_series(series: TimeSeries) -> Self {
        Self::Series(series)
    }

    /// 由闭包和支持区间构建
    pub fn from_fn<F>(f: F, start: f64, end: f64) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::Closure {
            f: Box::new(f),
            start,
            end,
        }
    }

    /// 支持区间起点 [s]
    pub fn start(&self) -> f64 {
        match self {
            Self::Constant(_) => f64::NEG_INFINITY,
            Self::Series(series) => series.start(),
            Self::Closure { start, .. } => *start,
        }
    }

    /// 支持区间终点 [s]
    pub fn end(&self) -> f64 {
        match self {
            Self::Constant(_) => f64::INFINITY,
            Self::Series(series) => series.end(),
            Self::Closure { end, .. } => *end,
        }
    }

    /// 支持区间内求值
    ///
    /// 区间外与 [`TimeSeries::evaluate`] 同样区分"过早 / 过晚"。
    pub fn evaluate(&self, time: f64) -> ThResult<f64> {
        match self {
            Self::Constant(v) => Ok(*v),
            Self::Series(series) => series.evaluate(time),
            Self::Closure { f, start, end } => {
                ensure!(time >= *start, ThError::time_too_early(time, *start));
                ensure!(time <= *end, ThError::time_too_late(time, *end));
                Ok(f(time))
            }
        }
    }
}

impl From<TimeSeries> for TimeFunction {
    fn from(series: TimeSeries) -> Self {
        Self::Series(series)
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> TimeSeries {
        TimeSeries::new(vec![0.0, 10.0, 20.0], vec![1.0, 3.0, 2.0]).unwrap()
    }

    #[test]
    fn test_linear_interpolation() {
        let ts = series();
        assert!((ts.evaluate(5.0).unwrap() - 2.0).abs() < 1e-12);
        assert!((ts.evaluate(15.0).unwrap() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_exact_sample_points() {
        let ts = series();
        assert_eq!(ts.evaluate(0.0).unwrap(), 1.0);
        assert_eq!(ts.evaluate(10.0).unwrap(), 3.0);
        assert_eq!(ts.evaluate(20.0).unwrap(), 2.0);
    }

    #[test]
    fn test_out_of_support() {
        let ts = series();
        assert!(matches!(
            ts.evaluate(-1.0),
            Err(ThError::TimeTooEarly { .. })
        ));
        let err = ts.evaluate(21.0).unwrap_err();
        assert!(err.is_time_too_late());
    }

    #[test]
    fn test_rejects_non_monotonic() {
        assert!(TimeSeries::new(vec![0.0, 5.0, 5.0], vec![1.0, 2.0, 3.0]).is_err());
        assert!(TimeSeries::new(vec![0.0], vec![1.0]).is_err());
        assert!(TimeSeries::new(vec![0.0, 1.0], vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_time_function_constant_has_infinite_support() {
        let f = TimeFunction::constant(2.5);
        assert_eq!(f.evaluate(-1e9).unwrap(), 2.5);
        assert_eq!(f.evaluate(1e9).unwrap(), 2.5);
    }

    #[test]
    fn test_time_function_closure_support() {
        let f = TimeFunction::from_fn(|t| 2.0 * t, 0.0, 10.0);
        assert!((f.evaluate(3.0).unwrap() - 6.0).abs() < 1e-12);
        assert!(matches!(
            f.evaluate(-0.5),
            Err(ThError::TimeTooEarly { .. })
        ));
        assert!(f.evaluate(10.5).unwrap_err().is_time_too_late());
    }

    #[test]
    fn test_series_serde_round_trip() {
        let ts = series();
        let json = serde_json::to_string(&ts).unwrap();
        let restored: TimeSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), 3);
        assert!((restored.evaluate(15.0).unwrap() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_time_function_from_series() {
        let f: TimeFunction = series().into();
        assert!((f.evaluate(5.0).unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(f.start(), 0.0);
        assert_eq!(f.end(), 20.0);
    }
}
