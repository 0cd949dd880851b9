// crates/th_physics/src/boundary.rs

//! 边界对象
//!
//! 为边界边提供幽灵侧值。每条边界边通过标签关联一个边界对象，
//! 每时间步对每条边界边求值一次：
//!
//! - [`Dirichlet`]: 固定值，与时间和内部状态无关
//! - [`Transmissive`]: 零梯度，原样返回内侧边值
//! - [`TimeVarying`]: 时间函数；超出支持区间时"过早"致命，
//!   "过晚"可由默认函数恢复并只警告一次
//!
//! 标签到边界对象的缺失映射是致命配置错误，在演进循环开始前检出。

use tracing::warn;

use th_foundation::{ThError, ThResult};

use crate::timeseries::TimeFunction;

/// 边界对象
///
/// `interior` 为该边界边内侧各守恒量的当前边值，`out` 为写出的
/// 幽灵侧值，两者长度一致（守恒量个数）。
pub trait Boundary: Send + Sync {
    /// 边界类型名，用于日志
    fn kind(&self) -> &'static str;

    /// 求取一条边界边的幽灵侧值
    fn evaluate(&mut self, time: f64, interior: &[f64], out: &mut [f64]) -> ThResult<()>;
}

// ============================================================
// Dirichlet 边界
// ============================================================

/// 固定值边界
#[derive(Debug, Clone)]
pub struct Dirichlet {
    values: Vec<f64>,
}

impl Dirichlet {
    /// 创建固定值边界（每个守恒量一个分量）
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl Boundary for Dirichlet {
    fn kind(&self) -> &'static str {
        "dirichlet"
    }

    fn evaluate(&mut self, _time: f64, _interior: &[f64], out: &mut [f64]) -> ThResult<()> {
        ThError::check_size("dirichlet_values", out.len(), self.values.len())?;
        out.copy_from_slice(&self.values);
        Ok(())
    }
}

// ============================================================
// 透射边界
// ============================================================

/// 零梯度透射边界
#[derive(Debug, Clone, Default)]
pub struct Transmissive;

impl Transmissive {
    /// 创建透射边界
    pub fn new() -> Self {
        Self
    }
}

impl Boundary for Transmissive {
    fn kind(&self) -> &'static str {
        "transmissive"
    }

    fn evaluate(&mut self, _time: f64, interior: &[f64], out: &mut [f64]) -> ThResult<()> {
        ThError::check_size("transmissive_values", out.len(), interior.len())?;
        out.copy_from_slice(interior);
        Ok(())
    }
}

// ============================================================
// 时变边界
// ============================================================

/// 超出支持区间后的默认值函数
pub type DefaultFn = Box<dyn Fn(f64) -> Vec<f64> + Send + Sync>;

/// 时变边界
///
/// 每个守恒量一个时间函数。查询时间晚于支持区间终点且提供了默认
/// 函数时改用默认函数，首次降级发出一次警告，之后静默。
pub struct TimeVarying {
    functions: Vec<TimeFunction>,
    default: Option<DefaultFn>,
    warned: bool,
}

impl TimeVarying {
    /// 创建时变边界
    pub fn new(functions: Vec<TimeFunction>) -> Self {
        Self {
            functions,
            default: None,
            warned: false,
        }
    }

    /// 设置"过晚"降级默认函数
    pub fn with_default(mut self, default: DefaultFn) -> Self {
        self.default = Some(default);
        self
    }

    /// 是否已发出过降级警告
    #[inline]
    pub fn has_warned(&self) -> bool {
        self.warned
    }
}

impl Boundary for TimeVarying {
    fn kind(&self) -> &'static str {
        "time_varying"
    }

    fn evaluate(&mut self, time: f64, _interior: &[f64], out: &mut [f64]) -> ThResult<()> {
        ThError::check_size("time_varying_values", out.len(), self.functions.len())?;

        // 降级按分量进行：支持区间不一致时，仍在区间内的分量照常求值
        let mut fallback: Option<Vec<f64>> = None;

        for (qi, function) in self.functions.iter().enumerate() {
            match function.evaluate(time) {
                Ok(v) => out[qi] = v,
                Err(err) if err.is_time_too_late() => {
                    if fallback.is_none() {
                        let default = match &self.default {
                            Some(f) => f,
                            None => return Err(err),
                        };
                        let values = default(time);
                        ThError::check_size("default_boundary_values", out.len(), values.len())?;
                        if !self.warned {
                            self.warned = true;
                            warn!(time, "时变边界超出数据终点，改用默认函数");
                        }
                        fallback = Some(values);
                    }
                    if let Some(values) = &fallback {
                        out[qi] = values[qi];
                    }
                }
                // 过早无合理默认，始终致命
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeseries::TimeSeries;

    fn series(end_value: f64) -> TimeFunction {
        TimeSeries::new(vec![0.0, 10.0], vec![1.0, end_value])
            .unwrap()
            .into()
    }

    #[test]
    fn test_dirichlet_constant() {
        let mut b = Dirichlet::new(vec![1.5, 0.0, 0.0]);
        let mut out = [0.0; 3];
        b.evaluate(99.0, &[7.0, 7.0, 7.0], &mut out).unwrap();
        assert_eq!(out, [1.5, 0.0, 0.0]);
    }

    #[test]
    fn test_transmissive_mirrors_interior() {
        let mut b = Transmissive::new();
        let mut out = [0.0; 2];
        b.evaluate(0.0, &[3.0, -1.0], &mut out).unwrap();
        assert_eq!(out, [3.0, -1.0]);
    }

    #[test]
    fn test_time_varying_interpolates() {
        let mut b = TimeVarying::new(vec![series(3.0), series(5.0)]);
        let mut out = [0.0; 2];
        b.evaluate(5.0, &[0.0, 0.0], &mut out).unwrap();
        assert!((out[0] - 2.0).abs() < 1e-12);
        assert!((out[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_too_early_is_fatal() {
        let mut b = TimeVarying::new(vec![series(3.0)]);
        let mut out = [0.0; 1];
        let err = b.evaluate(-1.0, &[0.0], &mut out).unwrap_err();
        assert!(matches!(err, ThError::TimeTooEarly { .. }));
    }

    #[test]
    fn test_too_late_without_default_is_fatal() {
        let mut b = TimeVarying::new(vec![series(3.0)]);
        let mut out = [0.0; 1];
        assert!(b.evaluate(11.0, &[0.0], &mut out).unwrap_err().is_time_too_late());
    }

    #[test]
    fn test_too_late_falls_back_and_warns_once() {
        let mut b = TimeVarying::new(vec![series(3.0)])
            .with_default(Box::new(|_t| vec![0.25]));
        let mut out = [0.0; 1];

        assert!(!b.has_warned());
        b.evaluate(11.0, &[0.0], &mut out).unwrap();
        assert_eq!(out, [0.25]);
        assert!(b.has_warned());

        // 再次降级不再改变警告状态（NotWarned -> Warned 不可逆）
        b.evaluate(12.0, &[0.0], &mut out).unwrap();
        assert!(b.has_warned());

        // 回到支持区间内正常求值
        b.evaluate(5.0, &[0.0], &mut out).unwrap();
        assert!((out[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_expiry_only_replaces_expired_components() {
        // 分量 0 支持区间无限（常数），分量 1 在 t=10 过期
        let mut b = TimeVarying::new(vec![TimeFunction::constant(7.0), series(3.0)])
            .with_default(Box::new(|_t| vec![-1.0, 0.25]));
        let mut out = [0.0; 2];

        b.evaluate(11.0, &[0.0, 0.0], &mut out).unwrap();
        assert_eq!(out, [7.0, 0.25]);
        assert!(b.has_warned());

        // 过期分量在前也不影响后续仍有效的分量
        let mut b = TimeVarying::new(vec![series(3.0), TimeFunction::constant(7.0)])
            .with_default(Box::new(|_t| vec![0.25, -1.0]));
        b.evaluate(11.0, &[0.0, 0.0], &mut out).unwrap();
        assert_eq!(out, [0.25, 7.0]);
    }
}
