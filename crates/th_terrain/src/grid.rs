// crates/th_terrain/src/grid.rs

//! 结构化网格数据容器
//!
//! - [`Grid2`]: 带坐标轴的二维标量网格，x 主序存储
//! - [`InterpolationMode`]: 插值模式（双线性 / 分片常值）

use std::fmt;
use std::str::FromStr;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use th_foundation::{ThError, ThResult};

use crate::interpolate::{interpolate2d, validate_axes};

/// 插值模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    /// 双线性插值（无过冲）
    Linear,
    /// 分片常值（最近角点）
    Constant,
}

impl InterpolationMode {
    /// 模式名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Constant => "constant",
        }
    }
}

impl FromStr for InterpolationMode {
    type Err = ThError;

    fn from_str(s: &str) -> ThResult<Self> {
        match s {
            "linear" => Ok(Self::Linear),
            "constant" => Ok(Self::Constant),
            other => Err(ThError::config(format!(
                "未知插值模式 '{}'，可选: linear / constant",
                other
            ))),
        }
    }
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 带坐标轴的二维标量网格
///
/// `values[i * ny + j]` 为坐标 `(x[i], y[j])` 处的值（x 主序）。
/// 坐标轴必须严格非降且至少含两个节点。
#[derive(Debug, Clone)]
pub struct Grid2 {
    x: Vec<f64>,
    y: Vec<f64>,
    values: Vec<f64>,
}

impl Grid2 {
    /// 从 x 主序数据构建网格
    pub fn new(x: Vec<f64>, y: Vec<f64>, values: Vec<f64>) -> ThResult<Self> {
        validate_axes(&x, &y)?;
        ThError::check_size("grid_values", x.len() * y.len(), values.len())?;
        Ok(Self { x, y, values })
    }

    /// 从北上栅格构建网格
    ///
    /// 栅格按纬度行 × 经度列存储，第 0 行对应 y 最大值。
    /// 构造时翻转行序并转置为 x 主序。
    pub fn from_raster(x: Vec<f64>, y: Vec<f64>, raster: Vec<f64>) -> ThResult<Self> {
        validate_axes(&x, &y)?;
        ThError::check_size("raster_values", x.len() * y.len(), raster.len())?;

        let (nx, ny) = (x.len(), y.len());
        let mut values = vec![0.0; nx * ny];
        for i in 0..nx {
            for j in 0..ny {
                values[i * ny + j] = raster[(ny - 1 - j) * nx + i];
            }
        }
        Ok(Self { x, y, values })
    }

    /// x 轴节点
    #[inline]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// y 轴节点
    #[inline]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// x 主序数据
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 坐标 `(x[i], y[j])` 处的值
    #[inline]
    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.y.len() + j]
    }

    /// 在任意散点处采样
    pub fn sample(
        &self,
        points: &[DVec2],
        mode: InterpolationMode,
        bounds_error: bool,
    ) -> ThResult<Vec<f64>> {
        interpolate2d(&self.x, &self.y, &self.values, points, mode, bounds_error)
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!(
            "linear".parse::<InterpolationMode>().unwrap(),
            InterpolationMode::Linear
        );
        assert_eq!(
            "constant".parse::<InterpolationMode>().unwrap(),
            InterpolationMode::Constant
        );
        assert!("cubic".parse::<InterpolationMode>().is_err());
    }

    #[test]
    fn test_grid_indexing() {
        let grid = Grid2::new(
            vec![0.0, 1.0],
            vec![0.0, 1.0, 2.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap();
        assert_eq!(grid.at(0, 2), 3.0);
        assert_eq!(grid.at(1, 0), 4.0);
    }

    #[test]
    fn test_grid_shape_mismatch() {
        let result = Grid2::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ThError::SizeMismatch { .. })));
    }

    #[test]
    fn test_from_raster_orientation() {
        // 北上栅格: 第 0 行 y=1, 第 1 行 y=0
        // 行 0: [10, 20], 行 1: [30, 40]
        let grid = Grid2::from_raster(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![10.0, 20.0, 30.0, 40.0],
        )
        .unwrap();
        // (x=0, y=0) 对应栅格行 1 列 0
        assert_eq!(grid.at(0, 0), 30.0);
        // (x=1, y=1) 对应栅格行 0 列 1
        assert_eq!(grid.at(1, 1), 20.0);
    }
}
