// crates/th_terrain/src/interpolate.rs

//! 结构化网格到散点的插值
//!
//! 将二维结构化网格上的标量场插值到任意散点：
//!
//! - [`interpolate2d`]: 核心入口，x 主序数据
//! - [`interpolate_raster`]: 北上栅格便捷入口（翻转行序 + 转置后委托）
//!
//! # 越界语义
//!
//! - `bounds_error = true`: 任一查询点坐标严格落在域外即报
//!   [`ThError::Bounds`]，错误信息指明越界的坐标轴、查询值和被超出的
//!   域边界
//! - `bounds_error = false`: 域外点和携带 NaN 坐标的点在对应输出槽位
//!   得到 NaN，不影响其他槽位
//!
//! # 无过冲保证
//!
//! 双线性模式采用因式分解形式
//! `z00 + alpha*dx + beta*dy + alpha*beta*(z11 - dx - dy - z00)`，
//! 代数上等价于先沿 x 后沿 y 的两步线性插值，输出必然落在所在
//! 网格单元四个角点值的 [min, max] 区间内。

use glam::DVec2;
use th_foundation::{ensure, ThError, ThResult};

use crate::grid::InterpolationMode;

/// 校验插值坐标轴
///
/// 要求两轴各至少两个节点且严格非降。
pub fn validate_axes(x: &[f64], y: &[f64]) -> ThResult<()> {
    ensure!(
        x.len() >= 2,
        ThError::config(format!("x 轴节点数不足: {} (至少 2)", x.len()))
    );
    ensure!(
        y.len() >= 2,
        ThError::config(format!("y 轴节点数不足: {} (至少 2)", y.len()))
    );
    ensure!(
        x.windows(2).all(|w| w[0] <= w[1]),
        ThError::config("x 轴必须非降排列")
    );
    ensure!(
        y.windows(2).all(|w| w[0] <= w[1]),
        ThError::config("y 轴必须非降排列")
    );
    Ok(())
}

/// 结构化网格插值到散点
///
/// # 参数
///
/// - `x`: x 轴节点（非降，长度 M）
/// - `y`: y 轴节点（非降，长度 N）
/// - `z`: x 主序数据，`z[i * N + j]` 位于 `(x[i], y[j])`
/// - `points`: 查询点
/// - `mode`: 插值模式
/// - `bounds_error`: 越界时报错还是输出 NaN
pub fn interpolate2d(
    x: &[f64],
    y: &[f64],
    z: &[f64],
    points: &[DVec2],
    mode: InterpolationMode,
    bounds_error: bool,
) -> ThResult<Vec<f64>> {
    validate_axes(x, y)?;
    ThError::check_size("interpolation_grid", x.len() * y.len(), z.len())?;

    let ny = y.len();
    let mut result = Vec::with_capacity(points.len());

    for &p in points {
        if bounds_error {
            check_bounds(p, x, y)?;
        } else if outside(p, x, y) {
            result.push(f64::NAN);
            continue;
        }

        // 左偏定位：首个不小于查询值的节点，夹到 1..=len-1 保证
        // 括区两端均为有效节点，端点查询得到精确节点值
        let i1 = bracket(x, p.x);
        let j1 = bracket(y, p.y);
        let (i0, j0) = (i1 - 1, j1 - 1);

        let alpha = fraction(p.x, x[i0], x[i1]);
        let beta = fraction(p.y, y[j0], y[j1]);

        let z00 = z[i0 * ny + j0];
        let z01 = z[i0 * ny + j1];
        let z10 = z[i1 * ny + j0];
        let z11 = z[i1 * ny + j1];

        let value = match mode {
            InterpolationMode::Linear => {
                let dx = z10 - z00;
                let dy = z01 - z00;
                z00 + alpha * dx + beta * dy + alpha * beta * (z11 - dx - dy - z00)
            }
            InterpolationMode::Constant => {
                // 象限判定，alpha==0.5 / beta==0.5 归上/右角点
                let i_sel = if alpha < 0.5 { i0 } else { i1 };
                let j_sel = if beta < 0.5 { j0 } else { j1 };
                z[i_sel * ny + j_sel]
            }
        };

        result.push(value);
    }

    Ok(result)
}

/// 北上栅格插值到散点
///
/// 栅格按纬度行 × 经度列存储（`raster[row * M + col]`，第 0 行对应
/// y 最大值）。翻转行序并转置为 x 主序后委托给 [`interpolate2d`]。
pub fn interpolate_raster(
    x: &[f64],
    y: &[f64],
    raster: &[f64],
    points: &[DVec2],
    mode: InterpolationMode,
    bounds_error: bool,
) -> ThResult<Vec<f64>> {
    validate_axes(x, y)?;
    ThError::check_size("raster_grid", x.len() * y.len(), raster.len())?;

    let (nx, ny) = (x.len(), y.len());
    let mut z = vec![0.0; nx * ny];
    for i in 0..nx {
        for j in 0..ny {
            z[i * ny + j] = raster[(ny - 1 - j) * nx + i];
        }
    }

    interpolate2d(x, y, &z, points, mode, bounds_error)
}

/// 括区定位：首个满足 `axis[idx] >= v` 的下标，夹到 `1..=len-1`
#[inline]
fn bracket(axis: &[f64], v: f64) -> usize {
    axis.partition_point(|&node| node < v).clamp(1, axis.len() - 1)
}

/// 括区内归一化坐标，退化间距（重复节点）时取 0
#[inline]
fn fraction(v: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        (v - lo) / (hi - lo)
    } else {
        0.0
    }
}

/// 坐标是否落在域外或含 NaN（NaN 比较恒为 false，需显式分支）
#[inline]
fn outside(p: DVec2, x: &[f64], y: &[f64]) -> bool {
    !(p.x >= x[0] && p.x <= x[x.len() - 1] && p.y >= y[0] && p.y <= y[y.len() - 1])
}

fn check_bounds(p: DVec2, x: &[f64], y: &[f64]) -> ThResult<()> {
    ensure!(!(p.x < x[0]), ThError::bounds("x", p.x, x[0]));
    ensure!(
        !(p.x > x[x.len() - 1]),
        ThError::bounds("x", p.x, x[x.len() - 1])
    );
    ensure!(!(p.y < y[0]), ThError::bounds("y", p.y, y[0]));
    ensure!(
        !(p.y > y[y.len() - 1]),
        ThError::bounds("y", p.y, y[y.len() - 1])
    );
    Ok(())
}

// ============================================================
// 测试
// ============================================================
