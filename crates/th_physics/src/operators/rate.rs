// crates/th_physics/src/operators/rate.rs

//! 变率算子
//!
//! 向选择器覆盖的单元水位注入 `factor × rate × dt`。变率可以是
//! 常数、时间函数或形心坐标的（时空）函数。
//!
//! # 符号约定
//!
//! 非负变率无条件叠加；负变率（抽取）钳制结果不低于该单元的
//! 底高程，水深不会为负。正分支没有对应的上限钳制。
//!
//! # 时变数据降级
//!
//! 时间序列支持区间之前的查询致命；之后的查询在提供了默认变率
//! 函数时降级使用，首次降级警告一次。

use glam::DVec2;
use tracing::warn;

use th_foundation::{require, ThResult};
use th_mesh::TriangleMesh;

use crate::operators::{Operator, OperatorContext};
use crate::quantity::QuantitySet;
use crate::region::Region;
use crate::timeseries::TimeFunction;

/// 变率来源
pub enum Rate {
    /// 常数 [m/s]
    Constant(f64),
    /// 时间函数
    Temporal(TimeFunction),
    /// 形心坐标函数
    Spatial(Box<dyn Fn(DVec2) -> f64 + Send + Sync>),
    /// 时空函数
    SpatioTemporal(Box<dyn Fn(DVec2, f64) -> f64 + Send + Sync>),
}

/// 默认变率函数（时变数据过期后的降级来源）
pub type DefaultRateFn = Box<dyn Fn(f64) -> f64 + Send + Sync>;

/// 变率算子
pub struct RateOperator {
    quantity: String,
    elevation: String,
    rate: Rate,
    factor: f64,
    region: Region,
    default_rate: Option<DefaultRateFn>,
    warned: bool,
}

impl RateOperator {
    /// 创建变率算子（默认作用于 stage，底高程取 elevation）
    pub fn new(rate: Rate, region: Region) -> Self {
        Self {
            quantity: "stage".to_string(),
            elevation: "elevation".to_string(),
            rate,
            factor: 1.0,
            region,
            default_rate: None,
            warned: false,
        }
    }

    /// 圆形选区变率算子（形心落在圆内的单元）
    pub fn in_circle(mesh: &TriangleMesh, center: DVec2, radius: f64, rate: Rate) -> Self {
        Self::new(rate, Region::in_circle(mesh, center, radius))
    }

    /// 多边形选区变率算子（形心落在多边形内的单元）
    pub fn in_polygon(mesh: &TriangleMesh, polygon: &[DVec2], rate: Rate) -> Self {
        Self::new(rate, Region::in_polygon(mesh, polygon))
    }

    /// 设置放大系数
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// 设置时变数据过期后的默认变率函数
    pub fn with_default_rate(mut self, default: DefaultRateFn) -> Self {
        self.default_rate = Some(default);
        self
    }

    /// 是否已发出过降级警告
    #[inline]
    pub fn has_warned(&self) -> bool {
        self.warned
    }

    /// 解析时间相关的变率（空间变率返回 None，逐单元求值）
    fn temporal_rate(&mut self, time: f64) -> ThResult<Option<f64>> {
        match &self.rate {
            Rate::Constant(c) => Ok(Some(*c)),
            Rate::Temporal(function) => match function.evaluate(time) {
                Ok(v) => Ok(Some(v)),
                Err(err) if err.is_time_too_late() => {
                    let default = require!(self.default_rate.as_ref(), err);
                    let v = default(time);
                    if !self.warned {
                        self.warned = true;
                        warn!(time, rate = v, "变率序列超出数据终点，改用默认变率");
                    }
                    Ok(Some(v))
                }
                Err(err) => Err(err),
            },
            Rate::Spatial(_) | Rate::SpatioTemporal(_) => Ok(None),
        }
    }

    #[inline]
    fn cell_rate(&self, temporal: Option<f64>, centroid: DVec2, time: f64) -> f64 {
        match (&self.rate, temporal) {
            (_, Some(v)) => v,
            (Rate::Spatial(f), None) => f(centroid),
            (Rate::SpatioTemporal(f), None) => f(centroid, time),
            // temporal_rate 已覆盖其余变体
            _ => unreachable!("时间相关变率未在循环前解析"),
        }
    }

    /// 当前选区的总注入流量 [m³/s]（变率 × 面积 × 系数，仅统计
    /// 本进程完全拥有的单元）
    pub fn discharge(&mut self, mesh: &TriangleMesh, time: f64) -> ThResult<f64> {
        let temporal = self.temporal_rate(time)?;
        let mut total = 0.0;
        self.region.for_each_cell(mesh.n_triangles(), |t| {
            if mesh.is_full(t) {
                total += self.factor * self.cell_rate(temporal, mesh.centroid(t), time) * mesh.area(t);
            }
        });
        Ok(total)
    }
}

impl Operator for RateOperator {
    fn name(&self) -> &str {
        "rate"
    }

    fn parallel_safe(&self) -> bool {
        // 每个单元的贡献只依赖该单元自身的状态
        true
    }

    fn apply(&mut self, quantities: &mut QuantitySet, ctx: &OperatorContext<'_>) -> ThResult<()> {
        let temporal = self.temporal_rate(ctx.time)?;
        let (stage, elevation) = quantities.pair_mut(&self.quantity, &self.elevation)?;

        let mesh = ctx.mesh;
        self.region.for_each_cell(mesh.n_triangles(), |t| {
            if !mesh.is_full(t) {
                return;
            }

            let rate = self.cell_rate(temporal, mesh.centroid(t), ctx.time);
            stage.centroid_values_mut()[t] += self.factor * rate * ctx.dt;

            // 抽取不把水位压到底高程以下
            if rate < 0.0 {
                let bed = elevation.centroid_values()[t];
                if stage.centroid_values()[t] < bed {
                    stage.centroid_values_mut()[t] = bed;
                }
            }
        });

        Ok(())
    }
}

// ============================================================
// 测试
// ============================================================
