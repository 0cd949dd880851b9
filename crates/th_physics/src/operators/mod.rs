// crates/th_physics/src/operators/mod.rs

//! 算子框架
//!
//! 每时间步在通量计算与守恒更新之间调用一次的强迫单元：
//!
//! - [`region_ops`]: 区域算子（覆写 / 叠加 / 场间叠加）
//! - [`rate`]: 变率算子（`factor × rate × dt` 注入水位）
//!
//! # 并行安全契约
//!
//! 声明 `parallel_safe` 的算子只读写单个单元自身的状态，不做
//! 跨单元归约，也不假设分区间单元总数固定。区域分解运行时
//! 只有满足该契约的算子可以独立作用于各分区。

pub mod rate;
pub mod region_ops;

pub use rate::{Rate, RateOperator};
pub use region_ops::{AddQuantity, AddValue, Granularity, SetRegion, Value};

use th_foundation::ThResult;
use th_mesh::TriangleMesh;

use crate::quantity::QuantitySet;

/// 算子调用上下文
pub struct OperatorContext<'a> {
    /// 网格拓扑
    pub mesh: &'a TriangleMesh,
    /// 当前模拟时间 [s]
    pub time: f64,
    /// 当前时间步长 [s]
    pub dt: f64,
}

/// 强迫算子
pub trait Operator: Send + Sync {
    /// 算子名称，用于日志
    fn name(&self) -> &str;

    /// 是否满足并行安全契约（不读写其他单元的状态）
    fn parallel_safe(&self) -> bool;

    /// 施加一次强迫（每时间步调用一次）
    fn apply(&mut self, quantities: &mut QuantitySet, ctx: &OperatorContext<'_>) -> ThResult<()>;
}
