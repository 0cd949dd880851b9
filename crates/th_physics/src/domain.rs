// crates/th_physics/src/domain.rs

//! 演进驱动
//!
//! 持有网格、场集合、边界映射与算子序列，按固定相位顺序推进：
//!
//! `IDLE → 边界更新 → 通量计算(外部) → 算子施加 → 守恒更新 → 外插 → IDLE`
//!
//! 顺序保证：算子观察到边界更新后的值，守恒更新观察到算子修改后
//! 的形心值，外插在更新之后执行。每个完整时间步向调用方让出一次
//! 控制权（协作式单线程，不是并发）。时间步一旦开始就完整执行，
//! 取消即不再进入下一次迭代。

use std::collections::HashMap;

use tracing::{debug, info};

use th_foundation::{ensure, ThError, ThResult};
use th_mesh::TriangleMesh;

use crate::boundary::Boundary;
use crate::operators::{Operator, OperatorContext};
use crate::quantity::{Quantity, QuantitySet};

/// 时间步内的相位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 等待下一时间步
    Idle,
    /// 边界值更新
    BoundaryUpdate,
    /// 通量计算（外部协作者填充累加器）
    FluxCompute,
    /// 算子施加
    OperatorsApply,
    /// 半隐式守恒更新
    ConservedUpdate,
    /// 外插
    Extrapolate,
}

/// 通量协作者
///
/// 进入该相位时所有守恒量的两个累加器已清零；填充的数值以
/// `dt × 值` 为场增量为单位约定。
pub trait FluxComputer: Send + Sync {
    /// 由单元间数值通量填充 explicit/semi_implicit 累加器
    fn compute(
        &mut self,
        quantities: &mut QuantitySet,
        mesh: &TriangleMesh,
        time: f64,
        dt: f64,
    ) -> ThResult<()>;
}

/// 无通量协作者（纯算子/边界驱动的退化配置）
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFluxes;

impl FluxComputer for NoFluxes {
    fn compute(
        &mut self,
        _quantities: &mut QuantitySet,
        _mesh: &TriangleMesh,
        _time: f64,
        _dt: f64,
    ) -> ThResult<()> {
        Ok(())
    }
}

/// 外插器
///
/// 由形心值派生顶点/边值。高阶限制性外插（梯度重构且不产生
/// 新极值）作为外部协作者以该契约接入。
pub trait Extrapolator: Send + Sync {
    /// 对一个场执行外插
    fn extrapolate(&self, quantity: &mut Quantity, mesh: &TriangleMesh) -> ThResult<()>;
}

/// 一阶外插：顶点值与边值直接取形心值
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOrder;

impl Extrapolator for FirstOrder {
    fn extrapolate(&self, quantity: &mut Quantity, _mesh: &TriangleMesh) -> ThResult<()> {
        quantity.extrapolate_first_order();
        Ok(())
    }
}

// ============================================================
// 演进域
// ============================================================

/// 演进域：一份模拟状态加一个时间步状态机
pub struct Domain {
    mesh: TriangleMesh,
    quantities: QuantitySet,
    conserved: Vec<String>,
    boundaries: HashMap<String, Box<dyn Boundary>>,
    operators: Vec<Box<dyn Operator>>,
    flux: Box<dyn FluxComputer>,
    extrapolator: Box<dyn Extrapolator>,
    time: f64,
    phase: Phase,
}

impl Domain {
    /// 创建演进域，注册给定名称的守恒量（初值为零）
    pub fn new(mesh: TriangleMesh, conserved: &[&str]) -> Self {
        let mut quantities = QuantitySet::new();
        for name in conserved {
            quantities.insert(Quantity::new(
                *name,
                mesh.n_triangles(),
                mesh.n_boundary_edges(),
            ));
        }

        Self {
            mesh,
            quantities,
            conserved: conserved.iter().map(|s| s.to_string()).collect(),
            boundaries: HashMap::new(),
            operators: Vec::new(),
            flux: Box::new(NoFluxes),
            extrapolator: Box::new(FirstOrder),
            time: 0.0,
            phase: Phase::Idle,
        }
    }

    /// 注册非守恒辅助场（底高程、摩阻系数等）
    pub fn add_quantity(&mut self, name: impl Into<String>) {
        self.quantities.insert(Quantity::new(
            name.into(),
            self.mesh.n_triangles(),
            self.mesh.n_boundary_edges(),
        ));
    }

    /// 为边界标签绑定边界对象
    pub fn set_boundary(&mut self, tag: impl Into<String>, boundary: Box<dyn Boundary>) {
        self.boundaries.insert(tag.into(), boundary);
    }

    /// 追加算子（按追加顺序施加）
    pub fn add_operator(&mut self, operator: Box<dyn Operator>) {
        self.operators.push(operator);
    }

    /// 设置通量协作者
    pub fn set_flux_computer(&mut self, flux: Box<dyn FluxComputer>) {
        self.flux = flux;
    }

    /// 设置外插器
    pub fn set_extrapolator(&mut self, extrapolator: Box<dyn Extrapolator>) {
        self.extrapolator = extrapolator;
    }

    /// 网格
    #[inline]
    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// 场集合
    #[inline]
    pub fn quantities(&self) -> &QuantitySet {
        &self.quantities
    }

    /// 场集合（可变，初值设定用）
    #[inline]
    pub fn quantities_mut(&mut self) -> &mut QuantitySet {
        &mut self.quantities
    }

    /// 当前模拟时间 [s]
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// 当前相位
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 校验每个网格边界标签都绑定了边界对象
    fn validate_boundaries(&self) -> ThResult<()> {
        for tag in self.mesh.boundary_tag_names() {
            ensure!(
                self.boundaries.contains_key(tag),
                ThError::config(format!("边界标签 '{}' 未绑定边界对象", tag))
            );
        }
        Ok(())
    }

    /// 启动演进迭代器
    ///
    /// 以步长 `dt` 推进到 `final_time`，每个完整时间步让出一次
    /// 当前模拟时间。末步自动收缩到恰好落在终止时间上。
    ///
    /// # 错误
    ///
    /// 步长/终止时间非法或存在未绑定的边界标签时立即报配置错误。
    pub fn evolve(&mut self, dt: f64, final_time: f64) -> ThResult<Evolve<'_>> {
        ensure!(
            dt > 0.0 && dt.is_finite(),
            ThError::config(format!("非法时间步长: {}", dt))
        );
        ensure!(
            final_time >= self.time,
            ThError::config(format!(
                "终止时间 {} 早于当前时间 {}",
                final_time, self.time
            ))
        );
        self.validate_boundaries()?;

        info!(dt, final_time, start = self.time, "开始演进");
        Ok(Evolve {
            domain: self,
            dt,
            final_time,
        })
    }

    /// 推进一个完整时间步
    fn step(&mut self, dt: f64) -> ThResult<()> {
        debug!(time = self.time, dt, "时间步开始");

        self.phase = Phase::BoundaryUpdate;
        update_boundary_values(
            &mut self.quantities,
            &mut self.boundaries,
            &self.mesh,
            &self.conserved,
            self.time,
        )?;

        self.phase = Phase::FluxCompute;
        for name in &self.conserved {
            self.quantities.get_mut(name)?.reset_updates();
        }
        self.flux
            .compute(&mut self.quantities, &self.mesh, self.time, dt)?;

        self.phase = Phase::OperatorsApply;
        // 算子自持可变状态（警告标记），取出施加后放回
        let mut operators = std::mem::take(&mut self.operators);
        let ctx = OperatorContext {
            mesh: &self.mesh,
            time: self.time,
            dt,
        };
        let result = operators
            .iter_mut()
            .try_for_each(|op| op.apply(&mut self.quantities, &ctx));
        self.operators = operators;
        result?;

        self.phase = Phase::ConservedUpdate;
        for name in &self.conserved {
            self.quantities.get_mut(name)?.update(dt)?;
        }

        self.phase = Phase::Extrapolate;
        for name in &self.conserved {
            let quantity = self.quantities.get_mut(name)?;
            self.extrapolator.extrapolate(quantity, &self.mesh)?;
        }

        self.time += dt;
        self.phase = Phase::Idle;
        Ok(())
    }
}

/// 边界值更新：对每个边界槽位求取幽灵侧值并写入各守恒量
fn update_boundary_values(
    quantities: &mut QuantitySet,
    boundaries: &mut HashMap<String, Box<dyn Boundary>>,
    mesh: &TriangleMesh,
    conserved: &[String],
    time: f64,
) -> ThResult<()> {
    let nq = conserved.len();
    let mut interior = vec![0.0; nq];
    let mut out = vec![0.0; nq];

    for slot in 0..mesh.n_boundary_edges() {
        let (t, e) = mesh.boundary_edges()[slot];
        let tag = mesh.boundary_tag(slot);
        let boundary = boundaries
            .get_mut(tag)
            .ok_or_else(|| ThError::config(format!("边界标签 '{}' 未绑定边界对象", tag)))?;

        for (qi, name) in conserved.iter().enumerate() {
            interior[qi] = quantities.get(name)?.edge_values()[t][e];
        }

        boundary.evaluate(time, &interior, &mut out)?;

        for (qi, name) in conserved.iter().enumerate() {
            quantities.get_mut(name)?.boundary_values_mut()[slot] = out[qi];
        }
    }

    Ok(())
}

// ============================================================
// 演进迭代器
// ============================================================

/// 每个完整时间步让出一次当前模拟时间
pub struct Evolve<'a> {
    domain: &'a mut Domain,
    dt: f64,
    final_time: f64,
}

impl Iterator for Evolve<'_> {
    type Item = ThResult<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.final_time - self.domain.time;
        // 浮点累加残差不再构成一个时间步
        if remaining <= self.dt * 1e-12 {
            return None;
        }

        let dt = self.dt.min(remaining);
        match self.domain.step(dt) {
            Ok(()) => Some(Ok(self.domain.time)),
            Err(err) => {
                // 出错后不再推进
                self.final_time = self.domain.time;
                Some(Err(err))
            }
        }
    }
}

// ============================================================
// 测试
// ============================================================
