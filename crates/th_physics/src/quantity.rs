// crates/th_physics/src/quantity.rs

//! 守恒量场
//!
//! 网格上的标量场，同一场持有三套对齐表示：
//!
//! - 形心值: 长度 N，主状态
//! - 顶点值: N×3，同一物理顶点在不同单元可持有不同值
//! - 边值 / 边界值: 边中点值，边界值按边界槽位编号索引
//!
//! # 一致性约定
//!
//! 外插（extrapolate）之后形心值与顶点值的平均一致；`update` 之后
//! 顶点/边/边界值过期，重新外插前不可当作当前值读取。
//!
//! # 半隐式更新
//!
//! `centroid ← centroid / (1 − dt·semi/centroid) + dt·explicit`。
//! 与状态成反比的源项（如摩阻 ∝ 1/水深）在状态趋零时显式积分
//! 刚性发散，折入分母等效于隐式积分；通量散度项保持显式。

use std::collections::HashMap;

use glam::DVec2;
use th_foundation::{ensure, require, ThError, ThResult};
use th_mesh::TriangleMesh;

use crate::expression::Expr;
use crate::region::Region;

/// 赋值位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// 形心（广播到顶点）
    Centroids,
    /// 逐单元逐顶点
    Vertices,
    /// 逐物理顶点（共享顶点的所有单元取同一值）
    UniqueVertices,
}

/// 网格标量场
#[derive(Debug, Clone)]
pub struct Quantity {
    name: String,
    centroid_values: Vec<f64>,
    vertex_values: Vec<[f64; 3]>,
    edge_values: Vec<[f64; 3]>,
    boundary_values: Vec<f64>,
    explicit_update: Vec<f64>,
    semi_implicit_update: Vec<f64>,
}

impl Quantity {
    /// 创建零初值的场
    pub fn new(name: impl Into<String>, n_triangles: usize, n_boundary: usize) -> Self {
        Self {
            name: name.into(),
            centroid_values: vec![0.0; n_triangles],
            vertex_values: vec![[0.0; 3]; n_triangles],
            edge_values: vec![[0.0; 3]; n_triangles],
            boundary_values: vec![0.0; n_boundary],
            explicit_update: vec![0.0; n_triangles],
            semi_implicit_update: vec![0.0; n_triangles],
        }
    }

    /// 场名称
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 单元数
    #[inline]
    pub fn len(&self) -> usize {
        self.centroid_values.len()
    }

    /// 是否为空网格上的场
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.centroid_values.is_empty()
    }

    // ========== 三套表示的访问 ==========

    /// 形心值
    #[inline]
    pub fn centroid_values(&self) -> &[f64] {
        &self.centroid_values
    }

    /// 形心值（可变）
    #[inline]
    pub fn centroid_values_mut(&mut self) -> &mut [f64] {
        &mut self.centroid_values
    }

    /// 顶点值
    #[inline]
    pub fn vertex_values(&self) -> &[[f64; 3]] {
        &self.vertex_values
    }

    /// 顶点值（可变）
    #[inline]
    pub fn vertex_values_mut(&mut self) -> &mut [[f64; 3]] {
        &mut self.vertex_values
    }

    /// 边值
    #[inline]
    pub fn edge_values(&self) -> &[[f64; 3]] {
        &self.edge_values
    }

    /// 边界值（按边界槽位编号）
    #[inline]
    pub fn boundary_values(&self) -> &[f64] {
        &self.boundary_values
    }

    /// 边界值（可变）
    #[inline]
    pub fn boundary_values_mut(&mut self) -> &mut [f64] {
        &mut self.boundary_values
    }

    /// 显式源项累加器
    #[inline]
    pub fn explicit_update(&self) -> &[f64] {
        &self.explicit_update
    }

    /// 显式源项累加器（可变）
    #[inline]
    pub fn explicit_update_mut(&mut self) -> &mut [f64] {
        &mut self.explicit_update
    }

    /// 半隐式源项累加器
    #[inline]
    pub fn semi_implicit_update(&self) -> &[f64] {
        &self.semi_implicit_update
    }

    /// 半隐式源项累加器（可变）
    #[inline]
    pub fn semi_implicit_update_mut(&mut self) -> &mut [f64] {
        &mut self.semi_implicit_update
    }

    // ========== 赋值 ==========

    /// 常数赋值
    pub fn set_constant(&mut self, value: f64, region: &Region) {
        let n = self.len();
        region.for_each_cell(n, |t| {
            self.centroid_values[t] = value;
            self.vertex_values[t] = [value; 3];
            self.edge_values[t] = [value; 3];
        });
    }

    /// 逐形心数组赋值（广播到顶点和边）
    pub fn set_centroid_array(&mut self, values: &[f64], region: &Region) -> ThResult<()> {
        ThError::check_size("centroid_values", self.len(), values.len())?;
        region.for_each_cell(self.len(), |t| {
            let v = values[t];
            self.centroid_values[t] = v;
            self.vertex_values[t] = [v; 3];
            self.edge_values[t] = [v; 3];
        });
        Ok(())
    }

    /// 逐顶点数组赋值（形心与边由顶点平均派生）
    pub fn set_vertex_array(&mut self, values: &[[f64; 3]], region: &Region) -> ThResult<()> {
        ThError::check_size("vertex_values", self.len(), values.len())?;
        region.for_each_cell(self.len(), |t| {
            self.vertex_values[t] = values[t];
        });
        self.interpolate_from_vertices(region);
        Ok(())
    }

    /// 坐标函数赋值
    ///
    /// `Centroids`: 在形心求值并广播；`Vertices`/`UniqueVertices`:
    /// 在顶点坐标求值（同一物理顶点两者结果一致），形心取顶点平均。
    pub fn set_fn<F>(&mut self, f: F, location: Location, mesh: &TriangleMesh, region: &Region)
    where
        F: Fn(DVec2) -> f64,
    {
        let n = self.len();
        match location {
            Location::Centroids => {
                region.for_each_cell(n, |t| {
                    let v = f(mesh.centroid(t));
                    self.centroid_values[t] = v;
                    self.vertex_values[t] = [v; 3];
                    self.edge_values[t] = [v; 3];
                });
            }
            Location::Vertices | Location::UniqueVertices => {
                region.for_each_cell(n, |t| {
                    let coords = mesh.vertex_coords(t);
                    self.vertex_values[t] = [f(coords[0]), f(coords[1]), f(coords[2])];
                });
                self.interpolate_from_vertices(region);
            }
        }
    }

    /// 由结构化网格数据赋值
    ///
    /// 在形心或顶点坐标处采样栅格（严格越界检查），再按位置
    /// 语义广播/平均。网格数据未覆盖计算域时报越界错误。
    pub fn set_from_grid(
        &mut self,
        grid: &th_terrain::Grid2,
        mode: th_terrain::InterpolationMode,
        location: Location,
        mesh: &TriangleMesh,
        region: &Region,
    ) -> ThResult<()> {
        let n = self.len();
        match location {
            Location::Centroids => {
                let values = grid.sample(mesh.centroids(), mode, true)?;
                region.for_each_cell(n, |t| {
                    let v = values[t];
                    self.centroid_values[t] = v;
                    self.vertex_values[t] = [v; 3];
                    self.edge_values[t] = [v; 3];
                });
            }
            Location::Vertices | Location::UniqueVertices => {
                let points: Vec<DVec2> = (0..mesh.n_vertices()).map(|v| mesh.vertex(v)).collect();
                let values = grid.sample(&points, mode, true)?;
                region.for_each_cell(n, |t| {
                    let tri = mesh.triangle(t);
                    self.vertex_values[t] = [values[tri[0]], values[tri[1]], values[tri[2]]];
                });
                self.interpolate_from_vertices(region);
            }
        }
        Ok(())
    }

    /// 由顶点值派生形心值与边值
    pub fn interpolate_from_vertices(&mut self, region: &Region) {
        let n = self.len();
        region.for_each_cell(n, |t| {
            let v = self.vertex_values[t];
            self.centroid_values[t] = (v[0] + v[1] + v[2]) / 3.0;
            // 局部边 e 连接局部顶点 (e+1)%3 和 (e+2)%3
            self.edge_values[t] = [
                0.5 * (v[1] + v[2]),
                0.5 * (v[2] + v[0]),
                0.5 * (v[0] + v[1]),
            ];
        });
    }

    // ========== 外插与更新 ==========

    /// 一阶外插：顶点值与边值取形心值
    pub fn extrapolate_first_order(&mut self) {
        for t in 0..self.len() {
            let c = self.centroid_values[t];
            self.vertex_values[t] = [c; 3];
            self.edge_values[t] = [c; 3];
        }
    }

    /// 半隐式时间积分
    ///
    /// `centroid ← centroid / (1 − dt·semi/centroid) + dt·explicit`。
    /// 形心值恰为零时该单元无半隐式贡献；分母非正视为不可恢复的
    /// 数值状态。更新完成后两个累加器清零。
    pub fn update(&mut self, dt: f64) -> ThResult<()> {
        for t in 0..self.centroid_values.len() {
            let c = self.centroid_values[t];
            let mut next = if c != 0.0 {
                let denominator = 1.0 - dt * self.semi_implicit_update[t] / c;
                ensure!(
                    denominator > 0.0,
                    ThError::numerical(format!(
                        "场 '{}' 单元 {} 半隐式分母非正: {}",
                        self.name, t, denominator
                    ))
                );
                c / denominator
            } else {
                0.0
            };
            next += dt * self.explicit_update[t];
            self.centroid_values[t] = next;
        }

        self.explicit_update.fill(0.0);
        self.semi_implicit_update.fill(0.0);
        Ok(())
    }

    /// 累加器清零（每时间步通量计算前调用）
    pub fn reset_updates(&mut self) {
        self.explicit_update.fill(0.0);
        self.semi_implicit_update.fill(0.0);
    }
}

/// 赋值数据来源
///
/// 覆盖全部赋值形式：常数、逐形心数组、逐顶点数组、坐标函数、
/// 场代数表达式和结构化栅格。
pub enum ValueSource<'a> {
    /// 常数
    Constant(f64),
    /// 逐形心数组（广播到顶点）
    Centroids(&'a [f64]),
    /// 逐单元逐顶点数组
    Vertices(&'a [[f64; 3]]),
    /// 坐标函数
    Function(&'a (dyn Fn(DVec2) -> f64)),
    /// 场代数表达式
    Expression(&'a Expr),
    /// 结构化栅格加插值模式
    Grid(&'a th_terrain::Grid2, th_terrain::InterpolationMode),
}

// ============================================================
// 场注册表
// ============================================================

/// 命名场集合
///
/// 插入顺序保留，名称索引用于表达式求值和算子查找。
#[derive(Debug, Default)]
pub struct QuantitySet {
    quantities: Vec<Quantity>,
    name_index: HashMap<String, usize>,
}

impl QuantitySet {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入场（同名替换）
    pub fn insert(&mut self, quantity: Quantity) {
        let name = quantity.name().to_string();
        match self.name_index.get(&name) {
            Some(&idx) => self.quantities[idx] = quantity,
            None => {
                self.name_index.insert(name, self.quantities.len());
                self.quantities.push(quantity);
            }
        }
    }

    /// 场数量
    #[inline]
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// 是否含有指定名称的场
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    /// 按插入顺序列出场名
    pub fn names(&self) -> Vec<&str> {
        self.quantities.iter().map(|q| q.name()).collect()
    }

    /// 按名称查找
    pub fn get(&self, name: &str) -> ThResult<&Quantity> {
        let idx = require!(
            self.name_index.get(name),
            ThError::not_found(format!("场 '{}'", name))
        );
        Ok(&self.quantities[*idx])
    }

    /// 按名称查找（可变）
    pub fn get_mut(&mut self, name: &str) -> ThResult<&mut Quantity> {
        let idx = *require!(
            self.name_index.get(name),
            ThError::not_found(format!("场 '{}'", name))
        );
        Ok(&mut self.quantities[idx])
    }

    /// 统一赋值入口：按数据来源分派到各赋值方法
    pub fn set_quantity(
        &mut self,
        name: &str,
        source: ValueSource<'_>,
        location: Location,
        mesh: &TriangleMesh,
        region: &Region,
    ) -> ThResult<()> {
        match source {
            ValueSource::Constant(v) => {
                self.get_mut(name)?.set_constant(v, region);
                Ok(())
            }
            ValueSource::Centroids(values) => self.get_mut(name)?.set_centroid_array(values, region),
            ValueSource::Vertices(values) => self.get_mut(name)?.set_vertex_array(values, region),
            ValueSource::Function(f) => {
                self.get_mut(name)?.set_fn(f, location, mesh, region);
                Ok(())
            }
            ValueSource::Expression(expr) => self.assign_expression(name, expr, region),
            ValueSource::Grid(grid, mode) => {
                self.get_mut(name)?
                    .set_from_grid(grid, mode, location, mesh, region)
            }
        }
    }

    /// 同时借出一个可变场和一个只读场
    ///
    /// 算子常见形态：写 stage、读 elevation。两名称相同时报配置错误。
    pub fn pair_mut(&mut self, target: &str, source: &str) -> ThResult<(&mut Quantity, &Quantity)> {
        ensure!(
            target != source,
            ThError::config(format!("pair_mut 目标与来源同为 '{}'", target))
        );
        let ti = *require!(
            self.name_index.get(target),
            ThError::not_found(format!("场 '{}'", target))
        );
        let si = *require!(
            self.name_index.get(source),
            ThError::not_found(format!("场 '{}'", source))
        );

        if ti < si {
            let (left, right) = self.quantities.split_at_mut(si);
            Ok((&mut left[ti], &right[0]))
        } else {
            let (left, right) = self.quantities.split_at_mut(ti);
            Ok((&mut right[0], &left[si]))
        }
    }
}

// ============================================================
// 测试
// ============================================================
