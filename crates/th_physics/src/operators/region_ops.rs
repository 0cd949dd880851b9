// crates/th_physics/src/operators/region_ops.rs

//! 区域算子
//!
//! 对选择器覆盖的单元做确定性的场值调整，单次调用无内部状态：
//!
//! - [`SetRegion`]: 覆写场值
//! - [`AddValue`]: 叠加数值，支持逐单元和逐物理顶点两种粒度，
//!   可选相对某个基准场
//! - [`AddQuantity`]: 将一个场叠加进另一个场
//!
//! 空选择器是合法的空操作；`Region::All` 与 `Region::Empty`
//! 是不同配置，不可互换。

use glam::DVec2;
use th_foundation::ThResult;
use th_mesh::TriangleMesh;

use crate::operators::{Operator, OperatorContext};
use crate::quantity::{Location, QuantitySet};
use crate::region::Region;

/// 数值来源：常数或网格坐标的函数
pub enum Value {
    /// 常数
    Constant(f64),
    /// 坐标函数
    Fn(Box<dyn Fn(DVec2) -> f64 + Send + Sync>),
}

impl Value {
    /// 在给定坐标处取值
    #[inline]
    pub fn at(&self, p: DVec2) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::Fn(f) => f(p),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Constant(v)
    }
}

/// 叠加粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// 逐单元（作用于形心）
    Cells,
    /// 逐物理顶点（共享顶点的所有单元同步改写，形心重新平均）
    UniqueVertices,
}

// ============================================================
// 覆写算子
// ============================================================

/// 区域覆写算子：将选择器覆盖的单元场值设为给定值
pub struct SetRegion {
    quantity: String,
    value: Value,
    region: Region,
}

impl SetRegion {
    /// 创建覆写算子
    pub fn new(quantity: impl Into<String>, value: impl Into<Value>, region: Region) -> Self {
        Self {
            quantity: quantity.into(),
            value: value.into(),
            region,
        }
    }
}

impl Operator for SetRegion {
    fn name(&self) -> &str {
        "set_region"
    }

    fn parallel_safe(&self) -> bool {
        true
    }

    fn apply(&mut self, quantities: &mut QuantitySet, ctx: &OperatorContext<'_>) -> ThResult<()> {
        let quantity = quantities.get_mut(&self.quantity)?;
        match &self.value {
            Value::Constant(v) => quantity.set_constant(*v, &self.region),
            Value::Fn(f) => {
                quantity.set_fn(|p| f(p), Location::Centroids, ctx.mesh, &self.region)
            }
        }
        Ok(())
    }
}

// ============================================================
// 叠加算子
// ============================================================

/// 区域叠加算子：向选择器覆盖的单元场值叠加给定值
///
/// 指定 `relative_to` 时结果为基准场值加给定值（覆写式），
/// 否则在当前值上累加。
pub struct AddValue {
    quantity: String,
    value: Value,
    region: Region,
    granularity: Granularity,
    relative_to: Option<String>,
}

impl AddValue {
    /// 创建逐单元叠加算子
    pub fn new(quantity: impl Into<String>, value: impl Into<Value>, region: Region) -> Self {
        Self {
            quantity: quantity.into(),
            value: value.into(),
            region,
            granularity: Granularity::Cells,
            relative_to: None,
        }
    }

    /// 切换为逐物理顶点粒度
    pub fn per_unique_vertices(mut self) -> Self {
        self.granularity = Granularity::UniqueVertices;
        self
    }

    /// 以命名基准场为底叠加
    pub fn relative_to(mut self, base: impl Into<String>) -> Self {
        self.relative_to = Some(base.into());
        self
    }

    fn apply_cells(&self, quantities: &mut QuantitySet, mesh: &TriangleMesh) -> ThResult<()> {
        let n = mesh.n_triangles();
        match &self.relative_to {
            Some(base) => {
                let (target, base) = quantities.pair_mut(&self.quantity, base)?;
                self.region.for_each_cell(n, |t| {
                    let v = base.centroid_values()[t] + self.value.at(mesh.centroid(t));
                    target.centroid_values_mut()[t] = v;
                    target.vertex_values_mut()[t] = [v; 3];
                });
            }
            None => {
                let target = quantities.get_mut(&self.quantity)?;
                self.region.for_each_cell(n, |t| {
                    let dv = self.value.at(mesh.centroid(t));
                    target.centroid_values_mut()[t] += dv;
                    for corner in 0..3 {
                        target.vertex_values_mut()[t][corner] += dv;
                    }
                });
            }
        }
        Ok(())
    }

    fn apply_unique_vertices(
        &self,
        quantities: &mut QuantitySet,
        mesh: &TriangleMesh,
    ) -> ThResult<()> {
        let vertices = self.region.unique_vertices(mesh);
        let mut touched = Vec::new();

        match &self.relative_to {
            Some(base) => {
                let (target, base) = quantities.pair_mut(&self.quantity, base)?;
                for &v in &vertices {
                    let dv = self.value.at(mesh.vertex(v));
                    for &(t, corner) in mesh.vertex_sharers(v) {
                        target.vertex_values_mut()[t][corner] =
                            base.vertex_values()[t][corner] + dv;
                        touched.push(t);
                    }
                }
            }
            None => {
                let target = quantities.get_mut(&self.quantity)?;
                for &v in &vertices {
                    let dv = self.value.at(mesh.vertex(v));
                    for &(t, corner) in mesh.vertex_sharers(v) {
                        target.vertex_values_mut()[t][corner] += dv;
                        touched.push(t);
                    }
                }
            }
        }

        touched.sort_unstable();
        touched.dedup();
        let target = quantities.get_mut(&self.quantity)?;
        target.interpolate_from_vertices(&Region::Indices(touched));
        Ok(())
    }
}

impl Operator for AddValue {
    fn name(&self) -> &str {
        "add_value"
    }

    fn parallel_safe(&self) -> bool {
        // 逐物理顶点粒度跨单元改写共享顶点
        self.granularity == Granularity::Cells
    }

    fn apply(&mut self, quantities: &mut QuantitySet, ctx: &OperatorContext<'_>) -> ThResult<()> {
        match self.granularity {
            Granularity::Cells => self.apply_cells(quantities, ctx.mesh),
            Granularity::UniqueVertices => self.apply_unique_vertices(quantities, ctx.mesh),
        }
    }
}

// ============================================================
// 场间叠加算子
// ============================================================

/// 将来源场叠加进目标场
pub struct AddQuantity {
    target: String,
    source: String,
    region: Region,
}

impl AddQuantity {
    /// 创建场间叠加算子
    pub fn new(target: impl Into<String>, source: impl Into<String>, region: Region) -> Self {
        Self {
            target: target.into(),
            source: source.into(),
            region,
        }
    }
}

impl Operator for AddQuantity {
    fn name(&self) -> &str {
        "add_quantity"
    }

    fn parallel_safe(&self) -> bool {
        true
    }

    fn apply(&mut self, quantities: &mut QuantitySet, ctx: &OperatorContext<'_>) -> ThResult<()> {
        let (target, source) = quantities.pair_mut(&self.target, &self.source)?;
        self.region.for_each_cell(ctx.mesh.n_triangles(), |t| {
            target.centroid_values_mut()[t] += source.centroid_values()[t];
            for corner in 0..3 {
                target.vertex_values_mut()[t][corner] += source.vertex_values()[t][corner];
            }
        });
        Ok(())
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::Quantity;
    use th_mesh::RectMeshBuilder;

    fn setup() -> (TriangleMesh, QuantitySet) {
        let mesh = RectMeshBuilder::new(2, 2, 2.0, 2.0).build().unwrap();
        let mut set = QuantitySet::new();
        for name in ["stage", "elevation"] {
            set.insert(Quantity::new(
                name,
                mesh.n_triangles(),
                mesh.n_boundary_edges(),
            ));
        }
        (mesh, set)
    }

    fn ctx(mesh: &TriangleMesh) -> OperatorContext<'_> {
        OperatorContext {
            mesh,
            time: 0.0,
            dt: 0.1,
        }
    }

    #[test]
    fn test_set_then_add_composition() {
        let (mesh, mut set) = setup();
        let region = Region::Indices(vec![0, 3, 5]);

        let mut set_op = SetRegion::new("stage", 2.0, region.clone());
        let mut add_op = AddValue::new("stage", 0.5, region.clone());
        set_op.apply(&mut set, &ctx(&mesh)).unwrap();
        add_op.apply(&mut set, &ctx(&mesh)).unwrap();

        let stage = set.get("stage").unwrap();
        for t in 0..mesh.n_triangles() {
            let expected = if [0, 3, 5].contains(&t) { 2.5 } else { 0.0 };
            assert_eq!(stage.centroid_values()[t], expected, "t={}", t);
        }
    }

    #[test]
    fn test_empty_selector_is_noop() {
        let (mesh, mut set) = setup();
        set.get_mut("stage")
            .unwrap()
            .set_constant(1.0, &Region::All);

        let mut op = SetRegion::new("stage", 9.0, Region::Empty);
        op.apply(&mut set, &ctx(&mesh)).unwrap();
        assert!(set
            .get("stage")
            .unwrap()
            .centroid_values()
            .iter()
            .all(|&v| v == 1.0));
    }

    #[test]
    fn test_set_with_coordinate_fn() {
        let (mesh, mut set) = setup();
        let mut op = SetRegion::new(
            "elevation",
            Value::Fn(Box::new(|p: DVec2| 0.1 * p.x)),
            Region::All,
        );
        op.apply(&mut set, &ctx(&mesh)).unwrap();

        let elevation = set.get("elevation").unwrap();
        for t in 0..mesh.n_triangles() {
            let expected = 0.1 * mesh.centroid(t).x;
            assert!((elevation.centroid_values()[t] - expected).abs() < 1e-14);
        }
    }

    #[test]
    fn test_add_relative_to_base() {
        let (mesh, mut set) = setup();
        set.get_mut("elevation")
            .unwrap()
            .set_constant(3.0, &Region::All);
        set.get_mut("stage")
            .unwrap()
            .set_constant(99.0, &Region::All);

        let mut op = AddValue::new("stage", 0.5, Region::All).relative_to("elevation");
        op.apply(&mut set, &ctx(&mesh)).unwrap();

        assert!(set
            .get("stage")
            .unwrap()
            .centroid_values()
            .iter()
            .all(|&v| (v - 3.5).abs() < 1e-14));
    }

    #[test]
    fn test_unique_vertex_granularity() {
        let (mesh, mut set) = setup();
        // 单元 0、1 共享矩形的 4 个物理顶点
        let region = Region::Indices(vec![0, 1]);
        let mut op = AddValue::new("stage", 1.0, region).per_unique_vertices();
        assert!(!op.parallel_safe());
        op.apply(&mut set, &ctx(&mesh)).unwrap();

        let stage = set.get("stage").unwrap();
        // 选中单元的全部顶点各加 1，形心重新平均
        assert!((stage.centroid_values()[0] - 1.0).abs() < 1e-14);
        assert!((stage.centroid_values()[1] - 1.0).abs() < 1e-14);
        // 共享这些顶点的相邻单元局部受影响但形心只按其顶点平均
        for t in 2..mesh.n_triangles() {
            let shared: usize = mesh.triangle(t)
                .iter()
                .filter(|&&v| {
                    mesh.vertex_sharers(v).iter().any(|&(s, _)| s == 0 || s == 1)
                })
                .count();
            let expected = shared as f64 / 3.0;
            assert!(
                (stage.centroid_values()[t] - expected).abs() < 1e-14,
                "t={}",
                t
            );
        }
    }

    #[test]
    fn test_add_quantity_into_another() {
        let (mesh, mut set) = setup();
        set.get_mut("stage")
            .unwrap()
            .set_constant(1.0, &Region::All);
        set.get_mut("elevation")
            .unwrap()
            .set_constant(0.25, &Region::All);

        let mut op = AddQuantity::new("stage", "elevation", Region::Indices(vec![2]));
        op.apply(&mut set, &ctx(&mesh)).unwrap();

        let stage = set.get("stage").unwrap();
        assert_eq!(stage.centroid_values()[2], 1.25);
        assert_eq!(stage.centroid_values()[0], 1.0);
    }
}
