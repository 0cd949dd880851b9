// crates/th_physics/src/region.rs

//! 区域选择器
//!
//! 标识网格单元子集的三态选择器：
//!
//! - `All`: 全部单元
//! - `Empty`: 空选择（与 `All` 不可互换）
//! - `Indices`: 显式单元索引列表
//!
//! 几何构造器（圆内 / 多边形内）和标签构造器在构造时解析为
//! 显式索引列表，apply 热路径中不再做几何判定。

use glam::DVec2;
use th_foundation::{ThError, ThResult};
use th_mesh::{point_in_circle, point_in_polygon, TriangleMesh};

/// 区域选择器
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    /// 全部单元
    All,
    /// 空选择（不作用于任何单元）
    Empty,
    /// 显式单元索引列表
    Indices(Vec<usize>),
}

impl Region {
    /// 由区域标签解析（标签未注册时报配置错误）
    pub fn from_tag(mesh: &TriangleMesh, tag: &str) -> ThResult<Self> {
        let indices = mesh
            .region(tag)
            .ok_or_else(|| ThError::not_found(format!("区域标签 '{}'", tag)))?;
        Ok(Self::Indices(indices.to_vec()))
    }

    /// 形心落在圆内的单元
    pub fn in_circle(mesh: &TriangleMesh, center: DVec2, radius: f64) -> Self {
        let indices = (0..mesh.n_triangles())
            .filter(|&t| point_in_circle(mesh.centroid(t), center, radius))
            .collect();
        Self::Indices(indices)
    }

    /// 形心落在多边形内的单元
    pub fn in_polygon(mesh: &TriangleMesh, polygon: &[DVec2]) -> Self {
        let indices = (0..mesh.n_triangles())
            .filter(|&t| point_in_polygon(mesh.centroid(t), polygon))
            .collect();
        Self::Indices(indices)
    }

    /// 选择是否为空
    pub fn is_empty(&self, n_triangles: usize) -> bool {
        match self {
            Self::All => n_triangles == 0,
            Self::Empty => true,
            Self::Indices(indices) => indices.is_empty(),
        }
    }

    /// 选中的单元数
    pub fn len(&self, n_triangles: usize) -> usize {
        match self {
            Self::All => n_triangles,
            Self::Empty => 0,
            Self::Indices(indices) => indices.len(),
        }
    }

    /// 遍历选中的单元索引
    pub fn for_each_cell<F>(&self, n_triangles: usize, mut f: F)
    where
        F: FnMut(usize),
    {
        match self {
            Self::All => (0..n_triangles).for_each(&mut f),
            Self::Empty => {}
            Self::Indices(indices) => indices.iter().copied().for_each(&mut f),
        }
    }

    /// 校验索引列表不越界
    pub fn validate(&self, n_triangles: usize) -> ThResult<()> {
        if let Self::Indices(indices) = self {
            for &t in indices {
                if t >= n_triangles {
                    return Err(ThError::config(format!(
                        "区域索引 {} 超出单元数 {}",
                        t, n_triangles
                    )));
                }
            }
        }
        Ok(())
    }

    /// 选中单元涉及的物理顶点（去重，升序）
    pub fn unique_vertices(&self, mesh: &TriangleMesh) -> Vec<usize> {
        let mut vertices = Vec::new();
        self.for_each_cell(mesh.n_triangles(), |t| {
            vertices.extend_from_slice(&mesh.triangle(t));
        });
        vertices.sort_unstable();
        vertices.dedup();
        vertices
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use th_mesh::RectMeshBuilder;

    fn mesh() -> TriangleMesh {
        RectMeshBuilder::new(4, 4, 4.0, 4.0).build().unwrap()
    }

    #[test]
    fn test_tri_state_distinct() {
        let all = Region::All;
        let empty = Region::Empty;
        let none_indices = Region::Indices(vec![]);

        assert_eq!(all.len(10), 10);
        assert_eq!(empty.len(10), 0);
        assert_eq!(none_indices.len(10), 0);

        assert!(!all.is_empty(10));
        assert!(empty.is_empty(10));
        assert!(none_indices.is_empty(10));
        assert_ne!(all, empty);
    }

    #[test]
    fn test_in_circle_selects_center_cells() {
        let mesh = mesh();
        let region = Region::in_circle(&mesh, DVec2::new(2.0, 2.0), 0.8);
        let mut selected = Vec::new();
        region.for_each_cell(mesh.n_triangles(), |t| selected.push(t));
        assert!(!selected.is_empty());
        for &t in &selected {
            assert!(mesh.centroid(t).distance(DVec2::new(2.0, 2.0)) <= 0.8);
        }
    }

    #[test]
    fn test_in_polygon() {
        let mesh = mesh();
        // 左下象限
        let poly = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(0.0, 2.0),
        ];
        let region = Region::in_polygon(&mesh, &poly);
        region.for_each_cell(mesh.n_triangles(), |t| {
            let c = mesh.centroid(t);
            assert!(c.x < 2.0 && c.y < 2.0);
        });
        assert_eq!(region.len(mesh.n_triangles()), 8);
    }

    #[test]
    fn test_from_tag() {
        let mut mesh = mesh();
        mesh.set_region_tag("inlet", vec![0, 1, 2]);
        let region = Region::from_tag(&mesh, "inlet").unwrap();
        assert_eq!(region, Region::Indices(vec![0, 1, 2]));
        assert!(Region::from_tag(&mesh, "missing").is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let region = Region::Indices(vec![0, 100]);
        assert!(region.validate(10).is_err());
        assert!(region.validate(101).is_ok());
    }

    #[test]
    fn test_unique_vertices() {
        let mesh = mesh();
        let region = Region::Indices(vec![0, 1]);
        let vertices = region.unique_vertices(&mesh);
        // 单元 0,1 构成一个矩形，共 4 个物理顶点
        assert_eq!(vertices.len(), 4);
    }
}
