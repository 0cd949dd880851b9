// crates/th_mesh/src/generation.rs

//! 网格生成模块
//!
//! 提供简单的结构化网格生成工具，用于测试和验证：
//!
//! - [`RectMeshBuilder`]: 矩形结构化网格生成器
//!
//! # 使用示例
//!
//! ```rust
//! use th_mesh::generation::RectMeshBuilder;
//!
//! // 生成 10x10 的矩形网格
//! let mesh = RectMeshBuilder::new(10, 10, 100.0, 100.0).build().unwrap();
//!
//! assert_eq!(mesh.n_triangles(), 200); // 10*10*2 triangles
//! ```

use glam::DVec2;
use th_foundation::ThResult;

use crate::topology::TriangleMesh;

/// 矩形结构化网格生成器
///
/// 生成矩形域上的三角形网格，顶点按行主序排列。
/// 四条外边界分别打上 "left" / "right" / "bottom" / "top" 标签。
pub struct RectMeshBuilder {
    /// x 方向单元数
    nx: usize,
    /// y 方向单元数
    ny: usize,
    /// x 方向域长度 [m]
    lx: f64,
    /// y 方向域长度 [m]
    ly: f64,
    /// x 方向起点
    x0: f64,
    /// y 方向起点
    y0: f64,
}

impl RectMeshBuilder {
    /// 创建矩形网格生成器
    ///
    /// # 参数
    ///
    /// - `nx`: x 方向单元数
    /// - `ny`: y 方向单元数
    /// - `lx`: x 方向域长度
    /// - `ly`: y 方向域长度
    pub fn new(nx: usize, ny: usize, lx: f64, ly: f64) -> Self {
        Self {
            nx,
            ny,
            lx,
            ly,
            x0: 0.0,
            y0: 0.0,
        }
    }

    /// 创建方形网格生成器
    pub fn square(n: usize, length: f64) -> Self {
        Self::new(n, n, length, length)
    }

    /// 设置原点偏移
    pub fn with_origin(mut self, x0: f64, y0: f64) -> Self {
        self.x0 = x0;
        self.y0 = y0;
        self
    }

    /// x 方向网格间距
    pub fn dx(&self) -> f64 {
        self.lx / self.nx as f64
    }

    /// y 方向网格间距
    pub fn dy(&self) -> f64 {
        self.ly / self.ny as f64
    }

    /// 顶点总数
    pub fn n_vertices(&self) -> usize {
        (self.nx + 1) * (self.ny + 1)
    }

    /// 单元总数（每个矩形分为 2 个三角形）
    pub fn n_cells(&self) -> usize {
        self.nx * self.ny * 2
    }

    /// 构建网格
    pub fn build(&self) -> ThResult<TriangleMesh> {
        let dx = self.dx();
        let dy = self.dy();

        let mut vertices = Vec::with_capacity(self.n_vertices());
        for j in 0..=self.ny {
            for i in 0..=self.nx {
                vertices.push(DVec2::new(
                    self.x0 + i as f64 * dx,
                    self.y0 + j as f64 * dy,
                ));
            }
        }

        let vertex_idx = |i: usize, j: usize| -> usize { j * (self.nx + 1) + i };

        // 每个矩形沿对角线 v00-v11 分为两个逆时针三角形
        let mut triangles = Vec::with_capacity(self.n_cells());
        for j in 0..self.ny {
            for i in 0..self.nx {
                let v00 = vertex_idx(i, j);
                let v10 = vertex_idx(i + 1, j);
                let v01 = vertex_idx(i, j + 1);
                let v11 = vertex_idx(i + 1, j + 1);

                triangles.push([v00, v10, v11]);
                triangles.push([v00, v11, v01]);
            }
        }

        let mut mesh = TriangleMesh::new(vertices, triangles)?;

        let (x0, y0) = (self.x0, self.y0);
        let (x1, y1) = (self.x0 + self.lx, self.y0 + self.ly);
        let eps = 1e-9 * dx.max(dy);
        mesh.tag_boundary(|mid| {
            if (mid.x - x0).abs() < eps {
                Some("left".to_string())
            } else if (mid.x - x1).abs() < eps {
                Some("right".to_string())
            } else if (mid.y - y0).abs() < eps {
                Some("bottom".to_string())
            } else if (mid.y - y1).abs() < eps {
                Some("top".to_string())
            } else {
                None
            }
        });

        Ok(mesh)
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_mesh_counts() {
        let mesh = RectMeshBuilder::new(4, 3, 4.0, 3.0).build().unwrap();
        assert_eq!(mesh.n_triangles(), 24);
        assert_eq!(mesh.n_vertices(), 20);
        // 周长上的边界边: 2*(4+3)
        assert_eq!(mesh.n_boundary_edges(), 14);
    }

    #[test]
    fn test_total_area() {
        let mesh = RectMeshBuilder::new(5, 5, 10.0, 10.0).build().unwrap();
        let total: f64 = mesh.areas().iter().sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_tags() {
        let mesh = RectMeshBuilder::square(2, 2.0).build().unwrap();
        let mut counts = std::collections::HashMap::new();
        for slot in 0..mesh.n_boundary_edges() {
            *counts.entry(mesh.boundary_tag(slot).to_string()).or_insert(0) += 1;
        }
        assert_eq!(counts.get("left"), Some(&2));
        assert_eq!(counts.get("right"), Some(&2));
        assert_eq!(counts.get("bottom"), Some(&2));
        assert_eq!(counts.get("top"), Some(&2));
    }

    #[test]
    fn test_origin_offset() {
        let mesh = RectMeshBuilder::new(1, 1, 1.0, 1.0)
            .with_origin(10.0, 20.0)
            .build()
            .unwrap();
        assert_eq!(mesh.vertex(0), DVec2::new(10.0, 20.0));
    }
}
