// crates/th_mesh/src/topology.rs

//! 三角网格拓扑
//!
//! 本模块提供求解器消费的只读三角网格表示：
//! - TriangleMesh: 顶点、单元、邻接关系、边界边枚举
//!
//! # 约定
//!
//! - 单元顶点按逆时针排列
//! - 局部边 `e` 为局部顶点 `e` 的对边，连接局部顶点 `(e+1)%3` 和 `(e+2)%3`
//! - `neighbours[t][e] >= 0` 为跨越该边的邻居单元索引；负值哨兵 `-(k+1)`
//!   标识第 k 条边界边
//! - 边界边按 `(t, e)` 行优先扫描顺序编号，该顺序是对外契约的一部分，
//!   对固定网格的重复推导必须得到相同编号

use std::collections::{HashMap, HashSet};

use glam::DVec2;
use th_foundation::{ensure, ThError, ThResult};

/// 未打标签边界边的默认标签
pub const DEFAULT_BOUNDARY_TAG: &str = "exterior";

/// 三角网格（只读拓扑）
///
/// 求解核心不生成网格，只消费外部构建好的顶点表和单元表。
/// 构造时派生邻接关系、面积、形心、边界边枚举和顶点共享表。
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    /// 顶点坐标
    vertices: Vec<DVec2>,
    /// 单元顶点索引（逆时针）
    triangles: Vec<[usize; 3]>,
    /// 邻接表，负值哨兵 -(k+1) 标识第 k 条边界边
    neighbours: Vec<[i64; 3]>,
    /// 单元面积 [m²]
    areas: Vec<f64>,
    /// 单元形心
    centroids: Vec<DVec2>,
    /// 单元是否为本进程完全拥有（区域分解时幽灵单元为 false）
    tri_full_flag: Vec<bool>,
    /// 边界边 (单元, 局部边)，下标即边界槽位
    boundary_edges: Vec<(usize, usize)>,
    /// 边界标签，与 boundary_edges 对齐
    boundary_tags: Vec<String>,
    /// 区域标签 -> 单元索引列表
    region_tags: HashMap<String, Vec<usize>>,
    /// 每个物理顶点被哪些 (单元, 局部角标) 共享
    vertex_sharers: Vec<Vec<(usize, usize)>>,
}

impl TriangleMesh {
    /// 从顶点表和单元表构建网格
    ///
    /// 派生邻接关系和边界边枚举。所有边界边初始标签为
    /// [`DEFAULT_BOUNDARY_TAG`]，可通过 [`tag_boundary`](Self::tag_boundary)
    /// 或 [`set_boundary_tag`](Self::set_boundary_tag) 重打标签。
    ///
    /// # 错误
    ///
    /// - 顶点索引越界
    /// - 单元有向面积非正（退化或顺时针排列）
    /// - 同一条边被两个以上单元共享
    pub fn new(vertices: Vec<DVec2>, triangles: Vec<[usize; 3]>) -> ThResult<Self> {
        let n_vertices = vertices.len();
        let n_triangles = triangles.len();

        let mut areas = Vec::with_capacity(n_triangles);
        let mut centroids = Vec::with_capacity(n_triangles);

        for (t, tri) in triangles.iter().enumerate() {
            for &v in tri {
                ensure!(
                    v < n_vertices,
                    ThError::invalid_mesh(format!(
                        "单元 {} 引用了不存在的顶点 {} (顶点数 {})",
                        t, v, n_vertices
                    ))
                );
            }

            let [a, b, c] = [vertices[tri[0]], vertices[tri[1]], vertices[tri[2]]];
            // 有向面积（逆时针为正）
            let signed = 0.5 * ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y));
            ensure!(
                signed > 0.0,
                ThError::invalid_mesh(format!("单元 {} 有向面积非正: {}", t, signed))
            );

            areas.push(signed);
            centroids.push((a + b + c) / 3.0);
        }

        // 共享边匹配：无序顶点对 -> (单元, 局部边)
        let mut edge_map: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
        let mut paired: HashSet<(usize, usize)> = HashSet::new();
        let mut neighbours = vec![[0i64; 3]; n_triangles];

        for (t, tri) in triangles.iter().enumerate() {
            for e in 0..3 {
                let va = tri[(e + 1) % 3];
                let vb = tri[(e + 2) % 3];
                let key = (va.min(vb), va.max(vb));

                if let Some((t2, e2)) = edge_map.remove(&key) {
                    neighbours[t][e] = t2 as i64;
                    neighbours[t2][e2] = t as i64;
                    paired.insert(key);
                } else {
                    // 已配对的边再次出现即非流形
                    ensure!(
                        !paired.contains(&key),
                        ThError::invalid_mesh(format!(
                            "边 ({}, {}) 被两个以上单元共享",
                            key.0, key.1
                        ))
                    );
                    edge_map.insert(key, (t, e));
                    // 暂记 0，下面的扫描会改写为邻居索引或边界哨兵
                    neighbours[t][e] = 0;
                }
            }
        }

        // 剩余未配对的边即边界边，按 (t, e) 行优先扫描顺序编号
        let unmatched: HashSet<(usize, usize)> = edge_map.into_values().collect();

        let mut boundary_edges = Vec::new();
        for t in 0..triangles.len() {
            for e in 0..3 {
                if unmatched.contains(&(t, e)) {
                    let slot = boundary_edges.len() as i64;
                    neighbours[t][e] = -(slot + 1);
                    boundary_edges.push((t, e));
                }
            }
        }

        let boundary_tags = vec![DEFAULT_BOUNDARY_TAG.to_string(); boundary_edges.len()];

        // 顶点共享表
        let mut vertex_sharers = vec![Vec::new(); n_vertices];
        for (t, tri) in triangles.iter().enumerate() {
            for (corner, &v) in tri.iter().enumerate() {
                vertex_sharers[v].push((t, corner));
            }
        }

        Ok(Self {
            vertices,
            triangles,
            neighbours,
            areas,
            centroids,
            tri_full_flag: vec![true; n_triangles],
            boundary_edges,
            boundary_tags,
            region_tags: HashMap::new(),
            vertex_sharers,
        })
    }

    // ========== 基本访问 ==========

    /// 单元数量
    #[inline]
    pub fn n_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// 顶点数量
    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// 顶点坐标
    #[inline]
    pub fn vertex(&self, v: usize) -> DVec2 {
        self.vertices[v]
    }

    /// 单元的顶点索引
    #[inline]
    pub fn triangle(&self, t: usize) -> [usize; 3] {
        self.triangles[t]
    }

    /// 单元三个顶点的坐标
    #[inline]
    pub fn vertex_coords(&self, t: usize) -> [DVec2; 3] {
        let tri = self.triangles[t];
        [
            self.vertices[tri[0]],
            self.vertices[tri[1]],
            self.vertices[tri[2]],
        ]
    }

    /// 单元形心
    #[inline]
    pub fn centroid(&self, t: usize) -> DVec2 {
        self.centroids[t]
    }

    /// 所有形心
    #[inline]
    pub fn centroids(&self) -> &[DVec2] {
        &self.centroids
    }

    /// 单元面积 [m²]
    #[inline]
    pub fn area(&self, t: usize) -> f64 {
        self.areas[t]
    }

    /// 所有面积
    #[inline]
    pub fn areas(&self) -> &[f64] {
        &self.areas
    }

    /// 邻接项：邻居单元索引或负值哨兵
    #[inline]
    pub fn neighbour(&self, t: usize, e: usize) -> i64 {
        self.neighbours[t][e]
    }

    /// 局部边中点
    #[inline]
    pub fn edge_midpoint(&self, t: usize, e: usize) -> DVec2 {
        let tri = self.triangles[t];
        let a = self.vertices[tri[(e + 1) % 3]];
        let b = self.vertices[tri[(e + 2) % 3]];
        (a + b) * 0.5
    }

    /// 顶点共享表：物理顶点 v 被哪些 (单元, 局部角标) 共享
    #[inline]
    pub fn vertex_sharers(&self, v: usize) -> &[(usize, usize)] {
        &self.vertex_sharers[v]
    }

    // ========== 幽灵单元标记 ==========

    /// 单元是否为本进程完全拥有
    #[inline]
    pub fn is_full(&self, t: usize) -> bool {
        self.tri_full_flag[t]
    }

    /// 设置幽灵单元标记（区域分解时由外部划分器调用）
    pub fn set_full_flags(&mut self, flags: Vec<bool>) -> ThResult<()> {
        ThError::check_size("tri_full_flag", self.n_triangles(), flags.len())?;
        self.tri_full_flag = flags;
        Ok(())
    }

    // ========== 边界边 ==========

    /// 边界边列表 (单元, 局部边)，下标即边界槽位
    #[inline]
    pub fn boundary_edges(&self) -> &[(usize, usize)] {
        &self.boundary_edges
    }

    /// 边界边数量
    #[inline]
    pub fn n_boundary_edges(&self) -> usize {
        self.boundary_edges.len()
    }

    /// 边界槽位的标签
    #[inline]
    pub fn boundary_tag(&self, slot: usize) -> &str {
        &self.boundary_tags[slot]
    }

    /// 出现过的边界标签集合（去重，按首次出现顺序）
    pub fn boundary_tag_names(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for tag in &self.boundary_tags {
            if !seen.contains(&tag.as_str()) {
                seen.push(tag.as_str());
            }
        }
        seen
    }

    /// 按谓词批量打边界标签
    ///
    /// 对每条边界边以边中点调用谓词，返回 `Some(tag)` 则改写该边标签。
    pub fn tag_boundary<F>(&mut self, predicate: F)
    where
        F: Fn(DVec2) -> Option<String>,
    {
        for slot in 0..self.boundary_edges.len() {
            let (t, e) = self.boundary_edges[slot];
            if let Some(tag) = predicate(self.edge_midpoint(t, e)) {
                self.boundary_tags[slot] = tag;
            }
        }
    }

    /// 设置单条边界边的标签
    pub fn set_boundary_tag(&mut self, slot: usize, tag: impl Into<String>) -> ThResult<()> {
        ensure!(
            slot < self.boundary_tags.len(),
            ThError::invalid_mesh(format!(
                "边界槽位 {} 超出范围 0..{}",
                slot,
                self.boundary_tags.len()
            ))
        );
        self.boundary_tags[slot] = tag.into();
        Ok(())
    }

    // ========== 区域标签 ==========

    /// 注册区域标签（标签 -> 单元索引列表）
    pub fn set_region_tag(&mut self, tag: impl Into<String>, indices: Vec<usize>) {
        self.region_tags.insert(tag.into(), indices);
    }

    /// 解析区域标签
    pub fn region(&self, tag: &str) -> Option<&[usize]> {
        self.region_tags.get(tag).map(|v| v.as_slice())
    }
}

// ============================================================
// 测试
// ============================================================
