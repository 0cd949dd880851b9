// crates/th_mesh/src/lib.rs

//! TriHydro Mesh Layer
//!
//! 非结构三角网格的拓扑表示与几何工具。
//!
//! # 模块概览
//!
//! - [`topology`]: 三角网格拓扑（邻接、边界边枚举、区域标签）
//! - [`geometry`]: 几何谓词（点在多边形/圆内）
//! - [`generation`]: 结构化测试网格生成器
//!
//! # 设计思路
//!
//! 求解核心消费外部构建好的网格，本层只负责派生求解所需的
//! 拓扑信息：邻接表、边界边的确定性枚举、顶点共享表。

#![warn(clippy::all)]

pub mod generation;
pub mod geometry;
pub mod topology;

pub use generation::RectMeshBuilder;
pub use geometry::{point_in_circle, point_in_polygon};
pub use topology::{TriangleMesh, DEFAULT_BOUNDARY_TAG};
