// crates/th_terrain/src/lib.rs

//! TriHydro Terrain Layer
//!
//! 结构化网格数据与插值引擎。
//!
//! # 模块概览
//!
//! - [`grid`]: 带坐标轴的二维网格容器与插值模式
//! - [`interpolate`]: 网格到散点的双线性 / 分片常值插值
//!
//! # 使用示例
//!
//! ```rust
//! use glam::DVec2;
//! use th_terrain::{interpolate2d, InterpolationMode};
//!
//! let x = vec![0.0, 1.0];
//! let y = vec![0.0, 1.0];
//! let z = vec![0.0, 1.0, 2.0, 3.0];
//! let values = interpolate2d(
//!     &x, &y, &z,
//!     &[DVec2::new(0.5, 0.5)],
//!     InterpolationMode::Linear,
//!     true,
//! ).unwrap();
//! assert!((values[0] - 1.5).abs() < 1e-12);
//! ```

#![warn(clippy::all)]

pub mod grid;
pub mod interpolate;

pub use grid::{Grid2, InterpolationMode};
pub use interpolate::{interpolate2d, interpolate_raster};
