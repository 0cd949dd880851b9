// crates/th_physics/src/lib.rs

//! TriHydro Physics Layer
//!
//! 有限体积浅水求解器的守恒量更新核心。
//!
//! # 模块概览
//!
//! - [`quantity`]: 守恒量场（形心/顶点/边三套表示、半隐式更新）
//! - [`expression`]: 配置期构建的场代数表达式
//! - [`timeseries`]: 时变数据载体
//! - [`boundary`]: 边界对象（固定值 / 透射 / 时变）
//! - [`region`]: 区域选择器（全部 / 空 / 索引列表）
//! - [`operators`]: 强迫算子框架（区域算子、变率算子）
//! - [`domain`]: 演进驱动（相位状态机、逐时间步让出）
//!
//! # 设计思路
//!
//! 通量求解数值格式是外部协作者：本层定义累加器契约
//! （[`domain::FluxComputer`]）并保证相位顺序，自身只负责边界耦合、
//! 强迫施加和半隐式守恒更新。
//!
//! # 使用示例
//!
//! ```rust
//! use th_mesh::RectMeshBuilder;
//! use th_physics::boundary::Dirichlet;
//! use th_physics::domain::Domain;
//!
//! let mesh = RectMeshBuilder::square(4, 10.0).build().unwrap();
//! let mut domain = Domain::new(mesh, &["stage", "xmomentum", "ymomentum"]);
//! for tag in ["left", "right", "bottom", "top"] {
//!     domain.set_boundary(tag, Box::new(Dirichlet::new(vec![0.0, 0.0, 0.0])));
//! }
//!
//! for time in domain.evolve(0.5, 2.0).unwrap() {
//!     let time = time.unwrap();
//!     assert!(time <= 2.0);
//! }
//! ```

#![warn(clippy::all)]

pub mod boundary;
pub mod domain;
pub mod expression;
pub mod operators;
pub mod quantity;
pub mod region;
pub mod timeseries;

pub use boundary::{Boundary, Dirichlet, TimeVarying, Transmissive};
pub use domain::{Domain, Evolve, Extrapolator, FirstOrder, FluxComputer, NoFluxes, Phase};
pub use expression::{BinOp, Expr};
pub use operators::{
    AddQuantity, AddValue, Granularity, Operator, OperatorContext, Rate, RateOperator, SetRegion,
    Value,
};
pub use quantity::{Location, Quantity, QuantitySet, ValueSource};
pub use region::Region;
pub use timeseries::{TimeFunction, TimeSeries};
