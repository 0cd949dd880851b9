// crates/th_foundation/src/lib.rs

//! TriHydro Foundation Layer
//!
//! 基础层，提供整个项目的统一错误类型和校验宏。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `ThError` / `ThResult`
//!
//! # 设计原则
//!
//! 1. **最小依赖**: 仅依赖 thiserror
//! 2. **单一错误类型**: 上层各 crate 共用 `ThError`，不再派生局部错误枚举

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub use error::{ThError, ThResult};

/// 条件校验宏：条件不满足时提前返回给定错误
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err);
        }
    };
}

/// Option 解包宏：为 None 时提前返回给定错误
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr) => {
        match $opt {
            Some(v) => v,
            None => return Err($err),
        }
    };
}

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{ThError, ThResult};
    pub use crate::{ensure, require};
}
