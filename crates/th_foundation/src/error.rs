// crates/th_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `ThError` 枚举和 `ThResult` 类型别名，用于整个项目的错误处理。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层定义全部核心错误，物理层不再扩展新类型
//! 2. **易用性**: 提供便捷的构造方法
//! 3. **可定位**: 错误信息携带出错的坐标/时间/名称
//!
//! # 错误分类
//!
//! - 配置类（`Config`/`SizeMismatch`/`InvalidMesh`/`NotFound`）: 在计算
//!   开始前检出，致命，不重试
//! - 越界类（`Bounds`）: 仅在调用方要求严格越界检查时产生
//! - 时间范围类（`TimeTooEarly`/`TimeTooLate`）: 时变数据支持范围之外的
//!   查询；"过晚"可由调用方提供的默认函数恢复
//! - 数值类（`Numerical`）: 半隐式分母退化等不可恢复的数值状态

use thiserror::Error;

/// 统一结果类型
pub type ThResult<T> = Result<T, ThError>;

/// TriHydro 错误类型
#[derive(Error, Debug)]
pub enum ThError {
    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 无效网格拓扑
    #[error("无效的网格拓扑: {message}")]
    InvalidMesh {
        /// 具体错误信息
        message: String,
    },

    /// 资源未找到（未知的量名称、区域标签、边界标签等）
    #[error("资源未找到: {resource}")]
    NotFound {
        /// 资源名称
        resource: String,
    },

    /// 插值点越界
    #[error("插值点 {axis}={value} 超出网格范围（域边界 {axis}={limit}）")]
    Bounds {
        /// 越界的坐标轴名
        axis: &'static str,
        /// 查询值
        value: f64,
        /// 被超出的域边界值
        limit: f64,
    },

    /// 查询时间早于时变数据起点
    #[error("查询时间 t={time} 早于数据起始时间 t={start}")]
    TimeTooEarly {
        /// 查询时间 [s]
        time: f64,
        /// 数据起始时间 [s]
        start: f64,
    },

    /// 查询时间晚于时变数据终点
    #[error("查询时间 t={time} 晚于数据结束时间 t={end}")]
    TimeTooLate {
        /// 查询时间 [s]
        time: f64,
        /// 数据结束时间 [s]
        end: f64,
    },

    /// 数值错误
    #[error("数值错误: {message}")]
    Numerical {
        /// 具体错误信息
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl ThError {
    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 无效网格
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// 资源未找到
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// 插值点越界
    pub fn bounds(axis: &'static str, value: f64, limit: f64) -> Self {
        Self::Bounds { axis, value, limit }
    }

    /// 时间过早
    pub fn time_too_early(time: f64, start: f64) -> Self {
        Self::TimeTooEarly { time, start }
    }

    /// 时间过晚
    pub fn time_too_late(time: f64, end: f64) -> Self {
        Self::TimeTooLate { time, end }
    }

    /// 数值错误
    pub fn numerical(message: impl Into<String>) -> Self {
        Self::Numerical {
            message: message.into(),
        }
    }

    /// 是否属于可恢复的"时间过晚"类别
    #[inline]
    pub fn is_time_too_late(&self) -> bool {
        matches!(self, Self::TimeTooLate { .. })
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl ThError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> ThResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }
}

// ========================================================================
// 测试
// ========================================================================
