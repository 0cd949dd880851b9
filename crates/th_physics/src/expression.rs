// crates/th_physics/src/expression.rs

//! 场代数表达式
//!
//! 配置期构建一次的类型化表达式树，逐顶点求值，例如
//! 水深 = stage − elevation：
//!
//! ```rust
//! use th_physics::expression::Expr;
//!
//! let depth = Expr::field("stage") - Expr::field("elevation");
//! ```
//!
//! 热路径中不解析文本，未知场名在求值时报资源未找到错误。

use std::ops;

use th_foundation::{ThError, ThResult};

use crate::quantity::QuantitySet;
use crate::region::Region;

/// 二元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// 加
    Add,
    /// 减
    Sub,
    /// 乘
    Mul,
    /// 除
    Div,
}

impl BinOp {
    #[inline]
    fn eval(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
        }
    }
}

/// 表达式树
#[derive(Debug, Clone)]
pub enum Expr {
    /// 按名称引用的场
    Field(String),
    /// 常数
    Constant(f64),
    /// 二元运算
    Binary {
        /// 运算符
        op: BinOp,
        /// 左操作数
        lhs: Box<Expr>,
        /// 右操作数
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// 场引用
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// 常数
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    /// 逐顶点求值
    ///
    /// 所有引用的场必须已注册且单元数一致。网格规模取自表达式中
    /// 首个场引用，常数据此广播。
    pub fn evaluate_vertices(&self, quantities: &QuantitySet) -> ThResult<Vec<[f64; 3]>> {
        let n = first_field_len(self, quantities)?;
        self.eval_vertices(quantities, n)
    }

    fn eval_vertices(&self, quantities: &QuantitySet, n: usize) -> ThResult<Vec<[f64; 3]>> {
        match self {
            Self::Field(name) => {
                let values = quantities.get(name)?.vertex_values();
                ThError::check_size("expression_field", n, values.len())?;
                Ok(values.to_vec())
            }
            Self::Constant(v) => Ok(vec![[*v; 3]; n]),
            Self::Binary { op, lhs, rhs } => {
                let a = lhs.eval_vertices(quantities, n)?;
                let b = rhs.eval_vertices(quantities, n)?;
                Ok(a.iter()
                    .zip(b.iter())
                    .map(|(va, vb)| {
                        [
                            op.eval(va[0], vb[0]),
                            op.eval(va[1], vb[1]),
                            op.eval(va[2], vb[2]),
                        ]
                    })
                    .collect())
            }
        }
    }

    /// 表达式引用的场名（深度优先）
    pub fn field_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_fields(&mut names);
        names
    }

    fn collect_fields<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Field(name) => names.push(name),
            Self::Constant(_) => {}
            Self::Binary { lhs, rhs, .. } => {
                lhs.collect_fields(names);
                rhs.collect_fields(names);
            }
        }
    }
}

/// 纯常数表达式无法确定网格规模
fn first_field_len(root: &Expr, quantities: &QuantitySet) -> ThResult<usize> {
    match root.field_names().first() {
        Some(name) => Ok(quantities.get(name)?.len()),
        None => Err(ThError::config(
            "纯常数表达式无法确定网格规模，请改用 set_constant",
        )),
    }
}

impl ops::Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::Binary {
            op: BinOp::Add,
            lhs: Box::new(self),
            rhs: Box::new(rhs),
        }
    }
}

impl ops::Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        Expr::Binary {
            op: BinOp::Sub,
            lhs: Box::new(self),
            rhs: Box::new(rhs),
        }
    }
}

impl ops::Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::Binary {
            op: BinOp::Mul,
            lhs: Box::new(self),
            rhs: Box::new(rhs),
        }
    }
}

impl ops::Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        Expr::Binary {
            op: BinOp::Div,
            lhs: Box::new(self),
            rhs: Box::new(rhs),
        }
    }
}

impl QuantitySet {
    /// 将表达式求值结果赋给目标场
    ///
    /// 先对整个表达式求值再写入，目标场可出现在表达式中
    /// （如 stage = stage + 0.1·elevation）。
    pub fn assign_expression(
        &mut self,
        target: &str,
        expr: &Expr,
        region: &Region,
    ) -> ThResult<()> {
        let values = expr.evaluate_vertices(self)?;
        let quantity = self.get_mut(target)?;
        quantity.set_vertex_array(&values, region)
    }
}

// ============================================================
// 测试
// ============================================================
