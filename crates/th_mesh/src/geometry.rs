// crates/th_mesh/src/geometry.rs

//! 几何谓词
//!
//! 点在多边形内/圆内判定，供区域选择和空间变率场使用。

use glam::DVec2;

/// 点是否落在圆内（含圆周）
#[inline]
pub fn point_in_circle(point: DVec2, center: DVec2, radius: f64) -> bool {
    point.distance_squared(center) <= radius * radius
}

/// 射线法判断点是否在简单多边形内部
///
/// 多边形顶点按顺序给出（不要求闭合），落在边上的点视为内部。
pub fn point_in_polygon(point: DVec2, polygon: &[DVec2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];

        // 点恰好落在顶点上
        if point == pi {
            return true;
        }

        // 点落在边上
        if on_segment(point, pi, pj) {
            return true;
        }

        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = pi.x + (point.y - pi.y) / (pj.y - pi.y) * (pj.x - pi.x);
            if point.x < x_cross {
                inside = !inside;
            }
        }

        j = i;
    }

    inside
}

/// 点是否落在线段 ab 上（含端点）
fn on_segment(p: DVec2, a: DVec2, b: DVec2) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross.abs() > 1e-12 {
        return false;
    }
    let dot = (p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y);
    let len_sq = a.distance_squared(b);
    dot >= 0.0 && dot <= len_sq
}

// ============================================================
// 测试
// ============================================================
