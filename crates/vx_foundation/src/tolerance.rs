// crates/vx_foundation/src/tolerance.rs

//! 几何比较容差模型
//!
//! 所有坐标比较使用相对容差：坐标 a 与参考值 b 相等当且仅当
//! `|a - b| <= eps_rel * scale`，其中 `scale` 为网格包围盒最大边长。
//! 法向分类使用角度阈值 θ：`z_down` 意味着 `normal · (0,0,-1) > cos θ`。
//!
//! 容差实例由配置层构造后注入各管线阶段，无全局状态。

use serde::{Deserialize, Serialize};

/// 默认相对容差
pub const DEFAULT_EPS_REL: f64 = 1e-6;

/// 默认法向角度阈值（度）
pub const DEFAULT_NORMAL_ANGLE_DEG: f64 = 45.0;

/// 默认跨部件邻近距离（包围盒最大边长的比例）
pub const DEFAULT_CROSS_PART_DISTANCE_REL: f64 = 0.05;

/// 几何容差配置
///
/// 全部为相对量，绝对量通过 `*_abs` 方法结合网格尺度得到。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// 坐标比较相对容差
    pub eps_rel: f64,
    /// 法向分类角度阈值（度）
    pub normal_angle_deg: f64,
    /// 跨部件邻近距离比例
    pub cross_part_distance_rel: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            eps_rel: DEFAULT_EPS_REL,
            normal_angle_deg: DEFAULT_NORMAL_ANGLE_DEG,
            cross_part_distance_rel: DEFAULT_CROSS_PART_DISTANCE_REL,
        }
    }
}

impl Tolerance {
    /// 创建容差配置
    pub fn new(eps_rel: f64, normal_angle_deg: f64, cross_part_distance_rel: f64) -> Self {
        Self {
            eps_rel,
            normal_angle_deg,
            cross_part_distance_rel,
        }
    }

    /// 绝对坐标容差（`scale` 为包围盒最大边长）
    #[inline]
    pub fn eps_abs(&self, scale: f64) -> f64 {
        self.eps_rel * scale.abs().max(1e-30)
    }

    /// 判断两坐标在给定尺度下是否相等
    #[inline]
    pub fn coord_eq(&self, a: f64, b: f64, scale: f64) -> bool {
        (a - b).abs() <= self.eps_abs(scale)
    }

    /// 角度阈值的余弦值
    #[inline]
    pub fn cos_theta(&self) -> f64 {
        self.normal_angle_deg.to_radians().cos()
    }

    /// 判断单位法向是否指向 -z（在角度阈值内）
    #[inline]
    pub fn points_down(&self, normal_z: f64) -> bool {
        -normal_z > self.cos_theta()
    }

    /// 判断单位法向是否指向 +z（在角度阈值内）
    #[inline]
    pub fn points_up(&self, normal_z: f64) -> bool {
        normal_z > self.cos_theta()
    }

    /// 跨部件邻近绝对距离（`scale` 为包围盒最大边长）
    #[inline]
    pub fn proximity_distance(&self, scale: f64) -> f64 {
        self.cross_part_distance_rel * scale
    }
}
