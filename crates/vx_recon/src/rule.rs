// crates/vx_recon/src/rule.rs

//! 几何重建规则
//!
//! 规则是带标签的变体，每个变体实现一个 `apply`；没有类层次。
//! 面级规则天然作用在边界面上，节点/单元集合通过面的节点或
//! 所属单元派生。所有选择都只依赖新网格的几何，不依赖任何
//! 来自 CAD 的标注。

use glam::DVec3;
use vx_foundation::{CancelToken, Tolerance};
use vx_mesh::geometry::{Aabb3, Axis};
use vx_mesh::{Face, FaceIndex, Mesh};

use crate::error::ReconResult;

/// 命名集合的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// 节点集合
    Nodes,
    /// 面（有序面片列表）
    Faces,
    /// 单元集合
    Elements,
}

/// 相对分数盒：部件包围盒按分数缩放出的选择范围
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelBox {
    /// 下角分数 (fx_lo, fy_lo, fz_lo)
    pub lo: DVec3,
    /// 上角分数 (fx_hi, fy_hi, fz_hi)
    pub hi: DVec3,
}

impl RelBox {
    /// 覆盖整个部件的盒
    pub const FULL: RelBox = RelBox {
        lo: DVec3::ZERO,
        hi: DVec3::ONE,
    };

    /// 由一组点在参考包围盒内的相对范围推断
    pub fn infer(points: impl IntoIterator<Item = DVec3>, reference: &Aabb3) -> Self {
        let mut lo = DVec3::splat(f64::MAX);
        let mut hi = DVec3::splat(f64::MIN);
        let mut any = false;
        for p in points {
            let rel = reference.relative(p);
            lo = lo.min(rel);
            hi = hi.max(rel);
            any = true;
        }
        if !any {
            return Self {
                lo: DVec3::ZERO,
                hi: DVec3::ZERO,
            };
        }
        Self { lo, hi }
    }
}

/// 跨部件邻近规则的对侧几何来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerRef {
    /// 对侧部件名（模板可辨识时）
    pub part: Option<String>,
    /// 对侧面名（部件未重新划分网格时按模板面取几何）
    pub surface: String,
}

/// 重建规则
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// 全局最低 z 平面（容差内）上的实体
    ZMinPlane,
    /// 法向朝下（角度阈值内）且质心严格高于底面的边界面
    ZDownExceptBottom,
    /// 部件包围盒的相对分数盒
    RelativeBounds(RelBox),
    /// 距对侧部件边界面质心 ≤ d 的面；d 缺省为容差给出的比例距离
    CrossPartProximity {
        /// 对侧几何
        partner: PartnerRef,
        /// 绝对距离（None 时按容差比例）
        distance: Option<f64>,
    },
    /// 轴对齐圆筒壳：到部件包围盒中轴的径向距离在 [r_min, r_max]
    AxisCylinder {
        /// 圆筒轴向
        axis: Axis,
        /// 内半径
        r_min: f64,
        /// 外半径
        r_max: f64,
    },
    /// 各子规则的交集（保持第一条子规则的输出顺序）
    Intersection(Vec<Rule>),
}

impl Rule {
    /// 规则种类标签（用于策略核查与日志）
    pub fn kind_tag(&self) -> &'static str {
        match self {
            Self::ZMinPlane => "z_min_plane",
            Self::ZDownExceptBottom => "z_down_except_bottom",
            Self::RelativeBounds(_) => "relative_bounds",
            Self::CrossPartProximity { .. } => "cross_part_proximity",
            Self::AxisCylinder { .. } => "axis_cylinder",
            Self::Intersection(_) => "intersection",
        }
    }

    /// 是否为相对边界规则（自接触策略要求）
    pub fn is_relative_bounds(&self) -> bool {
        matches!(self, Self::RelativeBounds(_))
    }
}

/// 规则求值上下文
///
/// 由重建器对被置换部件预计算一次，供全部规则共享。
pub struct RuleContext<'a> {
    /// 新网格
    pub mesh: &'a Mesh,
    /// 被置换部件名
    pub part: &'a str,
    /// 部件包围盒（新网格）
    pub part_bbox: Aabb3,
    /// 全网格包围盒最大边长（容差尺度）
    pub scale: f64,
    /// 几何容差
    pub tol: &'a Tolerance,
    /// 部件引用的节点索引（升序去重）
    pub part_nodes: &'a [u32],
    /// 部件边界面
    pub boundary: &'a [Face],
    /// 边界面质心（与 `boundary` 同序）
    pub centroids: &'a [DVec3],
    /// 边界面外法向（与 `boundary` 同序）
    pub normals: &'a [DVec3],
    /// 跨部件邻近规则的对侧面心索引
    pub partner_index: Option<&'a FaceIndex>,
    /// 取消令牌（每轮遍历检查一次）
    pub cancel: &'a CancelToken,
}

/// 规则输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// 节点索引（升序去重）
    Nodes(Vec<u32>),
    /// 边界面下标（`RuleContext::boundary` 的下标）
    Faces(Vec<usize>),
    /// 单元索引（升序去重）
    Elements(Vec<usize>),
}

impl Selection {
    /// 选中的实体数
    pub fn len(&self) -> usize {
        match self {
            Self::Nodes(v) => v.len(),
            Self::Faces(v) => v.len(),
            Self::Elements(v) => v.len(),
        }
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Rule {
    /// 在新网格上求值
    pub fn apply(&self, ctx: &RuleContext<'_>, kind: SelectionKind) -> ReconResult<Selection> {
        ctx.cancel.check()?;

        match self {
            Self::ZMinPlane => Ok(self.select_by_predicate(ctx, kind, &|p: DVec3| {
                ctx.tol.coord_eq(p.z, ctx.part_bbox.min.z, ctx.scale)
            })),

            Self::ZDownExceptBottom => {
                let eps = ctx.tol.eps_abs(ctx.scale);
                let z_floor = ctx.part_bbox.min.z + eps;
                let faces: Vec<usize> = (0..ctx.boundary.len())
                    .filter(|&i| {
                        ctx.tol.points_down(ctx.normals[i].z) && ctx.centroids[i].z > z_floor
                    })
                    .collect();
                Ok(faces_to_kind(ctx, faces, kind))
            }

            Self::RelativeBounds(rel) => {
                let lo = ctx.part_bbox.absolute(rel.lo);
                let hi = ctx.part_bbox.absolute(rel.hi);
                let eps = ctx.tol.eps_abs(ctx.scale);
                let abs_box = Aabb3 { min: lo, max: hi };
                Ok(self.select_by_predicate(ctx, kind, &|p: DVec3| abs_box.contains(p, eps)))
            }

            Self::CrossPartProximity { distance, .. } => {
                let d = distance.unwrap_or_else(|| ctx.tol.proximity_distance(ctx.scale));
                let Some(index) = ctx.partner_index else {
                    return Ok(faces_to_kind(ctx, Vec::new(), kind));
                };
                let faces: Vec<usize> = (0..ctx.boundary.len())
                    .filter(|&i| {
                        index
                            .nearest_distance(ctx.centroids[i])
                            .is_some_and(|dist| dist <= d)
                    })
                    .collect();
                Ok(faces_to_kind(ctx, faces, kind))
            }

            Self::AxisCylinder { axis, r_min, r_max } => {
                let center = (ctx.part_bbox.min + ctx.part_bbox.max) * 0.5;
                let radial = move |p: DVec3| {
                    let d = p - center;
                    match axis {
                        Axis::X => (d.y * d.y + d.z * d.z).sqrt(),
                        Axis::Y => (d.x * d.x + d.z * d.z).sqrt(),
                        Axis::Z => (d.x * d.x + d.y * d.y).sqrt(),
                    }
                };
                let (r_min, r_max) = (*r_min, *r_max);
                Ok(self.select_by_predicate(ctx, kind, &move |p: DVec3| {
                    let r = radial(p);
                    r >= r_min && r <= r_max
                }))
            }

            Self::Intersection(rules) => {
                let mut iter = rules.iter();
                let Some(first) = iter.next() else {
                    return Ok(faces_to_kind(ctx, Vec::new(), kind));
                };
                let mut result = first.apply(ctx, kind)?;
                for rule in iter {
                    let other = rule.apply(ctx, kind)?;
                    result = intersect(result, &other);
                }
                Ok(result)
            }
        }
    }

    /// 按点谓词选择：节点用坐标，面用质心，单元用质心
    fn select_by_predicate(
        &self,
        ctx: &RuleContext<'_>,
        kind: SelectionKind,
        pred: &dyn Fn(DVec3) -> bool,
    ) -> Selection {
        match kind {
            SelectionKind::Nodes => Selection::Nodes(
                ctx.part_nodes
                    .iter()
                    .copied()
                    .filter(|&n| pred(ctx.mesh.nodes()[n as usize]))
                    .collect(),
            ),
            SelectionKind::Faces => Selection::Faces(
                (0..ctx.boundary.len())
                    .filter(|&i| pred(ctx.centroids[i]))
                    .collect(),
            ),
            SelectionKind::Elements => {
                let range = ctx
                    .mesh
                    .part(ctx.part)
                    .map(|p| p.range.clone())
                    .unwrap_or(0..0);
                Selection::Elements(
                    range
                        .filter(|&e| pred(ctx.mesh.element_centroid(e)))
                        .collect(),
                )
            }
        }
    }
}

/// 面下标列表转换为目标种类
fn faces_to_kind(ctx: &RuleContext<'_>, faces: Vec<usize>, kind: SelectionKind) -> Selection {
    match kind {
        SelectionKind::Faces => Selection::Faces(faces),
        SelectionKind::Nodes => {
            let mut nodes: Vec<u32> = faces
                .iter()
                .flat_map(|&i| ctx.boundary[i].nodes(ctx.mesh))
                .collect();
            nodes.sort_unstable();
            nodes.dedup();
            Selection::Nodes(nodes)
        }
        SelectionKind::Elements => {
            let mut elems: Vec<usize> = faces.iter().map(|&i| ctx.boundary[i].element).collect();
            elems.sort_unstable();
            elems.dedup();
            Selection::Elements(elems)
        }
    }
}

/// 交集（保持第一个输出的顺序）
fn intersect(first: Selection, other: &Selection) -> Selection {
    match (first, other) {
        (Selection::Nodes(a), Selection::Nodes(b)) => {
            Selection::Nodes(a.into_iter().filter(|x| b.contains(x)).collect())
        }
        (Selection::Faces(a), Selection::Faces(b)) => {
            Selection::Faces(a.into_iter().filter(|x| b.contains(x)).collect())
        }
        (Selection::Elements(a), Selection::Elements(b)) => {
            Selection::Elements(a.into_iter().filter(|x| b.contains(x)).collect())
        }
        // 种类不一致时交集无定义，视为空
        (Selection::Nodes(_), _) => Selection::Nodes(Vec::new()),
        (Selection::Faces(_), _) => Selection::Faces(Vec::new()),
        (Selection::Elements(_), _) => Selection::Elements(Vec::new()),
    }
}
