// crates/vx_mesh/src/geometry.rs

//! 几何内核：包围盒、面质心、外法向、平面节点查询
//!
//! 法向由面规范环绕的两条非共线边叉积得到，并以远离所属单元质心
//! 的方向为正（外法向）。坐标比较一律通过 [`Tolerance`] 的相对
//! 容差进行。

use glam::DVec3;
use vx_foundation::Tolerance;

use crate::error::MeshResult;
use crate::faces::Face;
use crate::mesh::Mesh;

/// 坐标轴
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// x 轴
    X,
    /// y 轴
    Y,
    /// z 轴
    Z,
}

impl Axis {
    /// 取向量在该轴上的分量
    #[inline]
    pub fn component(self, v: DVec3) -> f64 {
        match self {
            Self::X => v.x,
            Self::Y => v.y,
            Self::Z => v.z,
        }
    }
}

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// 最小角
    pub min: DVec3,
    /// 最大角
    pub max: DVec3,
}

impl Aabb3 {
    /// 从点集构建；空集返回退化盒（原点）
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a DVec3>) -> Self {
        let mut iter = points.into_iter();
        let Some(&first) = iter.next() else {
            return Self {
                min: DVec3::ZERO,
                max: DVec3::ZERO,
            };
        };
        let mut min = first;
        let mut max = first;
        for &p in iter {
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    /// 各边长度
    #[inline]
    pub fn extent(&self) -> DVec3 {
        self.max - self.min
    }

    /// 最长边
    #[inline]
    pub fn max_edge(&self) -> f64 {
        let e = self.extent();
        e.x.max(e.y).max(e.z)
    }

    /// 对角线长度
    #[inline]
    pub fn diagonal(&self) -> f64 {
        self.extent().length()
    }

    /// 绝对坐标转相对坐标（0-1）；零宽度维度按 1 处理避免除零
    pub fn relative(&self, p: DVec3) -> DVec3 {
        let e = self.extent();
        let safe = DVec3::new(
            if e.x == 0.0 { 1.0 } else { e.x },
            if e.y == 0.0 { 1.0 } else { e.y },
            if e.z == 0.0 { 1.0 } else { e.z },
        );
        (p - self.min) / safe
    }

    /// 相对坐标转绝对坐标
    pub fn absolute(&self, rel: DVec3) -> DVec3 {
        self.min + rel * self.extent()
    }

    /// 判断点是否在盒内（含容差）
    pub fn contains(&self, p: DVec3, eps: f64) -> bool {
        p.x >= self.min.x - eps
            && p.y >= self.min.y - eps
            && p.z >= self.min.z - eps
            && p.x <= self.max.x + eps
            && p.y <= self.max.y + eps
            && p.z <= self.max.z + eps
    }
}

/// 整个网格的包围盒
pub fn mesh_bbox(mesh: &Mesh) -> Aabb3 {
    Aabb3::from_points(mesh.nodes())
}

/// 部件的包围盒（只统计部件单元引用的节点）
pub fn part_bbox(mesh: &Mesh, part: &str) -> MeshResult<Aabb3> {
    let range = mesh.part_range(part)?;
    let mut min = DVec3::splat(f64::MAX);
    let mut max = DVec3::splat(f64::MIN);
    let mut seen = false;
    for element in range {
        for &n in &mesh.elements()[element].nodes {
            let p = mesh.nodes()[n as usize];
            min = min.min(p);
            max = max.max(p);
            seen = true;
        }
    }
    if !seen {
        return Ok(Aabb3 {
            min: DVec3::ZERO,
            max: DVec3::ZERO,
        });
    }
    Ok(Aabb3 { min, max })
}

/// 面质心：面内全部节点坐标的均值
pub fn face_centroid(mesh: &Mesh, face: &Face) -> DVec3 {
    let nodes = face.nodes(mesh);
    let mut sum = DVec3::ZERO;
    for &n in &nodes {
        sum += mesh.nodes()[n as usize];
    }
    sum / nodes.len() as f64
}

/// 面外法向（单位向量）
///
/// 由角节点的两条非共线边叉积得到，翻转到远离所属单元质心的方向。
/// 退化面（零面积）返回零向量。
pub fn face_normal(mesh: &Mesh, face: &Face) -> DVec3 {
    let nodes = face.nodes(mesh);
    let n_corners = face.n_corners(mesh);
    let p0 = mesh.nodes()[nodes[0] as usize];
    let p1 = mesh.nodes()[nodes[1] as usize];
    let p_last = mesh.nodes()[nodes[n_corners - 1] as usize];

    let normal = (p1 - p0).cross(p_last - p0).normalize_or_zero();
    if normal == DVec3::ZERO {
        return normal;
    }

    let outward = face_centroid(mesh, face) - mesh.element_centroid(face.element);
    if normal.dot(outward) < 0.0 {
        -normal
    } else {
        normal
    }
}

/// 位于给定轴向平面上的节点索引（升序）
pub fn nodes_on_plane(
    mesh: &Mesh,
    axis: Axis,
    value: f64,
    tol: &Tolerance,
    scale: f64,
) -> Vec<u32> {
    mesh.nodes()
        .iter()
        .enumerate()
        .filter(|(_, p)| tol.coord_eq(axis.component(**p), value, scale))
        .map(|(i, _)| i as u32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::boundary_faces;
    use crate::mesh::fixtures::{stacked_hexes, unit_hex};

    #[test]
    fn test_bbox() {
        let mesh = stacked_hexes("RUBBER_OBJ");
        let bbox = mesh_bbox(&mesh);
        assert!((bbox.min - DVec3::ZERO).length() < 1e-12);
        assert!((bbox.max - DVec3::new(1.0, 1.0, 2.0)).length() < 1e-12);
        assert!((bbox.max_edge() - 2.0).abs() < 1e-12);

        let pb = part_bbox(&mesh, "RUBBER_OBJ").unwrap();
        assert_eq!(pb, bbox);
    }

    #[test]
    fn test_relative_roundtrip() {
        let bbox = Aabb3 {
            min: DVec3::new(-1.0, 0.0, 2.0),
            max: DVec3::new(1.0, 4.0, 6.0),
        };
        let p = DVec3::new(0.0, 1.0, 3.0);
        let rel = bbox.relative(p);
        assert!((bbox.absolute(rel) - p).length() < 1e-12);
        assert!((rel - DVec3::new(0.5, 0.25, 0.25)).length() < 1e-12);
    }

    #[test]
    fn test_normals_point_outward() {
        let mesh = unit_hex("RUBBER_OBJ");
        let centroid = mesh.element_centroid(0);
        for face in boundary_faces(&mesh, "RUBBER_OBJ").unwrap() {
            let n = face_normal(&mesh, &face);
            assert!((n.length() - 1.0).abs() < 1e-12);
            let outward = face_centroid(&mesh, &face) - centroid;
            assert!(n.dot(outward) > 0.0, "normal must point away from element");
        }
    }

    #[test]
    fn test_bottom_face_normal_is_down() {
        let mesh = unit_hex("RUBBER_OBJ");
        let bottom = Face::new(0, 0);
        let n = face_normal(&mesh, &bottom);
        assert!((n - DVec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn test_nodes_on_plane() {
        let mesh = stacked_hexes("RUBBER_OBJ");
        let tol = Tolerance::default();
        let scale = mesh_bbox(&mesh).max_edge();

        let bottom = nodes_on_plane(&mesh, Axis::Z, 0.0, &tol, scale);
        assert_eq!(bottom, vec![0, 1, 2, 3]);

        let mid = nodes_on_plane(&mesh, Axis::Z, 1.0, &tol, scale);
        assert_eq!(mid, vec![4, 5, 6, 7]);
    }
}
