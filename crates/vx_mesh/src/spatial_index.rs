// crates/vx_mesh/src/spatial_index.rs

//! 面心空间索引
//!
//! 基于 R-tree 的三维点索引，按查询集一次性批量构建，用于
//! 跨部件邻近判定中的最近面心距离查询。

use glam::DVec3;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::faces::Face;
use crate::geometry::face_centroid;
use crate::mesh::Mesh;

/// 索引条目：面心坐标与面引用
#[derive(Debug, Clone)]
struct CentroidEntry {
    point: [f64; 3],
    face: Face,
}

impl RTreeObject for CentroidEntry {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for CentroidEntry {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// 面心空间索引
pub struct FaceIndex {
    tree: RTree<CentroidEntry>,
}

impl FaceIndex {
    /// 从网格面集批量构建
    pub fn build(mesh: &Mesh, faces: &[Face]) -> Self {
        let entries: Vec<CentroidEntry> = faces
            .iter()
            .map(|&face| {
                let c = face_centroid(mesh, &face);
                CentroidEntry {
                    point: [c.x, c.y, c.z],
                    face,
                }
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// 从裸点集批量构建（用于模板侧保留部件的面心）
    pub fn from_points(points: &[DVec3]) -> Self {
        let entries: Vec<CentroidEntry> = points
            .iter()
            .enumerate()
            .map(|(i, p)| CentroidEntry {
                point: [p.x, p.y, p.z],
                face: Face::new(i, 0),
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// 最近面心距离；索引为空返回 None
    pub fn nearest_distance(&self, p: DVec3) -> Option<f64> {
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[p.x, p.y, p.z])
            .next()
            .map(|(_, d2)| d2.sqrt())
    }

    /// 索引中的条目数
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// 索引是否为空
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
