// crates/vx_mesh/src/align.rs

//! 最小角对齐
//!
//! 模板的边界条件（地面、刚性压头路径）以绝对坐标锚定在参考部件
//! 包围盒的最小角，因此新网格以最小角平移对齐到模板坐标系，而非
//! 质心对齐。平移量 `Δ = bbox_min(旧) − bbox_min(新)` 施加到新网格
//! 的全部节点。

use glam::DVec3;
use tracing::info;

use crate::error::MeshResult;
use crate::geometry::part_bbox;
use crate::mesh::Mesh;

/// 对齐器
#[derive(Debug, Clone)]
pub struct Aligner {
    /// 参考部件（模板中的主变形体）
    pub reference_part: String,
}

impl Aligner {
    /// 创建对齐器
    pub fn new(reference_part: impl Into<String>) -> Self {
        Self {
            reference_part: reference_part.into(),
        }
    }

    /// 计算平移量但不施加
    pub fn compute(&self, old_part_min: DVec3, mesh: &Mesh) -> MeshResult<DVec3> {
        let new_bbox = part_bbox(mesh, &self.reference_part)?;
        Ok(old_part_min - new_bbox.min)
    }

    /// 计算平移量并施加到整个网格
    ///
    /// 返回施加的平移量。对同一 (旧, 新) 组合重复调用是幂等的：
    /// 第二次的平移量为零。
    pub fn align(&self, old_part_min: DVec3, mesh: &mut Mesh) -> MeshResult<DVec3> {
        let delta = self.compute(old_part_min, mesh)?;
        info!(
            "Aligning mesh (min-corner): dx={:.4}, dy={:.4}, dz={:.4}",
            delta.x, delta.y, delta.z
        );
        mesh.translate(delta);
        Ok(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::mesh_bbox;
    use crate::mesh::fixtures::unit_hex;

    #[test]
    fn test_translated_mesh_aligns_back() {
        let mut mesh = unit_hex("RUBBER_OBJ");
        mesh.translate(DVec3::new(10.0, 20.0, 30.0));

        let aligner = Aligner::new("RUBBER_OBJ");
        let delta = aligner.align(DVec3::ZERO, &mut mesh).unwrap();

        assert!((delta - DVec3::new(-10.0, -20.0, -30.0)).length() < 1e-12);
        assert!(mesh_bbox(&mesh).min.length() < 1e-12);
    }

    #[test]
    fn test_alignment_idempotent() {
        let mut mesh = unit_hex("RUBBER_OBJ");
        mesh.translate(DVec3::new(3.0, -2.0, 7.5));

        let aligner = Aligner::new("RUBBER_OBJ");
        let old_min = DVec3::new(1.0, 1.0, 1.0);

        aligner.align(old_min, &mut mesh).unwrap();
        let after_first: Vec<_> = mesh.nodes().to_vec();

        let delta2 = aligner.align(old_min, &mut mesh).unwrap();
        assert!(delta2.length() < 1e-12);
        assert_eq!(mesh.nodes(), after_first.as_slice());
    }

    #[test]
    fn test_missing_reference_part() {
        let mut mesh = unit_hex("RUBBER_OBJ");
        let aligner = Aligner::new("KEYCAP");
        assert!(aligner.align(DVec3::ZERO, &mut mesh).is_err());
    }
}
