// crates/vx_mesh/src/boundary.rs

//! 边界面提取
//!
//! 在部件范围内统计每个面的规范键出现次数，恰好出现一次的面为
//! 边界面。返回顺序按（单元索引升序，局部面号升序）确定，保证
//! 同一网格多次提取结果一致。

use std::collections::HashMap;

use crate::error::MeshResult;
use crate::faces::{face_table, Face};
use crate::mesh::Mesh;

/// 提取部件的边界面
///
/// 面的多重集签名在部件内唯一（即只被一个单元拥有）时入选。
pub fn boundary_faces(mesh: &Mesh, part: &str) -> MeshResult<Vec<Face>> {
    let range = mesh.part_range(part)?;

    let mut counts: HashMap<Vec<u32>, (Face, usize)> = HashMap::new();
    for element in range {
        let etype = mesh.elements()[element].etype;
        for local_face in 0..face_table(etype).len() {
            let face = Face::new(element, local_face);
            let key = face.key(mesh);
            counts
                .entry(key)
                .and_modify(|(_, n)| *n += 1)
                .or_insert((face, 1));
        }
    }

    let mut result: Vec<Face> = counts
        .into_values()
        .filter(|&(_, n)| n == 1)
        .map(|(face, _)| face)
        .collect();

    result.sort_unstable_by_key(|f| (f.element, f.local_face));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures::{stacked_hexes, unit_hex};

    #[test]
    fn test_single_hex_all_faces_boundary() {
        let mesh = unit_hex("RUBBER_OBJ");
        let faces = boundary_faces(&mesh, "RUBBER_OBJ").unwrap();
        assert_eq!(faces.len(), 6);
    }

    #[test]
    fn test_shared_face_not_boundary() {
        let mesh = stacked_hexes("RUBBER_OBJ");
        let faces = boundary_faces(&mesh, "RUBBER_OBJ").unwrap();
        // 2 × 6 面，中间贴合面一对消去
        assert_eq!(faces.len(), 10);

        // 每个边界面的键在部件内只出现一次
        for face in &faces {
            let key = face.key(&mesh);
            let mut occurrences = 0;
            for element in 0..mesh.n_elements() {
                let etype = mesh.elements()[element].etype;
                for lf in 0..face_table(etype).len() {
                    if Face::new(element, lf).key(&mesh) == key {
                        occurrences += 1;
                    }
                }
            }
            assert_eq!(occurrences, 1);
        }
    }

    #[test]
    fn test_deterministic_order() {
        let mesh = stacked_hexes("RUBBER_OBJ");
        let a = boundary_faces(&mesh, "RUBBER_OBJ").unwrap();
        let b = boundary_faces(&mesh, "RUBBER_OBJ").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_part() {
        let mesh = unit_hex("RUBBER_OBJ");
        assert!(boundary_faces(&mesh, "KEYCAP").is_err());
    }
}
