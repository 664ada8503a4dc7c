// crates/vx_mesh/src/faces.rs

//! 单元面的规范编号表
//!
//! 每种单元类型的面按固定顺序编号（局部面号），面内节点按外法向
//! 约定的环绕顺序排列。高阶单元的面先列角节点再列棱中节点，
//! 法向与质心计算只使用角节点之外还要用到全部节点时由调用方决定。
//!
//! 面不拥有数据：以 `(单元索引, 局部面号)` 引用，节点元组按需从
//! 网格重新计算，避免面与单元之间的所有权环。

use crate::mesh::{ElemType, Mesh};

/// hex8 的 6 个面（外法向环绕）
const HEX8_FACES: &[&[usize]] = &[
    &[0, 3, 2, 1], // 底
    &[4, 5, 6, 7], // 顶
    &[0, 1, 5, 4],
    &[1, 2, 6, 5],
    &[2, 3, 7, 6],
    &[3, 0, 4, 7],
];

/// hex20 的 6 个面：4 角节点 + 4 棱中节点
const HEX20_FACES: &[&[usize]] = &[
    &[0, 3, 2, 1, 11, 10, 9, 8],
    &[4, 5, 6, 7, 12, 13, 14, 15],
    &[0, 1, 5, 4, 8, 17, 12, 16],
    &[1, 2, 6, 5, 9, 18, 13, 17],
    &[2, 3, 7, 6, 10, 19, 14, 18],
    &[3, 0, 4, 7, 11, 16, 15, 19],
];

const TET4_FACES: &[&[usize]] = &[&[0, 1, 3], &[1, 2, 3], &[0, 3, 2], &[0, 2, 1]];

/// tet10 的 4 个面：3 角节点 + 3 棱中节点
const TET10_FACES: &[&[usize]] = &[
    &[0, 1, 3, 4, 8, 7],
    &[1, 2, 3, 5, 9, 8],
    &[0, 3, 2, 7, 9, 6],
    &[0, 2, 1, 6, 5, 4],
];

const WEDGE_FACES: &[&[usize]] = &[
    &[0, 2, 1],
    &[3, 4, 5],
    &[0, 1, 4, 3],
    &[1, 2, 5, 4],
    &[2, 0, 3, 5],
];

const PYRAMID_FACES: &[&[usize]] = &[
    &[0, 3, 2, 1],
    &[0, 1, 4],
    &[1, 2, 4],
    &[2, 3, 4],
    &[3, 0, 4],
];

/// 单元类型的面编号表
pub fn face_table(etype: ElemType) -> &'static [&'static [usize]] {
    match etype {
        ElemType::Hex8 => HEX8_FACES,
        ElemType::Hex20 => HEX20_FACES,
        ElemType::Tet4 => TET4_FACES,
        ElemType::Tet10 => TET10_FACES,
        ElemType::Wedge => WEDGE_FACES,
        ElemType::Pyramid => PYRAMID_FACES,
    }
}

/// 派生面：以所属单元索引与局部面号引用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Face {
    /// 所属单元在网格单元序列中的索引
    pub element: usize,
    /// 局部面号（面编号表中的下标）
    pub local_face: usize,
}

impl Face {
    /// 创建面引用
    pub fn new(element: usize, local_face: usize) -> Self {
        Self {
            element,
            local_face,
        }
    }

    /// 面的节点索引（按规范环绕顺序）
    pub fn nodes(&self, mesh: &Mesh) -> Vec<u32> {
        let elem = &mesh.elements()[self.element];
        face_table(elem.etype)[self.local_face]
            .iter()
            .map(|&i| elem.nodes[i])
            .collect()
    }

    /// 面的规范键：节点索引排序后的序列，用于跨单元配对
    pub fn key(&self, mesh: &Mesh) -> Vec<u32> {
        let mut nodes = self.nodes(mesh);
        nodes.sort_unstable();
        nodes
    }

    /// 角节点数（3 或 4；高阶面的棱中节点不计入）
    pub fn n_corners(&self, mesh: &Mesh) -> usize {
        let n = self.nodes(mesh).len();
        if n == 3 || n == 6 {
            3
        } else {
            4
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures::unit_hex;

    #[test]
    fn test_face_tables_arity() {
        for etype in [
            ElemType::Hex8,
            ElemType::Hex20,
            ElemType::Tet4,
            ElemType::Tet10,
            ElemType::Wedge,
            ElemType::Pyramid,
        ] {
            let n = etype.n_nodes();
            for face in face_table(etype) {
                assert!(face.iter().all(|&i| i < n), "{:?} face index out of range", etype);
            }
        }
        assert_eq!(face_table(ElemType::Hex8).len(), 6);
        assert_eq!(face_table(ElemType::Tet4).len(), 4);
        assert_eq!(face_table(ElemType::Wedge).len(), 5);
        assert_eq!(face_table(ElemType::Pyramid).len(), 5);
    }

    #[test]
    fn test_face_nodes_and_key() {
        let mesh = unit_hex("P");
        let bottom = Face::new(0, 0);
        assert_eq!(bottom.nodes(&mesh), vec![0, 3, 2, 1]);
        assert_eq!(bottom.key(&mesh), vec![0, 1, 2, 3]);
        assert_eq!(bottom.n_corners(&mesh), 4);
    }

    #[test]
    fn test_hex20_face_covers_edges() {
        // 每个 hex20 面应含 4 角 + 4 棱中
        for face in face_table(ElemType::Hex20) {
            assert_eq!(face.len(), 8);
            assert!(face[..4].iter().all(|&i| i < 8));
            assert!(face[4..].iter().all(|&i| (8..20).contains(&i)));
        }
    }
}
