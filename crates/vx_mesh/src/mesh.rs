// crates/vx_mesh/src/mesh.rs

//! 体网格数据模型
//!
//! 网格为 (N, E, P)：有序节点序列、有序单元序列、部件到单元区间的
//! 映射。构造时校验两条不变量：
//!
//! 1. 每个单元引用的节点索引都在 `[0, |N|)` 内
//! 2. 部件区间互不相交且完整覆盖 E
//!
//! 构造完成后网格不可变，唯一的例外是对齐器施加的整体平移
//! （见 [`crate::align`]）。

use glam::DVec3;
use std::ops::Range;

use crate::error::{MeshError, MeshResult};

/// 单元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElemType {
    /// 8 节点六面体
    Hex8,
    /// 20 节点六面体
    Hex20,
    /// 4 节点四面体
    Tet4,
    /// 10 节点四面体
    Tet10,
    /// 6 节点三棱柱
    Wedge,
    /// 5 节点金字塔
    Pyramid,
}

impl ElemType {
    /// 该类型的节点数
    pub fn n_nodes(self) -> usize {
        match self {
            Self::Hex8 => 8,
            Self::Hex20 => 20,
            Self::Tet4 => 4,
            Self::Tet10 => 10,
            Self::Wedge => 6,
            Self::Pyramid => 5,
        }
    }

    /// 从传统非结构网格的单元类型码解析
    ///
    /// 27 节点六面体按 20 节点六面体读取（截断高阶面心/体心节点）。
    pub fn from_legacy_code(code: u8) -> Option<(Self, usize)> {
        match code {
            10 => Some((Self::Tet4, 4)),
            12 => Some((Self::Hex8, 8)),
            13 => Some((Self::Wedge, 6)),
            14 => Some((Self::Pyramid, 5)),
            24 => Some((Self::Tet10, 10)),
            25 => Some((Self::Hex20, 20)),
            29 => Some((Self::Hex20, 20)),
            _ => None,
        }
    }

    /// 求解器文档中的单元标签
    pub fn doc_tag(self) -> &'static str {
        match self {
            Self::Hex8 => "hex8",
            Self::Hex20 => "hex20",
            Self::Tet4 => "tet4",
            Self::Tet10 => "tet10",
            Self::Wedge => "penta6",
            Self::Pyramid => "pyra5",
        }
    }
}

/// 体单元
///
/// 节点索引按该类型的规范顺序排列。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// 单元类型
    pub etype: ElemType,
    /// 节点索引（长度等于 `etype.n_nodes()`）
    pub nodes: Vec<u32>,
}

impl Element {
    /// 创建单元，校验节点数与类型匹配
    pub fn new(etype: ElemType, nodes: Vec<u32>) -> MeshResult<Self> {
        if nodes.len() != etype.n_nodes() {
            return Err(MeshError::malformed(format!(
                "element type {:?} expects {} nodes, got {}",
                etype,
                etype.n_nodes(),
                nodes.len()
            )));
        }
        Ok(Self { etype, nodes })
    }
}

/// 部件：共享材料指派的连续单元区域
#[derive(Debug, Clone)]
pub struct Part {
    /// 部件名（与模板文档中的 Elements 块同名）
    pub name: String,
    /// 在单元序列中的索引区间
    pub range: Range<usize>,
}

/// 体网格
#[derive(Debug, Clone)]
pub struct Mesh {
    nodes: Vec<DVec3>,
    elements: Vec<Element>,
    parts: Vec<Part>,
}

impl Mesh {
    /// 创建网格并校验不变量
    pub fn new(nodes: Vec<DVec3>, elements: Vec<Element>, parts: Vec<Part>) -> MeshResult<Self> {
        let n_nodes = nodes.len() as u32;
        for (i, elem) in elements.iter().enumerate() {
            if let Some(&bad) = elem.nodes.iter().find(|&&n| n >= n_nodes) {
                return Err(MeshError::malformed(format!(
                    "element {} references node {} out of {} nodes",
                    i, bad, n_nodes
                )));
            }
        }

        // 部件区间必须首尾相接地覆盖整个单元序列
        let mut covered = 0usize;
        for part in &parts {
            if part.range.start != covered {
                return Err(MeshError::malformed(format!(
                    "part '{}' range starts at {}, expected {}",
                    part.name, part.range.start, covered
                )));
            }
            if part.range.end < part.range.start || part.range.end > elements.len() {
                return Err(MeshError::malformed(format!(
                    "part '{}' range {:?} exceeds {} elements",
                    part.name, part.range, elements.len()
                )));
            }
            covered = part.range.end;
        }
        if covered != elements.len() {
            return Err(MeshError::malformed(format!(
                "parts cover {} of {} elements",
                covered,
                elements.len()
            )));
        }

        Ok(Self {
            nodes,
            elements,
            parts,
        })
    }

    /// 创建单部件网格
    pub fn single_part(
        name: impl Into<String>,
        nodes: Vec<DVec3>,
        elements: Vec<Element>,
    ) -> MeshResult<Self> {
        let range = 0..elements.len();
        Self::new(
            nodes,
            elements,
            vec![Part {
                name: name.into(),
                range,
            }],
        )
    }

    /// 节点坐标
    #[inline]
    pub fn nodes(&self) -> &[DVec3] {
        &self.nodes
    }

    /// 所有单元
    #[inline]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// 所有部件
    #[inline]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// 节点数
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// 单元数
    #[inline]
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// 按名称查找部件
    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// 部件的单元索引区间
    pub fn part_range(&self, name: &str) -> MeshResult<Range<usize>> {
        self.part(name)
            .map(|p| p.range.clone())
            .ok_or_else(|| MeshError::missing_part(name))
    }

    /// 单元索引所属的部件
    pub fn part_of_element(&self, element: usize) -> Option<&Part> {
        self.parts.iter().find(|p| p.range.contains(&element))
    }

    /// 单元质心
    pub fn element_centroid(&self, element: usize) -> DVec3 {
        let elem = &self.elements[element];
        let mut sum = DVec3::ZERO;
        for &n in &elem.nodes {
            sum += self.nodes[n as usize];
        }
        sum / elem.nodes.len() as f64
    }

    /// 对每个节点施加整体平移（仅供对齐器使用）
    pub(crate) fn translate(&mut self, delta: DVec3) {
        for node in &mut self.nodes {
            *node += delta;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_element_arity_checked() {
        assert!(Element::new(ElemType::Hex8, vec![0, 1, 2]).is_err());
        assert!(Element::new(ElemType::Tet4, vec![0, 1, 2, 3]).is_ok());
    }

    #[test]
    fn test_node_index_bounds() {
        let nodes = vec![DVec3::ZERO; 4];
        let elems = vec![Element::new(ElemType::Tet4, vec![0, 1, 2, 9]).unwrap()];
        assert!(Mesh::single_part("P", nodes, elems).is_err());
    }

    #[test]
    fn test_part_ranges_must_cover() {
        let mesh = stacked_hexes("RUBBER_OBJ");
        let nodes = mesh.nodes().to_vec();
        let elems = mesh.elements().to_vec();

        // 区间留空洞
        let parts = vec![Part {
            name: "A".into(),
            range: 0..1,
        }];
        assert!(Mesh::new(nodes.clone(), elems.clone(), parts).is_err());

        // 正确覆盖
        let parts = vec![
            Part {
                name: "A".into(),
                range: 0..1,
            },
            Part {
                name: "B".into(),
                range: 1..2,
            },
        ];
        let mesh = Mesh::new(nodes, elems, parts).unwrap();
        assert_eq!(mesh.part_range("B").unwrap(), 1..2);
        assert_eq!(mesh.part_of_element(0).unwrap().name, "A");
        assert!(mesh.part_range("C").is_err());
    }

    #[test]
    fn test_element_centroid() {
        let mesh = unit_hex("RUBBER_OBJ");
        let c = mesh.element_centroid(0);
        assert!((c - DVec3::splat(0.5)).length() < 1e-12);
    }

    #[test]
    fn test_legacy_codes() {
        assert_eq!(ElemType::from_legacy_code(12), Some((ElemType::Hex8, 8)));
        assert_eq!(ElemType::from_legacy_code(29), Some((ElemType::Hex20, 20)));
        assert_eq!(ElemType::from_legacy_code(42), None);
    }
}
