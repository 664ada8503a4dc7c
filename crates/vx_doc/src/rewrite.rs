// crates/vx_doc/src/rewrite.rs

//! 文档重写器
//!
//! 一次遍历内原子地替换：节点块、各部件的单元块、内容有变化的
//! 全部命名集合。不触碰材料、载荷曲线、接触算法与控制参数。
//! 输入文档只读；输出写到 `.tmp` 兄弟文件，成功后改名落盘。
//!
//! id 规则：替换产生的节点/单元从全文档最大 id + 1 起连续编号，
//! 面片 id 紧接最后一个单元 id。重写集合内节点/单元 id 升序去重，
//! 面片保持规则产出的顺序。

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

use vx_mesh::Mesh;

use crate::error::{DocError, DocResult};
use crate::model::FebDocument;
use crate::xml::XmlElement;

/// 重建出的面：所属单元（网格局部索引）、局部面号、节点局部索引元组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceOut {
    /// 所属单元索引
    pub element: usize,
    /// 局部面号
    pub local_face: usize,
    /// 面节点（网格局部索引，规范环绕顺序）
    pub nodes: Vec<u32>,
}

/// 重建出的全部命名集合（网格局部索引表示）
#[derive(Debug, Clone, Default)]
pub struct SelectionUpdate {
    /// 节点集合：名 → 局部节点索引
    pub nodesets: BTreeMap<String, Vec<u32>>,
    /// 面：名 → 面列表（已按规则顺序排列）
    pub surfaces: BTreeMap<String, Vec<FaceOut>>,
    /// 单元集合：名 → 局部单元索引
    pub elementsets: BTreeMap<String, Vec<usize>>,
}

/// 局部索引到文档 id 的映射
#[derive(Debug, Clone)]
pub struct IdMaps {
    /// 节点局部索引 → 文档节点 id
    pub node: Vec<u32>,
    /// 单元局部索引 → 文档单元 id
    pub element: Vec<u32>,
}

/// 文档重写器
#[derive(Debug, Default)]
pub struct Rewriter;

impl Rewriter {
    /// 创建重写器
    pub fn new() -> Self {
        Self
    }

    /// 用新网格与重建集合改写文档
    ///
    /// 返回局部索引到文档 id 的映射。网格包含模板没有的部件时
    /// 返回 [`DocError::TemplateMissingPart`]。
    pub fn apply(
        &self,
        doc: &mut FebDocument,
        mesh: &Mesh,
        update: &SelectionUpdate,
    ) -> DocResult<IdMaps> {
        // 部件核对先于任何修改
        for part in mesh.parts() {
            doc.nodes_block(&part.name)?;
            doc.elements_block(&part.name)?;
        }

        // 捕获被替换部件的旧节点 id，用于收尾的陈旧引用审计
        let mut removed_ids: BTreeSet<u32> = BTreeSet::new();
        for part in mesh.parts() {
            removed_ids.extend(doc.part_node_ids(&part.name)?);
        }

        // 清空被替换部件的节点/单元块
        let replaced: Vec<String> = mesh.parts().iter().map(|p| p.name.clone()).collect();
        {
            let mesh_root = doc.mesh_mut()?;
            for part in &replaced {
                if let Some(block) = mesh_root.find_by_name_mut("Nodes", part) {
                    block.clear_content();
                }
                if let Some(block) = mesh_root.find_by_name_mut("Elements", part) {
                    block.clear_content();
                }
            }
        }

        // 清空后的最大 id 只来自保留部件（刚体等）
        let start_node_id = doc.max_node_id()? + 1;
        let start_elem_id = doc.max_element_id()? + 1;
        debug!(
            "Renumbering: nodes start at {}, elements at {}",
            start_node_id, start_elem_id
        );

        let maps = IdMaps {
            node: (0..mesh.n_nodes() as u32).map(|i| start_node_id + i).collect(),
            element: (0..mesh.n_elements() as u32)
                .map(|i| start_elem_id + i)
                .collect(),
        };

        self.write_parts(doc, mesh, &maps)?;
        let next_facet_id = start_elem_id + mesh.n_elements() as u32;
        self.write_selections(doc, update, &maps, next_facet_id)?;
        self.audit_stale_references(doc, &removed_ids)?;

        info!(
            "Rewrote mesh: {} nodes, {} elements, {} nodesets, {} surfaces, {} elementsets",
            mesh.n_nodes(),
            mesh.n_elements(),
            update.nodesets.len(),
            update.surfaces.len(),
            update.elementsets.len()
        );
        Ok(maps)
    }

    fn write_parts(&self, doc: &mut FebDocument, mesh: &Mesh, maps: &IdMaps) -> DocResult<()> {
        for part in mesh.parts().to_vec() {
            // 部件引用的节点，按文档 id 升序写入该部件的节点块
            let mut part_nodes: BTreeSet<u32> = BTreeSet::new();
            let mut etype = None;
            for element in &mesh.elements()[part.range.clone()] {
                match etype {
                    None => etype = Some(element.etype),
                    Some(t) if t != element.etype => {
                        return Err(DocError::parse(format!(
                            "part '{}' mixes element types {:?} and {:?}",
                            part.name, t, element.etype
                        )));
                    }
                    _ => {}
                }
                part_nodes.extend(element.nodes.iter().copied());
            }
            let Some(etype) = etype else {
                return Err(DocError::template_missing_part(format!(
                    "{} (empty part)",
                    part.name
                )));
            };

            let mesh_root = doc.mesh_mut()?;
            let nodes_block = mesh_root
                .find_by_name_mut("Nodes", &part.name)
                .ok_or_else(|| DocError::template_missing_part(&part.name))?;
            for local in &part_nodes {
                let p = mesh.nodes()[*local as usize];
                nodes_block.push_child(
                    XmlElement::new("node")
                        .with_attr("id", maps.node[*local as usize].to_string())
                        .with_text(format!("{:.6e},{:.6e},{:.6e}", p.x, p.y, p.z)),
                );
            }

            let elems_block = mesh_root
                .find_by_name_mut("Elements", &part.name)
                .ok_or_else(|| DocError::template_missing_part(&part.name))?;
            elems_block.set_attr("type", etype.doc_tag());
            for (offset, element) in mesh.elements()[part.range.clone()].iter().enumerate() {
                let index = part.range.start + offset;
                let ids: Vec<String> = element
                    .nodes
                    .iter()
                    .map(|&n| maps.node[n as usize].to_string())
                    .collect();
                elems_block.push_child(
                    XmlElement::new("elem")
                        .with_attr("id", maps.element[index].to_string())
                        .with_text(ids.join(",")),
                );
            }
        }
        Ok(())
    }

    fn write_selections(
        &self,
        doc: &mut FebDocument,
        update: &SelectionUpdate,
        maps: &IdMaps,
        mut next_facet_id: u32,
    ) -> DocResult<()> {
        let mesh_root = doc.mesh_mut()?;

        for (name, locals) in &update.nodesets {
            let ids: BTreeSet<u32> = locals.iter().map(|&i| maps.node[i as usize]).collect();
            let set = find_or_append(mesh_root, "NodeSet", name);
            set.clear_content();
            for id in ids {
                set.push_child(XmlElement::new("node").with_attr("id", id.to_string()));
            }
        }

        for (name, faces) in &update.surfaces {
            let surface = find_or_append(mesh_root, "Surface", name);
            surface.clear_content();
            for face in faces {
                let tag = match face.nodes.len() {
                    3 => "tri3",
                    4 => "quad4",
                    6 => "tri6",
                    8 => "quad8",
                    n => {
                        return Err(DocError::parse(format!(
                            "surface '{}' face with {} nodes has no facet tag",
                            name, n
                        )));
                    }
                };
                let ids: Vec<String> = face
                    .nodes
                    .iter()
                    .map(|&n| maps.node[n as usize].to_string())
                    .collect();
                surface.push_child(
                    XmlElement::new(tag)
                        .with_attr("id", next_facet_id.to_string())
                        .with_text(ids.join(",")),
                );
                next_facet_id += 1;
            }
        }

        for (name, locals) in &update.elementsets {
            let ids: BTreeSet<u32> = locals.iter().map(|&i| maps.element[i]).collect();
            let set = find_or_append(mesh_root, "ElementSet", name);
            set.clear_content();
            for id in ids {
                set.push_child(XmlElement::new("elem").with_attr("id", id.to_string()));
            }
        }

        Ok(())
    }

    /// 陈旧引用审计
    ///
    /// 替换后任何命名集合仍引用已删除节点 id 即为缺陷：该集合
    /// 没有被重建，求解器会接受文档但约束悄然失效。
    fn audit_stale_references(
        &self,
        doc: &FebDocument,
        removed_ids: &BTreeSet<u32>,
    ) -> DocResult<()> {
        for set in doc.nodesets()? {
            let ids = FebDocument::nodeset_ids(set);
            if ids.iter().any(|id| removed_ids.contains(id)) {
                return Err(DocError::selection_lost(set.name().unwrap_or("<unnamed>")));
            }
        }
        for surface in doc.surfaces()? {
            for facet in FebDocument::surface_face_nodes(surface)? {
                if facet.iter().any(|id| removed_ids.contains(id)) {
                    return Err(DocError::selection_lost(
                        surface.name().unwrap_or("<unnamed>"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// 原子落盘：写 `.tmp` 兄弟文件，成功后改名
    pub fn save_atomic(&self, doc: &FebDocument, path: &Path) -> DocResult<()> {
        let tmp = path.with_extension("feb.tmp");
        std::fs::write(&tmp, doc.to_xml_string())?;
        std::fs::rename(&tmp, path)?;
        info!("Wrote prepared document: {}", path.display());
        Ok(())
    }
}

fn find_or_append<'a>(mesh_root: &'a mut XmlElement, tag: &str, name: &str) -> &'a mut XmlElement {
    // 双重查找绕开借用检查对提前返回的限制
    if mesh_root.find_by_name(tag, name).is_some() {
        return mesh_root.find_by_name_mut(tag, name).unwrap();
    }
    mesh_root.push_child(XmlElement::new(tag).with_attr("name", name));
    mesh_root.children.last_mut().unwrap()
}
