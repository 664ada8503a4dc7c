// crates/vx_doc/src/model.rs

//! FEA 输入文档的类型化视图
//!
//! 在元素树之上提供求解器方言的定位器：网格块、部件、命名
//! 节点/单元集合、面定义、接触对、材料绑定、控制块与输出块。
//! 视图只负责定位与解码，改写由 [`crate::rewrite`] 完成。

use glam::DVec3;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::{DocError, DocResult};
use crate::xml::{parse_document, XmlElement};

/// 接触对：主/从两个面名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfacePair {
    /// 接触对名
    pub name: String,
    /// 主面名
    pub primary: String,
    /// 从面名
    pub secondary: String,
}

/// FEA 输入文档
#[derive(Debug, Clone)]
pub struct FebDocument {
    root: XmlElement,
}

impl FebDocument {
    /// 从字符串解析
    pub fn parse(content: &str) -> DocResult<Self> {
        let root = parse_document(content)?;
        let doc = Self { root };
        // 没有网格块的模板无法进行任何置换
        doc.mesh()?;
        Ok(doc)
    }

    /// 从文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> DocResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DocError::Foundation(
                vx_foundation::VxError::file_not_found(path),
            ));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// 文档根元素
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// 文档根元素（可变）
    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.root
    }

    /// 网格块
    pub fn mesh(&self) -> DocResult<&XmlElement> {
        self.root
            .find("Mesh")
            .ok_or(DocError::MissingSection { section: "Mesh" })
    }

    /// 网格块（可变）
    pub fn mesh_mut(&mut self) -> DocResult<&mut XmlElement> {
        self.root
            .find_mut("Mesh")
            .ok_or(DocError::MissingSection { section: "Mesh" })
    }

    /// 模板中的部件名（按 Elements 块出现顺序）
    pub fn parts(&self) -> DocResult<Vec<String>> {
        Ok(self
            .mesh()?
            .find_all("Elements")
            .filter_map(|e| e.name().map(str::to_string))
            .collect())
    }

    /// 指定部件的节点块
    pub fn nodes_block(&self, part: &str) -> DocResult<&XmlElement> {
        self.mesh()?
            .find_by_name("Nodes", part)
            .ok_or_else(|| DocError::template_missing_part(part))
    }

    /// 指定部件的单元块
    pub fn elements_block(&self, part: &str) -> DocResult<&XmlElement> {
        self.mesh()?
            .find_by_name("Elements", part)
            .ok_or_else(|| DocError::template_missing_part(part))
    }

    /// 全部节点坐标：id → 坐标（跨所有 Nodes 块）
    pub fn node_coords(&self) -> DocResult<BTreeMap<u32, DVec3>> {
        let mut map = BTreeMap::new();
        for nodes in self.mesh()?.find_all("Nodes") {
            for node in nodes.find_all("node") {
                let Some(id) = node.attr("id").and_then(|s| s.parse::<u32>().ok()) else {
                    continue;
                };
                let coords: Vec<f64> = node.parse_text_list()?;
                if coords.len() != 3 {
                    return Err(DocError::parse(format!(
                        "node {} has {} coordinates",
                        id,
                        coords.len()
                    )));
                }
                map.insert(id, DVec3::new(coords[0], coords[1], coords[2]));
            }
        }
        Ok(map)
    }

    /// 指定部件的节点 id 集合
    pub fn part_node_ids(&self, part: &str) -> DocResult<BTreeSet<u32>> {
        let block = self.nodes_block(part)?;
        Ok(block
            .find_all("node")
            .filter_map(|n| n.attr("id").and_then(|s| s.parse().ok()))
            .collect())
    }

    /// 所有命名节点集合
    pub fn nodesets(&self) -> DocResult<Vec<&XmlElement>> {
        Ok(self.mesh()?.find_all("NodeSet").collect())
    }

    /// 所有命名面
    pub fn surfaces(&self) -> DocResult<Vec<&XmlElement>> {
        Ok(self.mesh()?.find_all("Surface").collect())
    }

    /// 所有命名单元集合
    pub fn elementsets(&self) -> DocResult<Vec<&XmlElement>> {
        Ok(self.mesh()?.find_all("ElementSet").collect())
    }

    /// 按名查找面
    pub fn surface(&self, name: &str) -> DocResult<Option<&XmlElement>> {
        Ok(self.mesh()?.find_by_name("Surface", name))
    }

    /// 接触对（SurfacePair 定义）
    pub fn contact_pairs(&self) -> DocResult<Vec<SurfacePair>> {
        let mut pairs = Vec::new();
        for sp in self.mesh()?.find_all("SurfacePair") {
            let primary = sp.find("primary").map(|e| e.text.trim().to_string());
            let secondary = sp.find("secondary").map(|e| e.text.trim().to_string());
            if let (Some(primary), Some(secondary)) = (primary, secondary) {
                pairs.push(SurfacePair {
                    name: sp.name().unwrap_or_default().to_string(),
                    primary,
                    secondary,
                });
            }
        }
        Ok(pairs)
    }

    /// 节点集合的 id 列表
    pub fn nodeset_ids(set: &XmlElement) -> Vec<u32> {
        set.find_all("node")
            .filter_map(|n| n.attr("id").and_then(|s| s.parse().ok()))
            .collect()
    }

    /// 单元集合的 id 列表
    pub fn elementset_ids(set: &XmlElement) -> Vec<u32> {
        set.find_all("elem")
            .filter_map(|n| n.attr("id").and_then(|s| s.parse().ok()))
            .collect()
    }

    /// 面定义的逐面节点 id 元组（按文档顺序）
    pub fn surface_face_nodes(surface: &XmlElement) -> DocResult<Vec<Vec<u32>>> {
        surface
            .children
            .iter()
            .map(XmlElement::parse_text_list)
            .collect()
    }

    /// 部件的材料绑定（MeshDomains 中的域声明）
    pub fn domain_material(&self, part: &str) -> Option<&str> {
        let domains = self.root.find("MeshDomains")?;
        domains
            .children
            .iter()
            .find(|d| d.name() == Some(part))
            .and_then(|d| d.attr("mat"))
    }

    /// 控制块发现：总模拟时长
    ///
    /// 递归收集每个 `Control` 块（含嵌套在 step 子块内的），
    /// 将各自的 `steps × dt` 求和。没有任何控制块时返回 1.0，
    /// 保证进度分数有定义。
    pub fn control_total_time(&self) -> f64 {
        let mut controls = Vec::new();
        self.root.find_all_deep("Control", &mut controls);

        let mut total = 0.0;
        for control in controls {
            let steps = control
                .find("time_steps")
                .and_then(|e| e.text.trim().parse::<f64>().ok())
                .unwrap_or(0.0);
            let dt = control
                .find("step_size")
                .and_then(|e| e.text.trim().parse::<f64>().ok())
                .unwrap_or(0.0);
            total += steps * dt;
        }

        if total > 0.0 {
            total
        } else {
            1.0
        }
    }

    /// 输出块中的 plotfile 元素
    pub fn output_plotfile(&self) -> Option<&XmlElement> {
        self.root.find("Output")?.find("plotfile")
    }

    /// 全文档最大节点 id（没有节点时为 0）
    pub fn max_node_id(&self) -> DocResult<u32> {
        let mut max = 0;
        for nodes in self.mesh()?.find_all("Nodes") {
            for node in nodes.find_all("node") {
                if let Some(id) = node.attr("id").and_then(|s| s.parse::<u32>().ok()) {
                    max = max.max(id);
                }
            }
        }
        Ok(max)
    }

    /// 全文档最大单元/面片 id
    pub fn max_element_id(&self) -> DocResult<u32> {
        let mut max = 0;
        let mesh = self.mesh()?;
        for block in mesh.find_all("Elements") {
            for elem in &block.children {
                if let Some(id) = elem.attr("id").and_then(|s| s.parse::<u32>().ok()) {
                    max = max.max(id);
                }
            }
        }
        for surface in mesh.find_all("Surface") {
            for facet in &surface.children {
                if let Some(id) = facet.attr("id").and_then(|s| s.parse::<u32>().ok()) {
                    max = max.max(id);
                }
            }
        }
        Ok(max)
    }

    /// 序列化为字符串
    pub fn to_xml_string(&self) -> String {
        self.root.to_document_string()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::MINI_TEMPLATE;
    use super::*;

    #[test]
    fn test_locators() {
        let doc = FebDocument::parse(MINI_TEMPLATE).unwrap();

        assert_eq!(doc.parts().unwrap(), vec!["RUBBER_OBJ".to_string()]);
        assert_eq!(doc.part_node_ids("RUBBER_OBJ").unwrap().len(), 8);
        assert_eq!(doc.nodesets().unwrap().len(), 1);
        assert_eq!(doc.surfaces().unwrap().len(), 3);
        assert_eq!(doc.domain_material("RUBBER_OBJ"), Some("RUBBER"));
        assert!(doc.output_plotfile().is_some());
    }

    #[test]
    fn test_node_coords() {
        let doc = FebDocument::parse(MINI_TEMPLATE).unwrap();
        let coords = doc.node_coords().unwrap();
        assert_eq!(coords.len(), 12);
        assert!((coords[&7] - DVec3::new(1.0, 1.0, 1.0)).length() < 1e-12);
        assert!((coords[&101].z - 2.65).abs() < 1e-12);
    }

    #[test]
    fn test_contact_pairs() {
        let doc = FebDocument::parse(MINI_TEMPLATE).unwrap();
        let pairs = doc.contact_pairs().unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].primary, "RUBBER_BOTTOM_CONTACT_Primary");
        assert_eq!(pairs[0].secondary, "RUBBER_BOTTOM_CONTACT_Secondary");
    }

    #[test]
    fn test_control_total_time_nested() {
        let doc = FebDocument::parse(MINI_TEMPLATE).unwrap();
        // 嵌套在 Step/step 内的控制块也要计入
        assert!((doc.control_total_time() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_control_total_time_sums_blocks() {
        let content = r#"<root><Mesh/><Control><time_steps>10</time_steps><step_size>0.1</step_size></Control><Step><step><Control><time_steps>5</time_steps><step_size>0.2</step_size></Control></step></Step></root>"#;
        let doc = FebDocument::parse(content).unwrap();
        assert!((doc.control_total_time() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_control_fallback() {
        let doc = FebDocument::parse("<root><Mesh/></root>").unwrap();
        assert!((doc.control_total_time() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_ids() {
        let doc = FebDocument::parse(MINI_TEMPLATE).unwrap();
        assert_eq!(doc.max_node_id().unwrap(), 104);
        assert_eq!(doc.max_element_id().unwrap(), 4);
    }

    #[test]
    fn test_missing_mesh_section() {
        assert!(FebDocument::parse("<febio_spec/>").is_err());
    }
}
