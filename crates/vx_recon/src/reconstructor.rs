// crates/vx_recon/src/reconstructor.rs

//! 集合重建器
//!
//! 分析阶段读取模板：找出属于被置换部件的每个命名集合，按
//! 规则表解析出它的重建规则（精确名 → 接触策略 → 种类缺省）。
//! 重建阶段只依赖新网格几何产出新的 id 列表，并核查非空不变量
//! 与自接触策略。
//!
//! 规则解析顺序：
//!
//! 1. 精确名条目（模板物理约定的固定面）
//! 2. 接触对策略：同部件 → 双方 `relative_bounds`；跨部件 → 邻近
//! 3. 种类缺省：节点/面集合按旧集合的相对范围推断，单元集合取整个部件

use glam::DVec3;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use vx_doc::rewrite::{FaceOut, SelectionUpdate};
use vx_doc::{FebDocument, SurfacePair};
use vx_foundation::{CancelToken, Tolerance};
use vx_mesh::boundary::boundary_faces;
use vx_mesh::geometry::{face_centroid, face_normal, mesh_bbox, part_bbox, Aabb3};
use vx_mesh::{FaceIndex, Mesh};

use crate::error::{ReconError, ReconResult};
use crate::rule::{PartnerRef, RelBox, Rule, RuleContext, Selection, SelectionKind};

/// 精确名规则表
///
/// 圆顶脚部的圆角/倒角面（排除贴地面）与贴地面本身由几何特征
/// 直接识别，不依赖旧集合的范围推断。
fn exact_name_rule(name: &str) -> Option<Rule> {
    match name {
        "RUBBER_BOTTOM_CONTACT_Primary" => Some(Rule::ZDownExceptBottom),
        "RUBBER_BOTTOM_CONTACT_Secondary" => Some(Rule::ZMinPlane),
        _ => None,
    }
}

/// 一个命名集合的重建定义
#[derive(Debug, Clone)]
pub struct SetDefinition {
    /// 集合名
    pub name: String,
    /// 集合种类
    pub kind: SelectionKind,
    /// 选定的规则
    pub rule: Rule,
    /// 模板中的条目数（非空不变量的基准）
    pub old_count: usize,
    /// 是否由精确名表指定（豁免自接触策略核查）
    pub exact_name: bool,
}

/// 重建结果
#[derive(Debug, Clone)]
pub struct ReconstructionReport {
    /// 供重写器使用的全部新集合
    pub update: SelectionUpdate,
    /// 每个集合实际使用的规则种类标签
    pub rules_used: BTreeMap<String, &'static str>,
    /// 判定为同部件（自接触）的接触对名
    pub same_part_pairs: Vec<String>,
}

/// 集合重建器
pub struct SetReconstructor {
    part: String,
    tol: Tolerance,
    definitions: Vec<SetDefinition>,
    pairs: Vec<SurfacePair>,
    /// 跨部件对侧面的模板面心（对侧部件未重新划分网格时的几何来源）
    partner_centroids: BTreeMap<String, Vec<DVec3>>,
}

impl SetReconstructor {
    /// 分析模板，建立被置换部件的集合定义表
    pub fn analyze(doc: &FebDocument, part: &str, tol: Tolerance) -> ReconResult<Self> {
        let coords = doc.node_coords()?;
        let part_ids = doc.part_node_ids(part)?;
        let old_part_bbox = Aabb3::from_points(
            part_ids
                .iter()
                .filter_map(|id| coords.get(id))
                .collect::<Vec<_>>()
                .into_iter(),
        );

        // 各部件的节点 id 集合，用于判定面的归属部件
        let mut part_ids_by_name: BTreeMap<String, BTreeSet<u32>> = BTreeMap::new();
        for p in doc.parts()? {
            part_ids_by_name.insert(p.clone(), doc.part_node_ids(&p)?);
        }

        let pairs = doc.contact_pairs()?;
        let mut partner_of: BTreeMap<&str, &str> = BTreeMap::new();
        for pair in &pairs {
            partner_of.insert(&pair.primary, &pair.secondary);
            partner_of.insert(&pair.secondary, &pair.primary);
        }

        let mut definitions = Vec::new();
        let mut partner_centroids = BTreeMap::new();

        // 节点集合：全部落在部件内的才属于本部件
        for set in doc.nodesets()? {
            let Some(name) = set.name() else { continue };
            let ids = FebDocument::nodeset_ids(set);
            if ids.is_empty() || !ids.iter().all(|id| part_ids.contains(id)) {
                continue;
            }
            let rel = RelBox::infer(
                ids.iter().filter_map(|id| coords.get(id)).copied(),
                &old_part_bbox,
            );
            definitions.push(SetDefinition {
                name: name.to_string(),
                kind: SelectionKind::Nodes,
                rule: Rule::RelativeBounds(rel),
                old_count: ids.len(),
                exact_name: false,
            });
        }

        // 面：按规则表解析
        for surface in doc.surfaces()? {
            let Some(name) = surface.name() else { continue };
            let faces = FebDocument::surface_face_nodes(surface)?;
            let surface_ids: BTreeSet<u32> = faces.iter().flatten().copied().collect();
            if surface_ids.is_empty() || !surface_ids.iter().all(|id| part_ids.contains(id)) {
                continue;
            }

            let (rule, exact) = if let Some(rule) = exact_name_rule(name) {
                (rule, true)
            } else if let Some(&partner_name) = partner_of.get(name) {
                let partner_owner = part_ids_by_name
                    .iter()
                    .find(|(_, ids)| {
                        if let Ok(Some(ps)) = doc.surface(partner_name) {
                            let pids: BTreeSet<u32> = FebDocument::surface_face_nodes(ps)
                                .map(|fs| fs.into_iter().flatten().collect())
                                .unwrap_or_default();
                            !pids.is_empty() && pids.iter().all(|id| ids.contains(id))
                        } else {
                            false
                        }
                    })
                    .map(|(p, _)| p.clone());

                if partner_owner.as_deref() == Some(part) {
                    // 自接触：邻近规则会误選同部件的相邻褶皱，强制相对边界
                    debug!(
                        "Surface '{}' partner '{}' on same part, forcing relative bounds",
                        name, partner_name
                    );
                    let rel = RelBox::infer(
                        surface_ids.iter().filter_map(|id| coords.get(id)).copied(),
                        &old_part_bbox,
                    );
                    (Rule::RelativeBounds(rel), false)
                } else {
                    // 跨部件：记录对侧面的模板面心作为几何来源
                    if let Ok(Some(ps)) = doc.surface(partner_name) {
                        let centroids = FebDocument::surface_face_nodes(ps)?
                            .iter()
                            .filter_map(|face| {
                                let pts: Vec<DVec3> = face
                                    .iter()
                                    .filter_map(|id| coords.get(id))
                                    .copied()
                                    .collect();
                                if pts.is_empty() {
                                    None
                                } else {
                                    Some(pts.iter().sum::<DVec3>() / pts.len() as f64)
                                }
                            })
                            .collect::<Vec<_>>();
                        partner_centroids.insert(partner_name.to_string(), centroids);
                    }
                    (
                        Rule::CrossPartProximity {
                            partner: PartnerRef {
                                part: partner_owner,
                                surface: partner_name.to_string(),
                            },
                            distance: None,
                        },
                        false,
                    )
                }
            } else {
                let rel = RelBox::infer(
                    surface_ids.iter().filter_map(|id| coords.get(id)).copied(),
                    &old_part_bbox,
                );
                (Rule::RelativeBounds(rel), false)
            };

            definitions.push(SetDefinition {
                name: name.to_string(),
                kind: SelectionKind::Faces,
                rule,
                old_count: faces.len(),
                exact_name: exact,
            });
        }

        // 单元集合：属于部件的取整个部件
        let part_elem_ids: BTreeSet<u32> = doc
            .elements_block(part)?
            .children
            .iter()
            .filter_map(|e| e.attr("id").and_then(|s| s.parse().ok()))
            .collect();
        for set in doc.elementsets()? {
            let Some(name) = set.name() else { continue };
            let ids = FebDocument::elementset_ids(set);
            if ids.is_empty() || !ids.iter().all(|id| part_elem_ids.contains(id)) {
                continue;
            }
            definitions.push(SetDefinition {
                name: name.to_string(),
                kind: SelectionKind::Elements,
                rule: Rule::RelativeBounds(RelBox::FULL),
                old_count: ids.len(),
                exact_name: false,
            });
        }

        info!(
            "Analyzed template: {} selections to rebuild for part '{}'",
            definitions.len(),
            part
        );

        Ok(Self {
            part: part.to_string(),
            tol,
            definitions,
            pairs,
            partner_centroids,
        })
    }

    /// 集合定义表
    pub fn definitions(&self) -> &[SetDefinition] {
        &self.definitions
    }

    /// 在新网格上重建全部集合
    pub fn reconstruct(
        &self,
        mesh: &Mesh,
        cancel: &CancelToken,
    ) -> ReconResult<ReconstructionReport> {
        let boundary = boundary_faces(mesh, &self.part)?;
        let centroids: Vec<DVec3> = boundary.iter().map(|f| face_centroid(mesh, f)).collect();
        let normals: Vec<DVec3> = boundary.iter().map(|f| face_normal(mesh, f)).collect();
        let new_part_bbox = part_bbox(mesh, &self.part)?;
        let scale = mesh_bbox(mesh).max_edge();

        let part_range = mesh.part_range(&self.part)?;
        let mut part_nodes: Vec<u32> = mesh.elements()[part_range]
            .iter()
            .flat_map(|e| e.nodes.iter().copied())
            .collect();
        part_nodes.sort_unstable();
        part_nodes.dedup();

        debug!(
            "Reconstructing on new mesh: {} boundary faces, part bbox {:?}",
            boundary.len(),
            new_part_bbox
        );

        let mut update = SelectionUpdate::default();
        let mut rules_used = BTreeMap::new();

        for def in &self.definitions {
            cancel.check()?;

            let partner_index = self.build_partner_index(mesh, &def.rule)?;
            let ctx = RuleContext {
                mesh,
                part: &self.part,
                part_bbox: new_part_bbox,
                scale,
                tol: &self.tol,
                part_nodes: &part_nodes,
                boundary: &boundary,
                centroids: &centroids,
                normals: &normals,
                partner_index: partner_index.as_ref(),
                cancel,
            };

            let selection = def.rule.apply(&ctx, def.kind)?;
            if def.old_count > 0 && selection.is_empty() {
                return Err(ReconError::selection_lost(&def.name));
            }
            debug!(
                "Selection '{}': {} -> {} entries ({})",
                def.name,
                def.old_count,
                selection.len(),
                def.rule.kind_tag()
            );
            rules_used.insert(def.name.clone(), def.rule.kind_tag());

            match selection {
                Selection::Nodes(nodes) => {
                    update.nodesets.insert(def.name.clone(), nodes);
                }
                Selection::Faces(mut indices) => {
                    indices.sort_unstable_by_key(|&i| (boundary[i].element, boundary[i].local_face));
                    let faces = indices
                        .into_iter()
                        .map(|i| FaceOut {
                            element: boundary[i].element,
                            local_face: boundary[i].local_face,
                            nodes: boundary[i].nodes(mesh),
                        })
                        .collect();
                    update.surfaces.insert(def.name.clone(), faces);
                }
                Selection::Elements(elements) => {
                    update.elementsets.insert(def.name.clone(), elements);
                }
            }
        }

        let same_part_pairs = self.verify_contact_policy(mesh, &update)?;

        Ok(ReconstructionReport {
            update,
            rules_used,
            same_part_pairs,
        })
    }

    /// 跨部件邻近规则的对侧面心索引
    ///
    /// 对侧部件也在新网格中时用它的边界面，否则退回模板面心。
    fn build_partner_index(&self, mesh: &Mesh, rule: &Rule) -> ReconResult<Option<FaceIndex>> {
        let Rule::CrossPartProximity { partner, .. } = rule else {
            return Ok(None);
        };

        if let Some(part) = partner.part.as_deref() {
            if mesh.part(part).is_some() {
                let faces = boundary_faces(mesh, part)?;
                return Ok(Some(FaceIndex::build(mesh, &faces)));
            }
        }

        let centroids = self
            .partner_centroids
            .get(&partner.surface)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        Ok(Some(FaceIndex::from_points(centroids)))
    }

    /// 自接触策略的线上不变量核查
    ///
    /// 双方都被重建的接触对，按新网格判定同部件后，两面都必须由
    /// `relative_bounds` 产出（精确名规则豁免）。返回同部件对名单。
    fn verify_contact_policy(
        &self,
        mesh: &Mesh,
        update: &SelectionUpdate,
    ) -> ReconResult<Vec<String>> {
        let mut same_part_pairs = Vec::new();

        for pair in &self.pairs {
            let (Some(primary), Some(secondary)) = (
                update.surfaces.get(&pair.primary),
                update.surfaces.get(&pair.secondary),
            ) else {
                continue;
            };

            // 同部件：两面引用的单元并集落在一个部件内
            let mut owner_parts: BTreeSet<&str> = BTreeSet::new();
            for face in primary.iter().chain(secondary) {
                if let Some(p) = mesh.part_of_element(face.element) {
                    owner_parts.insert(&p.name);
                }
            }
            if owner_parts.len() != 1 {
                continue;
            }
            same_part_pairs.push(pair.name.clone());

            for surface_name in [&pair.primary, &pair.secondary] {
                let def = self
                    .definitions
                    .iter()
                    .find(|d| &d.name == surface_name)
                    .expect("reconstructed surface must have a definition");
                if !def.exact_name && !def.rule.is_relative_bounds() {
                    return Err(ReconError::SamePartPolicyViolation {
                        pair: pair.name.clone(),
                        surface: surface_name.clone(),
                    });
                }
            }
        }

        Ok(same_part_pairs)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use vx_mesh::mesh::{ElemType, Element};

    /// 立方体模板：单 hex8，无悬挑面（没有朝下高于底面的边界面）
    const TEMPLATE_CUBE: &str = r#"<?xml version="1.0"?>
<febio_spec version="4.0">
	<Mesh>
		<Nodes name="RUBBER_OBJ">
			<node id="1">0.0,0.0,0.0</node>
			<node id="2">1.0,0.0,0.0</node>
			<node id="3">1.0,1.0,0.0</node>
			<node id="4">0.0,1.0,0.0</node>
			<node id="5">0.0,0.0,1.0</node>
			<node id="6">1.0,0.0,1.0</node>
			<node id="7">1.0,1.0,1.0</node>
			<node id="8">0.0,1.0,1.0</node>
		</Nodes>
		<Nodes name="KEYCAP">
			<node id="101">0.0,0.0,1.0</node>
			<node id="102">1.0,0.0,1.0</node>
			<node id="103">1.0,1.0,1.0</node>
			<node id="104">0.0,1.0,1.0</node>
		</Nodes>
		<Elements type="hex8" name="RUBBER_OBJ">
			<elem id="1">1,2,3,4,5,6,7,8</elem>
		</Elements>
		<NodeSet name="FIX_BOTTOM">
			<node id="1"/>
			<node id="2"/>
			<node id="3"/>
			<node id="4"/>
		</NodeSet>
		<Surface name="RUBBER_BOTTOM_CONTACT_Secondary">
			<quad4 id="2">1,4,3,2</quad4>
		</Surface>
		<Surface name="TOP_CONTACT_Primary">
			<quad4 id="3">5,6,7,8</quad4>
		</Surface>
		<Surface name="KEYCAP_BOTTOM">
			<quad4 id="4">101,102,103,104</quad4>
		</Surface>
		<ElementSet name="RUBBER_ELEMS">
			<elem id="1"/>
		</ElementSet>
		<SurfacePair name="TOP_CONTACT">
			<primary>TOP_CONTACT_Primary</primary>
			<secondary>KEYCAP_BOTTOM</secondary>
		</SurfacePair>
	</Mesh>
</febio_spec>
"#;

    /// 蘑菇模板：下 hex + 加宽的上 hex，上块底面形成悬挑
    const TEMPLATE_MUSHROOM: &str = r#"<?xml version="1.0"?>
<febio_spec version="4.0">
	<Mesh>
		<Nodes name="RUBBER_OBJ">
			<node id="1">0.0,0.0,0.0</node>
			<node id="2">1.0,0.0,0.0</node>
			<node id="3">1.0,1.0,0.0</node>
			<node id="4">0.0,1.0,0.0</node>
			<node id="5">0.0,0.0,1.0</node>
			<node id="6">1.0,0.0,1.0</node>
			<node id="7">1.0,1.0,1.0</node>
			<node id="8">0.0,1.0,1.0</node>
			<node id="9">-0.5,-0.5,1.0</node>
			<node id="10">1.5,-0.5,1.0</node>
			<node id="11">1.5,1.5,1.0</node>
			<node id="12">-0.5,1.5,1.0</node>
			<node id="13">-0.5,-0.5,2.0</node>
			<node id="14">1.5,-0.5,2.0</node>
			<node id="15">1.5,1.5,2.0</node>
			<node id="16">-0.5,1.5,2.0</node>
		</Nodes>
		<Elements type="hex8" name="RUBBER_OBJ">
			<elem id="1">1,2,3,4,5,6,7,8</elem>
			<elem id="2">9,10,11,12,13,14,15,16</elem>
		</Elements>
		<Surface name="RUBBER_BOTTOM_CONTACT_Primary">
			<quad4 id="3">9,12,11,10</quad4>
		</Surface>
		<Surface name="RUBBER_BOTTOM_CONTACT_Secondary">
			<quad4 id="4">1,4,3,2</quad4>
		</Surface>
	</Mesh>
</febio_spec>
"#;

    fn unit_hex() -> Mesh {
        let nodes = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(1.0, 0.0, 1.0),
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(0.0, 1.0, 1.0),
        ];
        let elems = vec![Element::new(ElemType::Hex8, (0..8).collect()).unwrap()];
        Mesh::single_part("RUBBER_OBJ", nodes, elems).unwrap()
    }

    /// 与蘑菇模板同构的网格
    fn mushroom_mesh() -> Mesh {
        let nodes = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(1.0, 0.0, 1.0),
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(0.0, 1.0, 1.0),
            DVec3::new(-0.5, -0.5, 1.0),
            DVec3::new(1.5, -0.5, 1.0),
            DVec3::new(1.5, 1.5, 1.0),
            DVec3::new(-0.5, 1.5, 1.0),
            DVec3::new(-0.5, -0.5, 2.0),
            DVec3::new(1.5, -0.5, 2.0),
            DVec3::new(1.5, 1.5, 2.0),
            DVec3::new(-0.5, 1.5, 2.0),
        ];
        let elems = vec![
            Element::new(ElemType::Hex8, vec![0, 1, 2, 3, 4, 5, 6, 7]).unwrap(),
            Element::new(ElemType::Hex8, vec![8, 9, 10, 11, 12, 13, 14, 15]).unwrap(),
        ];
        Mesh::single_part("RUBBER_OBJ", nodes, elems).unwrap()
    }

    fn cube_reconstructor() -> SetReconstructor {
        let doc = FebDocument::parse(TEMPLATE_CUBE).unwrap();
        SetReconstructor::analyze(&doc, "RUBBER_OBJ", Tolerance::default()).unwrap()
    }

    #[test]
    fn test_analysis_picks_rules() {
        let recon = cube_reconstructor();
        let rules: BTreeMap<&str, &str> = recon
            .definitions()
            .iter()
            .map(|d| (d.name.as_str(), d.rule.kind_tag()))
            .collect();

        assert_eq!(rules["FIX_BOTTOM"], "relative_bounds");
        assert_eq!(rules["RUBBER_BOTTOM_CONTACT_Secondary"], "z_min_plane");
        // 跨部件接触（对侧在 KEYCAP 上）
        assert_eq!(rules["TOP_CONTACT_Primary"], "cross_part_proximity");
        assert_eq!(rules["RUBBER_ELEMS"], "relative_bounds");
        // KEYCAP 的面不属于被置换部件
        assert!(!rules.contains_key("KEYCAP_BOTTOM"));
    }

    #[test]
    fn test_identity_roundtrip() {
        let recon = cube_reconstructor();
        let mesh = unit_hex();
        let report = recon.reconstruct(&mesh, &CancelToken::new()).unwrap();

        // 底面固定节点集合：局部索引 0-3
        assert_eq!(report.update.nodesets["FIX_BOTTOM"], vec![0, 1, 2, 3]);

        // 贴地面：恰好一张底面
        let secondary = &report.update.surfaces["RUBBER_BOTTOM_CONTACT_Secondary"];
        assert_eq!(secondary.len(), 1);
        assert_eq!(secondary[0].local_face, 0);

        // 顶面接触：对侧 KEYCAP 面在 z=1，与顶面重合
        let top = &report.update.surfaces["TOP_CONTACT_Primary"];
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].local_face, 1);

        // 单元集合取整个部件
        assert_eq!(report.update.elementsets["RUBBER_ELEMS"], vec![0]);
    }

    #[test]
    fn test_mushroom_overhang_rules() {
        let doc = FebDocument::parse(TEMPLATE_MUSHROOM).unwrap();
        let recon =
            SetReconstructor::analyze(&doc, "RUBBER_OBJ", Tolerance::default()).unwrap();
        let mesh = mushroom_mesh();
        let report = recon.reconstruct(&mesh, &CancelToken::new()).unwrap();

        // 悬挑底面（上块的朝下面，z=1）被 z_down_except_bottom 捕获
        let primary = &report.update.surfaces["RUBBER_BOTTOM_CONTACT_Primary"];
        assert_eq!(primary.len(), 1);
        assert_eq!(primary[0].element, 1);

        // 贴地面是下块的底面
        let secondary = &report.update.surfaces["RUBBER_BOTTOM_CONTACT_Secondary"];
        assert_eq!(secondary.len(), 1);
        assert_eq!(secondary[0].element, 0);
        assert_eq!(secondary[0].local_face, 0);
    }

    #[test]
    fn test_missing_ground_face_is_selection_lost() {
        let recon = cube_reconstructor();

        // 倾斜四面体：没有面的质心落在 z_min 平面容差内
        let nodes = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.2),
            DVec3::new(0.0, 1.0, 0.4),
            DVec3::new(0.3, 0.3, 1.0),
        ];
        let elems = vec![Element::new(ElemType::Tet4, vec![0, 1, 2, 3]).unwrap()];
        let mesh = Mesh::single_part("RUBBER_OBJ", nodes, elems).unwrap();

        let result = recon.reconstruct(&mesh, &CancelToken::new());
        assert!(matches!(
            result,
            Err(ReconError::SelectionLost { ref name }) if name == "RUBBER_BOTTOM_CONTACT_Secondary"
        ));
    }

    #[test]
    fn test_cancellation() {
        let recon = cube_reconstructor();
        let mesh = unit_hex();
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(recon.reconstruct(&mesh, &cancel).is_err());
    }

    #[test]
    fn test_same_part_pair_forced_relative_bounds() {
        // 自接触对：双方都在橡胶上且不在精确名表中
        let template = r#"<?xml version="1.0"?>
<febio_spec version="4.0">
	<Mesh>
		<Nodes name="RUBBER_OBJ">
			<node id="1">0.0,0.0,0.0</node>
			<node id="2">1.0,0.0,0.0</node>
			<node id="3">1.0,1.0,0.0</node>
			<node id="4">0.0,1.0,0.0</node>
			<node id="5">0.0,0.0,1.0</node>
			<node id="6">1.0,0.0,1.0</node>
			<node id="7">1.0,1.0,1.0</node>
			<node id="8">0.0,1.0,1.0</node>
		</Nodes>
		<Elements type="hex8" name="RUBBER_OBJ">
			<elem id="1">1,2,3,4,5,6,7,8</elem>
		</Elements>
		<Surface name="FOLD_A">
			<quad4 id="2">1,2,6,5</quad4>
		</Surface>
		<Surface name="FOLD_B">
			<quad4 id="3">3,4,8,7</quad4>
		</Surface>
		<SurfacePair name="RUBBER_SELF_CONTACT">
			<primary>FOLD_A</primary>
			<secondary>FOLD_B</secondary>
		</SurfacePair>
	</Mesh>
</febio_spec>
"#;
        let doc = FebDocument::parse(template).unwrap();
        let recon = SetReconstructor::analyze(&doc, "RUBBER_OBJ", Tolerance::default()).unwrap();

        // 自接触双方都解析为相对边界
        for name in ["FOLD_A", "FOLD_B"] {
            let def = recon.definitions().iter().find(|d| d.name == name).unwrap();
            assert!(def.rule.is_relative_bounds(), "{} must use relative bounds", name);
        }

        let report = recon.reconstruct(&unit_hex(), &CancelToken::new()).unwrap();
        assert_eq!(report.same_part_pairs, vec!["RUBBER_SELF_CONTACT".to_string()]);
        assert!(!report.update.surfaces["FOLD_A"].is_empty());
        assert!(!report.update.surfaces["FOLD_B"].is_empty());
    }

    #[test]
    fn test_refined_mesh_selections_nonempty() {
        // 细分为 2×2×2 的八个 hex：细分后全部选择仍非空。
        // 模板对侧面只有一个面心，细分后质心间距变大，放宽邻近比例。
        let doc = FebDocument::parse(TEMPLATE_CUBE).unwrap();
        let recon =
            SetReconstructor::analyze(&doc, "RUBBER_OBJ", Tolerance::new(1e-6, 45.0, 0.5))
                .unwrap();

        let mut nodes = Vec::new();
        for z in 0..3 {
            for y in 0..3 {
                for x in 0..3 {
                    nodes.push(DVec3::new(x as f64 * 0.5, y as f64 * 0.5, z as f64 * 0.5));
                }
            }
        }
        let idx = |x: usize, y: usize, z: usize| (z * 9 + y * 3 + x) as u32;
        let mut elems = Vec::new();
        for z in 0..2 {
            for y in 0..2 {
                for x in 0..2 {
                    elems.push(
                        Element::new(
                            ElemType::Hex8,
                            vec![
                                idx(x, y, z),
                                idx(x + 1, y, z),
                                idx(x + 1, y + 1, z),
                                idx(x, y + 1, z),
                                idx(x, y, z + 1),
                                idx(x + 1, y, z + 1),
                                idx(x + 1, y + 1, z + 1),
                                idx(x, y + 1, z + 1),
                            ],
                        )
                        .unwrap(),
                    );
                }
            }
        }
        let mesh = Mesh::single_part("RUBBER_OBJ", nodes, elems).unwrap();

        let report = recon.reconstruct(&mesh, &CancelToken::new()).unwrap();

        // 细分后底面固定节点 3×3
        assert_eq!(report.update.nodesets["FIX_BOTTOM"].len(), 9);
        // 贴地面 2×2
        assert_eq!(report.update.surfaces["RUBBER_BOTTOM_CONTACT_Secondary"].len(), 4);
        // 顶面接触 2×2
        assert_eq!(report.update.surfaces["TOP_CONTACT_Primary"].len(), 4);
        // 单元集合覆盖全部 8 个单元
        assert_eq!(report.update.elementsets["RUBBER_ELEMS"].len(), 8);

        // 面片按（单元、局部面号）升序
        let secondary = &report.update.surfaces["RUBBER_BOTTOM_CONTACT_Secondary"];
        let keys: Vec<(usize, usize)> =
            secondary.iter().map(|f| (f.element, f.local_face)).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }
}
