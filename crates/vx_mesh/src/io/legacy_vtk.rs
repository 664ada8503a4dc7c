// crates/vx_mesh/src/io/legacy_vtk.rs

//! 传统非结构网格格式加载
//!
//! 外部网格器输出 ASCII 的传统非结构网格容器：节点数组、单元
//! 连接数组、单元类型数组，以及名为 `part` 的单元数据数组标记
//! 部件归属。部件名不随文件携带（该格式没有字符串数组），由
//! 配置的 id→名称映射在 [`build_mesh`] 时解析。
//!
//! # 示例
//!
//! ```ignore
//! use vx_mesh::io::legacy_vtk::{build_mesh, LegacyVtkLoader};
//!
//! let grid = LegacyVtkLoader::load("temp/dome.vtk")?;
//! let mesh = build_mesh(grid, |id| (id == 0).then(|| "RUBBER_OBJ".to_string()))?;
//! ```

use glam::DVec3;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

use crate::error::{MeshError, MeshResult};
use crate::mesh::{ElemType, Element, Mesh, Part};

/// 加载后的原始网格数据（尚未解析部件名）
#[derive(Debug, Clone)]
pub struct LegacyGrid {
    /// 节点坐标
    pub points: Vec<DVec3>,
    /// 每个单元的节点索引
    pub cells: Vec<Vec<u32>>,
    /// 每个单元的类型码
    pub cell_types: Vec<u8>,
    /// 每个单元的部件 id（文件缺少 `part` 数组时全为 0）
    pub part_ids: Vec<usize>,
}

impl LegacyGrid {
    /// 节点数量
    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    /// 单元数量
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }
}

/// 传统非结构网格加载器
pub struct LegacyVtkLoader;

impl LegacyVtkLoader {
    /// 从文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> MeshResult<LegacyGrid> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            MeshError::malformed(format!("cannot open {}: {}", path.display(), e))
        })?;
        let grid = Self::load_from_reader(BufReader::new(file))?;
        info!(
            "Loaded mesh {}: {} nodes, {} cells",
            path.display(),
            grid.n_points(),
            grid.n_cells()
        );
        Ok(grid)
    }

    /// 从 reader 加载
    pub fn load_from_reader<R: Read>(mut reader: R) -> MeshResult<LegacyGrid> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse(&content)
    }

    /// 解析文件内容
    pub fn parse(content: &str) -> MeshResult<LegacyGrid> {
        let mut lines = content.lines();

        let header = lines.next().unwrap_or("");
        if !header.starts_with("# vtk DataFile") {
            return Err(MeshError::malformed("missing legacy grid header"));
        }
        let _title = lines.next().unwrap_or("");
        let format = lines.next().unwrap_or("").trim();
        if format != "ASCII" {
            return Err(MeshError::malformed(format!(
                "unsupported format '{}', expected ASCII",
                format
            )));
        }
        let dataset = lines.next().unwrap_or("").trim();
        if dataset != "DATASET UNSTRUCTURED_GRID" {
            return Err(MeshError::malformed(format!(
                "unsupported dataset '{}'",
                dataset
            )));
        }

        let mut cursor = Tokens::new(lines.collect::<Vec<_>>().join("\n"));

        let mut points: Vec<DVec3> = Vec::new();
        let mut cells: Vec<Vec<u32>> = Vec::new();
        let mut cell_types: Vec<u8> = Vec::new();
        let mut part_ids: Option<Vec<usize>> = None;
        // 当前数据段长度（CELL_DATA / POINT_DATA）
        let mut data_len = 0usize;
        let mut in_cell_data = false;

        while let Some(keyword) = cursor.next() {
            match keyword.as_str() {
                "POINTS" => {
                    let n: usize = cursor.parse_next("POINTS count")?;
                    let _dtype = cursor.require_next("POINTS type")?;
                    points.reserve(n);
                    for _ in 0..n {
                        let x: f64 = cursor.parse_next("point x")?;
                        let y: f64 = cursor.parse_next("point y")?;
                        let z: f64 = cursor.parse_next("point z")?;
                        points.push(DVec3::new(x, y, z));
                    }
                }
                "CELLS" => {
                    let n: usize = cursor.parse_next("CELLS count")?;
                    let _size: usize = cursor.parse_next("CELLS size")?;
                    cells.reserve(n);
                    for _ in 0..n {
                        let count: usize = cursor.parse_next("cell node count")?;
                        let mut conn = Vec::with_capacity(count);
                        for _ in 0..count {
                            conn.push(cursor.parse_next::<u32>("cell node index")?);
                        }
                        cells.push(conn);
                    }
                }
                "CELL_TYPES" => {
                    let n: usize = cursor.parse_next("CELL_TYPES count")?;
                    cell_types.reserve(n);
                    for _ in 0..n {
                        cell_types.push(cursor.parse_next::<u8>("cell type code")?);
                    }
                }
                "CELL_DATA" => {
                    data_len = cursor.parse_next("CELL_DATA count")?;
                    in_cell_data = true;
                }
                "POINT_DATA" => {
                    data_len = cursor.parse_next("POINT_DATA count")?;
                    in_cell_data = false;
                }
                "SCALARS" => {
                    let name = cursor.require_next("SCALARS name")?;
                    let _dtype = cursor.require_next("SCALARS type")?;
                    // 可选的分量数
                    let ncomp = match cursor.peek().and_then(|t| t.parse::<usize>().ok()) {
                        Some(n) => {
                            cursor.next();
                            n
                        }
                        None => 1,
                    };
                    let lut = cursor.require_next("LOOKUP_TABLE keyword")?;
                    if lut != "LOOKUP_TABLE" {
                        return Err(MeshError::malformed(format!(
                            "expected LOOKUP_TABLE after SCALARS, got '{}'",
                            lut
                        )));
                    }
                    let _table = cursor.require_next("LOOKUP_TABLE name")?;

                    if in_cell_data && name == "part" {
                        let mut ids = Vec::with_capacity(data_len);
                        for _ in 0..data_len {
                            ids.push(cursor.parse_next::<f64>("part id")? as usize);
                            for _ in 1..ncomp {
                                cursor.parse_next::<f64>("part id component")?;
                            }
                        }
                        part_ids = Some(ids);
                    } else {
                        for _ in 0..data_len * ncomp {
                            cursor.parse_next::<f64>("scalar value")?;
                        }
                    }
                }
                "FIELD" => {
                    let _name = cursor.require_next("FIELD name")?;
                    let n_arrays: usize = cursor.parse_next("FIELD array count")?;
                    for _ in 0..n_arrays {
                        let _aname = cursor.require_next("field array name")?;
                        let ncomp: usize = cursor.parse_next("field array components")?;
                        let ntuples: usize = cursor.parse_next("field array tuples")?;
                        let _dtype = cursor.require_next("field array type")?;
                        for _ in 0..ncomp * ntuples {
                            cursor.parse_next::<f64>("field value")?;
                        }
                    }
                }
                other => {
                    return Err(MeshError::malformed(format!(
                        "unknown section keyword '{}'",
                        other
                    )));
                }
            }
        }

        if points.is_empty() {
            return Err(MeshError::malformed("no points in mesh file"));
        }
        if cells.is_empty() {
            return Err(MeshError::malformed("no cells in mesh file"));
        }
        if cell_types.len() != cells.len() {
            return Err(MeshError::malformed(format!(
                "{} cell types for {} cells",
                cell_types.len(),
                cells.len()
            )));
        }
        let part_ids = match part_ids {
            Some(ids) => {
                if ids.len() != cells.len() {
                    return Err(MeshError::malformed(format!(
                        "part array has {} entries for {} cells",
                        ids.len(),
                        cells.len()
                    )));
                }
                ids
            }
            None => vec![0; cells.len()],
        };

        Ok(LegacyGrid {
            points,
            cells,
            cell_types,
            part_ids,
        })
    }
}

/// 从原始网格数据构建内存网格
///
/// `part_name` 把 `part` 数组的整数 id 解析为模板部件名；解析失败
/// 返回 [`MeshError::MissingPart`]。同一部件的单元必须连续出现，
/// 保证部件是单元序列上的区间。
pub fn build_mesh(
    grid: LegacyGrid,
    part_name: impl Fn(usize) -> Option<String>,
) -> MeshResult<Mesh> {
    let mut elements = Vec::with_capacity(grid.cells.len());
    for (i, (conn, &code)) in grid.cells.iter().zip(&grid.cell_types).enumerate() {
        let Some((etype, n_take)) = ElemType::from_legacy_code(code) else {
            return Err(MeshError::malformed(format!(
                "unknown cell type {} at cell {}",
                code, i
            )));
        };
        if conn.len() < n_take {
            return Err(MeshError::malformed(format!(
                "cell {} has {} nodes, type {:?} needs {}",
                i,
                conn.len(),
                etype,
                n_take
            )));
        }
        elements.push(Element::new(etype, conn[..n_take].to_vec())?);
    }

    // 按连续出现的部件 id 切分区间
    let mut parts: Vec<Part> = Vec::new();
    let mut seen_ids: Vec<usize> = Vec::new();
    let mut start = 0usize;
    for i in 0..grid.part_ids.len() {
        let id = grid.part_ids[i];
        let is_last = i + 1 == grid.part_ids.len();
        let next_differs = !is_last && grid.part_ids[i + 1] != id;
        if is_last || next_differs {
            if seen_ids.contains(&id) {
                return Err(MeshError::malformed(format!(
                    "part id {} appears in non-contiguous runs",
                    id
                )));
            }
            seen_ids.push(id);
            let name = part_name(id)
                .ok_or_else(|| MeshError::missing_part(format!("part id {}", id)))?;
            parts.push(Part {
                name,
                range: start..i + 1,
            });
            start = i + 1;
        }
    }

    Mesh::new(grid.points, elements, parts)
}

/// 按空白切分的 token 游标
struct Tokens {
    tokens: Vec<String>,
    pos: usize,
}

impl Tokens {
    fn new(content: String) -> Self {
        Self {
            tokens: content.split_whitespace().map(str::to_string).collect(),
            pos: 0,
        }
    }

    fn next(&mut self) -> Option<String> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn require_next(&mut self, what: &str) -> MeshResult<String> {
        self.next()
            .ok_or_else(|| MeshError::malformed(format!("unexpected end of file, expected {}", what)))
    }

    fn parse_next<T: std::str::FromStr>(&mut self, what: &str) -> MeshResult<T> {
        let tok = self.require_next(what)?;
        tok.parse()
            .map_err(|_| MeshError::malformed(format!("cannot parse '{}' as {}", tok, what)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_HEX: &str = "\
# vtk DataFile Version 3.0
dome mesh
ASCII
DATASET UNSTRUCTURED_GRID
POINTS 8 double
0 0 0  1 0 0  1 1 0  0 1 0
0 0 1  1 0 1  1 1 1  0 1 1
CELLS 1 9
8 0 1 2 3 4 5 6 7
CELL_TYPES 1
12
CELL_DATA 1
SCALARS part int 1
LOOKUP_TABLE default
0
";

    #[test]
    fn test_parse_single_hex() {
        let grid = LegacyVtkLoader::parse(SINGLE_HEX).unwrap();
        assert_eq!(grid.n_points(), 8);
        assert_eq!(grid.n_cells(), 1);
        assert_eq!(grid.cell_types, vec![12]);
        assert_eq!(grid.part_ids, vec![0]);

        let mesh = build_mesh(grid, |id| (id == 0).then(|| "RUBBER_OBJ".to_string())).unwrap();
        assert_eq!(mesh.n_nodes(), 8);
        assert_eq!(mesh.elements()[0].etype, ElemType::Hex8);
        assert_eq!(mesh.parts()[0].name, "RUBBER_OBJ");
    }

    #[test]
    fn test_missing_part_array_defaults_to_zero() {
        let content = SINGLE_HEX
            .lines()
            .take_while(|l| !l.starts_with("CELL_DATA"))
            .collect::<Vec<_>>()
            .join("\n");
        let grid = LegacyVtkLoader::parse(&content).unwrap();
        assert_eq!(grid.part_ids, vec![0]);
    }

    #[test]
    fn test_unknown_cell_type_is_malformed() {
        let content = SINGLE_HEX.replace("\n12\n", "\n77\n");
        let grid = LegacyVtkLoader::parse(&content).unwrap();
        let result = build_mesh(grid, |_| Some("RUBBER_OBJ".to_string()));
        assert!(matches!(result, Err(MeshError::MalformedMesh { .. })));
    }

    #[test]
    fn test_unmapped_part_id_is_missing_part() {
        let grid = LegacyVtkLoader::parse(SINGLE_HEX).unwrap();
        let result = build_mesh(grid, |_| None);
        assert!(matches!(result, Err(MeshError::MissingPart { .. })));
    }

    #[test]
    fn test_bad_header_rejected() {
        assert!(LegacyVtkLoader::parse("not a mesh").is_err());
    }

    #[test]
    fn test_hex27_truncated_to_hex20() {
        // 27 节点六面体只保留前 20 个节点
        let mut content = String::from(
            "# vtk DataFile Version 3.0\nt\nASCII\nDATASET UNSTRUCTURED_GRID\nPOINTS 27 double\n",
        );
        for i in 0..27 {
            content.push_str(&format!("{} 0 0\n", i));
        }
        content.push_str("CELLS 1 28\n27");
        for i in 0..27 {
            content.push_str(&format!(" {}", i));
        }
        content.push_str("\nCELL_TYPES 1\n29\n");

        let grid = LegacyVtkLoader::parse(&content).unwrap();
        let mesh = build_mesh(grid, |_| Some("RUBBER_OBJ".to_string())).unwrap();
        assert_eq!(mesh.elements()[0].etype, ElemType::Hex20);
        assert_eq!(mesh.elements()[0].nodes.len(), 20);
    }

    #[test]
    fn test_non_contiguous_part_runs_rejected() {
        let content = "\
# vtk DataFile Version 3.0
t
ASCII
DATASET UNSTRUCTURED_GRID
POINTS 4 double
0 0 0  1 0 0  0 1 0  0 0 1
CELLS 3 15
4 0 1 2 3
4 0 1 2 3
4 0 1 2 3
CELL_TYPES 3
10 10 10
CELL_DATA 3
SCALARS part int 1
LOOKUP_TABLE default
0 1 0
";
        let grid = LegacyVtkLoader::parse(content).unwrap();
        let result = build_mesh(grid, |id| Some(format!("P{}", id)));
        assert!(matches!(result, Err(MeshError::MalformedMesh { .. })));
    }
}
