// crates/vx_mesh/src/lib.rs

//! VEXIS-CAE 网格层
//!
//! 提供体网格的内存表示与几何内核：包围盒、边界面提取、外法向、
//! 面心空间索引、平面节点查询，以及网格文件加载与最小角对齐。
//!
//! # 核心类型
//!
//! - [`Mesh`]: 不可变体网格（节点、单元、部件区间）
//! - [`Face`]: 以 `(单元索引, 局部面号)` 引用的派生面
//! - [`Aabb3`]: 轴对齐包围盒
//! - [`FaceIndex`]: 面心 R-tree 空间索引
//!
//! # 模块结构
//!
//! - [`mesh`]: 网格数据模型
//! - [`faces`]: 单元面的规范编号表
//! - [`boundary`]: 边界面提取
//! - [`geometry`]: 包围盒、质心、法向、平面查询
//! - [`spatial_index`]: 面心空间索引
//! - [`align`]: 最小角对齐
//! - [`io`]: 传统非结构网格格式加载
//!
//! # 示例
//!
//! ```
//! use vx_mesh::mesh::{ElemType, Element, Mesh};
//! use glam::DVec3;
//!
//! let nodes = vec![
//!     DVec3::new(0.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0),
//!     DVec3::new(1.0, 1.0, 0.0), DVec3::new(0.0, 1.0, 0.0),
//!     DVec3::new(0.0, 0.0, 1.0), DVec3::new(1.0, 0.0, 1.0),
//!     DVec3::new(1.0, 1.0, 1.0), DVec3::new(0.0, 1.0, 1.0),
//! ];
//! let elems = vec![Element::new(ElemType::Hex8, vec![0, 1, 2, 3, 4, 5, 6, 7]).unwrap()];
//! let mesh = Mesh::single_part("RUBBER_OBJ", nodes, elems).unwrap();
//!
//! let faces = vx_mesh::boundary::boundary_faces(&mesh, "RUBBER_OBJ").unwrap();
//! assert_eq!(faces.len(), 6);
//! ```

#![warn(missing_docs)]

pub mod align;
pub mod boundary;
pub mod error;
pub mod faces;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod spatial_index;

pub use error::{MeshError, MeshResult};
pub use faces::Face;
pub use geometry::Aabb3;
pub use mesh::{ElemType, Element, Mesh, Part};
pub use spatial_index::FaceIndex;
