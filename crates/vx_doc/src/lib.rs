// crates/vx_doc/src/lib.rs

//! VEXIS-CAE 文档层
//!
//! 提供 FEA 输入文档（求解器 XML 方言）的类型化视图与原子重写：
//! 定位网格块、部件、命名集合、面定义、接触对与控制块；以
//! `.tmp` + 原子改名的方式产出准备好的输入文档。物理内容
//! （材料、载荷曲线、接触算法）只读不写。
//!
//! # 模块结构
//!
//! - [`xml`]: 保序的 XML 元素树（quick-xml 解析，手写序列化）
//! - [`model`]: [`FebDocument`] 类型化定位器
//! - [`rewrite`]: 文档重写器（节点/单元/命名集合替换、id 重编号）
//! - [`overrides`]: 参数覆盖（压头高度、行程、步数）

#![warn(missing_docs)]

pub mod error;
pub mod model;
pub mod overrides;
pub mod rewrite;
pub mod xml;

pub use error::{DocError, DocResult};
pub use model::{FebDocument, SurfacePair};
pub use rewrite::{FaceOut, IdMaps, Rewriter, SelectionUpdate};
pub use xml::XmlElement;
