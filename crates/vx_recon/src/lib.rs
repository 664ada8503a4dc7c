// crates/vx_recon/src/lib.rs

//! VEXIS-CAE 集合重建
//!
//! 网格重新生成后节点与单元 id 全部作废，而物理设置按名称引用
//! 命名集合。本 crate 对模板中属于被置换部件的每个命名集合选择
//! 一条几何规则，在新网格上重新识别集合内容：
//!
//! - `z_min_plane`: 全局最低平面上的实体
//! - `z_down_except_bottom`: 法向朝下但不在底面上的边界面
//! - `relative_bounds`: 部件包围盒的相对分数盒
//! - `cross_part_proximity`: 距另一部件边界面一定距离内的面
//! - `axis_cylinder`: 轴对齐圆筒壳内的实体
//! - 以上规则的交集
//!
//! 接触对策略：两面同部件（自接触）时邻近规则会误選相邻褶皱，
//! 强制双方使用 `relative_bounds`；跨部件时使用邻近规则。
//! 重建后模板中非空的集合必须仍然非空，否则任务失败。

#![warn(missing_docs)]

pub mod error;
pub mod reconstructor;
pub mod rule;

pub use error::{ReconError, ReconResult};
pub use reconstructor::{ReconstructionReport, SetDefinition, SetReconstructor};
pub use rule::{RelBox, Rule, RuleContext, SelectionKind};
