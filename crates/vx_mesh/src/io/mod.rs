// crates/vx_mesh/src/io/mod.rs

//! 网格 IO
//!
//! 目前仅支持外部网格器输出的传统非结构网格格式。

pub mod legacy_vtk;

pub use legacy_vtk::{build_mesh, LegacyGrid, LegacyVtkLoader};
