// apps/vx_cli/src/commands/mod.rs

//! CLI 子命令

pub mod extract;
pub mod info;
pub mod prepare;
pub mod run;
