// crates/vx_doc/src/overrides.rs

//! 参数覆盖
//!
//! 置换完成后对准备好的文档做三类局部调整：
//!
//! 1. 压头高度：把刚性压头部件整体沿 z 平移到新橡胶顶面之上
//! 2. 行程覆盖：改写 `KEYCAP_PUSH` 刚性约束的位移值
//! 3. 步数覆盖：改写第一个控制块的 `time_steps`
//!
//! 找不到目标时记录警告并跳过，不视为任务失败。

use tracing::{info, warn};

use crate::error::DocResult;
use crate::model::FebDocument;

/// 压头约束名
const PUSH_BC_NAME: &str = "KEYCAP_PUSH";

/// 位移可忽略阈值
const NEGLIGIBLE_SHIFT: f64 = 1e-6;

/// 把压头部件的节点沿 z 平移 `rubber_max_z - ref_z`
///
/// 模板以 `ref_z` 为压头底面高度编写；新网格顶面变化后压头
/// 必须跟着抬高或下沉，否则初始即穿透或脱开。
pub fn adjust_indenter_height(
    doc: &mut FebDocument,
    indenter_part: &str,
    rubber_max_z: f64,
    ref_z: f64,
) -> DocResult<()> {
    let shift = rubber_max_z - ref_z;
    if shift.abs() < NEGLIGIBLE_SHIFT {
        info!("Indenter shift {:.2e} is negligible, skipping", shift);
        return Ok(());
    }

    let mesh_root = doc.mesh_mut()?;
    let Some(block) = mesh_root.find_by_name_mut("Nodes", indenter_part) else {
        warn!(
            "Indenter part '{}' not found in template, skipping height adjustment",
            indenter_part
        );
        return Ok(());
    };

    let mut count = 0usize;
    for node in block.children.iter_mut().filter(|c| c.tag == "node") {
        let coords: Vec<f64> = node.parse_text_list()?;
        if coords.len() != 3 {
            continue;
        }
        node.text = format!(
            "{:.6e},{:.6e},{:.6e}",
            coords[0],
            coords[1],
            coords[2] + shift
        );
        count += 1;
    }

    info!(
        "Shifted {} nodes of '{}' by {:.6} (rubber top {:.6}, ref {:.6})",
        count, indenter_part, shift, rubber_max_z, ref_z
    );
    Ok(())
}

/// 覆盖压头行程：`KEYCAP_PUSH` 的 `<value>` 置为 `-|total_stroke|`
pub fn override_push_distance(doc: &mut FebDocument, total_stroke: f64) {
    let push = -total_stroke.abs();

    let Some(bc) = doc
        .root_mut()
        .find_deep_mut(&|e| e.tag == "rigid_bc" && e.name() == Some(PUSH_BC_NAME))
    else {
        warn!("Rigid BC '{}' not found, stroke override skipped", PUSH_BC_NAME);
        return;
    };

    match bc.find_mut("value") {
        Some(value) => {
            info!("Overriding {} value: {} -> {}", PUSH_BC_NAME, value.text, push);
            value.text = format!("{}", push);
        }
        None => warn!("<value> not found in {}, stroke override skipped", PUSH_BC_NAME),
    }
}

/// 覆盖第一个控制块的时间步数
pub fn override_time_steps(doc: &mut FebDocument, time_steps: u32) {
    let Some(control) = doc.root_mut().find_deep_mut(&|e| e.tag == "Control") else {
        warn!("<Control> not found, time_steps override skipped");
        return;
    };

    match control.find_mut("time_steps") {
        Some(ts) => {
            info!("Overriding time_steps: {} -> {}", ts.text, time_steps);
            ts.text = time_steps.to_string();
        }
        None => warn!("<time_steps> not found in Control, override skipped"),
    }
}
