// crates/vx_solver/src/progress.rs

//! 求解器进度标记解析
//!
//! 求解器在收敛的每个时间步输出形如 `time = 0.125` 的行。
//! 总时长来自输入文档的控制块发现，进度分数为 `当前/总`，
//! 上限压到 0.99：最后 1% 留给收尾与结果提取。

use regex::Regex;

/// 进度快照
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverProgress {
    /// 当前模拟时间
    pub current_time: f64,
    /// 进度分数 [0, 0.99]
    pub fraction: f64,
}

/// 进度标记解析器
#[derive(Debug)]
pub struct ProgressParser {
    pattern: Regex,
    total_time: f64,
}

impl ProgressParser {
    /// 创建解析器；`total_time` 非正时按 1.0 处理
    pub fn new(total_time: f64) -> Self {
        Self {
            // 大小写不敏感：部分求解器输出 "Time = ..."
            pattern: Regex::new(r"(?i)time\s*=\s*([0-9.eE+\-]+)").expect("valid progress regex"),
            total_time: if total_time > 0.0 { total_time } else { 1.0 },
        }
    }

    /// 解析一行输出；不含进度标记时返回 None
    pub fn parse(&self, line: &str) -> Option<SolverProgress> {
        let captures = self.pattern.captures(line)?;
        let current_time: f64 = captures.get(1)?.as_str().parse().ok()?;
        let fraction = (current_time / self.total_time).clamp(0.0, 0.99);
        Some(SolverProgress {
            current_time,
            fraction,
        })
    }
}
