// crates/vx_foundation/src/cancel.rs

//! 协作式取消令牌
//!
//! 各管线阶段在粗粒度边界（每轮单元遍历、每行求解器输出）检查令牌，
//! 发现取消后返回 [`VxError::Cancelled`] 并保持文件系统一致。

use crate::error::{VxError, VxResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 取消令牌
///
/// 可自由克隆，所有克隆共享同一取消标志。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// 创建未取消的令牌
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// 是否已取消
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// 已取消则返回 [`VxError::Cancelled`]
    #[inline]
    pub fn check(&self) -> VxResult<()> {
        if self.is_cancelled() {
            Err(VxError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_shared_across_clones() {
        let token = CancelToken::new();
        let clone = token.clone();

        assert!(token.check().is_ok());
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(VxError::Cancelled)));
    }
}
