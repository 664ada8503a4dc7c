// crates/vx_doc/src/error.rs

//! 文档层错误类型

use thiserror::Error;
use vx_foundation::VxError;

/// 文档模块结果类型
pub type DocResult<T> = Result<T, DocError>;

/// 文档错误枚举
#[derive(Debug, Error)]
pub enum DocError {
    /// XML 解析失败
    #[error("文档解析错误: {message}")]
    Parse {
        /// 解析失败原因
        message: String,
    },

    /// 文档缺少必需的节
    #[error("文档缺少 <{section}> 节")]
    MissingSection {
        /// 节名
        section: &'static str,
    },

    /// 网格部件与模板不一致
    #[error("模板部件不匹配: {name}")]
    TemplateMissingPart {
        /// 缺失的部件名
        name: String,
    },

    /// 命名集合在新网格中为空
    #[error("命名集合丢失: {name}")]
    SelectionLost {
        /// 丢失的集合名
        name: String,
    },

    /// 基础错误
    #[error(transparent)]
    Foundation(#[from] VxError),
}

impl DocError {
    /// 创建解析错误
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// 创建部件不匹配错误
    pub fn template_missing_part(name: impl Into<String>) -> Self {
        Self::TemplateMissingPart { name: name.into() }
    }

    /// 创建集合丢失错误
    pub fn selection_lost(name: impl Into<String>) -> Self {
        Self::SelectionLost { name: name.into() }
    }
}

impl From<std::io::Error> for DocError {
    fn from(e: std::io::Error) -> Self {
        Self::Foundation(e.into())
    }
}

impl From<quick_xml::Error> for DocError {
    fn from(e: quick_xml::Error) -> Self {
        Self::parse(e.to_string())
    }
}
