use thiserror::Error;

/// 保留参数取值错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("query parameter '{name}' must be an unsigned integer, got '{value}'")]
    NotUnsigned { name: &'static str, value: String },
}

/// 分类查找错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CategoryError {
    /// 分类不存在
    #[error("no such category: {0}")]
    NotFound(u64),
    /// 向上查找祖先时回到了已访问的分类
    #[error("category tree contains a cycle at category {0}")]
    Cycle(u64),
}
