use thiserror::Error;

/// 查询字符串与 URL 处理错误
#[derive(Debug, Error)]
pub enum QueryError {
    /// URL 无法解析
    #[error("invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
