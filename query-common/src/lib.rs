pub mod codec;
pub mod error;
pub mod models;

// 重新导出常用类型和函数，方便直接使用
pub use codec::{join_url, parse_query, parse_url, split_url, to_query_string};
pub use error::QueryError;
pub use models::{QueryState, QueryValue};
