//! 查询、命中、输出解析与搜索会话

pub mod error;
pub mod hit;
pub mod parser;
pub mod query;
pub mod session;
pub mod target;

pub use error::SearchError;
pub use hit::{HitRecord, HitTable};
pub use parser::ParseSummary;
pub use query::{clean_query_name, Query, QueryId, QueryStore};
pub use session::{LoadProgress, SearchSession, SessionState};
pub use target::{Target, TargetIndex};
