//! 搜索流程的错误类型

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

/// 会话对外暴露的全部错误。`Display` 即给用户看的那一条消息。
#[derive(Debug, Error)]
pub enum SearchError {
    /// 外部程序不在 PATH 中
    #[error("Error: The program {program} was not found.  Please install NCBI BLAST to use this feature.")]
    ToolNotFound { program: String },

    /// 外部程序以非零状态退出或无法启动
    #[error("Error: {program} failed (status={status:?}): {message}")]
    ToolExecutionFailed {
        program: String,
        status: Option<i32>,
        message: String,
    },

    /// BLAST 结果引用了当前图中不存在的节点
    #[error("Error: BLAST hit refers to node '{node}' (label '{label}') which is not in the graph")]
    UnresolvedNodeReference { node: String, label: String },

    /// BLAST 结果引用了不存在的查询
    #[error("Error: BLAST hit refers to unknown query '{query}'")]
    UnresolvedQueryReference { query: String },

    #[error("Error: a query named '{name}' already exists")]
    DuplicateQuery { name: String },

    /// "all" 用来选中全部查询，不能作为查询名
    #[error("Error: '{name}' is reserved and cannot be used as a query name")]
    ReservedQueryName { name: String },

    #[error("Error: no query named '{name}'")]
    UnknownTarget { name: String },

    /// 数据库节点名里不能含下划线，否则无法从标签中还原
    #[error("Error: node name '{name}' contains '_' and cannot be encoded in a BLAST database label")]
    InvalidNodeName { name: String },

    #[error("Error: query loading was cancelled")]
    Cancelled,

    #[error("Error: cannot read query file '{path}': {message}")]
    SequenceFile { path: String, message: String },

    #[error("Error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl SearchError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        SearchError::Io { context: context.into(), source }
    }
}
