use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 默认传给 blastn / tblastn 的附加参数（空：使用 BLAST 自身默认值）
pub const DEFAULT_PARAMETERS: &str = "";

/// 一次自动搜索的配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// 查询序列 FASTA
    pub query_file: PathBuf,
    /// 原样追加到搜索命令行末尾的参数串，例如 `-evalue 1e-5`
    pub parameters: String,
    /// 存放数据库和中间文件的目录。实际文件写在其下的 `graph-blast-scratch` 子目录，
    /// 清理只清空该子目录
    pub scratch_dir: PathBuf,
}

impl SearchConfig {
    pub fn new(query_file: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            query_file: query_file.into(),
            parameters: DEFAULT_PARAMETERS.to_string(),
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn with_parameters(mut self, parameters: impl Into<String>) -> Self {
        self.parameters = parameters.into();
        self
    }
}
