//! 图节点表。
//!
//! 节点表由调用方（图加载 / 渲染层）拥有，本 crate 只读取它：
//! 建库时导出节点序列，解析 BLAST 输出时按名字解析节点。

use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

use crate::io::fasta;

/// 数据库中节点标签的前缀，标签形如 `NODE_<name>_length_<len>`
pub const LABEL_PREFIX: &str = "NODE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub seq: Vec<u8>,
}

impl Node {
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// 写入 BLAST 数据库时使用的标签
    pub fn db_label(&self) -> String {
        format!("{}_{}_length_{}", LABEL_PREFIX, self.name, self.len())
    }
}

/// 从节点标签中取出节点名：下划线分隔的第二段。
pub fn node_name_from_label(label: &str) -> Option<&str> {
    label.split('_').nth(1)
}

/// 按名字索引的节点表，保持插入顺序。
#[derive(Debug, Default, Clone)]
pub struct NodeTable {
    nodes: Vec<Node>,
    by_name: HashMap<String, usize>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入节点；同名节点会被替换。
    pub fn insert(&mut self, name: impl Into<String>, seq: Vec<u8>) {
        let name = name.into();
        if let Some(&i) = self.by_name.get(&name) {
            self.nodes[i].seq = seq;
            return;
        }
        self.by_name.insert(name.clone(), self.nodes.len());
        self.nodes.push(Node { name, seq });
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.by_name.get(name).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 从 FASTA 读入节点。标题已是 `NODE_<name>_...` 形式时取其中的节点名，
    /// 否则直接使用标题的第一个词。
    pub fn from_fasta(path: &Path) -> Result<Self> {
        let records = fasta::read_fasta_file(path)?;
        if records.is_empty() {
            anyhow::bail!("graph FASTA '{}' contains no sequences", path.display());
        }
        let mut table = Self::new();
        for rec in records {
            let name = match rec.id.strip_prefix(LABEL_PREFIX) {
                Some(rest) if rest.starts_with('_') => {
                    node_name_from_label(&rec.id).unwrap_or(&rec.id).to_string()
                }
                _ => rec.id.clone(),
            };
            table.insert(name, rec.seq);
        }
        log::info!("loaded {} graph nodes from {}", table.len(), path.display());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn label_round_trips_node_name() {
        let node = Node { name: "7".to_string(), seq: b"ACGTA".to_vec() };
        let label = node.db_label();
        assert_eq!(label, "NODE_7_length_5");
        assert_eq!(node_name_from_label(&label), Some("7"));
    }

    #[test]
    fn label_without_underscore_has_no_name() {
        assert_eq!(node_name_from_label("contig7"), None);
        assert_eq!(node_name_from_label("NODE_12_length_500_cov_3.2"), Some("12"));
    }

    #[test]
    fn insert_replaces_same_name() {
        let mut t = NodeTable::new();
        t.insert("1", b"AAA".to_vec());
        t.insert("2", b"CC".to_vec());
        t.insert("1", b"GGGG".to_vec());
        assert_eq!(t.len(), 2);
        assert_eq!(t.node("1").unwrap().seq, b"GGGG");
        let names: Vec<&str> = t.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["1", "2"]);
        assert!(t.node("3").is_none());
    }

    #[test]
    fn from_fasta_accepts_both_header_styles() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, ">NODE_5_length_4_cov_2.0\nACGT\n>12+ extra\nGGG\n").unwrap();
        let t = NodeTable::from_fasta(f.path()).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.node("5").unwrap().len(), 4);
        assert_eq!(t.node("12+").unwrap().seq, b"GGG");
    }
}
