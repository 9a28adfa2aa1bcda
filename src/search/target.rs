use std::collections::HashMap;

use super::hit::HitTable;
use super::query::QueryId;

/// 选择哪些查询的命中挂到节点上
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    All,
    Query(String),
}

impl Target {
    pub const ALL: &'static str = "all";
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        if s == Target::ALL {
            Target::All
        } else {
            Target::Query(s.to_string())
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::All => f.write_str(Target::ALL),
            Target::Query(name) => f.write_str(name),
        }
    }
}

/// 节点 → 命中位置（[`HitTable`] 中的下标）的派生索引。
///
/// 每次选择目标都会整体重建；不做增量维护。
#[derive(Debug, Default)]
pub struct TargetIndex {
    by_node: HashMap<String, Vec<usize>>,
    total: usize,
}

impl TargetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 清除所有节点上挂着的命中
    pub fn clear(&mut self) {
        self.by_node.clear();
        self.total = 0;
    }

    /// 先清空，再按 `selected` 的顺序逐个查询扫描整个命中表。
    pub fn rebuild(&mut self, selected: &[QueryId], hits: &HitTable) {
        self.clear();
        for &q in selected {
            for (pos, hit) in hits.iter().enumerate() {
                if hit.query == q {
                    self.by_node.entry(hit.node.clone()).or_default().push(pos);
                    self.total += 1;
                }
            }
        }
    }

    pub fn hit_positions(&self, node: &str) -> &[usize] {
        self.by_node.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_hit_count(&self, node: &str) -> usize {
        self.hit_positions(node).len()
    }

    /// 至少挂了一条命中的节点（无序）
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.by_node.keys().map(String::as_str)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
