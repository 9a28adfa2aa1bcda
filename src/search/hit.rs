use serde::Serialize;
use std::collections::HashSet;

use super::query::{QueryId, QueryStore};

/// 一条 BLAST 比对结果（outfmt 6 的一行）。
///
/// 查询与节点都按键引用：`query` 通过 [`QueryStore`] 解析，
/// `node` 通过 [`crate::graph::NodeTable`] 解析。坐标均为 1-based 闭区间，
/// 且保证 `node_start <= node_end`。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitRecord {
    pub query: QueryId,
    pub node: String,
    pub percent_identity: f64,
    pub alignment_length: u32,
    pub mismatches: u32,
    pub gap_opens: u32,
    pub query_start: u32,
    pub query_end: u32,
    pub node_start: u32,
    pub node_end: u32,
    pub e_value: f64,
    pub bit_score: i64,
}

fn span_fraction(start: u32, end: u32, len: usize) -> (f64, f64) {
    if len == 0 {
        return (0.0, 0.0);
    }
    let len = len as f64;
    ((start.saturating_sub(1)) as f64 / len, end as f64 / len)
}

impl HitRecord {
    /// 比对在查询上的起止位置，以查询长度的比例表示
    pub fn query_fraction(&self, query_len: usize) -> (f64, f64) {
        span_fraction(self.query_start, self.query_end, query_len)
    }

    /// 比对在节点上的起止位置，以节点长度的比例表示（渲染时用来定位）
    pub fn node_fraction(&self, node_len: usize) -> (f64, f64) {
        span_fraction(self.node_start, self.node_end, node_len)
    }

    /// 比对覆盖查询的比例
    pub fn query_coverage(&self, query_len: usize) -> f64 {
        let (s, e) = self.query_fraction(query_len);
        (e - s).max(0.0)
    }
}

/// 当前搜索的全部命中，按解析顺序保存。
#[derive(Debug, Default)]
pub struct HitTable {
    hits: Vec<HitRecord>,
}

impl HitTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条命中，同时给对应查询的命中计数加一。
    pub fn append(&mut self, hit: HitRecord, queries: &mut QueryStore) {
        queries.increment_hits(hit.query);
        self.hits.push(hit);
    }

    /// 删除属于给定查询的全部命中，其余命中保持相对顺序。
    pub fn remove_for_queries(&mut self, ids: &[QueryId]) -> usize {
        let doomed: HashSet<QueryId> = ids.iter().copied().collect();
        let before = self.hits.len();
        self.hits.retain(|h| !doomed.contains(&h.query));
        before - self.hits.len()
    }

    pub fn clear(&mut self) {
        self.hits.clear();
    }

    pub fn get(&self, pos: usize) -> Option<&HitRecord> {
        self.hits.get(pos)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HitRecord> {
        self.hits.iter()
    }

    pub fn hits_for_query(&self, id: QueryId) -> impl Iterator<Item = &HitRecord> {
        self.hits.iter().filter(move |h| h.query == id)
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
