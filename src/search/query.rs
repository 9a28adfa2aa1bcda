use serde::Serialize;
use std::collections::HashSet;

use super::error::{Result, SearchError};
use super::target::Target;
use crate::util::seq::{self, SequenceKind};

/// 查询在 [`QueryStore`] 中的稳定编号，删除后不复用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QueryId(pub(crate) u32);

impl QueryId {
    pub fn get(self) -> u32 {
        self.0
    }
}

/// 一条搜索查询
#[derive(Debug, Clone, Serialize)]
pub struct Query {
    id: QueryId,
    name: String,
    #[serde(skip)]
    seq: Vec<u8>,
    kind: SequenceKind,
    /// 本次搜索中链接到该查询的命中数
    hits: usize,
    /// 是否已提交给某次搜索
    searched_for: bool,
}

impl Query {
    pub fn id(&self) -> QueryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seq(&self) -> &[u8] {
        &self.seq
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    pub fn hit_count(&self) -> usize {
        self.hits
    }

    pub fn searched_for(&self) -> bool {
        self.searched_for
    }
}

/// 规范化查询名：空白替换为下划线，并去掉结尾的点。
///
/// BLAST 输出的 qseqid 不带结尾的点，不去掉就无法按名字匹配回查询。
pub fn clean_query_name(name: &str) -> String {
    let replaced: String = name
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    replaced.trim_end_matches('.').to_string()
}

/// 会话内全部查询，按添加顺序保存。
#[derive(Debug, Default)]
pub struct QueryStore {
    queries: Vec<Query>,
    next_id: u32,
}

impl QueryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加查询。名字先规范化；规范化后重名，或与 `"all"` 相同的查询会被拒绝。
    pub fn add_query(&mut self, name: &str, seq: Vec<u8>) -> Result<QueryId> {
        let name = clean_query_name(name);
        if name == Target::ALL {
            return Err(SearchError::ReservedQueryName { name });
        }
        if self.query_by_name(&name).is_some() {
            return Err(SearchError::DuplicateQuery { name });
        }
        let id = QueryId(self.next_id);
        self.next_id += 1;
        let kind = seq::detect_kind(&seq);
        log::debug!("query '{}' added as {} ({} residues)", name, kind, seq.len());
        self.queries.push(Query { id, name, seq, kind, hits: 0, searched_for: false });
        Ok(id)
    }

    pub fn query(&self, id: QueryId) -> Option<&Query> {
        self.queries.iter().find(|q| q.id == id)
    }

    pub(crate) fn query_mut(&mut self, id: QueryId) -> Option<&mut Query> {
        self.queries.iter_mut().find(|q| q.id == id)
    }

    pub fn query_by_name(&self, name: &str) -> Option<&Query> {
        self.queries.iter().find(|q| q.name == name)
    }

    pub(crate) fn increment_hits(&mut self, id: QueryId) {
        if let Some(q) = self.query_mut(id) {
            q.hits += 1;
        }
    }

    /// 删除给定查询，其余查询保持原顺序。返回实际删除的数量。
    pub fn remove_queries(&mut self, ids: &[QueryId]) -> usize {
        let doomed: HashSet<QueryId> = ids.iter().copied().collect();
        let before = self.queries.len();
        self.queries.retain(|q| !doomed.contains(&q.id));
        before - self.queries.len()
    }

    pub fn clear_all(&mut self) {
        self.queries.clear();
    }

    /// 清掉上一次搜索留下的统计，查询本身保留。
    pub fn clear_search_results(&mut self) {
        for q in &mut self.queries {
            q.hits = 0;
            q.searched_for = false;
        }
    }

    pub(crate) fn mark_searched(&mut self, kind: SequenceKind) {
        for q in self.queries.iter_mut().filter(|q| q.kind == kind) {
            q.searched_for = true;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Query> {
        self.queries.iter()
    }

    pub fn of_kind(&self, kind: SequenceKind) -> impl Iterator<Item = &Query> {
        self.queries.iter().filter(move |q| q.kind == kind)
    }

    pub fn ids(&self) -> Vec<QueryId> {
        self.queries.iter().map(|q| q.id).collect()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}
