//! 一次 BLAST 搜索会话：持有查询、命中与节点索引，并串起建库 → 搜索 → 解析。

use chrono::{DateTime, Utc};
use std::ops::ControlFlow;
use std::path::Path;

use super::error::{Result, SearchError};
use super::hit::{HitRecord, HitTable};
use super::parser::{self, ParseSummary};
use super::query::{QueryId, QueryStore};
use super::target::{Target, TargetIndex};
use crate::config::SearchConfig;
use crate::graph::NodeTable;
use crate::io::fasta;
use crate::tools::ToolRunner;
use crate::util::seq::SequenceKind;

/// 会话状态。`Empty` 时命中表一定为空。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Populated { target: Target },
}

/// 查询加载进度，每载入一条查询回调一次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: usize,
    pub total: usize,
}

pub struct SearchSession {
    config: SearchConfig,
    runner: ToolRunner,
    queries: QueryStore,
    hits: HitTable,
    index: TargetIndex,
    raw_output: String,
    state: SessionState,
    last_run: Option<DateTime<Utc>>,
}

impl SearchSession {
    pub fn new(config: SearchConfig, runner: ToolRunner) -> Self {
        Self {
            config,
            runner,
            queries: QueryStore::new(),
            hits: HitTable::new(),
            index: TargetIndex::new(),
            raw_output: String::new(),
            state: SessionState::Empty,
            last_run: None,
        }
    }

    /// 使用系统 PATH 中的 BLAST 程序
    pub fn with_system_tools(config: SearchConfig) -> Self {
        let runner = ToolRunner::system(config.scratch_dir.clone());
        Self::new(config, runner)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn target(&self) -> Option<&Target> {
        match &self.state {
            SessionState::Populated { target } => Some(target),
            SessionState::Empty => None,
        }
    }

    pub fn queries(&self) -> &QueryStore {
        &self.queries
    }

    pub fn hits(&self) -> &HitTable {
        &self.hits
    }

    pub fn index(&self) -> &TargetIndex {
        &self.index
    }

    pub fn raw_output(&self) -> &str {
        &self.raw_output
    }

    pub fn last_run(&self) -> Option<DateTime<Utc>> {
        self.last_run
    }

    pub fn scratch_dir(&self) -> &Path {
        self.runner.scratch_dir()
    }

    /// 丢弃上一次搜索的结果，查询保留。
    pub fn clear_hits(&mut self) {
        self.hits.clear();
        self.index.clear();
        self.queries.clear_search_results();
        self.raw_output.clear();
        self.state = SessionState::Empty;
    }

    /// 清掉命中和全部查询，并清空临时目录。
    pub fn clean_up(&mut self) -> Result<()> {
        self.clear_hits();
        self.queries.clear_all();
        self.runner.empty_scratch_dir()?;
        Ok(())
    }

    /// 从 FASTA 载入查询，名字按 [`super::query::clean_query_name`] 规范化。
    ///
    /// `progress` 返回 `Break` 即取消。出错或取消时本次载入的查询全部撤销。
    pub fn load_queries<F>(&mut self, path: &Path, mut progress: F) -> Result<usize>
    where
        F: FnMut(LoadProgress) -> ControlFlow<()>,
    {
        let records = fasta::read_fasta_file(path).map_err(|e| SearchError::SequenceFile {
            path: path.display().to_string(),
            message: format!("{:#}", e),
        })?;

        let total = records.len();
        let mut added: Vec<QueryId> = Vec::with_capacity(total);
        for rec in records {
            let step = self.queries.add_query(&rec.header, rec.seq).and_then(|id| {
                added.push(id);
                match progress(LoadProgress { loaded: added.len(), total }) {
                    ControlFlow::Continue(()) => Ok(()),
                    ControlFlow::Break(()) => Err(SearchError::Cancelled),
                }
            });
            if let Err(e) = step {
                self.queries.remove_queries(&added);
                return Err(e);
            }
        }
        log::info!("loaded {} queries from {}", total, path.display());
        Ok(total)
    }

    /// 全自动搜索：清理 → 建库 → 载入查询 → 定位搜索程序 → 搜索 → 解析 → 选中 "all"。
    ///
    /// 任何一步失败都立即返回该步的错误，会话停留在 `Empty`。
    pub fn run_automatic_search<F>(&mut self, nodes: &NodeTable, progress: F) -> Result<ParseSummary>
    where
        F: FnMut(LoadProgress) -> ControlFlow<()>,
    {
        self.clean_up()?;

        self.runner.build_database(nodes)?;

        let query_file = self.config.query_file.clone();
        self.load_queries(&query_file, progress)?;

        let programs = self.runner.locate_search_programs()?;
        let raw = self.runner.run_search(&programs, &self.queries, &self.config.parameters)?;
        self.queries.mark_searched(SequenceKind::Nucleotide);
        self.queries.mark_searched(SequenceKind::Protein);

        let summary = self.link_output(raw, nodes)?;
        self.last_run = Some(Utc::now());
        Ok(summary)
    }

    /// 解析一份已有的 BLAST 输出（不运行 BLAST）。已载入的查询保留，旧命中被替换。
    pub fn load_output(&mut self, raw: String, nodes: &NodeTable) -> Result<ParseSummary> {
        self.clear_hits();
        let summary = self.link_output(raw, nodes)?;
        self.last_run = Some(Utc::now());
        Ok(summary)
    }

    fn link_output(&mut self, raw: String, nodes: &NodeTable) -> Result<ParseSummary> {
        self.raw_output = raw;
        let summary = parser::parse(&self.raw_output, &mut self.queries, nodes, &mut self.hits)?;
        self.state = SessionState::Populated { target: Target::All };
        self.select_target(Target::All)?;
        Ok(summary)
    }

    /// 删除部分查询：先删命中，再删查询，最后按当前目标重建索引。
    /// 若当前目标正是被删的查询，改为选中 "all"。
    pub fn remove_queries(&mut self, ids: &[QueryId]) -> usize {
        let removed_hits = self.hits.remove_for_queries(ids);
        let removed = self.queries.remove_queries(ids);
        log::info!("removed {} queries and {} hits", removed, removed_hits);

        if let SessionState::Populated { target } = &self.state {
            let target = match target {
                Target::Query(name) if self.queries.query_by_name(name).is_none() => Target::All,
                other => other.clone(),
            };
            // 目标已确认存在，这里不会失败
            if let Err(e) = self.select_target(target) {
                log::warn!("could not reselect target after removal: {}", e);
            }
        } else {
            self.index.clear();
        }
        removed
    }

    fn selected_queries(&self, target: &Target) -> Result<Vec<QueryId>> {
        match target {
            Target::All => Ok(self.queries.ids()),
            Target::Query(name) => self
                .queries
                .query_by_name(name)
                .map(|q| vec![q.id()])
                .ok_or_else(|| SearchError::UnknownTarget { name: name.clone() }),
        }
    }

    /// 重建节点索引，只挂上所选查询的命中。
    ///
    /// 名字不存在时返回 [`SearchError::UnknownTarget`]，原索引和目标保持不变。
    pub fn select_target(&mut self, target: Target) -> Result<()> {
        let selected = self.selected_queries(&target)?;
        self.index.rebuild(&selected, &self.hits);
        log::info!(
            "target '{}': {} hits on {} nodes",
            target,
            self.index.total(),
            self.index.nodes().count()
        );
        if let SessionState::Populated { .. } = self.state {
            self.state = SessionState::Populated { target };
        }
        Ok(())
    }

    /// 当前目标下挂在某节点上的命中
    pub fn hits_on_node<'a>(&'a self, node: &str) -> impl Iterator<Item = &'a HitRecord> + 'a {
        let positions = self.index.hit_positions(node);
        positions.iter().filter_map(move |&p| self.hits.get(p))
    }

    pub fn node_hit_count(&self, node: &str) -> usize {
        self.index.node_hit_count(node)
    }

    /// 当前目标下的全部命中，按命中表顺序
    pub fn target_hits(&self) -> Vec<&HitRecord> {
        let Some(target) = self.target() else {
            return Vec::new();
        };
        let selected = self.selected_queries(target).unwrap_or_default();
        self.hits.iter().filter(|h| selected.contains(&h.query)).collect()
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        if let Err(e) = self.runner.empty_scratch_dir() {
            log::warn!("could not empty scratch directory on drop: {}", e);
        }
    }
}
