//! 把当前目标下的命中导出为 TSV 或 JSON 报告。

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::graph::NodeTable;
use crate::search::SearchSession;
use crate::util::seq::SequenceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Tsv,
    Json,
}

#[derive(Debug, Serialize)]
pub struct QuerySummary {
    pub name: String,
    pub kind: SequenceKind,
    pub length: usize,
    pub hits: usize,
    pub searched_for: bool,
}

#[derive(Debug, Serialize)]
pub struct HitRow {
    pub query: String,
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
    /// 命中在节点上的相对位置 [start, end)
    pub node_fraction: (f64, f64),
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub target: String,
    pub queries: Vec<QuerySummary>,
    pub hits: Vec<HitRow>,
}

impl Report {
    pub fn from_session(session: &SearchSession, nodes: &NodeTable) -> Self {
        let queries = session
            .queries()
            .iter()
            .map(|q| QuerySummary {
                name: q.name().to_string(),
                kind: q.kind(),
                length: q.len(),
                hits: q.hit_count(),
                searched_for: q.searched_for(),
            })
            .collect();

        let hits = session
            .target_hits()
            .into_iter()
            .map(|h| {
                let query = session.queries().query(h.query).map(|q| q.name()).unwrap_or("?");
                let node_len = nodes.node(&h.node).map(|n| n.len()).unwrap_or(0);
                HitRow {
                    query: query.to_string(),
                    node: h.node.clone(),
                    percent_identity: h.percent_identity,
                    alignment_length: h.alignment_length,
                    mismatches: h.mismatches,
                    gap_opens: h.gap_opens,
                    query_start: h.query_start,
                    query_end: h.query_end,
                    node_start: h.node_start,
                    node_end: h.node_end,
                    e_value: h.e_value,
                    bit_score: h.bit_score,
                    node_fraction: h.node_fraction(node_len),
                }
            })
            .collect();

        Self {
            generated_at: session.last_run().unwrap_or_else(Utc::now),
            target: session.target().map(ToString::to_string).unwrap_or_default(),
            queries,
            hits,
        }
    }

    pub fn write<W: Write>(&self, out: &mut W, format: ReportFormat) -> Result<()> {
        match format {
            ReportFormat::Tsv => self.write_tsv(out),
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self)?;
                writeln!(out)?;
                Ok(())
            }
        }
    }

    /// 注释行给出时间、目标和每个查询的命中数，随后每个命中一行
    pub fn write_tsv<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "# generated: {}", self.generated_at.to_rfc3339())?;
        writeln!(out, "# target: {}", self.target)?;
        for q in &self.queries {
            writeln!(out, "# query\t{}\t{}\t{}\t{} hits", q.name, q.kind, q.length, q.hits)?;
        }
        writeln!(
            out,
            "query\tnode\tpident\tlength\tmismatch\tgapopen\tqstart\tqend\tnstart\tnend\tevalue\tbitscore"
        )?;
        for h in &self.hits {
            writeln!(
                out,
                "{}\t{}\t{:.2}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:e}\t{}",
                h.query,
                h.node,
                h.percent_identity,
                h.alignment_length,
                h.mismatches,
                h.gap_opens,
                h.query_start,
                h.query_end,
                h.node_start,
                h.node_end,
                h.e_value,
                h.bit_score,
            )?;
        }
        Ok(())
    }
}
