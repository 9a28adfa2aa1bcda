//! BLAST 表格输出（`-outfmt 6`）解析与链接。
//!
//! 每行 12 列，以 tab 分隔：
//!
//! | 列 | 内容 |
//! |----|------|
//! | 0 | 查询名 |
//! | 1 | 节点标签（`NODE_<name>_length_<len>`） |
//! | 2 | identity 百分比 |
//! | 3 | 比对长度 |
//! | 4 | 错配数 |
//! | 5 | gap open 数 |
//! | 6, 7 | 查询起止 |
//! | 8, 9 | 节点起止 |
//! | 10 | e-value |
//! | 11 | bit score |
//!
//! 两类问题的处理方式不同：
//! - 格式坏的行（列数不足、数字解析失败）：停止解析，保留已解析的结果，不报错；
//! - 引用解析失败（节点或查询不存在）：整批作废并返回错误，命中表保持调用前的状态。

use std::str::FromStr;

use super::error::{Result, SearchError};
use super::hit::{HitRecord, HitTable};
use super::query::QueryStore;
use crate::graph::{self, NodeTable};

/// outfmt 6 的列数
pub const COLUMN_COUNT: usize = 12;

/// 一次解析的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub appended: usize,
    /// 反向链命中（node start > node end），被丢弃
    pub skipped_reverse: usize,
    /// 是否因格式坏的行提前停止
    pub stopped_early: bool,
}

/// 已切分、数值已解析但尚未链接的一行
#[derive(Debug)]
struct RawHit<'a> {
    query_name: &'a str,
    node_label: &'a str,
    percent_identity: f64,
    alignment_length: u32,
    mismatches: u32,
    gap_opens: u32,
    query_start: u32,
    query_end: u32,
    node_start: u32,
    node_end: u32,
    e_value: f64,
    bit_score: i64,
}

fn field<T: FromStr>(fields: &[&str], i: usize) -> Option<T> {
    fields[i].trim().parse().ok()
}

/// 切分一行；格式不对返回 `None`。
fn split_line(line: &str) -> Option<RawHit<'_>> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < COLUMN_COUNT {
        return None;
    }
    // BLAST 对小分值会输出小数 bit score，这里向零取整
    let bit_score: f64 = field(&fields, 11)?;
    Some(RawHit {
        query_name: fields[0].trim(),
        node_label: fields[1].trim(),
        percent_identity: field(&fields, 2)?,
        alignment_length: field(&fields, 3)?,
        mismatches: field(&fields, 4)?,
        gap_opens: field(&fields, 5)?,
        query_start: field(&fields, 6)?,
        query_end: field(&fields, 7)?,
        node_start: field(&fields, 8)?,
        node_end: field(&fields, 9)?,
        e_value: field(&fields, 10)?,
        bit_score: bit_score.trunc() as i64,
    })
}

/// 解析 BLAST 输出并把命中链接到查询和节点上。
///
/// 成功时所有命中一次性写入 `hits`（同时更新查询计数）；
/// 返回错误时 `hits` 与 `queries` 均不变。
pub fn parse(
    raw: &str,
    queries: &mut QueryStore,
    nodes: &NodeTable,
    hits: &mut HitTable,
) -> Result<ParseSummary> {
    let mut summary = ParseSummary::default();
    let mut staged: Vec<HitRecord> = Vec::new();

    for (lineno, line) in raw.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
        let Some(rec) = split_line(line) else {
            log::warn!("stopping at malformed BLAST output line {}: {:?}", lineno + 1, line);
            summary.stopped_early = true;
            break;
        };

        // 只保留正向链上的命中
        if rec.node_start > rec.node_end {
            summary.skipped_reverse += 1;
            continue;
        }

        let node_name = graph::node_name_from_label(rec.node_label).unwrap_or("");
        let Some(node) = nodes.node(node_name) else {
            return Err(SearchError::UnresolvedNodeReference {
                node: node_name.to_string(),
                label: rec.node_label.to_string(),
            });
        };

        let Some(query) = queries.query_by_name(rec.query_name) else {
            return Err(SearchError::UnresolvedQueryReference {
                query: rec.query_name.to_string(),
            });
        };

        staged.push(HitRecord {
            query: query.id(),
            node: node.name.clone(),
            percent_identity: rec.percent_identity,
            alignment_length: rec.alignment_length,
            mismatches: rec.mismatches,
            gap_opens: rec.gap_opens,
            query_start: rec.query_start,
            query_end: rec.query_end,
            node_start: rec.node_start,
            node_end: rec.node_end,
            e_value: rec.e_value,
            bit_score: rec.bit_score,
        });
    }

    summary.appended = staged.len();
    for hit in staged {
        hits.append(hit, queries);
    }
    log::info!(
        "parsed {} BLAST hits ({} reverse-strand skipped{})",
        summary.appended,
        summary.skipped_reverse,
        if summary.stopped_early { ", stopped at malformed line" } else { "" }
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "Q1\tNODE_7_length_500\t98.5\t120\t2\t0\t1\t120\t10\t130\t1e-40\t220";

    fn setup() -> (QueryStore, NodeTable, HitTable) {
        let mut queries = QueryStore::new();
        queries.add_query("Q1", vec![b'A'; 120]).unwrap();
        queries.add_query("Q2", vec![b'C'; 80]).unwrap();
        let mut nodes = NodeTable::new();
        nodes.insert("7", vec![b'A'; 500]);
        nodes.insert("8", vec![b'G'; 300]);
        (queries, nodes, HitTable::new())
    }

    fn line(query: &str, node: &str, start: u32, end: u32) -> String {
        format!("{query}\tNODE_{node}_length_500\t99.0\t50\t0\t0\t1\t50\t{start}\t{end}\t1e-20\t90")
    }

    #[test]
    fn parses_example_line() {
        let (mut queries, nodes, mut hits) = setup();
        let summary = parse(EXAMPLE, &mut queries, &nodes, &mut hits).unwrap();
        assert_eq!(summary.appended, 1);
        assert!(!summary.stopped_early);

        let h = hits.get(0).unwrap();
        let q1 = queries.query_by_name("Q1").unwrap();
        assert_eq!(h.query, q1.id());
        assert_eq!(h.node, "7");
        assert_eq!(h.percent_identity, 98.5);
        assert_eq!(h.alignment_length, 120);
        assert_eq!(h.mismatches, 2);
        assert_eq!(h.query_start, 1);
        assert_eq!(h.query_end, 120);
        assert_eq!(h.node_start, 10);
        assert_eq!(h.node_end, 130);
        assert_eq!(h.e_value, 1e-40);
        assert_eq!(h.bit_score, 220);
        assert_eq!(q1.hit_count(), 1);
    }

    #[test]
    fn reverse_strand_lines_are_skipped() {
        let (mut queries, nodes, mut hits) = setup();
        let raw = [line("Q1", "7", 130, 10), line("Q2", "8", 5, 40)].join("\n");
        let summary = parse(&raw, &mut queries, &nodes, &mut hits).unwrap();
        assert_eq!(summary.skipped_reverse, 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(queries.query_by_name("Q1").unwrap().hit_count(), 0);
        assert_eq!(queries.query_by_name("Q2").unwrap().hit_count(), 1);
    }

    #[test]
    fn malformed_line_keeps_earlier_hits() {
        let (mut queries, nodes, mut hits) = setup();
        let raw = [
            line("Q1", "7", 1, 50),
            line("Q2", "8", 1, 50),
            "Q1\tNODE_7_length_500\t99.0".to_string(),
            line("Q1", "8", 1, 50),
        ]
        .join("\n");
        let summary = parse(&raw, &mut queries, &nodes, &mut hits).unwrap();
        assert!(summary.stopped_early);
        assert_eq!(hits.len(), 2);
        assert_eq!(queries.query_by_name("Q1").unwrap().hit_count(), 1);
    }

    #[test]
    fn first_line_malformed_yields_nothing() {
        let (mut queries, nodes, mut hits) = setup();
        let raw = format!("garbage\n{}", line("Q1", "7", 1, 50));
        let summary = parse(&raw, &mut queries, &nodes, &mut hits).unwrap();
        assert!(summary.stopped_early);
        assert!(hits.is_empty());
    }

    #[test]
    fn unparsable_number_is_a_soft_stop() {
        let (mut queries, nodes, mut hits) = setup();
        let bad = "Q2\tNODE_8_length_300\tn/a\t50\t0\t0\t1\t50\t1\t50\t1e-20\t90";
        let raw = format!("{}\n{}", line("Q1", "7", 1, 50), bad);
        let summary = parse(&raw, &mut queries, &nodes, &mut hits).unwrap();
        assert!(summary.stopped_early);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn blank_and_crlf_lines_are_ignored() {
        let (mut queries, nodes, mut hits) = setup();
        let raw = format!("\n{}\r\n\r\n{}\r\n\n", line("Q1", "7", 1, 50), line("Q2", "8", 2, 9));
        let summary = parse(&raw, &mut queries, &nodes, &mut hits).unwrap();
        assert_eq!(summary.appended, 2);
        assert!(!summary.stopped_early);
        assert_eq!(hits.get(1).unwrap().bit_score, 90);
    }

    #[test]
    fn unknown_node_aborts_whole_batch() {
        let (mut queries, nodes, mut hits) = setup();
        let raw = [line("Q1", "7", 1, 50), line("Q1", "99", 1, 50), line("Q2", "8", 1, 50)].join("\n");
        let err = parse(&raw, &mut queries, &nodes, &mut hits).unwrap_err();
        assert!(matches!(err, SearchError::UnresolvedNodeReference { ref node, .. } if node == "99"));
        assert!(hits.is_empty());
        assert_eq!(queries.query_by_name("Q1").unwrap().hit_count(), 0);
    }

    #[test]
    fn label_without_node_token_is_unresolved() {
        let (mut queries, nodes, mut hits) = setup();
        let raw = "Q1\tcontig7\t99.0\t50\t0\t0\t1\t50\t1\t50\t1e-20\t90";
        let err = parse(raw, &mut queries, &nodes, &mut hits).unwrap_err();
        assert!(matches!(err, SearchError::UnresolvedNodeReference { .. }));
    }

    #[test]
    fn unknown_query_aborts_whole_batch() {
        let (mut queries, nodes, mut hits) = setup();
        let raw = [line("Q1", "7", 1, 50), line("Q9", "7", 1, 50)].join("\n");
        let err = parse(&raw, &mut queries, &nodes, &mut hits).unwrap_err();
        assert!(matches!(err, SearchError::UnresolvedQueryReference { ref query } if query == "Q9"));
        assert!(hits.is_empty());
    }

    #[test]
    fn prior_hits_survive_a_failed_batch() {
        let (mut queries, nodes, mut hits) = setup();
        parse(&line("Q1", "7", 1, 50), &mut queries, &nodes, &mut hits).unwrap();
        let raw = [line("Q2", "8", 1, 50), line("Q2", "404", 1, 50)].join("\n");
        assert!(parse(&raw, &mut queries, &nodes, &mut hits).is_err());
        assert_eq!(hits.len(), 1);
        assert_eq!(queries.query_by_name("Q2").unwrap().hit_count(), 0);
    }

    #[test]
    fn fractional_bit_score_is_truncated() {
        let (mut queries, nodes, mut hits) = setup();
        let raw = "Q1\tNODE_7_length_500\t100.00\t20\t0\t0\t1\t20\t1\t20\t0.002\t37.4";
        parse(raw, &mut queries, &nodes, &mut hits).unwrap();
        assert_eq!(hits.get(0).unwrap().bit_score, 37);
    }
}
