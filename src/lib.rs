//! # graph-blast
//!
//! 用 NCBI BLAST 在序列图的节点上搜索查询序列，并把表格输出链接回图节点与查询。
//!
//! 本 crate 不实现比对算法，所有序列比较都交给外部程序：
//!
//! - **建库**：把图中所有节点写成 FASTA，调用 `makeblastdb`
//! - **搜索**：核酸查询用 `blastn`，蛋白查询用 `tblastn`，输出 `-outfmt 6`
//! - **解析与链接**：把 12 列表格解析成 [`search::HitRecord`]，按名字解析查询与节点
//! - **目标选择**：为 "all" 或某个查询重建 节点 → 命中 索引，供渲染 / 报告使用
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use std::ops::ControlFlow;
//! use graph_blast::config::SearchConfig;
//! use graph_blast::graph::NodeTable;
//! use graph_blast::search::{SearchSession, Target};
//!
//! let nodes = NodeTable::from_fasta("graph_nodes.fasta".as_ref()).unwrap();
//! let config = SearchConfig::new("queries.fasta", "/tmp/graph-blast").with_parameters("-evalue 1e-5");
//! let mut session = SearchSession::with_system_tools(config);
//!
//! match session.run_automatic_search(&nodes, |_| ControlFlow::Continue(())) {
//!     Ok(summary) => println!("{} hits", summary.appended),
//!     Err(e) => eprintln!("{}", e),
//! }
//!
//! session.select_target(Target::from("my_gene")).ok();
//! for hit in session.hits_on_node("7") {
//!     println!("{}..{} e={}", hit.node_start, hit.node_end, hit.e_value);
//! }
//! ```
//!
//! ## 模块说明
//!
//! - [`io`]：FASTA 读写
//! - [`graph`]：节点表与数据库标签约定
//! - [`search`]：查询、命中、输出解析、会话
//! - [`tools`]：外部程序的定位与调用
//! - [`config`]：搜索配置
//! - [`report`]：TSV / JSON 报告
//! - [`util`]：序列类型判断

pub mod config;
pub mod graph;
pub mod io;
pub mod report;
pub mod search;
pub mod tools;
pub mod util;
